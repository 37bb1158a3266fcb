//! Interactive map ownership: sessions, markers, popups, registry

pub mod backend;
pub mod marker;
pub mod popup;
pub mod registry;
pub mod session;

pub use backend::{MapBackend, MapInstanceId, Viewport};
pub use marker::{Marker, MarkerId, MarkerKind};
pub use popup::{station_popup, PopupDescriptor, ReserveAction};
pub use registry::{MapHandle, MapRegistry};
pub use session::{MapSession, ReserveCallback, SelectCallback, SessionState};
