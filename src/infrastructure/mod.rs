//! Infrastructure layer - external concerns

pub mod http;
pub mod map;
pub mod positioning;

pub use http::{HttpStationQuery, NominatimGeocoder};
pub use map::InMemoryMapBackend;
pub use positioning::{IpPositioning, StaticPositioning};
