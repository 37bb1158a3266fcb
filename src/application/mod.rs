pub mod ports;
pub mod services;
pub mod session;

// Re-export key types for convenience
pub use ports::{
    GeocodeError, GeocodeHit, GeocodingPort, PositionError, PositioningPort, QueryError,
    StationQueryPort,
};
pub use services::{
    filter, AddressResolver, FixStatus, GeoLocator, LocationFix, RefreshOutcome, StationDirectory,
};
pub use session::DiscoverySession;
