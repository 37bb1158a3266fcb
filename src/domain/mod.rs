pub mod geo;
pub mod search;
pub mod station;

// Re-export commonly used types
pub use geo::{distance_km, Coordinate, GeoBounds, EARTH_RADIUS_KM};
pub use search::{SearchCriteria, StatusFilter};
pub use station::{Station, StationStatus};

// Re-export the error pair for convenience
pub use crate::shared::types::{DiscoveryError, DiscoveryResult};
