//! Application ports (hexagonal architecture boundaries)

pub mod outbound;

pub use outbound::{
    GeocodeError, GeocodeHit, GeocodingPort, PositionError, PositioningPort, QueryError,
    StationQueryPort,
};
