//! Outbound ports — interfaces to the collaborators the discovery core consumes
//!
//! These traits are the architectural contract that decouples the discovery
//! services from concrete transports. The production implementations live in
//! [`infrastructure::http`](crate::infrastructure::http) and
//! [`infrastructure::positioning`](crate::infrastructure::positioning);
//! tests substitute in-memory fakes.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::{Coordinate, Station};

// ── Station query ──────────────────────────────────────────────

/// Errors from the station proximity query.
#[derive(Debug, Error)]
pub enum QueryError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("service rejected the query: {0}")]
    Service(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// Port for the backend proximity search.
///
/// One call, one candidate superset for the given center and radius. The
/// directory layers generation tracking on top; implementations only fetch.
#[async_trait]
pub trait StationQueryPort: Send + Sync {
    async fn fetch_nearby(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Station>, QueryError>;
}

// ── Geocoding ──────────────────────────────────────────────────

/// Errors from the forward/reverse geocoder.
#[derive(Debug, Error)]
pub enum GeocodeError {
    #[error("transport failure: {0}")]
    Transport(String),

    #[error("malformed response: {0}")]
    Decode(String),
}

/// One forward-geocoding hit.
#[derive(Debug, Clone)]
pub struct GeocodeHit {
    pub coordinate: Coordinate,
    pub display_name: Option<String>,
}

/// Port for the third-party geocoding service.
///
/// Best-effort and unauthenticated; callers must tolerate both errors and
/// empty result sets.
#[async_trait]
pub trait GeocodingPort: Send + Sync {
    /// Resolve a free-text query to candidate coordinates, best match first.
    async fn forward(&self, query: &str) -> Result<Vec<GeocodeHit>, GeocodeError>;

    /// Resolve a coordinate to a display label, if the service knows one.
    async fn reverse(&self, position: Coordinate) -> Result<Option<String>, GeocodeError>;
}

// ── Positioning ────────────────────────────────────────────────

/// Errors from the positioning capability.
#[derive(Debug, Error)]
pub enum PositionError {
    #[error("permission denied")]
    PermissionDenied,

    #[error("positioning capability absent")]
    CapabilityAbsent,

    #[error("position unavailable: {0}")]
    Unavailable(String),
}

/// Port for acquiring the user's current position.
///
/// Asynchronous and permission-gated; the locator on top bounds the call
/// with a timeout and masks every failure with the configured fallback
/// coordinate.
#[async_trait]
pub trait PositioningPort: Send + Sync {
    async fn current_position(&self) -> Result<Coordinate, PositionError>;
}
