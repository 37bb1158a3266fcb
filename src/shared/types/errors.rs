use thiserror::Error;

/// Failure taxonomy for the discovery session.
///
/// Recoverable conditions (geolocation failure, geocode miss) are absorbed
/// close to where they occur and never reach callers as errors; only
/// conditions the user would otherwise not notice (a stale candidate set)
/// propagate.
#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error("Invalid coordinate: {field}={value} out of range")]
    InvalidCoordinate { field: &'static str, value: f64 },

    #[error("Station directory fetch failed: {0}")]
    DirectoryFetchFailed(String),

    #[error("Geolocation unavailable: {0}")]
    GeolocationUnavailable(String),

    #[error("No geocoding result for {query:?}")]
    GeocodeNotFound { query: String },

    #[error("Map container {0:?} is not present")]
    MapContainerMissing(String),

    #[error("Map session for container {0:?} is disposed")]
    MapSessionDisposed(String),
}

impl DiscoveryError {
    /// Whether this error should be surfaced to the user as a message.
    ///
    /// Only a failed directory fetch qualifies: the candidate set on screen
    /// is stale and the user has no other way to know.
    pub fn is_user_visible(&self) -> bool {
        matches!(self, DiscoveryError::DirectoryFetchFailed(_))
    }
}

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

// ── Tests ──────────────────────────────────────────────────────
