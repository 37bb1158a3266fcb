//! Geolocation with a deterministic fallback policy

use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use log::{debug, warn};

use crate::application::ports::PositioningPort;
use crate::domain::Coordinate;

/// Side channel distinguishing a real fix from the masked fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FixStatus {
    /// No resolution attempted yet
    Pending,
    /// Real position acquired from the capability
    Acquired,
    /// Capability failed or timed out; coordinate is the configured default
    Fallback,
}

/// Result of one `resolve()` call.
#[derive(Debug, Clone, Copy)]
pub struct LocationFix {
    pub coordinate: Coordinate,
    pub status: FixStatus,
    pub acquired_at: DateTime<Utc>,
}

/// Resolves the user's position, masking every failure with a fixed
/// fallback coordinate (a configured default city center).
///
/// `resolve()` never fails and never retries on its own; a retry is the
/// caller invoking `resolve()` again.
pub struct GeoLocator {
    port: Arc<dyn PositioningPort>,
    fallback: Coordinate,
    timeout: Duration,
}

impl GeoLocator {
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

    pub fn new(port: Arc<dyn PositioningPort>, fallback: Coordinate, timeout: Duration) -> Self {
        Self {
            port,
            fallback,
            timeout,
        }
    }

    /// The coordinate substituted when positioning fails.
    pub fn fallback(&self) -> Coordinate {
        self.fallback
    }

    /// Resolve the current position, bounded by the configured timeout.
    ///
    /// Any port error and a timeout are treated identically: the fallback
    /// coordinate is returned with [`FixStatus::Fallback`].
    pub async fn resolve(&self) -> LocationFix {
        let status = match tokio::time::timeout(self.timeout, self.port.current_position()).await {
            Ok(Ok(position)) => {
                debug!("Position acquired: {}", position);
                return LocationFix {
                    coordinate: position,
                    status: FixStatus::Acquired,
                    acquired_at: Utc::now(),
                };
            }
            Ok(Err(err)) => {
                warn!("Positioning failed ({}), using fallback", err);
                FixStatus::Fallback
            }
            Err(_) => {
                warn!(
                    "Positioning timed out after {:?}, using fallback",
                    self.timeout
                );
                FixStatus::Fallback
            }
        };

        LocationFix {
            coordinate: self.fallback,
            status,
            acquired_at: Utc::now(),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
