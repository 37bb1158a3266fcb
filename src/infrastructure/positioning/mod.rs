//! Positioning adapters
//!
//! Outside a browser there is no permission-gated geolocation API, so the
//! capability is either an IP-geolocation lookup or a position pinned in
//! configuration. Both feed the locator, which owns the timeout and
//! fallback policy.

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use crate::application::ports::{PositionError, PositioningPort};
use crate::domain::Coordinate;

const USER_AGENT: &str = concat!("borne-finder/", env!("CARGO_PKG_VERSION"));

/// A position pinned in configuration; `None` models an absent capability.
pub struct StaticPositioning {
    position: Option<Coordinate>,
}

impl StaticPositioning {
    pub fn pinned(position: Coordinate) -> Self {
        Self {
            position: Some(position),
        }
    }

    pub fn absent() -> Self {
        Self { position: None }
    }
}

#[async_trait]
impl PositioningPort for StaticPositioning {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        self.position.ok_or(PositionError::CapabilityAbsent)
    }
}

#[derive(Debug, Deserialize)]
struct IpLookupResponse {
    status: Option<String>,
    lat: Option<f64>,
    lon: Option<f64>,
}

/// Coarse position from an ip-api.com-compatible endpoint.
pub struct IpPositioning {
    client: reqwest::Client,
    endpoint: String,
}

impl IpPositioning {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, PositionError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| PositionError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }
}

#[async_trait]
impl PositioningPort for IpPositioning {
    async fn current_position(&self) -> Result<Coordinate, PositionError> {
        let response: IpLookupResponse = self
            .client
            .get(&self.endpoint)
            .send()
            .await
            .map_err(|e| PositionError::Unavailable(e.to_string()))?
            .json()
            .await
            .map_err(|e| PositionError::Unavailable(e.to_string()))?;

        if response.status.as_deref() == Some("fail") {
            return Err(PositionError::Unavailable("lookup refused".into()));
        }
        match (response.lat, response.lon) {
            (Some(lat), Some(lon)) => Coordinate::new(lat, lon)
                .map_err(|e| PositionError::Unavailable(e.to_string())),
            _ => Err(PositionError::Unavailable("no position in response".into())),
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
