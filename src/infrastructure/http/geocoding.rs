//! Nominatim-style forward/reverse geocoding adapter

use std::time::Duration;

use async_trait::async_trait;
use log::debug;
use serde::Deserialize;

use crate::application::ports::{GeocodeError, GeocodeHit, GeocodingPort};
use crate::domain::Coordinate;

const USER_AGENT: &str = concat!("borne-finder/", env!("CARGO_PKG_VERSION"));
const RESULT_LIMIT: u8 = 5;

/// One hit as returned by the service. Latitude and longitude come over the
/// wire as strings.
#[derive(Debug, Deserialize)]
struct NominatimHit {
    lat: String,
    lon: String,
    display_name: Option<String>,
}

impl NominatimHit {
    fn into_hit(self) -> Option<GeocodeHit> {
        let lat = self.lat.parse::<f64>().ok()?;
        let lon = self.lon.parse::<f64>().ok()?;
        // A hit outside valid ranges is dropped, not surfaced.
        let coordinate = Coordinate::new(lat, lon).ok()?;
        Some(GeocodeHit {
            coordinate,
            display_name: self.display_name,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ReverseResponse {
    display_name: Option<String>,
}

/// Forward/reverse geocoding against a Nominatim-compatible endpoint.
///
/// Unauthenticated and best-effort; the resolver on top absorbs every
/// failure this adapter reports.
pub struct NominatimGeocoder {
    client: reqwest::Client,
    base_url: String,
}

impl NominatimGeocoder {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, GeocodeError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| GeocodeError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl GeocodingPort for NominatimGeocoder {
    async fn forward(&self, query: &str) -> Result<Vec<GeocodeHit>, GeocodeError> {
        let url = format!("{}/search", self.base_url);
        let limit = RESULT_LIMIT.to_string();
        let hits: Vec<NominatimHit> = self
            .client
            .get(&url)
            .query(&[("q", query), ("format", "json"), ("limit", limit.as_str())])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;

        let parsed: Vec<GeocodeHit> = hits.into_iter().filter_map(NominatimHit::into_hit).collect();
        debug!("Geocoded {:?}: {} usable hits", query, parsed.len());
        Ok(parsed)
    }

    async fn reverse(&self, position: Coordinate) -> Result<Option<String>, GeocodeError> {
        let url = format!("{}/reverse", self.base_url);
        let response: ReverseResponse = self
            .client
            .get(&url)
            .query(&[
                ("lat", position.latitude().to_string()),
                ("lon", position.longitude().to_string()),
                ("format", "json".to_string()),
            ])
            .send()
            .await
            .map_err(|e| GeocodeError::Transport(e.to_string()))?
            .json()
            .await
            .map_err(|e| GeocodeError::Decode(e.to_string()))?;
        Ok(response.display_name)
    }
}

// ── Tests ──────────────────────────────────────────────────────
