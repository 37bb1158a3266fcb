//! HTTP adapter for the station proximity query API

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use log::warn;
use rust_decimal::Decimal;
use serde::Deserialize;

use crate::application::ports::{QueryError, StationQueryPort};
use crate::domain::{Coordinate, Station, StationStatus};

const USER_AGENT: &str = concat!("borne-finder/", env!("CARGO_PKG_VERSION"));

/// Response envelope of the proximity endpoint.
#[derive(Debug, Deserialize)]
struct StationEnvelope {
    result: EnvelopeStatus,
    #[serde(default)]
    data: Vec<StationDto>,
    message: Option<String>,
}

#[derive(Debug, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
enum EnvelopeStatus {
    Success,
    Error,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StationDto {
    id: String,
    name: String,
    #[serde(default)]
    address: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    power_kw: Option<f64>,
    price_per_kwh: Option<Decimal>,
    status: Option<String>,
    updated_at: Option<DateTime<Utc>>,
}

impl StationDto {
    fn into_station(self) -> Station {
        // A station with unusable coordinates stays listable; it just never
        // reaches the map.
        let coordinate = match (self.latitude, self.longitude) {
            (Some(lat), Some(lon)) => match Coordinate::new(lat, lon) {
                Ok(c) => Some(c),
                Err(err) => {
                    warn!("Station {} has an unusable position: {}", self.id, err);
                    None
                }
            },
            _ => None,
        };
        Station {
            id: self.id,
            name: self.name,
            address: self.address,
            coordinate,
            power_kw: self.power_kw,
            price_per_kwh: self.price_per_kwh,
            status: self
                .status
                .as_deref()
                .map(StationStatus::from_str)
                .unwrap_or(StationStatus::OutOfService),
            updated_at: self.updated_at,
        }
    }
}

/// Proximity search over the backend's REST API.
pub struct HttpStationQuery {
    client: reqwest::Client,
    base_url: String,
}

impl HttpStationQuery {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, QueryError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .user_agent(USER_AGENT)
            .build()
            .map_err(|e| QueryError::Transport(e.to_string()))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }
}

#[async_trait]
impl StationQueryPort for HttpStationQuery {
    async fn fetch_nearby(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> Result<Vec<Station>, QueryError> {
        let url = format!("{}/stations/nearby", self.base_url);
        let response = self
            .client
            .get(&url)
            .query(&[
                ("latitude", center.latitude().to_string()),
                ("longitude", center.longitude().to_string()),
                ("radiusKm", radius_km.to_string()),
            ])
            .send()
            .await
            .map_err(|e| QueryError::Transport(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(QueryError::Service(format!("HTTP {}", status)));
        }

        let envelope: StationEnvelope = response
            .json()
            .await
            .map_err(|e| QueryError::Decode(e.to_string()))?;

        if envelope.result == EnvelopeStatus::Error {
            return Err(QueryError::Service(
                envelope
                    .message
                    .unwrap_or_else(|| "backend reported ERROR".into()),
            ));
        }

        Ok(envelope
            .data
            .into_iter()
            .map(StationDto::into_station)
            .collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────
