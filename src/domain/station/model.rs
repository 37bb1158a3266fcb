//! Charging station domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::geo::{distance_km, Coordinate};

/// Operational status reported by the backend for a station
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StationStatus {
    /// Free and ready to charge
    Available,
    /// A vehicle is currently charging
    Occupied,
    /// Station is broken or decommissioned
    OutOfService,
    /// Temporarily down for maintenance
    Maintenance,
}

impl StationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Available => "AVAILABLE",
            Self::Occupied => "OCCUPIED",
            Self::OutOfService => "OUT_OF_SERVICE",
            Self::Maintenance => "MAINTENANCE",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "AVAILABLE" => Self::Available,
            "OCCUPIED" => Self::Occupied,
            "OUT_OF_SERVICE" => Self::OutOfService,
            "MAINTENANCE" => Self::Maintenance,
            // Unknown wire value: treat the station as unusable
            _ => Self::OutOfService,
        }
    }
}

impl std::fmt::Display for StationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A charging-station candidate as last fetched from the backend.
///
/// Snapshots are immutable on the client: a change on the server only ever
/// becomes visible through a directory refresh replacing the whole set.
#[derive(Debug, Clone, Serialize)]
pub struct Station {
    /// Backend identifier
    pub id: String,
    /// Display name
    pub name: String,
    /// Human-readable location label (street / city)
    pub address: String,
    /// Position; absent for stations the backend could not geolocate.
    /// Such stations stay listable but are never mapped.
    pub coordinate: Option<Coordinate>,
    /// Rated output power in kW
    pub power_kw: Option<f64>,
    /// Price per kWh in the backend's currency
    pub price_per_kwh: Option<Decimal>,
    /// Operational status
    pub status: StationStatus,
    /// When the backend last updated this record
    pub updated_at: Option<DateTime<Utc>>,
}

impl Station {
    pub fn new(id: impl Into<String>, name: impl Into<String>, address: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: address.into(),
            coordinate: None,
            power_kw: None,
            price_per_kwh: None,
            status: StationStatus::Available,
            updated_at: None,
        }
    }

    pub fn is_available(&self) -> bool {
        self.status == StationStatus::Available
    }

    /// Distance from `center` in kilometers, `None` when the station has no
    /// position.
    pub fn distance_from(&self, center: &Coordinate) -> Option<f64> {
        self.coordinate.as_ref().map(|c| distance_km(c, center))
    }
}

// ── Tests ──────────────────────────────────────────────────────
