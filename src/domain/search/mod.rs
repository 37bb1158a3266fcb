//! Search criteria owned by the discovery session

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::station::StationStatus;

/// Status dimension of the filter: everything, or one exact status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum StatusFilter {
    All,
    Only(StationStatus),
}

impl StatusFilter {
    pub fn matches(&self, status: StationStatus) -> bool {
        match self {
            Self::All => true,
            Self::Only(wanted) => *wanted == status,
        }
    }
}

impl Default for StatusFilter {
    fn default() -> Self {
        Self::All
    }
}

/// Mutable filter state for one discovery session.
///
/// Owned exclusively by the session UI layer; the filter engine only reads
/// it. Updated through the session's explicit setters, never shared mutably.
#[derive(Debug, Clone, Serialize)]
pub struct SearchCriteria {
    /// Free-text query, matched case-insensitively against name and address
    pub query: String,
    /// Search radius around the session center
    pub radius_km: f64,
    /// Inclusive lower price bound; `None` = unconstrained
    pub price_min: Option<Decimal>,
    /// Inclusive upper price bound; `None` = unconstrained
    pub price_max: Option<Decimal>,
    /// Minimum rated power in kW; `None` = unconstrained
    pub min_power_kw: Option<f64>,
    /// Status dimension
    pub status: StatusFilter,
    /// Shortcut for `status == Available`, composed on top of `status`
    pub available_only: bool,
}

impl SearchCriteria {
    pub fn with_radius(radius_km: f64) -> Self {
        Self {
            radius_km,
            ..Self::default()
        }
    }
}

impl Default for SearchCriteria {
    fn default() -> Self {
        Self {
            query: String::new(),
            radius_km: 5.0,
            price_min: None,
            price_max: None,
            min_power_kw: None,
            status: StatusFilter::All,
            available_only: false,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
