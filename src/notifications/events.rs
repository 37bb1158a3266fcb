//! Session events
//!
//! Everything the discovery session tells the outside world about its state
//! transitions, in the order they happen.

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use crate::domain::Coordinate;

/// Event types published by a discovery session
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", content = "data")]
pub enum SessionEvent {
    /// Geolocation resolved (real fix or fallback)
    LocationResolved {
        coordinate: Coordinate,
        is_fallback: bool,
    },
    /// The search center was replaced
    CenterChanged { coordinate: Coordinate },
    /// The directory committed a fresh candidate set
    DirectoryRefreshed { count: usize },
    /// A directory fetch failed; the previous set is still shown
    DirectoryRefreshFailed { reason: String },
    /// One or more filter criteria changed
    FiltersChanged,
    /// The marker set was reconciled against the filtered subset
    MarkersReconciled { count: usize },
    /// A station was selected (marker click or list row)
    StationSelected { station_id: String },
    /// The reserve affordance in a popup was activated
    ReserveRequested {
        station_id: String,
        requires_login: bool,
    },
    /// The map session was torn down
    MapDisposed { container_id: String },
}

impl SessionEvent {
    /// Get the event type name
    pub fn event_type(&self) -> &'static str {
        match self {
            SessionEvent::LocationResolved { .. } => "location_resolved",
            SessionEvent::CenterChanged { .. } => "center_changed",
            SessionEvent::DirectoryRefreshed { .. } => "directory_refreshed",
            SessionEvent::DirectoryRefreshFailed { .. } => "directory_refresh_failed",
            SessionEvent::FiltersChanged => "filters_changed",
            SessionEvent::MarkersReconciled { .. } => "markers_reconciled",
            SessionEvent::StationSelected { .. } => "station_selected",
            SessionEvent::ReserveRequested { .. } => "reserve_requested",
            SessionEvent::MapDisposed { .. } => "map_disposed",
        }
    }
}

/// Envelope adding identity and time to an event
#[derive(Debug, Clone, Serialize)]
pub struct EventMessage {
    pub id: Uuid,
    pub timestamp: DateTime<Utc>,
    pub event: SessionEvent,
}

impl EventMessage {
    pub fn new(event: SessionEvent) -> Self {
        Self {
            id: Uuid::new_v4(),
            timestamp: Utc::now(),
            event,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn event_types_are_stable() {
        let coordinate = Coordinate::new(48.85, 2.35).unwrap();
        assert_eq!(
            SessionEvent::LocationResolved {
                coordinate,
                is_fallback: true
            }
            .event_type(),
            "location_resolved"
        );
        assert_eq!(
            SessionEvent::DirectoryRefreshed { count: 3 }.event_type(),
            "directory_refreshed"
        );
        assert_eq!(SessionEvent::FiltersChanged.event_type(), "filters_changed");
    }

    #[test]
    fn serializes_with_type_tag() {
        let json = serde_json::to_value(SessionEvent::MarkersReconciled { count: 2 }).unwrap();
        assert_eq!(json["type"], "MarkersReconciled");
        assert_eq!(json["data"]["count"], 2);
    }
}
