//! Visual markers owned by a map session

use uuid::Uuid;

use crate::domain::Coordinate;
use crate::map::popup::PopupDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MarkerId(Uuid);

impl MarkerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MarkerId {
    fn default() -> Self {
        Self::new()
    }
}

/// What a marker is bound to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkerKind {
    /// One candidate station
    Station { station_id: String },
    /// The user's own position; at most one per session
    User { label: Option<String> },
}

/// A pure projection of a station (or the user position) onto the map.
///
/// Markers carry no state of their own beyond what is derivable from their
/// source; they are created and destroyed only by the session's
/// reconciliation.
#[derive(Debug, Clone)]
pub struct Marker {
    pub id: MarkerId,
    pub kind: MarkerKind,
    pub position: Coordinate,
    pub popup: Option<PopupDescriptor>,
}

impl Marker {
    pub fn station(station_id: impl Into<String>, position: Coordinate, popup: PopupDescriptor) -> Self {
        Self {
            id: MarkerId::new(),
            kind: MarkerKind::Station {
                station_id: station_id.into(),
            },
            position,
            popup: Some(popup),
        }
    }

    pub fn user(position: Coordinate, label: Option<String>) -> Self {
        Self {
            id: MarkerId::new(),
            kind: MarkerKind::User { label },
            position,
            popup: None,
        }
    }

    pub fn station_id(&self) -> Option<&str> {
        match &self.kind {
            MarkerKind::Station { station_id } => Some(station_id),
            MarkerKind::User { .. } => None,
        }
    }
}
