//! Lifecycle of one interactive map bound to a container

use std::sync::Arc;

use log::{debug, info, warn};

use crate::domain::{Coordinate, DiscoveryResult, GeoBounds, Station};
use crate::map::backend::{MapBackend, MapInstanceId};
use crate::map::marker::{Marker, MarkerId};
use crate::map::popup::{station_popup, ReserveAction};

/// Fraction of the bounds span added on every side by `fit_to_markers`.
const FIT_PADDING: f64 = 0.10;

/// Invoked with the station id when a station marker is clicked.
pub type SelectCallback = Arc<dyn Fn(&str) + Send + Sync>;
/// Invoked with the station id and resolved action when the reserve
/// affordance inside a popup is activated.
pub type ReserveCallback = Arc<dyn Fn(&str, ReserveAction) + Send + Sync>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Uninitialized,
    Ready,
    Disposed,
}

/// Owns one map instance and its marker set.
///
/// State machine: `Uninitialized → Ready → Disposed`. Every operation is a
/// no-op outside `Ready`; `Disposed` is terminal. A failed `initialize`
/// (missing container) leaves the session `Uninitialized`, and calling
/// `initialize` again later is the only recovery path.
pub struct MapSession {
    container_id: String,
    backend: Arc<dyn MapBackend>,
    state: SessionState,
    map: Option<MapInstanceId>,
    /// Origin for popup distance display
    search_center: Coordinate,
    station_markers: Vec<Marker>,
    user_marker: Option<Marker>,
    can_reserve: bool,
    on_select: Option<SelectCallback>,
    on_reserve: Option<ReserveCallback>,
}

impl MapSession {
    pub fn new(
        container_id: impl Into<String>,
        backend: Arc<dyn MapBackend>,
        search_center: Coordinate,
    ) -> Self {
        Self {
            container_id: container_id.into(),
            backend,
            state: SessionState::Uninitialized,
            map: None,
            search_center,
            station_markers: Vec::new(),
            user_marker: None,
            can_reserve: false,
            on_select: None,
            on_reserve: None,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    pub fn container_id(&self) -> &str {
        &self.container_id
    }

    /// Create the underlying map instance.
    ///
    /// Fails gracefully when the container is missing: the error is
    /// returned, nothing is leaked and the session stays `Uninitialized`.
    pub fn initialize(&mut self, center: Coordinate, zoom: u8) -> DiscoveryResult<()> {
        match self.state {
            SessionState::Ready => {
                warn!(
                    "Map session {:?} already initialized, ignoring",
                    self.container_id
                );
                return Ok(());
            }
            SessionState::Disposed => {
                warn!(
                    "Map session {:?} is disposed, ignoring initialize",
                    self.container_id
                );
                return Ok(());
            }
            SessionState::Uninitialized => {}
        }

        let map = self.backend.create_map(&self.container_id, center, zoom)?;
        self.map = Some(map);
        self.search_center = center;
        self.state = SessionState::Ready;
        info!("Map session ready for container {:?}", self.container_id);
        Ok(())
    }

    /// Bind the marker click and reserve callbacks, and the reserve
    /// capability used when projecting popups.
    pub fn bind_callbacks(
        &mut self,
        on_select: SelectCallback,
        on_reserve: ReserveCallback,
        can_reserve: bool,
    ) {
        if self.state == SessionState::Disposed {
            return;
        }
        self.on_select = Some(on_select);
        self.on_reserve = Some(on_reserve);
        self.can_reserve = can_reserve;
    }

    /// Update the origin used for popup distance display. Takes effect at
    /// the next reconciliation.
    pub fn set_search_center(&mut self, center: Coordinate) {
        if self.state != SessionState::Ready {
            return;
        }
        self.search_center = center;
    }

    /// Create or replace the single user-position marker.
    pub fn set_user_marker(&mut self, position: Coordinate, label: Option<String>) {
        let Some(map) = self.ready_map() else {
            return;
        };
        if let Some(previous) = self.user_marker.take() {
            self.backend.remove_marker(map, previous.id);
        }
        let marker = Marker::user(position, label);
        self.backend.place_marker(map, &marker);
        self.user_marker = Some(marker);
    }

    /// Make the station marker set exactly the image of the
    /// coordinate-bearing stations in `stations`, by full replacement.
    pub fn reconcile_station_markers(&mut self, stations: &[Station]) {
        let Some(map) = self.ready_map() else {
            return;
        };
        for marker in self.station_markers.drain(..) {
            self.backend.remove_marker(map, marker.id);
        }
        for station in stations {
            let Some(position) = station.coordinate else {
                continue;
            };
            // The popup always exists here since the coordinate does.
            let Some(popup) = station_popup(station, &self.search_center, self.can_reserve) else {
                continue;
            };
            let marker = Marker::station(&station.id, position, popup);
            self.backend.place_marker(map, &marker);
            self.station_markers.push(marker);
        }
        debug!(
            "Reconciled {} station markers for container {:?}",
            self.station_markers.len(),
            self.container_id
        );
    }

    /// Recenter and zoom the viewport without touching markers.
    pub fn focus_on(&mut self, center: Coordinate, zoom: u8) {
        let Some(map) = self.ready_map() else {
            return;
        };
        self.backend.set_view(map, center, zoom);
    }

    /// Fit the viewport to the region containing all current markers
    /// (stations and user), with a fixed padding margin. No-op with zero
    /// markers.
    pub fn fit_to_markers(&mut self) {
        let Some(map) = self.ready_map() else {
            return;
        };
        let positions: Vec<Coordinate> = self
            .station_markers
            .iter()
            .map(|m| m.position)
            .chain(self.user_marker.iter().map(|m| m.position))
            .collect();
        let Some(bounds) = GeoBounds::containing(positions.iter()) else {
            return;
        };
        self.backend.fit_bounds(map, bounds.padded(FIT_PADDING));
    }

    /// Release markers, the map instance and the bound callbacks.
    /// Terminal; only a fresh session can serve this container again.
    pub fn dispose(&mut self) {
        let Some(map) = self.ready_map() else {
            return;
        };
        for marker in self.station_markers.drain(..) {
            self.backend.remove_marker(map, marker.id);
        }
        if let Some(user) = self.user_marker.take() {
            self.backend.remove_marker(map, user.id);
        }
        self.backend.destroy_map(map);
        self.map = None;
        self.on_select = None;
        self.on_reserve = None;
        self.state = SessionState::Disposed;
        info!("Map session disposed for container {:?}", self.container_id);
    }

    // ── Click dispatch ─────────────────────────────────────────

    /// A station marker was clicked: dispatch the selection callback.
    pub fn click_marker(&self, marker_id: MarkerId) {
        if self.state != SessionState::Ready {
            return;
        }
        let Some(marker) = self.station_markers.iter().find(|m| m.id == marker_id) else {
            return;
        };
        if let (Some(on_select), Some(station_id)) = (&self.on_select, marker.station_id()) {
            on_select(station_id);
        }
    }

    /// The reserve control inside a marker's popup was activated.
    ///
    /// Contained: dispatches only the reserve callback, never the marker's
    /// own selection callback.
    pub fn click_reserve(&self, marker_id: MarkerId) {
        if self.state != SessionState::Ready {
            return;
        }
        let Some(marker) = self.station_markers.iter().find(|m| m.id == marker_id) else {
            return;
        };
        if let (Some(on_reserve), Some(station_id), Some(popup)) =
            (&self.on_reserve, marker.station_id(), &marker.popup)
        {
            on_reserve(station_id, popup.reserve);
        }
    }

    // ── Introspection ──────────────────────────────────────────

    pub fn station_marker_count(&self) -> usize {
        self.station_markers.len()
    }

    pub fn marker_count(&self) -> usize {
        self.station_markers.len() + usize::from(self.user_marker.is_some())
    }

    pub fn station_ids(&self) -> Vec<String> {
        self.station_markers
            .iter()
            .filter_map(|m| m.station_id().map(String::from))
            .collect()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.station_markers
    }

    fn ready_map(&self) -> Option<MapInstanceId> {
        match self.state {
            SessionState::Ready => self.map,
            _ => None,
        }
    }
}

impl Drop for MapSession {
    fn drop(&mut self) {
        if self.state == SessionState::Ready {
            self.dispose();
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
