//! In-memory map backend for development and testing
//!
//! Tracks containers, live map instances and their marker sets without any
//! real tile rendering, mirroring exactly the state a DOM-bound renderer
//! would hold. The probe binary and the test suite both drive sessions
//! against it.

use std::collections::HashMap;

use dashmap::DashMap;

use crate::domain::{Coordinate, DiscoveryError, DiscoveryResult, GeoBounds};
use crate::map::backend::{MapBackend, MapInstanceId, Viewport};
use crate::map::marker::{Marker, MarkerId};

/// Observable state of one live map instance.
#[derive(Debug, Clone)]
pub struct MapState {
    pub container_id: String,
    pub viewport: Viewport,
    pub markers: HashMap<MarkerId, Coordinate>,
    /// Last bounds passed to `fit_bounds`, padding included
    pub fitted: Option<GeoBounds>,
}

/// Backend holding everything in `DashMap`s.
pub struct InMemoryMapBackend {
    containers: DashMap<String, ()>,
    maps: DashMap<MapInstanceId, MapState>,
}

impl InMemoryMapBackend {
    pub fn new() -> Self {
        Self {
            containers: DashMap::new(),
            maps: DashMap::new(),
        }
    }

    /// Declare that a container exists, as mounting a view would.
    pub fn register_container(&self, container_id: impl Into<String>) {
        self.containers.insert(container_id.into(), ());
    }

    /// Remove a container, as tearing a view down would. Maps bound to it
    /// stay alive until destroyed; that leak is precisely what the session
    /// registry exists to prevent.
    pub fn unregister_container(&self, container_id: &str) {
        self.containers.remove(container_id);
    }

    pub fn live_map_count(&self) -> usize {
        self.maps.len()
    }

    pub fn map_for_container(&self, container_id: &str) -> Option<MapInstanceId> {
        self.maps
            .iter()
            .find(|entry| entry.value().container_id == container_id)
            .map(|entry| *entry.key())
    }

    pub fn map_state(&self, map: MapInstanceId) -> Option<MapState> {
        self.maps.get(&map).map(|entry| entry.value().clone())
    }

    pub fn marker_count(&self, map: MapInstanceId) -> usize {
        self.maps
            .get(&map)
            .map(|entry| entry.value().markers.len())
            .unwrap_or(0)
    }
}

impl Default for InMemoryMapBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl MapBackend for InMemoryMapBackend {
    fn create_map(
        &self,
        container_id: &str,
        center: Coordinate,
        zoom: u8,
    ) -> DiscoveryResult<MapInstanceId> {
        if !self.containers.contains_key(container_id) {
            return Err(DiscoveryError::MapContainerMissing(
                container_id.to_string(),
            ));
        }
        let id = MapInstanceId::new();
        self.maps.insert(
            id,
            MapState {
                container_id: container_id.to_string(),
                viewport: Viewport { center, zoom },
                markers: HashMap::new(),
                fitted: None,
            },
        );
        Ok(id)
    }

    fn destroy_map(&self, map: MapInstanceId) {
        self.maps.remove(&map);
    }

    fn place_marker(&self, map: MapInstanceId, marker: &Marker) {
        if let Some(mut state) = self.maps.get_mut(&map) {
            state.markers.insert(marker.id, marker.position);
        }
    }

    fn remove_marker(&self, map: MapInstanceId, marker: MarkerId) {
        if let Some(mut state) = self.maps.get_mut(&map) {
            state.markers.remove(&marker);
        }
    }

    fn set_view(&self, map: MapInstanceId, center: Coordinate, zoom: u8) {
        if let Some(mut state) = self.maps.get_mut(&map) {
            state.viewport = Viewport { center, zoom };
        }
    }

    fn fit_bounds(&self, map: MapInstanceId, bounds: GeoBounds) {
        if let Some(mut state) = self.maps.get_mut(&map) {
            state.viewport.center = bounds.center();
            state.fitted = Some(bounds);
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> Coordinate {
        Coordinate::new(48.8566, 2.3522).unwrap()
    }

    #[test]
    fn create_requires_a_registered_container() {
        let backend = InMemoryMapBackend::new();
        assert!(matches!(
            backend.create_map("map", center(), 13),
            Err(DiscoveryError::MapContainerMissing(_))
        ));

        backend.register_container("map");
        let map = backend.create_map("map", center(), 13).unwrap();
        assert_eq!(backend.live_map_count(), 1);
        assert_eq!(backend.map_for_container("map"), Some(map));
    }

    #[test]
    fn markers_follow_place_and_remove() {
        let backend = InMemoryMapBackend::new();
        backend.register_container("map");
        let map = backend.create_map("map", center(), 13).unwrap();

        let marker = Marker::user(center(), None);
        backend.place_marker(map, &marker);
        assert_eq!(backend.marker_count(map), 1);

        backend.remove_marker(map, marker.id);
        assert_eq!(backend.marker_count(map), 0);
    }

    #[test]
    fn mutating_a_destroyed_map_is_ignored() {
        let backend = InMemoryMapBackend::new();
        backend.register_container("map");
        let map = backend.create_map("map", center(), 13).unwrap();
        backend.destroy_map(map);

        backend.place_marker(map, &Marker::user(center(), None));
        backend.set_view(map, center(), 15);
        assert_eq!(backend.live_map_count(), 0);
    }

    #[test]
    fn fit_bounds_recenters_the_viewport() {
        let backend = InMemoryMapBackend::new();
        backend.register_container("map");
        let map = backend.create_map("map", center(), 13).unwrap();

        let bounds = GeoBounds {
            south: 48.0,
            west: 2.0,
            north: 50.0,
            east: 4.0,
        };
        backend.fit_bounds(map, bounds);

        let state = backend.map_state(map).unwrap();
        assert_eq!(state.fitted, Some(bounds));
        assert!((state.viewport.center.latitude() - 49.0).abs() < 1e-9);
        assert!((state.viewport.center.longitude() - 3.0).abs() < 1e-9);
    }
}
