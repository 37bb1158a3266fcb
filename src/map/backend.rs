//! Rendering backend port for the interactive map
//!
//! The discovery core never touches tiles or DOM state directly; it drives
//! a backend through this trait. The in-memory implementation lives in
//! [`infrastructure::map`](crate::infrastructure::map).

use uuid::Uuid;

use crate::domain::{Coordinate, DiscoveryResult, GeoBounds};
use crate::map::marker::{Marker, MarkerId};

/// Opaque identity of one live map instance inside a backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct MapInstanceId(Uuid);

impl MapInstanceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for MapInstanceId {
    fn default() -> Self {
        Self::new()
    }
}

/// Camera state of a map instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub center: Coordinate,
    pub zoom: u8,
}

/// Port to whatever renders the base layer and markers.
///
/// All operations except `create_map` are infallible from the session's
/// point of view: a backend asked to mutate an instance it no longer knows
/// simply ignores the call.
pub trait MapBackend: Send + Sync {
    /// Create a map bound to `container_id`.
    ///
    /// Fails with `DiscoveryError::MapContainerMissing` when the container
    /// does not exist at call time.
    fn create_map(
        &self,
        container_id: &str,
        center: Coordinate,
        zoom: u8,
    ) -> DiscoveryResult<MapInstanceId>;

    /// Tear down a map instance and everything attached to it.
    fn destroy_map(&self, map: MapInstanceId);

    fn place_marker(&self, map: MapInstanceId, marker: &Marker);

    fn remove_marker(&self, map: MapInstanceId, marker: MarkerId);

    fn set_view(&self, map: MapInstanceId, center: Coordinate, zoom: u8);

    fn fit_bounds(&self, map: MapInstanceId, bounds: GeoBounds);
}
