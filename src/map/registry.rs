//! Registry enforcing one live map session per container

use std::sync::{Arc, Mutex, MutexGuard};

use dashmap::DashMap;
use log::info;

use crate::domain::{Coordinate, DiscoveryResult};
use crate::map::backend::MapBackend;
use crate::map::session::MapSession;

type SharedMapSession = Arc<Mutex<MapSession>>;

/// Handle to one map session, returned by [`MapRegistry::initialize`] and
/// required for every subsequent operation.
///
/// Ownership is explicit: a handle outliving a re-initialization of its
/// container keeps pointing at the *disposed* prior session, whose
/// operations are all no-ops, so stale handles are harmless.
#[derive(Clone)]
pub struct MapHandle {
    session: SharedMapSession,
}

impl MapHandle {
    /// Lock the session for a sequence of operations.
    pub fn lock(&self) -> MutexGuard<'_, MapSession> {
        self.session
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn is_ready(&self) -> bool {
        self.lock().is_ready()
    }
}

/// Owns every map session, keyed by container id.
///
/// Hosting frameworks recycle containers across view transitions; the
/// registry guarantees that initializing a container that already holds a
/// live session first disposes it completely, so at most one map instance
/// exists per container at any time.
pub struct MapRegistry {
    backend: Arc<dyn MapBackend>,
    sessions: DashMap<String, SharedMapSession>,
}

impl MapRegistry {
    pub fn new(backend: Arc<dyn MapBackend>) -> Self {
        Self {
            backend,
            sessions: DashMap::new(),
        }
    }

    /// Create a ready session for `container_id`, disposing any prior one.
    ///
    /// On failure (missing container) nothing is registered and the prior
    /// session, if any, is already gone; the caller may retry later.
    pub fn initialize(
        &self,
        container_id: &str,
        center: Coordinate,
        zoom: u8,
    ) -> DiscoveryResult<MapHandle> {
        if let Some((_, prior)) = self.sessions.remove(container_id) {
            info!(
                "Re-initializing container {:?}: disposing prior session",
                container_id
            );
            prior
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .dispose();
        }

        let mut session = MapSession::new(container_id, self.backend.clone(), center);
        session.initialize(center, zoom)?;

        let shared = Arc::new(Mutex::new(session));
        self.sessions
            .insert(container_id.to_string(), shared.clone());
        Ok(MapHandle { session: shared })
    }

    /// Dispose and forget the session for `container_id`, if any.
    pub fn dispose(&self, container_id: &str) {
        if let Some((_, session)) = self.sessions.remove(container_id) {
            session
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .dispose();
        }
    }

    pub fn handle(&self, container_id: &str) -> Option<MapHandle> {
        self.sessions.get(container_id).map(|entry| MapHandle {
            session: entry.value().clone(),
        })
    }

    pub fn is_ready(&self, container_id: &str) -> bool {
        self.handle(container_id)
            .map(|h| h.is_ready())
            .unwrap_or(false)
    }

    pub fn session_count(&self) -> usize {
        self.sessions.len()
    }
}

// ── Tests ──────────────────────────────────────────────────────
