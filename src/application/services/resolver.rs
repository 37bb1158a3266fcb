//! Best-effort forward/reverse geocoding for search relocation

use std::sync::Arc;

use log::{debug, warn};

use crate::application::ports::GeocodingPort;
use crate::domain::Coordinate;

/// Resolves free-text queries into coordinates to relocate the search
/// center.
///
/// Geocoding is an optional enhancement to search, never a hard dependency:
/// network failures, malformed responses and empty result sets all collapse
/// to `None`, leaving the session center untouched. Queries shorter than the
/// minimum length are answered locally without a network round trip.
pub struct AddressResolver {
    port: Arc<dyn GeocodingPort>,
    min_query_len: usize,
}

impl AddressResolver {
    pub const DEFAULT_MIN_QUERY_LEN: usize = 3;

    pub fn new(port: Arc<dyn GeocodingPort>, min_query_len: usize) -> Self {
        Self {
            port,
            min_query_len,
        }
    }

    /// Forward-geocode `query` into a coordinate, taking the best hit.
    pub async fn resolve(&self, query: &str) -> Option<Coordinate> {
        let query = query.trim();
        if query.chars().count() < self.min_query_len {
            debug!("Geocode query {:?} below minimum length, skipping", query);
            return None;
        }

        metrics::counter!("geocode_requests_total").increment(1);
        match self.port.forward(query).await {
            Ok(hits) => {
                let hit = hits.into_iter().next();
                if hit.is_none() {
                    debug!("No geocoding result for {:?}", query);
                }
                hit.map(|h| h.coordinate)
            }
            Err(err) => {
                warn!("Geocoding failed for {:?}: {}", query, err);
                None
            }
        }
    }

    /// Reverse-geocode a coordinate into a display label, best effort.
    pub async fn reverse(&self, position: Coordinate) -> Option<String> {
        match self.port.reverse(position).await {
            Ok(label) => label,
            Err(err) => {
                warn!("Reverse geocoding failed for {}: {}", position, err);
                None
            }
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
