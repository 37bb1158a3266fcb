//! Station directory with stale-response rejection

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};
use std::time::Instant;

use chrono::{DateTime, Utc};
use log::{debug, info, warn};

use crate::application::ports::StationQueryPort;
use crate::domain::{distance_km, Coordinate, DiscoveryError, DiscoveryResult, Station};

/// Center drift below this is not a material change and needs no re-fetch.
const CENTER_EPSILON_KM: f64 = 0.01;

/// What happened to one `refresh` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshOutcome {
    /// The response was committed as the new candidate set.
    Committed { count: usize },
    /// A newer refresh was issued while this one was in flight; the
    /// response was discarded.
    Superseded,
}

#[derive(Debug, Clone)]
struct Snapshot {
    stations: Arc<Vec<Station>>,
    center: Option<Coordinate>,
    radius_km: f64,
    fetched_at: Option<DateTime<Utc>>,
    generation: u64,
}

impl Snapshot {
    fn empty() -> Self {
        Self {
            stations: Arc::new(Vec::new()),
            center: None,
            radius_km: 0.0,
            fetched_at: None,
            generation: 0,
        }
    }
}

/// Holds the last fetched superset of candidate stations for a search
/// center and radius.
///
/// Concurrent overlapping fetches are ordered by a request generation
/// counter: a newly issued refresh supersedes any in-flight one, and a
/// late-arriving stale response is discarded instead of overwriting fresher
/// data. On failure the previous candidate set is retained unchanged and the
/// error is surfaced to the caller.
pub struct StationDirectory {
    port: Arc<dyn StationQueryPort>,
    snapshot: RwLock<Snapshot>,
    generation: AtomicU64,
}

impl StationDirectory {
    pub fn new(port: Arc<dyn StationQueryPort>) -> Self {
        Self {
            port,
            snapshot: RwLock::new(Snapshot::empty()),
            generation: AtomicU64::new(0),
        }
    }

    /// Fetch candidates for `center`/`radius_km` and, unless superseded,
    /// atomically replace the held set.
    pub async fn refresh(
        &self,
        center: Coordinate,
        radius_km: f64,
    ) -> DiscoveryResult<RefreshOutcome> {
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let started = Instant::now();
        metrics::counter!("directory_refreshes_total").increment(1);

        let result = self.port.fetch_nearby(center, radius_km).await;
        metrics::histogram!("directory_fetch_seconds").record(started.elapsed().as_secs_f64());

        let mut guard = self
            .snapshot
            .write()
            .unwrap_or_else(|poisoned| poisoned.into_inner());

        // A newer refresh claimed a higher generation while we were in
        // flight: last writer wins, this response is dead either way.
        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(
                "Discarding superseded directory response (generation {})",
                generation
            );
            metrics::counter!("directory_stale_discarded_total").increment(1);
            return Ok(RefreshOutcome::Superseded);
        }

        match result {
            Ok(stations) => {
                let count = stations.len();
                *guard = Snapshot {
                    stations: Arc::new(stations),
                    center: Some(center),
                    radius_km,
                    fetched_at: Some(Utc::now()),
                    generation,
                };
                info!(
                    "Directory refreshed: {} stations within {} km of {}",
                    count, radius_km, center
                );
                Ok(RefreshOutcome::Committed { count })
            }
            Err(err) => {
                // Previous snapshot stays in place untouched.
                warn!("Directory fetch failed, retaining previous set: {}", err);
                metrics::counter!("directory_refresh_failures_total").increment(1);
                Err(DiscoveryError::DirectoryFetchFailed(err.to_string()))
            }
        }
    }

    /// Current candidate set. Cheap: the vector is shared, not copied.
    pub fn candidates(&self) -> Arc<Vec<Station>> {
        self.read_snapshot().stations
    }

    pub fn len(&self) -> usize {
        self.read_snapshot().stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn last_fetched_at(&self) -> Option<DateTime<Utc>> {
        self.read_snapshot().fetched_at
    }

    /// Whether a query for `center`/`radius_km` is materially different from
    /// what the directory already holds.
    pub fn needs_refresh(&self, center: Coordinate, radius_km: f64) -> bool {
        let snapshot = self.read_snapshot();
        match snapshot.center {
            None => true,
            Some(held) => {
                distance_km(&held, &center) > CENTER_EPSILON_KM
                    || (snapshot.radius_km - radius_km).abs() > f64::EPSILON
            }
        }
    }

    fn read_snapshot(&self) -> Snapshot {
        self.snapshot
            .read()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .clone()
    }
}

// ── Tests ──────────────────────────────────────────────────────
