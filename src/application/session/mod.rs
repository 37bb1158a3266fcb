//! Discovery session orchestration
//!
//! Closes the loop the rest of the crate only provides pieces of:
//! geolocation resolves a center, the directory fetches candidates around
//! it, the filter derives the visible subset, and the map session
//! reconciles its markers to match. Every user-visible filter change or
//! directory update is followed synchronously, within the same task, by a
//! marker reconciliation, so the list and the map never observably diverge.

use std::sync::Arc;

use rust_decimal::Decimal;
use tracing::{debug, warn};

use crate::application::services::{
    filter, AddressResolver, FixStatus, GeoLocator, LocationFix, RefreshOutcome, StationDirectory,
};
use crate::domain::{Coordinate, DiscoveryResult, SearchCriteria, Station, StatusFilter};
use crate::map::{MapHandle, MapRegistry, ReserveAction};
use crate::notifications::{SessionEvent, SharedEventBus};
use crate::shared::validations::{normalize_price_band, normalize_radius_km};

/// Initial zoom when a map comes up
const DEFAULT_ZOOM: u8 = 13;
/// Zoom applied when focusing one selected station
const FOCUS_ZOOM: u8 = 16;

/// One user's discovery session: owns the criteria, the search center, the
/// directory and (at most) one map handle.
///
/// Single ownership is the concurrency model: the session is driven from
/// one task, services handle their own interior synchronization, and
/// superseded fetches are discarded by the directory's generation counter.
pub struct DiscoverySession {
    locator: GeoLocator,
    directory: StationDirectory,
    resolver: AddressResolver,
    registry: Arc<MapRegistry>,
    events: SharedEventBus,
    criteria: SearchCriteria,
    center: Coordinate,
    fix_status: FixStatus,
    map: Option<MapHandle>,
    can_reserve: bool,
}

impl DiscoverySession {
    pub fn new(
        locator: GeoLocator,
        directory: StationDirectory,
        resolver: AddressResolver,
        registry: Arc<MapRegistry>,
        events: SharedEventBus,
        criteria: SearchCriteria,
        can_reserve: bool,
    ) -> Self {
        let center = locator.fallback();
        Self {
            locator,
            directory,
            resolver,
            registry,
            events,
            criteria,
            center,
            fix_status: FixStatus::Pending,
            map: None,
            can_reserve,
        }
    }

    // ── Accessors ──────────────────────────────────────────────

    pub fn criteria(&self) -> &SearchCriteria {
        &self.criteria
    }

    pub fn center(&self) -> Coordinate {
        self.center
    }

    pub fn fix_status(&self) -> FixStatus {
        self.fix_status
    }

    pub fn has_map(&self) -> bool {
        self.map.as_ref().map(|m| m.is_ready()).unwrap_or(false)
    }

    /// The listable subset: directory candidates under the active criteria.
    pub fn visible_stations(&self) -> Vec<Station> {
        filter::apply(&self.directory.candidates(), &self.criteria, &self.center)
    }

    /// Distance-sorted view of the visible subset, nearest first.
    pub fn nearest(&self, limit: usize) -> Vec<(Station, f64)> {
        let mut ranked: Vec<(Station, f64)> = self
            .visible_stations()
            .into_iter()
            .filter_map(|s| s.distance_from(&self.center).map(|d| (s, d)))
            .collect();
        ranked.sort_by(|a, b| a.1.total_cmp(&b.1));
        ranked.truncate(limit);
        ranked
    }

    // ── Lifecycle ──────────────────────────────────────────────

    /// Resolve a location, bring the map up and load the first candidate
    /// set.
    ///
    /// A missing map container is not fatal: the session keeps working
    /// list-only and [`retry_map`](Self::retry_map) can attach the map
    /// later. A failed directory fetch is returned to the caller after the
    /// rest of the session is consistent.
    pub async fn start(&mut self, container_id: &str) -> DiscoveryResult<()> {
        let fix = self.locator.resolve().await;
        self.apply_fix(fix);

        self.attach_map(container_id).await;

        let refreshed = self.refresh_and_reconcile().await;
        if let Some(map) = &self.map {
            map.lock().fit_to_markers();
        }
        refreshed
    }

    /// Re-run geolocation on explicit user request and re-center on the
    /// result.
    pub async fn retry_location(&mut self) -> DiscoveryResult<()> {
        let fix = self.locator.resolve().await;
        self.apply_fix(fix);
        if let Some(map) = &self.map {
            let label = self.resolver.reverse(self.center).await;
            let mut session = map.lock();
            session.set_search_center(self.center);
            session.set_user_marker(self.center, label);
            session.focus_on(self.center, DEFAULT_ZOOM);
        }
        self.refresh_and_reconcile().await
    }

    /// Attempt to (re)attach the map after a deferred initialization.
    /// Returns whether a map is now ready.
    pub async fn retry_map(&mut self, container_id: &str) -> bool {
        if self.has_map() {
            return true;
        }
        self.attach_map(container_id).await;
        if self.has_map() {
            self.reconcile();
            true
        } else {
            false
        }
    }

    /// Tear down the map session, if any. The directory and criteria
    /// survive; a later `retry_map` starts a fresh map.
    pub fn dispose_map(&mut self) {
        if let Some(map) = self.map.take() {
            let container_id = map.lock().container_id().to_string();
            self.registry.dispose(&container_id);
            self.events.publish(SessionEvent::MapDisposed { container_id });
        }
    }

    // ── Search center ──────────────────────────────────────────

    /// Geocode `query` and, on a hit, relocate the search center there.
    /// A miss (short query, no result, network failure) leaves the session
    /// untouched. Returns whether a relocation happened.
    pub async fn search(&mut self, query: &str) -> DiscoveryResult<bool> {
        match self.resolver.resolve(query).await {
            Some(center) => {
                self.relocate_with_zoom(center, DEFAULT_ZOOM).await?;
                Ok(true)
            }
            None => {
                debug!(query, "geocode miss, search center unchanged");
                Ok(false)
            }
        }
    }

    /// Replace the search center wholesale and re-fetch around it.
    pub async fn relocate(&mut self, center: Coordinate) -> DiscoveryResult<()> {
        self.relocate_with_zoom(center, DEFAULT_ZOOM).await
    }

    /// Select a station: focus it, make it the new search center.
    pub async fn select_station(&mut self, station_id: &str) -> DiscoveryResult<()> {
        self.events.publish(SessionEvent::StationSelected {
            station_id: station_id.to_string(),
        });
        let coordinate = self
            .directory
            .candidates()
            .iter()
            .find(|s| s.id == station_id)
            .and_then(|s| s.coordinate);
        match coordinate {
            Some(center) => self.relocate_with_zoom(center, FOCUS_ZOOM).await,
            None => Ok(()),
        }
    }

    // ── Criteria ───────────────────────────────────────────────

    pub fn set_query(&mut self, query: impl Into<String>) {
        self.criteria.query = query.into();
        self.filters_changed();
    }

    pub fn set_price_band(&mut self, min: Option<Decimal>, max: Option<Decimal>) {
        let (min, max) = normalize_price_band(min, max);
        self.criteria.price_min = min;
        self.criteria.price_max = max;
        self.filters_changed();
    }

    pub fn set_min_power_kw(&mut self, min_power_kw: Option<f64>) {
        self.criteria.min_power_kw = min_power_kw;
        self.filters_changed();
    }

    pub fn set_status_filter(&mut self, status: StatusFilter) {
        self.criteria.status = status;
        self.filters_changed();
    }

    pub fn set_available_only(&mut self, available_only: bool) {
        self.criteria.available_only = available_only;
        self.filters_changed();
    }

    /// Radius is part of the criteria but also part of the backend query:
    /// changing it re-fetches as well as re-filters.
    pub async fn set_radius_km(&mut self, radius_km: f64) -> DiscoveryResult<()> {
        self.criteria.radius_km = normalize_radius_km(Some(radius_km), self.criteria.radius_km);
        self.events.publish(SessionEvent::FiltersChanged);
        if self.directory.needs_refresh(self.center, self.criteria.radius_km) {
            self.refresh_and_reconcile().await
        } else {
            self.reconcile();
            Ok(())
        }
    }

    // ── Internals ──────────────────────────────────────────────

    fn apply_fix(&mut self, fix: LocationFix) {
        self.center = fix.coordinate;
        self.fix_status = fix.status;
        self.events.publish(SessionEvent::LocationResolved {
            coordinate: fix.coordinate,
            is_fallback: fix.status == FixStatus::Fallback,
        });
    }

    async fn attach_map(&mut self, container_id: &str) {
        match self
            .registry
            .initialize(container_id, self.center, DEFAULT_ZOOM)
        {
            Ok(handle) => {
                let on_select = {
                    let events = self.events.clone();
                    Arc::new(move |station_id: &str| {
                        events.publish(SessionEvent::StationSelected {
                            station_id: station_id.to_string(),
                        });
                    })
                };
                let on_reserve = {
                    let events = self.events.clone();
                    Arc::new(move |station_id: &str, action: ReserveAction| {
                        events.publish(SessionEvent::ReserveRequested {
                            station_id: station_id.to_string(),
                            requires_login: action == ReserveAction::RequiresLogin,
                        });
                    })
                };
                let label = self.resolver.reverse(self.center).await;
                {
                    let mut session = handle.lock();
                    session.bind_callbacks(on_select, on_reserve, self.can_reserve);
                    session.set_user_marker(self.center, label);
                }
                self.map = Some(handle);
            }
            Err(err) => {
                // Container not mounted yet; the session stays list-only
                // until retry_map succeeds.
                warn!("map initialization deferred: {}", err);
                self.map = None;
            }
        }
    }

    async fn relocate_with_zoom(&mut self, center: Coordinate, zoom: u8) -> DiscoveryResult<()> {
        self.center = center;
        self.events
            .publish(SessionEvent::CenterChanged { coordinate: center });
        if let Some(map) = &self.map {
            let mut session = map.lock();
            session.set_search_center(center);
            session.focus_on(center, zoom);
        }
        self.refresh_and_reconcile().await
    }

    async fn refresh_and_reconcile(&mut self) -> DiscoveryResult<()> {
        match self
            .directory
            .refresh(self.center, self.criteria.radius_km)
            .await
        {
            Ok(RefreshOutcome::Committed { count }) => {
                self.events
                    .publish(SessionEvent::DirectoryRefreshed { count });
                self.reconcile();
                Ok(())
            }
            // A newer request owns the state now; it will reconcile.
            Ok(RefreshOutcome::Superseded) => Ok(()),
            Err(err) => {
                self.events.publish(SessionEvent::DirectoryRefreshFailed {
                    reason: err.to_string(),
                });
                // Markers must keep matching the retained candidate set.
                self.reconcile();
                Err(err)
            }
        }
    }

    fn filters_changed(&mut self) {
        self.events.publish(SessionEvent::FiltersChanged);
        self.reconcile();
    }

    /// Make the marker set exactly the coordinate-bearing image of the
    /// visible subset. Synchronous: no await point separates a criteria or
    /// directory change from this call.
    fn reconcile(&mut self) {
        let visible = self.visible_stations();
        if let Some(map) = &self.map {
            let mut session = map.lock();
            session.set_search_center(self.center);
            session.reconcile_station_markers(&visible);
            let count = session.station_marker_count();
            drop(session);
            self.events
                .publish(SessionEvent::MarkersReconciled { count });
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::time::Duration;

    use async_trait::async_trait;

    use crate::application::ports::{
        GeocodeError, GeocodeHit, GeocodingPort, PositioningPort, QueryError, StationQueryPort,
    };
    use crate::domain::StationStatus;
    use crate::infrastructure::map::InMemoryMapBackend;
    use crate::infrastructure::positioning::StaticPositioning;
    use crate::notifications::create_event_bus;

    const CONTAINER: &str = "stations-map";

    fn paris() -> Coordinate {
        Coordinate::new(48.8566, 2.3522).unwrap()
    }

    fn lyon() -> Coordinate {
        Coordinate::new(45.7640, 4.8357).unwrap()
    }

    fn near_paris(offset_km: f64) -> Coordinate {
        Coordinate::new(48.8566 + offset_km / 111.2, 2.3522).unwrap()
    }

    /// Five candidates: three with coordinates, two without.
    fn fixture() -> Vec<Station> {
        let mut s1 = Station::new("s1", "Borne République", "Paris 3e");
        s1.coordinate = Some(near_paris(1.0));
        let mut s2 = Station::new("s2", "Borne Bastille", "Paris 11e");
        s2.coordinate = Some(near_paris(2.0));
        s2.status = StationStatus::Occupied;
        let mut s3 = Station::new("s3", "Borne Nation", "Paris 12e");
        s3.coordinate = Some(near_paris(3.0));
        let s4 = Station::new("s4", "Borne sans position", "inconnue");
        let s5 = Station::new("s5", "Autre borne sans position", "inconnue");
        vec![s1, s2, s3, s4, s5]
    }

    struct StubQuery {
        stations: Vec<Station>,
        fail: AtomicBool,
    }

    #[async_trait]
    impl StationQueryPort for StubQuery {
        async fn fetch_nearby(
            &self,
            _center: Coordinate,
            _radius_km: f64,
        ) -> Result<Vec<Station>, QueryError> {
            if self.fail.load(Ordering::SeqCst) {
                Err(QueryError::Transport("connection refused".into()))
            } else {
                Ok(self.stations.clone())
            }
        }
    }

    struct StubGeocoder {
        hit: Option<Coordinate>,
    }

    #[async_trait]
    impl GeocodingPort for StubGeocoder {
        async fn forward(&self, _query: &str) -> Result<Vec<GeocodeHit>, GeocodeError> {
            Ok(self
                .hit
                .map(|coordinate| GeocodeHit {
                    coordinate,
                    display_name: None,
                })
                .into_iter()
                .collect())
        }

        async fn reverse(&self, _position: Coordinate) -> Result<Option<String>, GeocodeError> {
            Ok(None)
        }
    }

    struct SessionUnderTest {
        session: DiscoverySession,
        backend: Arc<InMemoryMapBackend>,
        query: Arc<StubQuery>,
    }

    fn build(
        stations: Vec<Station>,
        positioning: Arc<dyn PositioningPort>,
        geocode_hit: Option<Coordinate>,
    ) -> SessionUnderTest {
        let backend = Arc::new(InMemoryMapBackend::new());
        backend.register_container(CONTAINER);
        let query = Arc::new(StubQuery {
            stations,
            fail: AtomicBool::new(false),
        });
        let session = DiscoverySession::new(
            GeoLocator::new(positioning, paris(), Duration::from_secs(1)),
            StationDirectory::new(query.clone()),
            AddressResolver::new(Arc::new(StubGeocoder { hit: geocode_hit }), 3),
            Arc::new(MapRegistry::new(backend.clone())),
            create_event_bus(),
            SearchCriteria::with_radius(10.0),
            false,
        );
        SessionUnderTest {
            session,
            backend,
            query,
        }
    }

    fn marker_ids(backend: &InMemoryMapBackend) -> usize {
        backend
            .map_for_container(CONTAINER)
            .map(|map| backend.marker_count(map))
            .unwrap_or(0)
    }

    #[tokio::test]
    async fn markers_mirror_the_filtered_coordinate_bearing_subset() {
        let mut t = build(
            fixture(),
            Arc::new(StaticPositioning::pinned(paris())),
            None,
        );
        t.session.start(CONTAINER).await.unwrap();

        // 3 located stations + the user marker
        assert_eq!(t.session.visible_stations().len(), 3);
        assert_eq!(marker_ids(&t.backend), 4);

        // Excluding one located station leaves exactly 2 station markers.
        t.session
            .set_status_filter(StatusFilter::Only(StationStatus::Available));
        assert_eq!(t.session.visible_stations().len(), 2);
        assert_eq!(marker_ids(&t.backend), 3);
    }

    #[tokio::test]
    async fn filter_setters_reconcile_synchronously() {
        let mut t = build(
            fixture(),
            Arc::new(StaticPositioning::pinned(paris())),
            None,
        );
        t.session.start(CONTAINER).await.unwrap();

        t.session.set_query("Bastille");
        assert_eq!(t.session.visible_stations().len(), 1);
        assert_eq!(marker_ids(&t.backend), 2); // station + user

        t.session.set_query("");
        assert_eq!(marker_ids(&t.backend), 4);

        t.session.set_min_power_kw(Some(50.0));
        // No station carries a power rating, so all pass
        assert_eq!(marker_ids(&t.backend), 4);
    }

    #[tokio::test]
    async fn fallback_center_is_used_when_positioning_is_absent() {
        let mut t = build(fixture(), Arc::new(StaticPositioning::absent()), None);
        t.session.start(CONTAINER).await.unwrap();

        assert_eq!(t.session.fix_status(), FixStatus::Fallback);
        assert_eq!(t.session.center(), paris());
    }

    #[tokio::test]
    async fn geocode_hit_relocates_and_miss_leaves_center() {
        let mut t = build(
            fixture(),
            Arc::new(StaticPositioning::pinned(paris())),
            Some(lyon()),
        );
        t.session.start(CONTAINER).await.unwrap();

        assert!(t.session.search("lyon part-dieu").await.unwrap());
        assert_eq!(t.session.center(), lyon());

        // Below minimum length: no geocode, no relocation
        assert!(!t.session.search("ly").await.unwrap());
        assert_eq!(t.session.center(), lyon());
    }

    #[tokio::test]
    async fn failed_refresh_surfaces_but_retains_consistency() {
        let mut t = build(
            fixture(),
            Arc::new(StaticPositioning::pinned(paris())),
            None,
        );
        t.session.start(CONTAINER).await.unwrap();
        assert_eq!(marker_ids(&t.backend), 4);

        t.query.fail.store(true, Ordering::SeqCst);
        let err = t.session.relocate(lyon()).await.unwrap_err();
        assert!(err.is_user_visible());

        // Retained candidates, still filtered against the NEW center: all
        // Paris stations fall outside 10 km of Lyon, so only the user
        // marker remains and list and map agree.
        assert!(t.session.visible_stations().is_empty());
        assert_eq!(marker_ids(&t.backend), 1);
    }

    #[tokio::test]
    async fn selecting_a_station_recenters_on_it() {
        let mut t = build(
            fixture(),
            Arc::new(StaticPositioning::pinned(paris())),
            None,
        );
        t.session.start(CONTAINER).await.unwrap();

        t.session.select_station("s2").await.unwrap();
        assert_eq!(t.session.center(), near_paris(2.0));

        // Selecting a station without coordinates changes nothing
        t.session.select_station("s4").await.unwrap();
        assert_eq!(t.session.center(), near_paris(2.0));
    }

    #[tokio::test]
    async fn missing_container_defers_the_map_without_failing() {
        let backend = Arc::new(InMemoryMapBackend::new());
        let query = Arc::new(StubQuery {
            stations: fixture(),
            fail: AtomicBool::new(false),
        });
        let mut session = DiscoverySession::new(
            GeoLocator::new(
                Arc::new(StaticPositioning::pinned(paris())),
                paris(),
                Duration::from_secs(1),
            ),
            StationDirectory::new(query),
            AddressResolver::new(Arc::new(StubGeocoder { hit: None }), 3),
            Arc::new(MapRegistry::new(backend.clone())),
            create_event_bus(),
            SearchCriteria::with_radius(10.0),
            false,
        );

        session.start(CONTAINER).await.unwrap();
        assert!(!session.has_map());
        // The list side keeps working without a map
        assert_eq!(session.visible_stations().len(), 3);

        // Container mounts later; retry attaches and reconciles.
        backend.register_container(CONTAINER);
        assert!(session.retry_map(CONTAINER).await);
        assert!(session.has_map());
        let map = backend.map_for_container(CONTAINER).unwrap();
        // 3 station markers + user marker placed on attach
        assert_eq!(backend.marker_count(map), 4);
    }

    #[tokio::test]
    async fn nearest_ranks_by_distance() {
        let mut t = build(
            fixture(),
            Arc::new(StaticPositioning::pinned(paris())),
            None,
        );
        t.session.start(CONTAINER).await.unwrap();

        let ranked = t.session.nearest(2);
        assert_eq!(ranked.len(), 2);
        assert_eq!(ranked[0].0.id, "s1");
        assert_eq!(ranked[1].0.id, "s2");
        assert!(ranked[0].1 < ranked[1].1);
    }

    #[tokio::test]
    async fn dispose_map_releases_the_container() {
        let mut t = build(
            fixture(),
            Arc::new(StaticPositioning::pinned(paris())),
            None,
        );
        t.session.start(CONTAINER).await.unwrap();
        assert_eq!(t.backend.live_map_count(), 1);

        t.session.dispose_map();
        assert!(!t.session.has_map());
        assert_eq!(t.backend.live_map_count(), 0);
    }
}
