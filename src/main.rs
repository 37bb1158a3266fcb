//!
//! Borne Finder discovery probe.
//! Runs one discovery pass against the configured endpoints and reports the
//! visible stations. Reads configuration from TOML file
//! (~/.config/borne-finder/config.toml).

use std::sync::Arc;

use tracing::{error, info, warn};

use borne_finder::application::{
    AddressResolver, DiscoverySession, GeoLocator, StationDirectory,
};
use borne_finder::domain::SearchCriteria;
use borne_finder::infrastructure::{
    HttpStationQuery, InMemoryMapBackend, IpPositioning, NominatimGeocoder,
};
use borne_finder::map::{station_popup, MapRegistry};
use borne_finder::{create_event_bus, default_config_path, AppConfig};

const MAP_CONTAINER: &str = "stations-map";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // ── Load configuration ─────────────────────────────────────
    let config_path = std::env::var("BORNE_CONFIG")
        .map(std::path::PathBuf::from)
        .unwrap_or_else(|_| default_config_path());
    let cfg = match AppConfig::load(&config_path) {
        Ok(cfg) => {
            // Initialize logging with configured level
            tracing_subscriber::fmt()
                .with_env_filter(
                    tracing_subscriber::EnvFilter::try_from_default_env()
                        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cfg.logging.level)),
                )
                .init();
            info!("Configuration loaded from {}", config_path.display());
            cfg
        }
        Err(e) => {
            tracing_subscriber::fmt()
                .with_env_filter(tracing_subscriber::EnvFilter::new("info"))
                .init();
            error!("Failed to load config: {}. Using defaults.", e);
            AppConfig::default()
        }
    };

    info!("Starting Borne Finder discovery probe...");

    // ── Prometheus metrics recorder (must be installed before any metrics calls) ──
    let prometheus_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("Failed to install Prometheus metrics recorder");

    // ── Wire the consumed collaborators ────────────────────────
    let fallback = match cfg.fallback_coordinate() {
        Ok(coordinate) => coordinate,
        Err(e) => {
            warn!("Configured fallback is unusable ({}), using default", e);
            AppConfig::default()
                .fallback_coordinate()
                .expect("default fallback coordinate is valid")
        }
    };
    info!("Fallback center: {}", fallback);

    let positioning = IpPositioning::new(&cfg.api.positioning_url, cfg.api.http_timeout())?;
    let stations = HttpStationQuery::new(&cfg.api.stations_base_url, cfg.api.http_timeout())?;
    let geocoder = NominatimGeocoder::new(&cfg.api.geocoder_base_url, cfg.api.http_timeout())?;

    let backend = Arc::new(InMemoryMapBackend::new());
    backend.register_container(MAP_CONTAINER);
    let registry = Arc::new(MapRegistry::new(backend.clone()));
    let events = create_event_bus();

    // Trace session events as they happen
    let mut subscriber = events.subscribe();
    tokio::spawn(async move {
        while let Some(message) = subscriber.recv().await {
            info!("session event: {}", message.event.event_type());
        }
    });

    let mut session = DiscoverySession::new(
        GeoLocator::new(Arc::new(positioning), fallback, cfg.location.timeout()),
        StationDirectory::new(Arc::new(stations)),
        AddressResolver::new(Arc::new(geocoder), cfg.search.min_geocode_query_len),
        registry,
        events.clone(),
        SearchCriteria::with_radius(cfg.search.default_radius_km),
        false,
    );

    // ── One discovery pass ─────────────────────────────────────
    if let Err(e) = session.start(MAP_CONTAINER).await {
        warn!("Initial refresh failed: {}", e);
    }

    info!(
        "Search center: {} (fix: {:?})",
        session.center(),
        session.fix_status()
    );

    let visible = session.visible_stations();
    let center = session.center();
    println!(
        "{} station(s) within {} km:",
        visible.len(),
        session.criteria().radius_km
    );
    for (station, _distance) in session.nearest(10) {
        if let Some(popup) = station_popup(&station, &center, false) {
            println!("  {}", popup);
        }
    }

    session.dispose_map();
    info!("Probe complete");

    println!("\n{}", prometheus_handle.render());
    Ok(())
}
