//! # Borne Finder
//!
//! Geospatial discovery session for electric-vehicle charging stations:
//! acquire the user's location, keep a candidate set fresh around a search
//! center, derive the visible subset through composable filters, and keep
//! an interactive map's markers consistent with it.
//!
//! ## Architecture
//!
//! The project follows Clean Architecture principles:
//!
//! - **domain**: Core value types and entities (coordinates, stations, criteria)
//! - **application**: Ports, services and the discovery session orchestrator
//! - **infrastructure**: External concerns (HTTP adapters, positioning, map backend)
//! - **map**: Map session lifecycle, markers, popups and the container registry
//! - **notifications**: Session event bus for UI subscribers

pub mod application;
pub mod config;
pub mod domain;
pub mod infrastructure;
pub mod map;
pub mod notifications;
pub mod shared;

pub use config::{default_config_path, AppConfig};

// Re-export the session entry points for easy access
pub use application::{
    AddressResolver, DiscoverySession, FixStatus, GeoLocator, StationDirectory,
};
pub use map::{MapHandle, MapRegistry};

// Re-export notifications
pub use notifications::{create_event_bus, EventBus, SessionEvent, SharedEventBus};
