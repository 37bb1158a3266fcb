//! HTTP adapters for the consumed collaborators

pub mod geocoding;
pub mod stations;

pub use geocoding::NominatimGeocoder;
pub use stations::HttpStationQuery;
