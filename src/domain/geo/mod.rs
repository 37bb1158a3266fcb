//! Geographic value types and great-circle distance.

use serde::Serialize;

use crate::shared::types::{DiscoveryError, DiscoveryResult};

/// Earth's mean radius in kilometers.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// A validated WGS-84 point. Immutable once constructed.
///
/// Construction is the validation boundary: latitude must lie in [-90, 90]
/// and longitude in [-180, 180], so distance math and map code never see an
/// out-of-range value.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Coordinate {
    latitude: f64,
    longitude: f64,
}

impl Coordinate {
    pub fn new(latitude: f64, longitude: f64) -> DiscoveryResult<Self> {
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(DiscoveryError::InvalidCoordinate {
                field: "latitude",
                value: latitude,
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(DiscoveryError::InvalidCoordinate {
                field: "longitude",
                value: longitude,
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    pub fn latitude(&self) -> f64 {
        self.latitude
    }

    pub fn longitude(&self) -> f64 {
        self.longitude
    }

    pub fn to_radians(&self) -> (f64, f64) {
        (self.latitude.to_radians(), self.longitude.to_radians())
    }
}

impl std::fmt::Display for Coordinate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "({:.5}, {:.5})", self.latitude, self.longitude)
    }
}

/// Great-circle distance between two points in kilometers (haversine).
///
/// Symmetric, zero for identical points.
pub fn distance_km(from: &Coordinate, to: &Coordinate) -> f64 {
    let (lat1, lon1) = from.to_radians();
    let (lat2, lon2) = to.to_radians();

    let d_lat = lat2 - lat1;
    let d_lon = lon2 - lon1;

    let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);
    let c = 2.0 * a.sqrt().atan2((1.0 - a).sqrt());

    EARTH_RADIUS_KM * c
}

/// Axis-aligned bounding region over a set of coordinates.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoBounds {
    pub south: f64,
    pub west: f64,
    pub north: f64,
    pub east: f64,
}

impl GeoBounds {
    /// Bounds containing every point in `points`, or `None` when empty.
    pub fn containing<'a, I>(points: I) -> Option<Self>
    where
        I: IntoIterator<Item = &'a Coordinate>,
    {
        let mut iter = points.into_iter();
        let first = iter.next()?;
        let mut bounds = Self {
            south: first.latitude(),
            west: first.longitude(),
            north: first.latitude(),
            east: first.longitude(),
        };
        for p in iter {
            bounds.extend(p);
        }
        Some(bounds)
    }

    pub fn extend(&mut self, point: &Coordinate) {
        self.south = self.south.min(point.latitude());
        self.north = self.north.max(point.latitude());
        self.west = self.west.min(point.longitude());
        self.east = self.east.max(point.longitude());
    }

    /// Grow the region by `fraction` of its span on every side, clamped to
    /// valid latitude/longitude ranges.
    pub fn padded(&self, fraction: f64) -> Self {
        let lat_pad = (self.north - self.south) * fraction;
        let lon_pad = (self.east - self.west) * fraction;
        Self {
            south: (self.south - lat_pad).max(-90.0),
            north: (self.north + lat_pad).min(90.0),
            west: (self.west - lon_pad).max(-180.0),
            east: (self.east + lon_pad).min(180.0),
        }
    }

    /// Midpoint of the region.
    pub fn center(&self) -> Coordinate {
        // Midpoint of valid bounds is always in range.
        Coordinate {
            latitude: (self.south + self.north) / 2.0,
            longitude: (self.west + self.east) / 2.0,
        }
    }
}

// ── Tests ──────────────────────────────────────────────────────
