//! Pure filtering of the candidate set against the session criteria
//!
//! `apply` is the single derivation point for the visible subset: a pure,
//! order-preserving AND of independent predicates. It never validates the
//! criteria; an inverted price band simply matches nothing.

use crate::domain::{distance_km, Coordinate, SearchCriteria, Station, StationStatus};

/// Derive the visible subset of `candidates` under `criteria`, with the
/// radius measured from `center`. Input order is preserved.
///
/// Stations without a coordinate are excluded by the radius predicate (a
/// radius is meaningless without a position); every other predicate treats
/// them like any other station. This mirrors the list view the source of
/// record displays, and is intentionally the same set the map consumes
/// after its own coordinate guard.
pub fn apply(candidates: &[Station], criteria: &SearchCriteria, center: &Coordinate) -> Vec<Station> {
    candidates
        .iter()
        .filter(|station| matches(station, criteria, center))
        .cloned()
        .collect()
}

/// Whether a single station passes every predicate.
pub fn matches(station: &Station, criteria: &SearchCriteria, center: &Coordinate) -> bool {
    text_matches(station, &criteria.query)
        && within_radius(station, center, criteria.radius_km)
        && price_in_band(station, criteria)
        && power_at_least(station, criteria.min_power_kw)
        && criteria.status.matches(station.status)
        && (!criteria.available_only || station.status == StationStatus::Available)
}

/// Case-insensitive substring match over name and address; an empty query
/// matches everything.
fn text_matches(station: &Station, query: &str) -> bool {
    let query = query.trim().to_lowercase();
    if query.is_empty() {
        return true;
    }
    station.name.to_lowercase().contains(&query) || station.address.to_lowercase().contains(&query)
}

fn within_radius(station: &Station, center: &Coordinate, radius_km: f64) -> bool {
    match &station.coordinate {
        Some(position) => distance_km(position, center) <= radius_km,
        None => false,
    }
}

fn price_in_band(station: &Station, criteria: &SearchCriteria) -> bool {
    // An unpriced station is unconstrained by the band.
    let Some(price) = station.price_per_kwh else {
        return true;
    };
    if let Some(min) = criteria.price_min {
        if price < min {
            return false;
        }
    }
    if let Some(max) = criteria.price_max {
        if price > max {
            return false;
        }
    }
    true
}

fn power_at_least(station: &Station, min_power_kw: Option<f64>) -> bool {
    match (station.power_kw, min_power_kw) {
        (Some(power), Some(min)) => power >= min,
        // Unrated stations pass; no constraint always passes.
        _ => true,
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal::Decimal;

    use crate::domain::StatusFilter;

    fn center() -> Coordinate {
        Coordinate::new(48.8566, 2.3522).unwrap()
    }

    /// A station `offset_km` roughly north of the center.
    fn station_at(id: &str, offset_km: f64) -> Station {
        let mut s = Station::new(id, format!("Borne {}", id), "Paris");
        // 1 degree of latitude is ~111.2 km
        let lat = 48.8566 + offset_km / 111.2;
        s.coordinate = Some(Coordinate::new(lat, 2.3522).unwrap());
        s
    }

    fn fixture() -> Vec<Station> {
        let mut near = station_at("near", 1.0);
        near.power_kw = Some(22.0);
        near.price_per_kwh = Some(Decimal::new(25, 2)); // 0.25

        let mut mid = station_at("mid", 3.0);
        mid.power_kw = Some(50.0);
        mid.price_per_kwh = Some(Decimal::new(45, 2)); // 0.45
        mid.status = StationStatus::Occupied;

        let mut far = station_at("far", 8.0);
        far.power_kw = Some(7.0);
        far.price_per_kwh = Some(Decimal::new(20, 2)); // 0.20

        let unlocated = Station::new("unlocated", "Borne fantôme", "unknown");

        vec![near, mid, far, unlocated]
    }

    fn ids(stations: &[Station]) -> Vec<&str> {
        stations.iter().map(|s| s.id.as_str()).collect()
    }

    #[test]
    fn default_criteria_keep_everything_in_radius() {
        let visible = apply(&fixture(), &SearchCriteria::default(), &center());
        // "far" is outside the 5 km default, "unlocated" has no position
        assert_eq!(ids(&visible), vec!["near", "mid"]);
    }

    #[test]
    fn order_is_preserved() {
        let criteria = SearchCriteria::with_radius(50.0);
        let visible = apply(&fixture(), &criteria, &center());
        assert_eq!(ids(&visible), vec!["near", "mid", "far"]);
    }

    #[test]
    fn text_predicate_is_case_insensitive_and_matches_address() {
        let mut criteria = SearchCriteria::with_radius(50.0);
        criteria.query = "FANTÔME".into();
        // Text matches, but the radius predicate still excludes a station
        // without coordinates.
        assert!(apply(&fixture(), &criteria, &center()).is_empty());

        criteria.query = "paris".into();
        let visible = apply(&fixture(), &criteria, &center());
        assert_eq!(visible.len(), 3);
    }

    #[test]
    fn price_band_is_inclusive_and_unpriced_passes() {
        let mut criteria = SearchCriteria::with_radius(50.0);
        criteria.price_min = Some(Decimal::new(25, 2));
        criteria.price_max = Some(Decimal::new(45, 2));

        let mut stations = fixture();
        stations[3].coordinate = Some(center()); // make "unlocated" mappable, unpriced

        let visible = apply(&stations, &criteria, &center());
        // 0.20 is below the band; both bounds are inclusive; unpriced passes
        assert_eq!(ids(&visible), vec!["near", "mid", "unlocated"]);
    }

    #[test]
    fn power_predicate_passes_unrated_stations() {
        let mut criteria = SearchCriteria::with_radius(50.0);
        criteria.min_power_kw = Some(22.0);

        let mut stations = fixture();
        stations[3].coordinate = Some(center()); // unrated, now in radius

        let visible = apply(&stations, &criteria, &center());
        assert_eq!(ids(&visible), vec!["near", "mid", "unlocated"]);
    }

    #[test]
    fn status_and_availability_predicates() {
        let mut criteria = SearchCriteria::with_radius(50.0);
        criteria.status = StatusFilter::Only(StationStatus::Occupied);
        assert_eq!(ids(&apply(&fixture(), &criteria, &center())), vec!["mid"]);

        let mut criteria = SearchCriteria::with_radius(50.0);
        criteria.available_only = true;
        assert_eq!(
            ids(&apply(&fixture(), &criteria, &center())),
            vec!["near", "far"]
        );
    }

    #[test]
    fn applying_twice_yields_the_same_result() {
        let criteria = SearchCriteria::default();
        let once = apply(&fixture(), &criteria, &center());
        let twice = apply(&once, &criteria, &center());
        assert_eq!(ids(&once), ids(&twice));
    }

    #[test]
    fn narrowing_a_criterion_never_grows_the_result() {
        let candidates = fixture();
        let broad = SearchCriteria::with_radius(50.0);
        let broad_count = apply(&candidates, &broad, &center()).len();

        for narrowed in [
            {
                let mut c = broad.clone();
                c.radius_km = 2.0;
                c
            },
            {
                let mut c = broad.clone();
                c.min_power_kw = Some(30.0);
                c
            },
            {
                let mut c = broad.clone();
                c.price_max = Some(Decimal::new(30, 2));
                c
            },
            {
                let mut c = broad.clone();
                c.available_only = true;
                c
            },
            {
                let mut c = broad.clone();
                c.query = "near".into();
                c
            },
        ] {
            assert!(apply(&candidates, &narrowed, &center()).len() <= broad_count);
        }
    }

    #[test]
    fn inverted_price_band_matches_nothing_priced() {
        let mut criteria = SearchCriteria::with_radius(50.0);
        criteria.price_min = Some(Decimal::new(45, 2));
        criteria.price_max = Some(Decimal::new(20, 2));
        let visible = apply(&fixture(), &criteria, &center());
        assert!(visible.is_empty());
    }
}
