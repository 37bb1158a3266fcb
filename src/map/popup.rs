//! Popup content as a pure projection of a station

use rust_decimal::Decimal;
use serde::Serialize;

use crate::domain::{distance_km, Coordinate, Station, StationStatus};

/// What the reserve affordance does when activated.
///
/// Decided once at popup construction from the session's capability check;
/// the rendering layer only dispatches.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ReserveAction {
    /// User may reserve directly
    Reserve,
    /// User must authenticate first
    RequiresLogin,
}

/// Everything a popup renders for one station marker.
///
/// A pure value: rebuilding it from the same station and center always
/// yields the same descriptor, so popups can be disposed and re-created
/// freely during reconciliation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PopupDescriptor {
    pub station_id: String,
    pub title: String,
    pub address: String,
    pub status: StationStatus,
    pub power_kw: Option<f64>,
    pub price_per_kwh: Option<Decimal>,
    /// Live distance from the session's search center, in km
    pub distance_km: f64,
    pub reserve: ReserveAction,
}

/// Project a station onto its popup, measured from `center`.
///
/// Returns `None` for stations without a position; those never reach the
/// map in the first place.
pub fn station_popup(
    station: &Station,
    center: &Coordinate,
    can_reserve: bool,
) -> Option<PopupDescriptor> {
    let position = station.coordinate.as_ref()?;
    Some(PopupDescriptor {
        station_id: station.id.clone(),
        title: station.name.clone(),
        address: station.address.clone(),
        status: station.status,
        power_kw: station.power_kw,
        price_per_kwh: station.price_per_kwh,
        distance_km: distance_km(position, center),
        reserve: if can_reserve {
            ReserveAction::Reserve
        } else {
            ReserveAction::RequiresLogin
        },
    })
}

impl std::fmt::Display for PopupDescriptor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} — {} — {:.1} km",
            self.title, self.status, self.distance_km
        )?;
        if let Some(power) = self.power_kw {
            write!(f, " — {} kW", power)?;
        }
        if let Some(price) = self.price_per_kwh {
            write!(f, " — {}/kWh", price)?;
        }
        Ok(())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn center() -> Coordinate {
        Coordinate::new(48.8566, 2.3522).unwrap()
    }

    fn located_station() -> Station {
        let mut s = Station::new("s1", "Borne Bastille", "8 Place de la Bastille");
        s.coordinate = Some(Coordinate::new(48.8532, 2.3692).unwrap());
        s.power_kw = Some(22.0);
        s.price_per_kwh = Some(Decimal::new(30, 2));
        s
    }

    #[test]
    fn popup_carries_all_display_fields() {
        let popup = station_popup(&located_station(), &center(), true).unwrap();
        assert_eq!(popup.station_id, "s1");
        assert_eq!(popup.title, "Borne Bastille");
        assert_eq!(popup.status, StationStatus::Available);
        assert_eq!(popup.power_kw, Some(22.0));
        assert_eq!(popup.price_per_kwh, Some(Decimal::new(30, 2)));
        assert!(popup.distance_km > 0.0 && popup.distance_km < 3.0);
        assert_eq!(popup.reserve, ReserveAction::Reserve);
    }

    #[test]
    fn capability_decides_the_reserve_action() {
        let popup = station_popup(&located_station(), &center(), false).unwrap();
        assert_eq!(popup.reserve, ReserveAction::RequiresLogin);
    }

    #[test]
    fn unlocated_station_has_no_popup() {
        let station = Station::new("s2", "Borne fantôme", "unknown");
        assert!(station_popup(&station, &center(), true).is_none());
    }

    #[test]
    fn projection_is_deterministic() {
        let station = located_station();
        assert_eq!(
            station_popup(&station, &center(), true),
            station_popup(&station, &center(), true)
        );
    }

    #[test]
    fn display_renders_the_essentials() {
        let popup = station_popup(&located_station(), &center(), true).unwrap();
        let rendered = popup.to_string();
        assert!(rendered.contains("Borne Bastille"));
        assert!(rendered.contains("AVAILABLE"));
        assert!(rendered.contains("22 kW"));
        assert!(rendered.contains("0.30/kWh"));
    }
}
