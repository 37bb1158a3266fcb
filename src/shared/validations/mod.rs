use rust_decimal::Decimal;

/// Smallest search radius the UI may request, in kilometers.
pub const MIN_RADIUS_KM: f64 = 0.5;
/// Largest search radius the UI may request, in kilometers.
pub const MAX_RADIUS_KM: f64 = 100.0;

/// Clamp a user-supplied search radius into the supported band.
///
/// `None` or a non-finite value falls back to `default_km`.
pub fn normalize_radius_km(radius: Option<f64>, default_km: f64) -> f64 {
    match radius {
        Some(r) if r.is_finite() => r.clamp(MIN_RADIUS_KM, MAX_RADIUS_KM),
        _ => default_km,
    }
}

/// Order a price band so min ≤ max, swapping if the caller inverted them.
pub fn normalize_price_band(
    min: Option<Decimal>,
    max: Option<Decimal>,
) -> (Option<Decimal>, Option<Decimal>) {
    match (min, max) {
        (Some(lo), Some(hi)) if lo > hi => (Some(hi), Some(lo)),
        other => other,
    }
}

// ── Tests ──────────────────────────────────────────────────────
