use serde::Serialize;

/// Caffeine elimination half-life used for the projection.
pub const HALF_LIFE_HOURS: f64 = 5.0;
/// Hours of projection emitted per event (inclusive, so 25 points).
pub const HORIZON_HOURS: u32 = 24;

#[derive(Debug, Clone, Serialize)]
pub struct DecayPoint {
    pub hour: u32,
    pub remaining_mg: f64,
}

/// Caffeine remaining from a single dose after `hours`.
pub fn remaining_mg(dose_mg: f64, hours: f64) -> f64 {
    dose_mg * 0.5_f64.powf(hours / HALF_LIFE_HOURS)
}

/// Hourly decay curve for one dose over the fixed horizon. Events are not
/// merged; each log gets its own curve.
pub fn decay_curve(dose_mg: f64) -> Vec<DecayPoint> {
    (0..=HORIZON_HOURS)
        .map(|hour| DecayPoint {
            hour,
            remaining_mg: remaining_mg(dose_mg, hour as f64),
        })
        .collect()
}
