//! crates/sleep_insight_core/src/stress.rs
//!
//! The local stress heuristic: a deterministic 1-10 estimate derived from
//! heart rate, sleep duration, and caffeine habit. Used as the fallback when
//! the analysis provider fails to supply a usable stress level.

use crate::domain::{CaffeineHabit, StressEstimate};

/// Every estimate starts from this midpoint before the adjustments below.
const BASELINE_SCORE: f64 = 5.0;
/// Final levels are clamped into this band before rounding.
const LEVEL_MIN: f64 = 1.0;
const LEVEL_MAX: f64 = 10.0;

/// Heart-rate adjustments, highest band first. 60-80 bpm is a typical
/// resting range; 85+ suggests elevated stress or poor recovery.
static HEART_RATE_BANDS: [(fn(f64) -> bool, f64); 3] = [
    (|bpm| bpm >= 85.0, 2.0),
    (|bpm| bpm >= 75.0, 1.0),
    (|bpm| bpm <= 55.0, -1.0),
];

/// Sleep-duration adjustments: short sleep raises the score, a solid
/// 8-9 hours lowers it slightly.
static SLEEP_BANDS: [(fn(f64) -> bool, f64); 3] = [
    (|hrs| hrs < 5.0, 2.0),
    (|hrs| hrs < 6.0, 1.0),
    (|hrs| (8.0..=9.0).contains(&hrs), -0.5),
];

/// Returns the adjustment of the first matching band, or 0 when none match.
/// The tables are ordered by priority, so overlap between predicates is fine.
fn band_adjustment(bands: &[(fn(f64) -> bool, f64)], value: f64) -> f64 {
    bands
        .iter()
        .find(|(applies, _)| applies(value))
        .map(|(_, delta)| *delta)
        .unwrap_or(0.0)
}

fn caffeine_adjustment(habit: CaffeineHabit) -> f64 {
    match habit {
        CaffeineHabit::Yes => 1.0,
        CaffeineHabit::Sometimes => 0.5,
        CaffeineHabit::No => 0.0,
    }
}

/// Estimates a stress level from already-normalized metrics.
///
/// Inputs are expected to be pre-clamped and defaulted by the caller, so
/// this never fails: the score is clamped to [1, 10] and rounded, and the
/// insight sentence cites the raw numbers it was computed from.
pub fn estimate_stress(
    heart_rate: f64,
    sleep_hours: f64,
    caffeine_afternoon: CaffeineHabit,
) -> StressEstimate {
    let score = BASELINE_SCORE
        + band_adjustment(&HEART_RATE_BANDS, heart_rate)
        + band_adjustment(&SLEEP_BANDS, sleep_hours)
        + caffeine_adjustment(caffeine_afternoon);
    let level = score.clamp(LEVEL_MIN, LEVEL_MAX).round() as u8;

    let heart_rate_clause = if heart_rate > 75.0 {
        "Elevated heart rate suggests elevated stress or poor recovery."
    } else {
        "Heart rate is in a relaxed range."
    };
    let sleep_clause = if sleep_hours < 6.0 {
        "Short sleep can raise stress."
    } else {
        ""
    };
    let insight = format!(
        "Calculated from your resting heart rate ({heart_rate} bpm), sleep \
         ({sleep_hours} hrs), and caffeine. {heart_rate_clause} {sleep_clause}"
    )
    .trim()
    .to_string();

    StressEstimate { level, insight }
}
