//! crates/sleep_insight_core/src/duration.rs
//!
//! Computes last night's sleep duration from the bed and wake times on the
//! intake form.

use crate::domain::TimeOfDay;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// Computes hours slept between `bed` and `wake` (`HH:MM` strings), rounded
/// to the nearest half hour.
///
/// When the wake time is at or before the bed time the interval is assumed
/// to cross midnight, so an explicit midnight-to-midnight pair yields 24.0.
/// Malformed input defaults to midnight rather than failing. Two absent
/// times mean nothing was entered at all and compute to 0.0; only entered
/// times get the full-wrap reading.
pub fn sleep_hours_between(bed: Option<&str>, wake: Option<&str>) -> f64 {
    if bed.is_none() && wake.is_none() {
        return 0.0;
    }

    let bed_mins = i64::from(TimeOfDay::parse_lenient(bed).minutes_from_midnight());
    let wake_mins = i64::from(TimeOfDay::parse_lenient(wake).minutes_from_midnight());

    let mut elapsed = if wake_mins <= bed_mins {
        // Overnight wrap: bed before midnight, wake after.
        MINUTES_PER_DAY - bed_mins + wake_mins
    } else {
        wake_mins - bed_mins
    };
    // Unreachable for in-range inputs, guarded anyway.
    if !(0..=MINUTES_PER_DAY).contains(&elapsed) {
        elapsed = 0;
    }

    (elapsed as f64 / 60.0 * 2.0).round() / 2.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overnight_wrap() {
        assert_eq!(sleep_hours_between(Some("23:00"), Some("06:00")), 7.0);
    }

    #[test]
    fn same_day_no_wrap() {
        assert_eq!(sleep_hours_between(Some("06:00"), Some("23:00")), 17.0);
    }

    #[test]
    fn equal_times_are_a_full_day() {
        assert_eq!(sleep_hours_between(Some("00:00"), Some("00:00")), 24.0);
        assert_eq!(sleep_hours_between(Some("13:30"), Some("13:30")), 24.0);
    }

    #[test]
    fn wholly_absent_times_compute_to_zero() {
        // No input at all is not the same as an entered midnight pair.
        assert_eq!(sleep_hours_between(None, None), 0.0);
    }

    #[test]
    fn a_single_missing_time_defaults_to_midnight() {
        assert_eq!(sleep_hours_between(None, Some("06:00")), 6.0);
        assert_eq!(sleep_hours_between(Some("22:00"), None), 2.0);
    }

    #[test]
    fn rounds_to_nearest_half_hour() {
        // 7h10m rounds down, 7h20m rounds up.
        assert_eq!(sleep_hours_between(Some("23:00"), Some("06:10")), 7.0);
        assert_eq!(sleep_hours_between(Some("23:00"), Some("06:20")), 7.5);
    }

    #[test]
    fn malformed_input_is_treated_as_midnight() {
        assert_eq!(
            sleep_hours_between(Some("not a time"), Some("08:00")),
            8.0
        );
    }
}
