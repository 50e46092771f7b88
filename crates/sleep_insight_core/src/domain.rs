//! crates/sleep_insight_core/src/domain.rs
//!
//! Defines the pure, core data structures for the application.
//! These structs are independent of any database or serialization format.
//! Every value here lives for exactly one analysis request.

/// Lower bound for a plausible resting heart rate, in bpm.
pub const HEART_RATE_MIN: f64 = 40.0;
/// Upper bound for a plausible resting heart rate, in bpm.
pub const HEART_RATE_MAX: f64 = 120.0;
/// Resting heart rate assumed when the caller supplies none.
pub const DEFAULT_HEART_RATE: f64 = 65.0;
/// Sleep duration assumed when the caller supplies none and no bed/wake
/// times are available to derive it from.
pub const DEFAULT_SLEEP_HOURS: f64 = 7.0;
/// Melatonin level (pg/mL) assumed when the caller supplies none.
pub const DEFAULT_MELATONIN_LEVEL: f64 = 20.0;

/// A clock time with no date attached, as entered on the intake form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeOfDay {
    pub hour: u32,
    pub minute: u32,
}

impl TimeOfDay {
    /// Parses an `HH:MM` string leniently. A missing, malformed, or
    /// out-of-range component becomes 0, so `None` parses as midnight and
    /// parsing never fails.
    pub fn parse_lenient(input: Option<&str>) -> Self {
        let raw = input.unwrap_or("00:00");
        let mut parts = raw.splitn(2, ':');
        let hour = parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|h| *h <= 23)
            .unwrap_or(0);
        let minute = parts
            .next()
            .and_then(|p| p.trim().parse::<u32>().ok())
            .filter(|m| *m <= 59)
            .unwrap_or(0);
        Self { hour, minute }
    }

    /// Minutes elapsed since midnight, in [0, 1439].
    pub fn minutes_from_midnight(&self) -> u32 {
        self.hour * 60 + self.minute
    }
}

/// Self-reported afternoon caffeine intake.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CaffeineHabit {
    #[default]
    No,
    Yes,
    Sometimes,
}

impl CaffeineHabit {
    /// Maps the form's category string onto the enum. Unrecognized or
    /// missing values count as `No`.
    pub fn parse_lenient(input: Option<&str>) -> Self {
        match input {
            Some("yes") => Self::Yes,
            Some("sometimes") => Self::Sometimes,
            _ => Self::No,
        }
    }

    /// The category string as it appears on the form.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::No => "no",
            Self::Yes => "yes",
            Self::Sometimes => "sometimes",
        }
    }
}

/// Clamps a reported resting heart rate into the plausible band, falling
/// back to [`DEFAULT_HEART_RATE`] when absent or not a finite number.
pub fn clamp_heart_rate(raw: Option<f64>) -> f64 {
    match raw {
        Some(bpm) if bpm.is_finite() => bpm.clamp(HEART_RATE_MIN, HEART_RATE_MAX),
        _ => DEFAULT_HEART_RATE,
    }
}

/// The normalized metrics for a single analysis request. Built by the
/// request layer after clamping and defaulting, so downstream consumers can
/// assume every field is in range.
#[derive(Debug, Clone)]
pub struct SleepMetrics {
    /// Melatonin level in pg/mL, typical range ~0-100.
    pub melatonin_level: f64,
    /// Resting heart rate in bpm, clamped to [40, 120].
    pub heart_rate: f64,
    /// Hours slept last night, half-hour granularity when derived.
    pub sleep_hours: f64,
    /// The raw `HH:MM` strings as entered, kept for the analysis prompt.
    pub bed_time: Option<String>,
    pub wake_time: Option<String>,
    pub age: Option<u32>,
    pub caffeine_afternoon: CaffeineHabit,
}

/// A stress estimate produced by the local heuristic: a 1-10 level and a
/// sentence explaining how it was derived.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StressEstimate {
    pub level: u8,
    pub insight: String,
}

/// The structured assessment returned by the analysis provider. Fields are
/// rendered to the user verbatim; only the stress fields are subject to the
/// merge policy, so those stay optional until merged.
#[derive(Debug, Clone)]
pub struct AnalysisReport {
    pub needs_more_sleep: bool,
    pub confidence: String,
    pub sleep_verdict: String,
    pub quality_score: u8,
    /// Raw stress level as the provider reported it, pre-validation.
    pub stress_level_detected: Option<f64>,
    pub stress_insight: Option<String>,
    pub recommendations: Vec<String>,
    pub ideal_bedtime: String,
    pub ideal_wake_time: String,
    pub circadian_insight: String,
    pub heart_rate_insight: String,
    pub sleep_debt_note: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_well_formed_time() {
        let t = TimeOfDay::parse_lenient(Some("23:45"));
        assert_eq!(t, TimeOfDay { hour: 23, minute: 45 });
        assert_eq!(t.minutes_from_midnight(), 1425);
    }

    #[test]
    fn missing_input_is_midnight() {
        assert_eq!(
            TimeOfDay::parse_lenient(None),
            TimeOfDay { hour: 0, minute: 0 }
        );
    }

    #[test]
    fn malformed_components_become_zero() {
        assert_eq!(
            TimeOfDay::parse_lenient(Some("garbage")),
            TimeOfDay { hour: 0, minute: 0 }
        );
        // Missing minute field.
        assert_eq!(
            TimeOfDay::parse_lenient(Some("7")),
            TimeOfDay { hour: 7, minute: 0 }
        );
        // Out-of-range components are treated as malformed.
        assert_eq!(
            TimeOfDay::parse_lenient(Some("25:99")),
            TimeOfDay { hour: 0, minute: 0 }
        );
    }

    #[test]
    fn heart_rate_is_clamped_into_band() {
        assert_eq!(clamp_heart_rate(Some(200.0)), HEART_RATE_MAX);
        assert_eq!(clamp_heart_rate(Some(10.0)), HEART_RATE_MIN);
        assert_eq!(clamp_heart_rate(Some(72.0)), 72.0);
        assert_eq!(clamp_heart_rate(None), DEFAULT_HEART_RATE);
        assert_eq!(clamp_heart_rate(Some(f64::NAN)), DEFAULT_HEART_RATE);
    }

    #[test]
    fn unknown_caffeine_category_counts_as_no() {
        assert_eq!(CaffeineHabit::parse_lenient(Some("yes")), CaffeineHabit::Yes);
        assert_eq!(
            CaffeineHabit::parse_lenient(Some("sometimes")),
            CaffeineHabit::Sometimes
        );
        assert_eq!(CaffeineHabit::parse_lenient(Some("often")), CaffeineHabit::No);
        assert_eq!(CaffeineHabit::parse_lenient(None), CaffeineHabit::No);
    }
}
