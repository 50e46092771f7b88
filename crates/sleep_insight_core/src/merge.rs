//! crates/sleep_insight_core/src/merge.rs
//!
//! Merge policy for the stress fields of an externally produced analysis.
//! The provider is asked to report a stress level but cannot be trusted to:
//! these functions decide, field by field, whether the external value or the
//! local heuristic's wins.

use crate::domain::StressEstimate;

/// Accepts the external stress level only when it is a finite number within
/// [1, 10]; anything else falls back to the heuristic's level. A valid
/// external value is rounded to the nearest integer.
pub fn merge_stress_level(external: Option<f64>, computed: u8) -> u8 {
    match external {
        Some(level) if level.is_finite() && (1.0..=10.0).contains(&level) => {
            level.round() as u8
        }
        _ => computed,
    }
}

/// Keeps the external insight text whenever it is non-empty; the heuristic's
/// insight only fills a gap, it never overwrites existing text.
pub fn merge_stress_insight(external: Option<String>, computed: String) -> String {
    external.filter(|text| !text.is_empty()).unwrap_or(computed)
}

/// Applies both merge rules, returning the final (level, insight) pair the
/// response must carry.
pub fn merge_stress_fields(
    external_level: Option<f64>,
    external_insight: Option<String>,
    computed: StressEstimate,
) -> (u8, String) {
    (
        merge_stress_level(external_level, computed.level),
        merge_stress_insight(external_insight, computed.insight),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn valid_external_level_wins_and_is_rounded() {
        assert_eq!(merge_stress_level(Some(3.0), 8), 3);
        assert_eq!(merge_stress_level(Some(9.6), 8), 10);
        assert_eq!(merge_stress_level(Some(1.0), 8), 1);
    }

    #[test]
    fn out_of_range_external_level_is_replaced() {
        assert_eq!(merge_stress_level(Some(0.0), 8), 8);
        assert_eq!(merge_stress_level(Some(10.4), 8), 8);
        assert_eq!(merge_stress_level(Some(-2.0), 8), 8);
        assert_eq!(merge_stress_level(Some(f64::NAN), 8), 8);
        assert_eq!(merge_stress_level(None, 8), 8);
    }

    #[test]
    fn non_empty_external_insight_is_never_overwritten() {
        assert_eq!(
            merge_stress_insight(Some("provider text".into()), "local".into()),
            "provider text"
        );
    }

    #[test]
    fn empty_or_absent_insight_is_substituted() {
        assert_eq!(merge_stress_insight(Some(String::new()), "local".into()), "local");
        assert_eq!(merge_stress_insight(None, "local".into()), "local");
    }

    #[test]
    fn merge_fields_combines_both_rules() {
        let computed = StressEstimate {
            level: 6,
            insight: "heuristic insight".into(),
        };
        let (level, insight) = merge_stress_fields(Some(11.0), None, computed);
        assert_eq!(level, 6);
        assert_eq!(insight, "heuristic insight");
    }
}
