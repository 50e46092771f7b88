pub mod domain;
pub mod duration;
pub mod merge;
pub mod ports;
pub mod stress;

pub use domain::{
    clamp_heart_rate, AnalysisReport, CaffeineHabit, SleepMetrics, StressEstimate, TimeOfDay,
    DEFAULT_HEART_RATE, DEFAULT_MELATONIN_LEVEL, DEFAULT_SLEEP_HOURS, HEART_RATE_MAX,
    HEART_RATE_MIN,
};
pub use duration::sleep_hours_between;
pub use merge::{merge_stress_fields, merge_stress_insight, merge_stress_level};
pub use ports::{PortError, PortResult, SleepAnalysisService};
pub use stress::estimate_stress;
