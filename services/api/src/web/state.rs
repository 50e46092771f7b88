//! services/api/src/web/state.rs
//!
//! Defines the application's shared state.

use crate::config::Config;
use sleep_insight_core::ports::SleepAnalysisService;
use std::sync::Arc;

/// The shared application state, created once at startup and passed to all
/// handlers. There is no per-request session state: every analysis request
/// is self-contained.
#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub analysis_adapter: Arc<dyn SleepAnalysisService>,
}
