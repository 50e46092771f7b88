//! crates/sleep_insight_core/src/ports.rs
//!
//! Defines the service contracts (traits) for the application's core logic.
//! These traits form the boundary of the hexagonal architecture, allowing the core
//! to be independent of specific external implementations like model-provider APIs.

use async_trait::async_trait;

use crate::domain::{AnalysisReport, SleepMetrics};

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A generic error type for all port operations.
/// This abstracts away the specific errors from external services (e.g., network, provider API).
#[derive(Debug, thiserror::Error)]
pub enum PortError {
    #[error("An unexpected error occurred: {0}")]
    Unexpected(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait SleepAnalysisService: Send + Sync {
    /// Produces a structured sleep-quality assessment for one set of metrics.
    ///
    /// Implementations must be best-effort: unusable provider *content*
    /// (as opposed to a failed call) is expected to surface as a degraded
    /// report, not an error.
    async fn analyze_metrics(&self, metrics: &SleepMetrics) -> PortResult<AnalysisReport>;
}
