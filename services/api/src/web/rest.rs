//! services/api/src/web/rest.rs
//!
//! Contains the Axum handler for the analysis endpoint and the master
//! definition for the OpenAPI specification.

use crate::web::state::AppState;
use axum::{
    extract::State,
    http::StatusCode,
    response::Json,
};
use serde::{Deserialize, Serialize};
use sleep_insight_core::{
    domain::{
        clamp_heart_rate, CaffeineHabit, SleepMetrics, DEFAULT_MELATONIN_LEVEL,
        DEFAULT_SLEEP_HOURS,
    },
    duration::sleep_hours_between,
    merge::merge_stress_fields,
    stress::estimate_stress,
};
use std::sync::Arc;
use tracing::error;
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        analyze_handler,
    ),
    components(
        schemas(AnalyzeRequest, AnalyzeResponse, ErrorResponse)
    ),
    tags(
        (name = "Sleep Insight API", description = "API endpoints for the sleep-quality analyzer.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Request and Response Structs
//=========================================================================================

/// The raw intake-form payload. Every field is optional and untrusted; the
/// handler normalizes them before any use.
#[derive(Debug, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeRequest {
    /// Melatonin level in pg/mL, typical range ~0-100.
    pub melatonin_level: Option<f64>,
    /// Resting heart rate in bpm; clamped to [40, 120] server-side.
    pub heart_rate: Option<f64>,
    /// Hours slept last night, as computed by the form.
    pub sleep_hours_last_night: Option<f64>,
    /// Bed time as `HH:MM`.
    pub bed_time: Option<String>,
    /// Wake time as `HH:MM`.
    pub wake_time: Option<String>,
    pub age: Option<u32>,
    /// Afternoon caffeine intake: "no", "yes", or "sometimes".
    pub caffeine_afternoon: Option<String>,
}

/// The analysis sent back to the client. The stress fields are always
/// populated: the provider's values when usable, the local heuristic's
/// otherwise.
#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AnalyzeResponse {
    pub needs_more_sleep: bool,
    pub confidence: String,
    pub sleep_verdict: String,
    pub quality_score: u8,
    pub stress_level_detected: u8,
    pub stress_insight: String,
    pub recommendations: Vec<String>,
    pub ideal_bedtime: String,
    pub ideal_wake_time: String,
    pub circadian_insight: String,
    pub heart_rate_insight: String,
    pub sleep_debt_note: String,
}

/// The error payload for a failed analysis.
#[derive(Debug, Serialize, ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub details: String,
}

//=========================================================================================
// Request Normalization
//=========================================================================================

/// Turns the untrusted request into normalized metrics: heart rate clamped
/// into its plausible band, sleep hours taken from the client when valid or
/// derived from the bed/wake times otherwise, and categorical fields
/// defaulted. Never fails; bad input becomes a safe default.
fn normalize_request(req: &AnalyzeRequest) -> SleepMetrics {
    let sleep_hours = match req.sleep_hours_last_night {
        Some(hours) if hours.is_finite() && hours > 0.0 && hours <= 24.0 => hours,
        _ if req.bed_time.is_some() || req.wake_time.is_some() => {
            sleep_hours_between(req.bed_time.as_deref(), req.wake_time.as_deref())
        }
        _ => DEFAULT_SLEEP_HOURS,
    };

    SleepMetrics {
        melatonin_level: req
            .melatonin_level
            .filter(|m| m.is_finite())
            .unwrap_or(DEFAULT_MELATONIN_LEVEL),
        heart_rate: clamp_heart_rate(req.heart_rate),
        sleep_hours,
        bed_time: req.bed_time.clone(),
        wake_time: req.wake_time.clone(),
        age: req.age.filter(|a| *a > 0),
        caffeine_afternoon: CaffeineHabit::parse_lenient(req.caffeine_afternoon.as_deref()),
    }
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// Analyze a set of self-reported sleep metrics.
///
/// Runs the metrics through the analysis provider and merges in the local
/// stress heuristic wherever the provider's stress fields are missing or out
/// of range, so the response always carries a 1-10 stress level.
#[utoipa::path(
    post,
    path = "/api/analyze",
    request_body = AnalyzeRequest,
    responses(
        (status = 200, description = "Analysis completed", body = AnalyzeResponse),
        (status = 500, description = "The analysis provider call failed", body = ErrorResponse)
    )
)]
pub async fn analyze_handler(
    State(app_state): State<Arc<AppState>>,
    Json(payload): Json<AnalyzeRequest>,
) -> Result<Json<AnalyzeResponse>, (StatusCode, Json<ErrorResponse>)> {
    let metrics = normalize_request(&payload);

    // Computed up front so a usable value exists whatever the provider says.
    let heuristic = estimate_stress(
        metrics.heart_rate,
        metrics.sleep_hours,
        metrics.caffeine_afternoon,
    );

    let report = app_state
        .analysis_adapter
        .analyze_metrics(&metrics)
        .await
        .map_err(|e| {
            error!("Sleep analysis failed: {:?}", e);
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorResponse {
                    error: "Analysis failed".to_string(),
                    details: e.to_string(),
                }),
            )
        })?;

    let (stress_level_detected, stress_insight) = merge_stress_fields(
        report.stress_level_detected,
        report.stress_insight.clone(),
        heuristic,
    );

    Ok(Json(AnalyzeResponse {
        needs_more_sleep: report.needs_more_sleep,
        confidence: report.confidence,
        sleep_verdict: report.sleep_verdict,
        quality_score: report.quality_score,
        stress_level_detected,
        stress_insight,
        recommendations: report.recommendations,
        ideal_bedtime: report.ideal_bedtime,
        ideal_wake_time: report.ideal_wake_time,
        circadian_insight: report.circadian_insight,
        heart_rate_insight: report.heart_rate_insight,
        sleep_debt_note: report.sleep_debt_note,
    }))
}
