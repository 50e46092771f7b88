//! services/api/src/adapters/analysis_llm.rs
//!
//! This module contains the adapter for the sleep-analysis LLM.
//! It implements the `SleepAnalysisService` port from the `core` crate.

const SYSTEM_INSTRUCTIONS: &str =
    "You respond only with valid JSON. No markdown code blocks, no explanation outside the JSON.";

const PROMPT_TEMPLATE: &str = r#"You are a sleep and circadian rhythm expert. Analyze this user data and respond in valid JSON only, no markdown or extra text.

User data (no stress level given - you must infer it):
- Melatonin level: {melatonin_level} pg/mL (picograms per milliliter, typical range ~0-100)
- Resting heart rate: {heart_rate} bpm
- Sleep last night: {sleep_hours} hours (bed: {bed_time}, wake: {wake_time})
- Age: {age}
- Caffeine after 2pm: {caffeine_afternoon}

You MUST infer and return stress level (1-10) from: elevated heart rate, short or fragmented sleep, late/irregular schedule, caffeine, age, and melatonin. 1 = very relaxed, 10 = very stressed. Always include stressLevelDetected and stressInsight.

Give 3 recommendations. Each recommendation must be 2-4 sentences: explain why it matters for their data, then what to do and how. Be specific to their melatonin, heart rate, sleep amount, and schedule. Escape any double quotes inside strings with backslash.

Respond with this exact JSON structure (use double quotes, escape any quotes in strings):
{
  "needsMoreSleep": true or false,
  "confidence": "high" or "medium" or "low",
  "sleepVerdict": "One short sentence: do they need more sleep?",
  "qualityScore": number 1-100,
  "stressLevelDetected": number 1-10,
  "stressInsight": "One or two sentences explaining why you inferred this stress level from their metrics",
  "recommendations": ["Full first recommendation paragraph here.", "Full second recommendation paragraph here.", "Full third recommendation paragraph here."],
  "idealBedtime": "HH:MM format suggestion",
  "idealWakeTime": "HH:MM format suggestion",
  "circadianInsight": "One paragraph on their circadian/melatonin timing",
  "heartRateInsight": "One sentence on what their HR suggests for recovery",
  "sleepDebtNote": "One sentence on sleep debt if relevant"
}"#;

use async_openai::{
    config::OpenAIConfig,
    error::OpenAIError,
    types::chat::{
        ChatCompletionRequestSystemMessageArgs, ChatCompletionRequestUserMessageArgs,
        CreateChatCompletionRequestArgs,
    },
    Client,
};
use async_trait::async_trait;
use regex::Regex;
use serde::{Deserialize, Deserializer};
use serde_json::Value;
use sleep_insight_core::{
    domain::{AnalysisReport, SleepMetrics},
    ports::{PortError, PortResult, SleepAnalysisService},
};
use tracing::warn;

// Canned copy used both for the full fallback report and for individual
// fields the provider left out.
const FALLBACK_VERDICT: &str =
    "Unable to parse detailed analysis. Consider getting more sleep and re-checking your metrics.";
const FALLBACK_QUALITY_SCORE: u8 = 50;
const FALLBACK_RECOMMENDATIONS: [&str; 3] = [
    "Ensure 7\u{2013}9 hours of sleep.",
    "Keep a consistent sleep schedule.",
    "Limit caffeine after 2pm.",
];
const FALLBACK_IDEAL_BEDTIME: &str = "22:30";
const FALLBACK_IDEAL_WAKE_TIME: &str = "06:30";
const FALLBACK_CIRCADIAN_INSIGHT: &str =
    "Consistent bed and wake times help align melatonin with your schedule.";
const FALLBACK_HEART_RATE_INSIGHT: &str =
    "Resting heart rate can reflect recovery; lower often indicates better rest.";
const FALLBACK_SLEEP_DEBT_NOTE: &str =
    "Try to catch up gradually with slightly earlier bedtimes.";

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `SleepAnalysisService` using an OpenAI-compatible LLM.
#[derive(Clone)]
pub struct OpenAiAnalysisAdapter {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiAnalysisAdapter {
    /// Creates a new `OpenAiAnalysisAdapter`.
    pub fn new(client: Client<OpenAIConfig>, model: String) -> Self {
        Self { client, model }
    }

    fn build_prompt(metrics: &SleepMetrics) -> String {
        PROMPT_TEMPLATE
            .replace("{melatonin_level}", &metrics.melatonin_level.to_string())
            .replace("{heart_rate}", &metrics.heart_rate.to_string())
            .replace("{sleep_hours}", &metrics.sleep_hours.to_string())
            .replace("{bed_time}", metrics.bed_time.as_deref().unwrap_or("not provided"))
            .replace("{wake_time}", metrics.wake_time.as_deref().unwrap_or("not provided"))
            .replace(
                "{age}",
                &metrics
                    .age
                    .map(|a| a.to_string())
                    .unwrap_or_else(|| "not provided".to_string()),
            )
            .replace("{caffeine_afternoon}", metrics.caffeine_afternoon.as_str())
    }

    /// Strips a surrounding Markdown code fence, which some models add
    /// despite the instructions.
    fn strip_code_fences(raw: &str) -> String {
        let fence_regex = Regex::new(r"^```(?:json)?\s*|\s*```$").unwrap();
        fence_regex.replace_all(raw.trim(), "").trim().to_string()
    }

    /// Parses the model's JSON into a report, or returns the static fallback
    /// report when the content is unusable. The stress fields are left empty
    /// in the fallback so the caller's heuristic fills them in.
    fn parse_report(raw: &str) -> AnalysisReport {
        let cleaned = Self::strip_code_fences(raw);
        match serde_json::from_str::<ReportPayload>(&cleaned) {
            Ok(payload) => payload.into_report(),
            Err(e) => {
                warn!("Analysis response was not valid JSON, using fallback report: {e}");
                fallback_report()
            }
        }
    }
}

/// The static report substituted when the provider's content cannot be parsed.
pub fn fallback_report() -> AnalysisReport {
    AnalysisReport {
        needs_more_sleep: true,
        confidence: "low".to_string(),
        sleep_verdict: FALLBACK_VERDICT.to_string(),
        quality_score: FALLBACK_QUALITY_SCORE,
        stress_level_detected: None,
        stress_insight: None,
        recommendations: FALLBACK_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect(),
        ideal_bedtime: FALLBACK_IDEAL_BEDTIME.to_string(),
        ideal_wake_time: FALLBACK_IDEAL_WAKE_TIME.to_string(),
        circadian_insight: FALLBACK_CIRCADIAN_INSIGHT.to_string(),
        heart_rate_insight: FALLBACK_HEART_RATE_INSIGHT.to_string(),
        sleep_debt_note: FALLBACK_SLEEP_DEBT_NOTE.to_string(),
    }
}

//=========================================================================================
// Provider Response Payload
//=========================================================================================

/// Coerces a JSON number or numeric string into a float, the way the form's
/// own numbers are coerced. Anything else becomes `None` so one off-type
/// field never sinks the rest of the payload.
fn lenient_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.and_then(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }))
}

/// The provider's JSON, deserialized leniently: every field is optional so a
/// partially-conforming response still yields a report, with the fallback
/// copy filling the gaps.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ReportPayload {
    needs_more_sleep: Option<bool>,
    confidence: Option<String>,
    sleep_verdict: Option<String>,
    #[serde(default, deserialize_with = "lenient_number")]
    quality_score: Option<f64>,
    #[serde(default, deserialize_with = "lenient_number")]
    stress_level_detected: Option<f64>,
    stress_insight: Option<String>,
    recommendations: Option<Vec<String>>,
    ideal_bedtime: Option<String>,
    ideal_wake_time: Option<String>,
    circadian_insight: Option<String>,
    heart_rate_insight: Option<String>,
    sleep_debt_note: Option<String>,
}

impl ReportPayload {
    fn into_report(self) -> AnalysisReport {
        let quality_score = self
            .quality_score
            .filter(|s| s.is_finite())
            .map(|s| s.clamp(1.0, 100.0).round() as u8)
            .unwrap_or(FALLBACK_QUALITY_SCORE);
        AnalysisReport {
            needs_more_sleep: self.needs_more_sleep.unwrap_or(true),
            confidence: self.confidence.unwrap_or_else(|| "low".to_string()),
            sleep_verdict: self.sleep_verdict.unwrap_or_else(|| FALLBACK_VERDICT.to_string()),
            quality_score,
            stress_level_detected: self.stress_level_detected,
            stress_insight: self.stress_insight,
            recommendations: self.recommendations.unwrap_or_else(|| {
                FALLBACK_RECOMMENDATIONS.iter().map(|s| s.to_string()).collect()
            }),
            ideal_bedtime: self
                .ideal_bedtime
                .unwrap_or_else(|| FALLBACK_IDEAL_BEDTIME.to_string()),
            ideal_wake_time: self
                .ideal_wake_time
                .unwrap_or_else(|| FALLBACK_IDEAL_WAKE_TIME.to_string()),
            circadian_insight: self
                .circadian_insight
                .unwrap_or_else(|| FALLBACK_CIRCADIAN_INSIGHT.to_string()),
            heart_rate_insight: self
                .heart_rate_insight
                .unwrap_or_else(|| FALLBACK_HEART_RATE_INSIGHT.to_string()),
            sleep_debt_note: self
                .sleep_debt_note
                .unwrap_or_else(|| FALLBACK_SLEEP_DEBT_NOTE.to_string()),
        }
    }
}

//=========================================================================================
// `SleepAnalysisService` Trait Implementation
//=========================================================================================

#[async_trait]
impl SleepAnalysisService for OpenAiAnalysisAdapter {
    /// Asks the model for a sleep-quality assessment of the given metrics.
    ///
    /// Only transport and API errors surface as `PortError`; unusable
    /// response content degrades to the static fallback report instead.
    async fn analyze_metrics(&self, metrics: &SleepMetrics) -> PortResult<AnalysisReport> {
        let messages = vec![
            ChatCompletionRequestSystemMessageArgs::default()
                .content(SYSTEM_INSTRUCTIONS)
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
            ChatCompletionRequestUserMessageArgs::default()
                .content(Self::build_prompt(metrics))
                .build()
                .map_err(|e| PortError::Unexpected(e.to_string()))?
                .into(),
        ];

        let request = CreateChatCompletionRequestArgs::default()
            .model(&self.model)
            .messages(messages)
            .temperature(0.4)
            .build()
            .map_err(|e| PortError::Unexpected(e.to_string()))?;

        // Call the API and manually map the error if it occurs, which respects the orphan rule.
        let response = self
            .client
            .chat()
            .create(request)
            .await
            .map_err(|e: OpenAIError| PortError::Unexpected(e.to_string()))?;

        let raw = response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        Ok(Self::parse_report(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sleep_insight_core::domain::CaffeineHabit;

    fn metrics() -> SleepMetrics {
        SleepMetrics {
            melatonin_level: 20.0,
            heart_rate: 65.0,
            sleep_hours: 7.0,
            bed_time: Some("23:00".to_string()),
            wake_time: Some("06:00".to_string()),
            age: None,
            caffeine_afternoon: CaffeineHabit::No,
        }
    }

    #[test]
    fn prompt_includes_metrics_and_placeholders_for_missing_fields() {
        let prompt = OpenAiAnalysisAdapter::build_prompt(&metrics());
        assert!(prompt.contains("Resting heart rate: 65 bpm"));
        assert!(prompt.contains("Sleep last night: 7 hours (bed: 23:00, wake: 06:00)"));
        assert!(prompt.contains("Age: not provided"));
        assert!(prompt.contains("Caffeine after 2pm: no"));
    }

    #[test]
    fn strips_code_fences_around_json() {
        let fenced = "```json\n{\"qualityScore\": 80}\n```";
        assert_eq!(
            OpenAiAnalysisAdapter::strip_code_fences(fenced),
            "{\"qualityScore\": 80}"
        );
        let bare = "```\n{}\n```";
        assert_eq!(OpenAiAnalysisAdapter::strip_code_fences(bare), "{}");
        let plain = "{\"a\": 1}";
        assert_eq!(OpenAiAnalysisAdapter::strip_code_fences(plain), plain);
    }

    #[test]
    fn well_formed_response_is_parsed() {
        let raw = r#"{
            "needsMoreSleep": false,
            "confidence": "high",
            "sleepVerdict": "You are sleeping enough.",
            "qualityScore": 82,
            "stressLevelDetected": 3,
            "stressInsight": "Low heart rate and solid sleep.",
            "recommendations": ["a", "b", "c"],
            "idealBedtime": "23:00",
            "idealWakeTime": "07:00",
            "circadianInsight": "Timing looks aligned.",
            "heartRateInsight": "Recovery looks good.",
            "sleepDebtNote": "No meaningful debt."
        }"#;
        let report = OpenAiAnalysisAdapter::parse_report(raw);
        assert!(!report.needs_more_sleep);
        assert_eq!(report.quality_score, 82);
        assert_eq!(report.stress_level_detected, Some(3.0));
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn unparseable_response_degrades_to_fallback() {
        let report = OpenAiAnalysisAdapter::parse_report("I cannot answer that.");
        assert!(report.needs_more_sleep);
        assert_eq!(report.confidence, "low");
        assert_eq!(report.quality_score, FALLBACK_QUALITY_SCORE);
        // Stress fields stay empty so the heuristic takes over downstream.
        assert!(report.stress_level_detected.is_none());
        assert!(report.stress_insight.is_none());
    }

    #[test]
    fn string_typed_numbers_do_not_sink_the_report() {
        // Some models quote their numbers; the rest of the report must
        // survive and the coerced value must still reach the merge policy.
        let raw = r#"{
            "stressLevelDetected": "7",
            "qualityScore": "64",
            "stressInsight": "Stress looks moderate.",
            "sleepVerdict": "Close to enough sleep.",
            "recommendations": ["a", "b", "c"]
        }"#;
        let report = OpenAiAnalysisAdapter::parse_report(raw);
        assert_eq!(report.stress_level_detected, Some(7.0));
        assert_eq!(report.quality_score, 64);
        assert_eq!(report.stress_insight.as_deref(), Some("Stress looks moderate."));
        assert_eq!(report.sleep_verdict, "Close to enough sleep.");
        assert_eq!(report.recommendations.len(), 3);
    }

    #[test]
    fn non_numeric_stress_level_becomes_absent_not_fatal() {
        let raw = r#"{
            "stressLevelDetected": "moderate",
            "stressInsight": "Some stress present."
        }"#;
        let report = OpenAiAnalysisAdapter::parse_report(raw);
        assert!(report.stress_level_detected.is_none());
        assert_eq!(report.stress_insight.as_deref(), Some("Some stress present."));
    }

    #[test]
    fn missing_fields_get_fallback_copy() {
        let report = OpenAiAnalysisAdapter::parse_report(r#"{"qualityScore": 90.4}"#);
        assert_eq!(report.quality_score, 90);
        assert_eq!(report.ideal_bedtime, FALLBACK_IDEAL_BEDTIME);
        assert_eq!(report.recommendations.len(), 3);
    }
}
