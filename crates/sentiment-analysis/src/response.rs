//! Validation of LLM sentiment replies.
//!
//! Replies are untrusted. Missing fields fall back to neutral defaults, while a
//! score or confidence that is present but malformed or out of range rejects the
//! whole reply so it never reaches clamped storage.

use ml_client::{MLError, MLResult};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use signal_core::stats::within;
use signal_core::ImpactTimeline;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LlmAnalysis {
    pub sentiment_score: f64,
    pub confidence: f64,
    pub explanation: String,
    pub impact_timeline: ImpactTimeline,
    pub affected_sectors: Vec<String>,
    pub mentioned_tickers: Vec<String>,
    pub key_themes: Vec<String>,
}

/// Parse and validate a raw reply. Returns the analysis plus the parsed
/// payload, which is stored for audit.
pub fn parse_llm_response(raw: &str) -> MLResult<(LlmAnalysis, Value)> {
    let value = extract_json_object(raw).ok_or_else(|| {
        MLError::InvalidResponse(format!("no JSON object in reply ({} chars)", raw.len()))
    })?;
    let analysis = validate(&value)?;
    Ok((analysis, value))
}

/// Whole reply as JSON first, then the greedy span from the first `{` to the
/// last `}`. Only objects are accepted.
pub fn extract_json_object(raw: &str) -> Option<Value> {
    if let Ok(value @ Value::Object(_)) = serde_json::from_str::<Value>(raw.trim()) {
        return Some(value);
    }

    let start = raw.find('{')?;
    let end = raw.rfind('}')?;
    if end <= start {
        return None;
    }
    match serde_json::from_str::<Value>(&raw[start..=end]) {
        Ok(value @ Value::Object(_)) => Some(value),
        _ => None,
    }
}

fn validate(value: &Value) -> MLResult<LlmAnalysis> {
    let obj = value
        .as_object()
        .ok_or_else(|| MLError::InvalidResponse("reply is not an object".to_string()))?;

    let sentiment_score = bounded_number(obj, "sentiment_score", -1.0, 1.0)?;
    let confidence = bounded_number(obj, "confidence", 0.0, 1.0)?;

    let explanation = obj
        .get("explanation")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .trim()
        .to_string();

    let impact_timeline = obj
        .get("impact_timeline")
        .and_then(Value::as_str)
        .and_then(ImpactTimeline::parse_lenient)
        .unwrap_or_default();

    Ok(LlmAnalysis {
        sentiment_score,
        confidence,
        explanation,
        impact_timeline,
        affected_sectors: string_list(obj, "affected_sectors"),
        mentioned_tickers: string_list(obj, "mentioned_tickers"),
        key_themes: string_list(obj, "key_themes"),
    })
}

fn bounded_number(obj: &Map<String, Value>, field: &str, min: f64, max: f64) -> MLResult<f64> {
    match obj.get(field) {
        None | Some(Value::Null) => Ok(0.0),
        Some(Value::Number(n)) => {
            let v = n.as_f64().unwrap_or(f64::NAN);
            if within(v, min, max) {
                Ok(v)
            } else {
                Err(MLError::InvalidResponse(format!(
                    "{} out of range [{}, {}]: {}",
                    field, min, max, v
                )))
            }
        }
        Some(other) => Err(MLError::InvalidResponse(format!(
            "{} is not a number: {}",
            field, other
        ))),
    }
}

fn string_list(obj: &Map<String, Value>, field: &str) -> Vec<String> {
    obj.get(field)
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(Value::as_str)
                .map(|s| s.trim().to_string())
                .filter(|s| !s.is_empty())
                .collect()
        })
        .unwrap_or_default()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parses_clean_json() {
        let raw = r#"{
            "sentiment_score": 0.65,
            "confidence": 0.8,
            "explanation": "Strong quarterly numbers.",
            "impact_timeline": "short_term",
            "affected_sectors": ["Information Technology"],
            "mentioned_tickers": ["TCS", "INFY"],
            "key_themes": ["earnings"]
        }"#;
        let (analysis, value) = parse_llm_response(raw).unwrap();
        assert_eq!(analysis.sentiment_score, 0.65);
        assert_eq!(analysis.confidence, 0.8);
        assert_eq!(analysis.impact_timeline, ImpactTimeline::ShortTerm);
        assert_eq!(analysis.mentioned_tickers, vec!["TCS", "INFY"]);
        assert_eq!(value["explanation"], "Strong quarterly numbers.");
    }

    #[test]
    fn test_extracts_object_from_markdown_fence() {
        let raw = "Here you go:\n```json\n{\"sentiment_score\": -0.4, \"confidence\": 0.6}\n```\nThanks";
        let (analysis, _) = parse_llm_response(raw).unwrap();
        assert_eq!(analysis.sentiment_score, -0.4);
        assert_eq!(analysis.confidence, 0.6);
    }

    #[test]
    fn test_unparseable_reply_fails() {
        assert!(parse_llm_response("I cannot help with that").is_err());
        assert!(parse_llm_response("} backwards {").is_err());
        assert!(parse_llm_response("{ not: valid json }").is_err());
        assert!(parse_llm_response("[1, 2, 3]").is_err());
    }

    #[test]
    fn test_missing_fields_default() {
        let (analysis, _) = parse_llm_response("{}").unwrap();
        assert_eq!(analysis.sentiment_score, 0.0);
        assert_eq!(analysis.confidence, 0.0);
        assert_eq!(analysis.explanation, "");
        assert_eq!(analysis.impact_timeline, ImpactTimeline::Unknown);
        assert!(analysis.key_themes.is_empty());
    }

    #[test]
    fn test_out_of_range_rejected() {
        assert!(parse_llm_response(r#"{"sentiment_score": 1.5, "confidence": 0.5}"#).is_err());
        assert!(parse_llm_response(r#"{"sentiment_score": 0.5, "confidence": -0.1}"#).is_err());
        assert!(parse_llm_response(r#"{"sentiment_score": "high"}"#).is_err());
    }

    #[test]
    fn test_boundaries_accepted() {
        let (analysis, _) =
            parse_llm_response(r#"{"sentiment_score": -1.0, "confidence": 1.0}"#).unwrap();
        assert_eq!(analysis.sentiment_score, -1.0);
        assert_eq!(analysis.confidence, 1.0);
    }

    #[test]
    fn test_unrecognized_timeline_is_unknown() {
        let (analysis, _) =
            parse_llm_response(r#"{"impact_timeline": "next fiscal year"}"#).unwrap();
        assert_eq!(analysis.impact_timeline, ImpactTimeline::Unknown);

        let (analysis, _) = parse_llm_response(r#"{"impact_timeline": "Long-Term"}"#).unwrap();
        assert_eq!(analysis.impact_timeline, ImpactTimeline::LongTerm);
    }

    #[test]
    fn test_non_string_list_items_skipped() {
        let (analysis, _) =
            parse_llm_response(r#"{"affected_sectors": ["FMCG", 3, null, " Telecom "]}"#).unwrap();
        assert_eq!(analysis.affected_sectors, vec!["FMCG", "Telecom"]);
    }
}
