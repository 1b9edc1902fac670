//! Turning model output into validated trends

use serde_json::Value;
use tracing::warn;

use super::AnalysisError;
use crate::models::{Classification, Trend};

const REQUIRED_FIELDS: [&str; 5] = [
    "tool_name",
    "classification",
    "confidence_score",
    "technical_insight",
    "architectural_verdict",
];

/// Locate the JSON array in a model reply
///
/// A reply starting with `[` is taken as-is; otherwise the slice from the
/// first `[` to the last `]` is used.
pub fn extract_json_array(content: &str) -> Option<&str> {
    let content = content.trim();
    if content.starts_with('[') {
        return Some(content);
    }

    let start = content.find('[')?;
    let end = content.rfind(']')?;
    (end > start).then(|| &content[start..=end])
}

/// Check a raw trend object
///
/// Requires every field in [`REQUIRED_FIELDS`], a `signal`/`noise`
/// classification and an integer confidence score in `1..=100`.
pub fn validate_trend(value: &Value) -> bool {
    let Some(obj) = value.as_object() else {
        return false;
    };

    if !REQUIRED_FIELDS.iter().all(|field| obj.contains_key(*field)) {
        return false;
    }

    if obj
        .get("classification")
        .and_then(Value::as_str)
        .and_then(Classification::parse)
        .is_none()
    {
        return false;
    }

    matches!(
        obj.get("confidence_score").and_then(Value::as_i64),
        Some(1..=100)
    )
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

/// Convert a validated object into a trend
fn to_trend(
    obj: &serde_json::Map<String, Value>,
    focus_area: &str,
    timestamp: &str,
) -> Option<Trend> {
    let text = |field: &str| obj.get(field).and_then(Value::as_str).map(str::to_string);

    Some(Trend {
        focus_area: focus_area.to_string(),
        tool_name: text("tool_name")?,
        classification: obj
            .get("classification")
            .and_then(Value::as_str)
            .and_then(Classification::parse)?,
        confidence_score: obj
            .get("confidence_score")
            .and_then(Value::as_i64)
            .and_then(|score| u8::try_from(score).ok())?,
        technical_insight: text("technical_insight")?,
        signal_evidence: string_list(obj.get("signal_evidence")),
        noise_indicators: string_list(obj.get("noise_indicators")),
        architectural_verdict: obj.get("architectural_verdict").and_then(Value::as_bool)?,
        timestamp: timestamp.to_string(),
    })
}

/// Parse a model reply into trends for one focus area
///
/// Invalid entries are skipped with a warning. A reply with no JSON array,
/// or with malformed JSON, is an error.
pub fn parse_trends(
    content: &str,
    focus_area: &str,
    timestamp: &str,
) -> Result<Vec<Trend>, AnalysisError> {
    let json = extract_json_array(content).ok_or(AnalysisError::NoJsonArray)?;
    let items: Vec<Value> = serde_json::from_str(json)?;

    let mut trends = Vec::with_capacity(items.len());
    for item in &items {
        let trend = item
            .as_object()
            .filter(|_| validate_trend(item))
            .and_then(|obj| to_trend(obj, focus_area, timestamp));

        match trend {
            Some(trend) => trends.push(trend),
            None => {
                let tool_name = item
                    .get("tool_name")
                    .and_then(Value::as_str)
                    .unwrap_or("unknown");
                warn!(focus_area, tool_name, "Invalid trend skipped");
            }
        }
    }

    Ok(trends)
}
