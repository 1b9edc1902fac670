// Core data structures for the trend radar

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

/// Signal/noise classification of a trend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Classification {
    Signal,
    Noise,
}

impl Classification {
    /// Get string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Signal => "signal",
            Self::Noise => "noise",
        }
    }

    /// Create from string (exact, lowercase)
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "signal" => Some(Self::Signal),
            "noise" => Some(Self::Noise),
            _ => None,
        }
    }

    /// Get all classifications
    pub fn all() -> [Self; 2] {
        [Self::Signal, Self::Noise]
    }
}

impl std::fmt::Display for Classification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Raised when a stored classification is neither `signal` nor `noise`
#[derive(Debug, Error)]
#[error("Unknown classification: {0}")]
pub struct UnknownClassification(pub String);

/// Focus areas known to the analysis prompts
///
/// Records carry their focus area as an open string; this enum only names
/// the areas the radar ships profiles and default buckets for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FocusArea {
    VoiceAiUx,
    AgentOrchestration,
    DurableRuntime,
}

impl FocusArea {
    /// Get the wire identifier
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::VoiceAiUx => "voice_ai_ux",
            Self::AgentOrchestration => "agent_orchestration",
            Self::DurableRuntime => "durable_runtime",
        }
    }

    /// Human readable name
    pub fn display_name(&self) -> &'static str {
        match self {
            Self::VoiceAiUx => "Voice AI UX",
            Self::AgentOrchestration => "Agent Orchestration",
            Self::DurableRuntime => "Durable Runtime",
        }
    }

    /// Create from wire identifier
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "voice_ai_ux" => Some(Self::VoiceAiUx),
            "agent_orchestration" => Some(Self::AgentOrchestration),
            "durable_runtime" => Some(Self::DurableRuntime),
            _ => None,
        }
    }

    /// Get all focus areas in radar order
    pub fn all() -> Vec<Self> {
        vec![Self::VoiceAiUx, Self::AgentOrchestration, Self::DurableRuntime]
    }
}

impl std::fmt::Display for FocusArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Fully validated trend as stored and served by the API
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trend {
    pub focus_area: String,
    pub tool_name: String,
    pub classification: Classification,
    pub confidence_score: u8, // 1..=100
    pub technical_insight: String,
    #[serde(default)]
    pub signal_evidence: Vec<String>,
    #[serde(default)]
    pub noise_indicators: Vec<String>,
    pub architectural_verdict: bool,
    pub timestamp: String, // ISO 8601
}

/// A single trend observation as the view layer sees it
///
/// Only `focus_area` and `classification` are interpreted, and a key that is
/// not a string reads as absent. Every other field is opaque payload kept in
/// `extra` exactly as received, so a record survives a round trip untouched.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendRecord {
    #[serde(
        default,
        deserialize_with = "lenient_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub focus_area: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_key",
        skip_serializing_if = "Option::is_none"
    )]
    pub classification: Option<String>,

    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Accept any JSON value for a bucketing key; only strings are kept
fn lenient_key<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(Value::String(key)) => Some(key),
        _ => None,
    })
}

impl TrendRecord {
    /// Create a bare record with only the bucketing keys set
    pub fn keyed(focus_area: impl Into<String>, classification: impl Into<String>) -> Self {
        Self {
            focus_area: Some(focus_area.into()),
            classification: Some(classification.into()),
            ..Default::default()
        }
    }

    /// Set a payload field
    pub fn with_payload(mut self, field: impl Into<String>, value: impl Into<Value>) -> Self {
        self.extra.insert(field.into(), value.into());
        self
    }

    /// `(focus_area, classification)` if both are present
    pub fn bucket_key(&self) -> Option<(&str, &str)> {
        match (&self.focus_area, &self.classification) {
            (Some(area), Some(class)) => Some((area.as_str(), class.as_str())),
            _ => None,
        }
    }

    /// A record missing either bucketing key
    pub fn is_malformed(&self) -> bool {
        self.bucket_key().is_none()
    }

    /// Raw payload field
    pub fn payload(&self, field: &str) -> Option<&Value> {
        self.extra.get(field)
    }

    pub fn tool_name(&self) -> Option<&str> {
        self.payload("tool_name").and_then(Value::as_str)
    }

    /// Confidence score as a number, integral or not
    pub fn confidence_score(&self) -> Option<f64> {
        self.payload("confidence_score").and_then(Value::as_f64)
    }

    pub fn architectural_verdict(&self) -> Option<bool> {
        self.payload("architectural_verdict").and_then(Value::as_bool)
    }
}

impl From<Trend> for TrendRecord {
    fn from(trend: Trend) -> Self {
        let mut extra = Map::new();
        extra.insert("tool_name".to_string(), trend.tool_name.into());
        extra.insert("confidence_score".to_string(), trend.confidence_score.into());
        extra.insert("technical_insight".to_string(), trend.technical_insight.into());
        extra.insert("signal_evidence".to_string(), trend.signal_evidence.into());
        extra.insert("noise_indicators".to_string(), trend.noise_indicators.into());
        extra.insert(
            "architectural_verdict".to_string(),
            trend.architectural_verdict.into(),
        );
        extra.insert("timestamp".to_string(), trend.timestamp.into());

        Self {
            focus_area: Some(trend.focus_area),
            classification: Some(trend.classification.as_str().to_string()),
            extra,
        }
    }
}

/// The dataset a loader publishes
///
/// `trends: None` is distinct from an empty list: the former means "nothing
/// loaded yet" and suppresses partitioning.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrendDataset {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub radar_date: Option<String>,

    #[serde(default)]
    pub trends: Option<Vec<TrendRecord>>,
}

impl TrendDataset {
    /// Dataset built from stored trends for one radar date
    pub fn from_trends(radar_date: impl Into<String>, trends: Vec<Trend>) -> Self {
        Self {
            radar_date: Some(radar_date.into()),
            trends: Some(trends.into_iter().map(TrendRecord::from).collect()),
        }
    }

    /// Number of records, zero when `trends` is absent
    pub fn len(&self) -> usize {
        self.trends.as_ref().map_or(0, Vec::len)
    }

    /// True when there are no records (absent or empty)
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
