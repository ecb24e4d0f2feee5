use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Topic {
    Rainfall,
    WaterLevel,
    Forecast,
    FloodRisk,
    AffectedRivers,
}

impl Topic {
    pub fn as_code(self) -> &'static str {
        match self {
            Self::Rainfall => "rainfall",
            Self::WaterLevel => "water_level",
            Self::Forecast => "forecast",
            Self::FloodRisk => "flood_risk",
            Self::AffectedRivers => "affected_rivers",
        }
    }
}

/// Body of `POST /api/briefing`. `q` stays optional so that a missing field
/// reaches the classifier instead of failing deserialization.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct BriefingRequest {
    #[serde(default, deserialize_with = "lenient_text")]
    pub q: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BriefingReply {
    pub ok: bool,
    pub reply: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocalBriefingReply {
    pub reply: String,
    pub source: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StationObservation {
    #[serde(default)]
    pub name: Option<String>,
    /// Kept as received (number or numeric string) so `142.0` renders as
    /// `142.0` rather than `142`.
    #[serde(default = "zero_reading")]
    pub level: Value,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub address: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RainfallObservation {
    pub station: String,
    #[serde(default = "zero_reading")]
    pub rainfall_24h: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RiskAlert {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub level: Option<String>,
    #[serde(default)]
    pub description: String,
}

/// Observation data a generated briefing is rendered from. Every section is
/// optional; empty sections fall back to the standing template text.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct BriefingInput {
    #[serde(default)]
    pub water_stations: Vec<StationObservation>,
    #[serde(default)]
    pub rainfall: Vec<RainfallObservation>,
    #[serde(default)]
    pub alerts: Vec<RiskAlert>,
    #[serde(default)]
    pub weather_info: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratedBriefing {
    pub ok: bool,
    pub issued_at: String,
    pub markdown: String,
}

/// Renders a numeric reading the way it arrived: numbers keep their JSON
/// spelling, strings are written without quotes and `null` counts as zero.
pub fn render_reading(value: &Value) -> String {
    match value {
        Value::Null => "0".to_string(),
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn zero_reading() -> Value {
    Value::from(0)
}

// Form bodies always carry strings, but JSON callers sometimes send `q: 42`.
// Falsy scalars (`false`, `0`) count as a missing question.
fn lenient_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) | Some(Value::Bool(false)) => Ok(None),
        Some(Value::Number(number)) if number.as_f64() == Some(0.0) => Ok(None),
        Some(Value::String(text)) => Ok(Some(text)),
        Some(Value::Number(number)) => Ok(Some(number.to_string())),
        Some(Value::Bool(flag)) => Ok(Some(flag.to_string())),
        Some(other) => Err(D::Error::custom(format!(
            "field `q` must be a string, got {}",
            value_kind(&other)
        ))),
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
        _ => "a scalar",
    }
}
