//! Typed shapes of the model's JSON replies.
//!
//! Routine plans stay raw JSON objects so they reach the client exactly as the
//! model wrote them; only progress reports are validated field by field.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use super::ModelError;

/// A routine as the model proposes it: any JSON object, kept verbatim
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoutinePlan(pub Map<String, Value>);

impl RoutinePlan {
    /// The `days` array; `None` when absent or not an array
    pub fn days(&self) -> Option<&Vec<Value>> {
        self.0.get("days").and_then(Value::as_array)
    }

    pub fn day_count(&self) -> usize {
        self.days().map_or(0, Vec::len)
    }

    pub fn name(&self) -> Option<&str> {
        self.0.get("name").and_then(Value::as_str)
    }
}

/// Reply to a chat turn
#[derive(Debug, Clone, Deserialize)]
pub struct ChatPayload {
    #[serde(default)]
    pub content: String,
    #[serde(default)]
    pub suggested_routine: Option<RoutinePlan>,
}

/// What the client receives for a chat turn
#[derive(Debug, Clone, Serialize)]
pub struct ChatReply {
    pub role: &'static str,
    pub content: String,
    pub routine: Option<RoutinePlan>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressStatus {
    Progressing,
    Stalled,
    Inconsistent,
}

/// Progress analysis produced by the model
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressReport {
    pub status: ProgressStatus,
    pub analysis: String,
    pub safety_warning: String,
    pub suggestion: String,
    #[serde(default)]
    pub recommended_changes: Vec<Value>,
    #[serde(default)]
    pub automatic_apply_available: bool,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Fixed answer when there is no training history to analyse
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InsufficientData {
    pub status: &'static str,
    pub analysis: &'static str,
    pub suggestion: &'static str,
}

impl Default for InsufficientData {
    fn default() -> Self {
        Self {
            status: "insufficient_data",
            analysis: "SISTEMA EN ESPERA: SIN DATOS DE SESIÓN DETECTADOS.",
            suggestion: "Tu núcleo de datos está vacío. Realiza al menos 5 sesiones de entrenamiento para que pueda calcular tus vectores de progresión.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ProgressOutcome {
    InsufficientData(InsufficientData),
    Report(ProgressReport),
}

/// Parse a completion as JSON of type `T`, tolerating markdown code fences
pub fn parse_reply<T: DeserializeOwned>(text: &str) -> Result<T, ModelError> {
    serde_json::from_str(strip_code_fences(text)).map_err(|e| ModelError::InvalidJson(e.to_string()))
}

fn strip_code_fences(s: &str) -> &str {
    let mut trimmed = s.trim();
    if let Some(stripped) = trimmed.strip_prefix("```json") {
        trimmed = stripped;
    } else if let Some(stripped) = trimmed.strip_prefix("```") {
        trimmed = stripped;
    }
    if let Some(stripped) = trimmed.strip_suffix("```") {
        trimmed = stripped;
    }
    trimmed.trim()
}
