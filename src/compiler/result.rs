use crate::error::{ValidationError, ValidationWarning};
use chrono::{DateTime, Utc};
use serde::Serialize;

/// Counts describing one compilation.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GenerationMetadata {
    pub strategy_name: String,
    pub node_count: usize,
    pub edge_count: usize,
    pub indicator_count: usize,
    pub condition_count: usize,
    pub action_count: usize,
    pub risk_count: usize,
    pub input_count: usize,
    pub line_count: usize,
    /// Wall-clock time of generation. Not part of `code`, which stays deterministic.
    pub generated_at: DateTime<Utc>,
}

/// What `Compiler::compile` hands back. Always well-formed: on failure `code`
/// holds the fallback script and `errors` says why.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GenerationResult {
    pub success: bool,
    pub code: String,
    pub errors: Vec<ValidationError>,
    pub warnings: Vec<ValidationWarning>,
    pub metadata: GenerationMetadata,
}

impl GenerationResult {
    pub fn error_messages(&self) -> Vec<String> {
        self.errors.iter().map(ToString::to_string).collect()
    }

    pub fn warning_messages(&self) -> Vec<String> {
        self.warnings.iter().map(ToString::to_string).collect()
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}
