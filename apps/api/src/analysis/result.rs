use serde::{Deserialize, Serialize};

/// The model's binary hiring verdict.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Yes,
    No,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Yes => "yes",
            Recommendation::No => "no",
        }
    }

    /// Case-insensitive match on "yes" / "no".
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "yes" => Some(Recommendation::Yes),
            "no" => Some(Recommendation::No),
            _ => None,
        }
    }
}

/// Validated evaluation of one candidate. Stored as the job's `result` column.
///
/// Contact fields are `None` when the model reported them as not found.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub hire_recommendation: Recommendation,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub match_reason: Option<String>,
    pub highlights: Vec<String>,
    pub risks: Vec<String>,
}
