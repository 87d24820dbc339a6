use serde::{Deserialize, Serialize};
use crate::models::domain::{CategoryLabel, MatchMode, ScoredMatch};

/// Response for find matches endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FindMatchesResponse {
    pub matches: Vec<ScoredMatch>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    pub mode: MatchMode,
}

/// Response for the pure scoring endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoreResponse {
    pub score: u32,
    pub hits: usize,
    pub denominator: usize,
    #[serde(rename = "canShare")]
    pub can_share: Vec<CategoryLabel>,
    #[serde(rename = "wantsToLearn")]
    pub wants_to_learn: Vec<CategoryLabel>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    /// Message shown to users for any failure in the data layer
    pub const GENERIC_MESSAGE: &'static str = "An error occurred";

    pub fn new(error: &str, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            status_code,
        }
    }

    pub fn generic(error: &str, status_code: u16) -> Self {
        Self::new(error, Self::GENERIC_MESSAGE, status_code)
    }
}
