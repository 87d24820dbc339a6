use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};
use crate::models::domain::{MatchMode, ProfileSnapshot};

/// Request to find exchange partners
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct FindMatchesRequest {
    /// Ignored when the viewer is identified by a session token
    #[serde(alias = "user_id", rename = "userId", default)]
    pub user_id: Option<String>,
    #[serde(default, alias = "type")]
    pub mode: MatchMode,
    #[validate(range(min = 1))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default)]
    #[serde(alias = "exclude_profile_ids", rename = "excludeProfileIds")]
    pub exclude_profile_ids: Vec<String>,
}

/// Request to score one candidate against one viewer, without any lookups
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_distinct_profiles"))]
pub struct ScoreRequest {
    #[validate(nested)]
    pub viewer: ProfileSnapshot,
    #[validate(nested)]
    pub candidate: ProfileSnapshot,
}

fn validate_distinct_profiles(request: &ScoreRequest) -> Result<(), ValidationError> {
    if request.viewer.id() == request.candidate.id() {
        let mut error = ValidationError::new("same_profile");
        error.message = Some("viewer and candidate must be different profiles".into());
        return Err(error);
    }
    Ok(())
}
