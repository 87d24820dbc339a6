use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;
use validator::Validate;

/// Which side of the generation exchange a profile belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Youth,
    Senior,
}

impl Role {
    /// The role a profile of this role is usually paired with
    pub fn counterpart(self) -> Role {
        match self {
            Role::Youth => Role::Senior,
            Role::Senior => Role::Youth,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Youth => "youth",
            Role::Senior => "senior",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "youth" => Ok(Role::Youth),
            "senior" => Ok(Role::Senior),
            other => Err(format!("unknown role: {}", other)),
        }
    }
}

/// Registered participant, as stored in the `profiles` table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct Profile {
    #[validate(length(min = 1))]
    pub id: String,
    #[serde(alias = "userId")]
    pub user_id: String,
    #[validate(length(min = 1))]
    #[serde(rename = "full_name", alias = "fullName")]
    pub display_name: String,
    #[validate(range(min = 1))]
    pub age: u32,
    #[serde(rename = "user_type", alias = "role")]
    pub role: Role,
    #[serde(default)]
    pub bio: Option<String>,
    #[serde(default)]
    pub created_at: Option<chrono::DateTime<chrono::Utc>>,
    #[serde(default)]
    pub updated_at: Option<chrono::DateTime<chrono::Utc>>,
}

/// Comparable key used to detect overlap between offerings and wants
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CategoryLabel(String);

impl CategoryLabel {
    pub fn new(label: impl Into<String>) -> Self {
        Self(label.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for CategoryLabel {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for CategoryLabel {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl fmt::Display for CategoryLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A labelled item on a profile: something offered or something wanted
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExchangeItem {
    pub label: CategoryLabel,
    #[serde(default)]
    pub description: Option<String>,
}

impl ExchangeItem {
    pub fn new(label: impl Into<CategoryLabel>) -> Self {
        Self {
            label: label.into(),
            description: None,
        }
    }
}

/// Something a profile can teach or share (an "asset")
pub type Offering = ExchangeItem;

/// Something a profile wishes to learn (a "need")
pub type Want = ExchangeItem;

/// Fixed category lookup entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: Uuid,
    pub name: String,
}

/// Stored row of `profile_assets` / `profile_needs`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemRow {
    #[serde(default)]
    pub id: Option<String>,
    pub profile_id: String,
    #[serde(default)]
    pub category_id: Option<Uuid>,
    #[serde(default)]
    pub description: Option<String>,
}

/// A profile with its offerings and wants fully loaded
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Validate)]
pub struct ProfileSnapshot {
    #[validate(nested)]
    pub profile: Profile,
    #[serde(default, alias = "assets")]
    pub offerings: Vec<Offering>,
    #[serde(default, alias = "needs")]
    pub wants: Vec<Want>,
}

impl ProfileSnapshot {
    pub fn new(profile: Profile) -> Self {
        Self {
            profile,
            offerings: Vec::new(),
            wants: Vec::new(),
        }
    }

    pub fn id(&self) -> &str {
        &self.profile.id
    }
}

/// Which direction of the exchange the viewer is looking at
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchMode {
    /// Every eligible candidate, ranked by score
    #[default]
    Exchange,
    /// Candidates who offer something the viewer wants
    Learn,
    /// Candidates who want something the viewer offers
    Share,
}

/// Scored match result
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScoredMatch {
    #[serde(rename = "profileId")]
    pub profile_id: String,
    #[serde(rename = "userId")]
    pub user_id: String,
    pub name: String,
    pub age: u32,
    pub role: Role,
    pub bio: Option<String>,
    #[serde(rename = "matchScore")]
    pub match_score: u32,
    #[serde(rename = "canShare")]
    pub can_share: Vec<CategoryLabel>,
    #[serde(rename = "wantsToLearn")]
    pub wants_to_learn: Vec<CategoryLabel>,
    pub offerings: Vec<Offering>,
    pub wants: Vec<Want>,
}

/// Candidate retrieval policy
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandidateQuery {
    pub role: Option<Role>,
    pub exclude_profile_ids: Vec<String>,
    pub limit: usize,
}

impl CandidateQuery {
    /// Build the query for a viewer; the viewer is always excluded
    pub fn for_viewer(
        viewer: &Profile,
        opposite_role_only: bool,
        exclude_profile_ids: &[String],
        limit: usize,
    ) -> Self {
        let mut exclude = vec![viewer.id.clone()];
        for id in exclude_profile_ids {
            if !exclude.contains(id) {
                exclude.push(id.clone());
            }
        }

        Self {
            role: opposite_role_only.then(|| viewer.role.counterpart()),
            exclude_profile_ids: exclude,
            limit,
        }
    }
}

/// How category labels are compared
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LabelMatching {
    /// Byte equality, case-sensitive as stored
    #[default]
    Exact,
    /// Trimmed, whitespace-collapsed, lowercased comparison
    Normalized,
}

/// Scoring behaviour
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ScoringPolicy {
    pub label_matching: LabelMatching,
    /// Cap scores at 100 when hits exceed the viewer's item count
    pub clamp_to_100: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn profile(id: &str, role: Role) -> Profile {
        Profile {
            id: id.to_string(),
            user_id: format!("user-{}", id),
            display_name: "Kim".to_string(),
            age: 30,
            role,
            bio: None,
            created_at: None,
            updated_at: None,
        }
    }

    #[test]
    fn test_role_counterpart() {
        assert_eq!(Role::Youth.counterpart(), Role::Senior);
        assert_eq!(Role::Senior.counterpart(), Role::Youth);
        assert_eq!("Senior".parse::<Role>(), Ok(Role::Senior));
        assert!("adult".parse::<Role>().is_err());
    }

    #[test]
    fn test_profile_uses_store_column_names() {
        let json = serde_json::json!({
            "id": "p1",
            "user_id": "u1",
            "full_name": "김영희",
            "age": 62,
            "user_type": "senior",
            "bio": null
        });

        let parsed: Profile = serde_json::from_value(json).unwrap();
        assert_eq!(parsed.display_name, "김영희");
        assert_eq!(parsed.role, Role::Senior);
        assert!(parsed.bio.is_none());
    }

    #[test]
    fn test_snapshot_missing_lists_are_empty() {
        let json = serde_json::json!({
            "profile": {
                "id": "p1",
                "user_id": "u1",
                "full_name": "Lee",
                "age": 25,
                "user_type": "youth"
            }
        });

        let snapshot: ProfileSnapshot = serde_json::from_value(json).unwrap();
        assert!(snapshot.offerings.is_empty());
        assert!(snapshot.wants.is_empty());
    }

    #[test]
    fn test_candidate_query_excludes_viewer() {
        let viewer = profile("p1", Role::Youth);
        let query = CandidateQuery::for_viewer(
            &viewer,
            true,
            &["p2".to_string(), "p1".to_string()],
            50,
        );

        assert_eq!(query.role, Some(Role::Senior));
        assert_eq!(query.exclude_profile_ids, vec!["p1", "p2"]);

        let open = CandidateQuery::for_viewer(&viewer, false, &[], 50);
        assert_eq!(open.role, None);
    }
}
