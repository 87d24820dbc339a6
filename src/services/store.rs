use async_trait::async_trait;
use std::collections::HashMap;
use thiserror::Error;
use crate::core::filters::matches_query_constraints;
use crate::models::{CandidateQuery, Category, ItemRow, Profile};

/// Errors that can occur when reading from the profile store
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: invalid API key or token")]
    Unauthorized,

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// Read-only access to profiles and their offering/want rows
///
/// Implemented by [`crate::services::SupabaseClient`] in production and by
/// [`InMemoryStore`] for tests and local runs.
#[async_trait]
pub trait ProfileStore: Send + Sync {
    /// The profile owned by an authenticated user
    async fn profile_for_user(&self, user_id: &str) -> Result<Profile, StoreError>;

    /// Candidate profiles in retrieval order, at most `query.limit` of them
    async fn candidate_profiles(&self, query: &CandidateQuery) -> Result<Vec<Profile>, StoreError>;

    /// Rows of `profile_assets` for a profile
    async fn offerings(&self, profile_id: &str) -> Result<Vec<ItemRow>, StoreError>;

    /// Rows of `profile_needs` for a profile
    async fn wants(&self, profile_id: &str) -> Result<Vec<ItemRow>, StoreError>;

    /// The fixed category lookup table
    async fn categories(&self) -> Result<Vec<Category>, StoreError>;

    async fn health_check(&self) -> Result<bool, StoreError> {
        Ok(true)
    }
}

/// Profile store held entirely in memory
///
/// Candidates are returned in insertion order.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    profiles: Vec<Profile>,
    offerings: HashMap<String, Vec<ItemRow>>,
    wants: HashMap<String, Vec<ItemRow>>,
    categories: Vec<Category>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_categories(mut self, categories: Vec<Category>) -> Self {
        self.categories = categories;
        self
    }

    /// Add a profile with free-text offerings and wants
    pub fn with_profile(mut self, profile: Profile, offerings: &[&str], wants: &[&str]) -> Self {
        let rows = |labels: &[&str]| -> Vec<ItemRow> {
            labels
                .iter()
                .enumerate()
                .map(|(i, label)| ItemRow {
                    id: Some(format!("{}-{}", profile.id, i)),
                    profile_id: profile.id.clone(),
                    category_id: None,
                    description: Some(label.to_string()),
                })
                .collect()
        };

        self.offerings.insert(profile.id.clone(), rows(offerings));
        self.wants.insert(profile.id.clone(), rows(wants));
        self.profiles.push(profile);
        self
    }

    /// Add a profile with pre-built rows
    pub fn with_rows(mut self, profile: Profile, offerings: Vec<ItemRow>, wants: Vec<ItemRow>) -> Self {
        self.offerings.insert(profile.id.clone(), offerings);
        self.wants.insert(profile.id.clone(), wants);
        self.profiles.push(profile);
        self
    }
}

#[async_trait]
impl ProfileStore for InMemoryStore {
    async fn profile_for_user(&self, user_id: &str) -> Result<Profile, StoreError> {
        self.profiles
            .iter()
            .find(|p| p.user_id == user_id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", user_id)))
    }

    async fn candidate_profiles(&self, query: &CandidateQuery) -> Result<Vec<Profile>, StoreError> {
        Ok(self
            .profiles
            .iter()
            .filter(|p| matches_query_constraints(p, query))
            .take(query.limit)
            .cloned()
            .collect())
    }

    async fn offerings(&self, profile_id: &str) -> Result<Vec<ItemRow>, StoreError> {
        Ok(self.offerings.get(profile_id).cloned().unwrap_or_default())
    }

    async fn wants(&self, profile_id: &str) -> Result<Vec<ItemRow>, StoreError> {
        Ok(self.wants.get(profile_id).cloned().unwrap_or_default())
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        Ok(self.categories.clone())
    }
}
