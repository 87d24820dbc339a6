use async_trait::async_trait;
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use std::time::Duration;
use crate::models::{CandidateQuery, Category, ItemRow, Profile};
use crate::services::store::{ProfileStore, StoreError};

const ITEM_COLUMNS: &str = "id,profile_id,category_id,description";

/// Table names in the Supabase database
#[derive(Debug, Clone)]
pub struct SupabaseTables {
    pub profiles: String,
    pub offerings: String,
    pub wants: String,
    pub categories: String,
}

impl Default for SupabaseTables {
    fn default() -> Self {
        Self {
            profiles: "profiles".to_string(),
            offerings: "profile_assets".to_string(),
            wants: "profile_needs".to_string(),
            categories: "categories".to_string(),
        }
    }
}

/// Supabase (PostgREST) API client
///
/// Handles all reads from the hosted backend:
/// - Looking up the viewer's profile by user id
/// - Querying candidate profiles
/// - Fetching offering/want rows and the category table
pub struct SupabaseClient {
    base_url: String,
    api_key: String,
    client: Client,
    tables: SupabaseTables,
}

impl SupabaseClient {
    /// Create a new Supabase client
    pub fn new(
        base_url: String,
        api_key: String,
        timeout: Duration,
        tables: SupabaseTables,
    ) -> Result<Self, StoreError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            api_key,
            client,
            tables,
        })
    }

    fn table_url(&self, table: &str) -> String {
        format!("{}/rest/v1/{}", self.base_url.trim_end_matches('/'), table)
    }

    async fn get(&self, url: &str) -> Result<Response, StoreError> {
        tracing::debug!("Fetching from: {}", url);

        let response = self
            .client
            .get(url)
            .header("apikey", &self.api_key)
            .header("Authorization", format!("Bearer {}", self.api_key))
            .header("Accept", "application/json")
            .send()
            .await?;

        let status = response.status();
        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(StoreError::Unauthorized);
        }

        if !status.is_success() {
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            tracing::error!("Supabase request failed: {} - {}", status, body);
            return Err(StoreError::ApiError(format!("Request failed: {}", status)));
        }

        Ok(response)
    }

    async fn get_rows<T: DeserializeOwned>(&self, url: &str, what: &str) -> Result<Vec<T>, StoreError> {
        let response = self.get(url).await?;

        response
            .json::<Vec<T>>()
            .await
            .map_err(|e| StoreError::InvalidResponse(format!("Failed to parse {}: {}", what, e)))
    }

    async fn item_rows(&self, table: &str, profile_id: &str) -> Result<Vec<ItemRow>, StoreError> {
        let url = format!(
            "{}?select={}&profile_id=eq.{}",
            self.table_url(table),
            ITEM_COLUMNS,
            urlencoding::encode(profile_id)
        );

        self.get_rows(&url, table).await
    }
}

/// PostgREST filter value for `column=not.in.(...)`
fn not_in_filter(ids: &[String]) -> String {
    let quoted = ids
        .iter()
        .map(|id| format!("\"{}\"", id.replace('"', "")))
        .collect::<Vec<_>>()
        .join(",");
    format!("not.in.({})", quoted)
}

#[async_trait]
impl ProfileStore for SupabaseClient {
    async fn profile_for_user(&self, user_id: &str) -> Result<Profile, StoreError> {
        let url = format!(
            "{}?select=*&user_id=eq.{}&limit=1",
            self.table_url(&self.tables.profiles),
            urlencoding::encode(user_id)
        );

        tracing::debug!("Fetching profile for user: {}", user_id);

        let profiles: Vec<Profile> = self.get_rows(&url, "profile").await?;

        profiles
            .into_iter()
            .next()
            .ok_or_else(|| StoreError::NotFound(format!("Profile not found for user {}", user_id)))
    }

    async fn candidate_profiles(&self, query: &CandidateQuery) -> Result<Vec<Profile>, StoreError> {
        let mut url = format!(
            "{}?select=*&order=created_at.asc&limit={}",
            self.table_url(&self.tables.profiles),
            query.limit
        );

        if let Some(role) = query.role {
            url.push_str(&format!("&user_type=eq.{}", role));
        }

        if !query.exclude_profile_ids.is_empty() {
            url.push_str(&format!(
                "&id={}",
                urlencoding::encode(&not_in_filter(&query.exclude_profile_ids))
            ));
        }

        let profiles: Vec<Profile> = self.get_rows(&url, "candidates").await?;

        tracing::debug!("Queried {} candidates (limit: {})", profiles.len(), query.limit);

        Ok(profiles)
    }

    async fn offerings(&self, profile_id: &str) -> Result<Vec<ItemRow>, StoreError> {
        self.item_rows(&self.tables.offerings, profile_id).await
    }

    async fn wants(&self, profile_id: &str) -> Result<Vec<ItemRow>, StoreError> {
        self.item_rows(&self.tables.wants, profile_id).await
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        let url = format!(
            "{}?select=id,name&order=name.asc",
            self.table_url(&self.tables.categories)
        );

        self.get_rows(&url, "categories").await
    }

    async fn health_check(&self) -> Result<bool, StoreError> {
        let url = format!("{}/rest/v1/", self.base_url.trim_end_matches('/'));
        Ok(self.get(&url).await.is_ok())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_supabase_client_creation() {
        let client = SupabaseClient::new(
            "https://project.supabase.test/".to_string(),
            "test_key".to_string(),
            Duration::from_secs(5),
            SupabaseTables::default(),
        )
        .unwrap();

        assert_eq!(client.api_key, "test_key");
        assert_eq!(
            client.table_url("profiles"),
            "https://project.supabase.test/rest/v1/profiles"
        );
    }

    #[test]
    fn test_not_in_filter() {
        let ids = vec!["p1".to_string(), "p\"2".to_string()];
        assert_eq!(not_in_filter(&ids), r#"not.in.("p1","p2")"#);
    }
}
