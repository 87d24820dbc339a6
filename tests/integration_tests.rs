// Integration tests for Intergen Match

use actix_web::{http::StatusCode, test, web, App};
use async_trait::async_trait;
use intergen_match::config::MatchingSettings;
use intergen_match::core::Matcher;
use intergen_match::models::{CandidateQuery, Category, ItemRow, Profile, Role};
use intergen_match::routes::{self, AppState};
use intergen_match::services::{
    InMemoryStore, ProfileStore, SessionVerifier, SnapshotLoader, StoreError,
};
use jsonwebtoken::{encode, EncodingKey, Header};
use serde_json::{json, Value};
use std::sync::Arc;

const JWT_SECRET: &str = "test-jwt-secret";

fn create_test_profile(id: &str, role: Role) -> Profile {
    Profile {
        id: format!("p-{}", id),
        user_id: format!("u-{}", id),
        display_name: format!("User {}", id),
        age: if role == Role::Senior { 72 } else { 24 },
        role,
        bio: None,
        created_at: None,
        updated_at: None,
    }
}

/// One youth viewer, four seniors and a second youth
fn create_test_store() -> InMemoryStore {
    InMemoryStore::new()
        .with_profile(create_test_profile("y1", Role::Youth), &["smartphone"], &["cooking"])
        .with_profile(create_test_profile("s1", Role::Senior), &["cooking"], &["smartphone"])
        .with_profile(create_test_profile("s2", Role::Senior), &["gardening"], &["smartphone"])
        .with_profile(create_test_profile("s3", Role::Senior), &["cooking"], &[])
        .with_profile(create_test_profile("s4", Role::Senior), &[], &[])
        .with_profile(create_test_profile("y2", Role::Youth), &["smartphone"], &["cooking"])
}

/// Store whose offering rows are unavailable for one profile
struct FailingOfferings {
    inner: InMemoryStore,
    broken_profile_id: &'static str,
}

#[async_trait]
impl ProfileStore for FailingOfferings {
    async fn profile_for_user(&self, user_id: &str) -> Result<Profile, StoreError> {
        self.inner.profile_for_user(user_id).await
    }

    async fn candidate_profiles(&self, query: &CandidateQuery) -> Result<Vec<Profile>, StoreError> {
        self.inner.candidate_profiles(query).await
    }

    async fn offerings(&self, profile_id: &str) -> Result<Vec<ItemRow>, StoreError> {
        if profile_id == self.broken_profile_id {
            return Err(StoreError::ApiError("Request failed: 503 Service Unavailable".to_string()));
        }
        self.inner.offerings(profile_id).await
    }

    async fn wants(&self, profile_id: &str) -> Result<Vec<ItemRow>, StoreError> {
        self.inner.wants(profile_id).await
    }

    async fn categories(&self) -> Result<Vec<Category>, StoreError> {
        self.inner.categories().await
    }
}

fn create_state(session: Option<SessionVerifier>) -> AppState {
    create_state_with_store(Arc::new(create_test_store()), session)
}

fn create_state_with_store(store: Arc<dyn ProfileStore>, session: Option<SessionVerifier>) -> AppState {
    AppState {
        snapshots: SnapshotLoader::new(store, None, 4),
        session,
        matcher: Matcher::default(),
        matching: MatchingSettings::default(),
    }
}

macro_rules! init_app {
    ($state:expr) => {
        test::init_service(
            App::new()
                .app_data(web::Data::new($state))
                .configure(routes::configure_extractors)
                .configure(routes::configure_routes),
        )
        .await
    };
}

fn match_ids(body: &Value) -> Vec<String> {
    body["matches"]
        .as_array()
        .map(|matches| {
            matches
                .iter()
                .filter_map(|m| m["profileId"].as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn session_token(sub: &str) -> String {
    let claims = json!({
        "sub": sub,
        "exp": chrono::Utc::now().timestamp() + 3600,
    });
    encode(&Header::default(), &claims, &EncodingKey::from_secret(JWT_SECRET.as_bytes())).unwrap()
}

#[actix_web::test]
async fn test_find_matches_ranks_opposite_role() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "userId": "u-y1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // Ties keep retrieval order; the other youth never appears
    assert_eq!(match_ids(&body), vec!["p-s1", "p-s2", "p-s3", "p-s4"]);
    assert_eq!(body["totalCandidates"], 4);
    assert_eq!(body["mode"], "exchange");

    let scores: Vec<u64> = body["matches"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["matchScore"].as_u64().unwrap())
        .collect();
    assert_eq!(scores, vec![100, 50, 50, 0]);

    let first = &body["matches"][0];
    assert_eq!(first["canShare"], json!(["cooking"]));
    assert_eq!(first["wantsToLearn"], json!(["smartphone"]));
    assert_eq!(first["role"], "senior");
}

#[actix_web::test]
async fn test_find_matches_modes() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "userId": "u-y1", "mode": "learn" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(match_ids(&body), vec!["p-s1", "p-s3"]);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "userId": "u-y1", "type": "share" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;
    assert_eq!(match_ids(&body), vec!["p-s1", "p-s2"]);
    assert_eq!(body["mode"], "share");
}

#[actix_web::test]
async fn test_find_matches_limit_and_exclusions() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({
            "userId": "u-y1",
            "limit": 2,
            "excludeProfileIds": ["p-s1"]
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(match_ids(&body), vec!["p-s2", "p-s3"]);
}

#[actix_web::test]
async fn test_find_matches_for_senior_viewer() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "userId": "u-s1" }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    // Both youths cover the senior fully
    assert_eq!(match_ids(&body), vec!["p-y1", "p-y2"]);
    assert_eq!(body["matches"][0]["matchScore"], 100);
    assert_eq!(body["matches"][1]["matchScore"], 100);
}

#[actix_web::test]
async fn test_unknown_user_gets_generic_not_found() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "userId": "nobody" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "An error occurred");
    assert!(!body.to_string().contains("nobody"));
}

#[actix_web::test]
async fn test_missing_user_id_is_rejected() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "mode": "exchange" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_blank_user_id_is_rejected_without_session() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "userId": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_candidate_load_failure_is_generic_server_error() {
    let store = FailingOfferings {
        inner: create_test_store(),
        broken_profile_id: "p-s3",
    };
    let app = init_app!(create_state_with_store(Arc::new(store), None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "userId": "u-y1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["message"], "An error occurred");
    assert!(!body.to_string().contains("503"));
}

#[actix_web::test]
async fn test_invalid_json_is_rejected() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(("content-type", "application/json"))
        .set_payload("{not json")
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(body["error"], "invalid_json");
}

#[actix_web::test]
async fn test_session_is_required_when_configured() {
    let app = init_app!(create_state(Some(SessionVerifier::new(JWT_SECRET, None))));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .set_json(json!({ "userId": "u-y1" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(("Authorization", "Bearer not-a-token"))
        .set_json(json!({}))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
}

#[actix_web::test]
async fn test_session_identifies_viewer() {
    let app = init_app!(create_state(Some(SessionVerifier::new(JWT_SECRET, None))));

    // The body userId is ignored once a session is present
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(("Authorization", format!("Bearer {}", session_token("u-y1"))))
        .set_json(json!({ "userId": "u-s1", "mode": "learn" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);

    let body: Value = test::read_body_json(resp).await;
    assert_eq!(match_ids(&body), vec!["p-s1", "p-s3"]);

    // A blank body userId is irrelevant when the token names the viewer
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/find")
        .insert_header(("Authorization", format!("Bearer {}", session_token("u-y1"))))
        .set_json(json!({ "userId": "" }))
        .to_request();
    let resp = test::call_service(&app, req).await;
    assert_eq!(resp.status(), StatusCode::OK);
}

#[actix_web::test]
async fn test_score_endpoint() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::post()
        .uri("/api/v1/matches/score")
        .set_json(json!({
            "viewer": {
                "profile": {"id": "v", "user_id": "uv", "full_name": "Viewer", "age": 24, "user_type": "youth"},
                "offerings": [{"label": "smartphone"}],
                "wants": [{"label": "cooking"}]
            },
            "candidate": {
                "profile": {"id": "c", "user_id": "uc", "full_name": "Candidate", "age": 70, "user_type": "senior"},
                "offerings": [{"label": "cooking"}, {"label": "gardening"}],
                "wants": [{"label": "smartphone"}, {"label": "youtube"}, {"label": "banking"}]
            }
        }))
        .to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["score"], 100);
    assert_eq!(body["hits"], 2);
    assert_eq!(body["denominator"], 2);
}

#[actix_web::test]
async fn test_score_endpoint_rejects_same_profile() {
    let app = init_app!(create_state(None));

    let profile = json!({"id": "v", "user_id": "uv", "full_name": "Viewer", "age": 24, "user_type": "youth"});
    let req = test::TestRequest::post()
        .uri("/api/v1/matches/score")
        .set_json(json!({
            "viewer": {"profile": profile.clone()},
            "candidate": {"profile": profile}
        }))
        .to_request();
    let resp = test::call_service(&app, req).await;

    assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
}

#[actix_web::test]
async fn test_health_endpoint() {
    let app = init_app!(create_state(None));

    let req = test::TestRequest::get().uri("/api/v1/health").to_request();
    let body: Value = test::call_and_read_body_json(&app, req).await;

    assert_eq!(body["status"], "healthy");
}
