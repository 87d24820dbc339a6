use actix_web::{http::header, web, HttpRequest, HttpResponse, Responder};
use validator::Validate;
use crate::config::MatchingSettings;
use crate::core::Matcher;
use crate::models::{
    CandidateQuery, ErrorResponse, FindMatchesRequest, FindMatchesResponse, HealthResponse,
    ScoreRequest, ScoreResponse,
};
use crate::services::{SessionVerifier, SnapshotLoader, StoreError};

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub snapshots: SnapshotLoader,
    pub session: Option<SessionVerifier>,
    pub matcher: Matcher,
    pub matching: MatchingSettings,
}

/// Configure all match-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/matches/find", web::post().to(find_matches))
        .route("/matches/score", web::post().to(score_pair));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    let store_healthy = state
        .snapshots
        .store()
        .health_check()
        .await
        .unwrap_or(false);

    let status = if store_healthy { "healthy" } else { "degraded" };

    HttpResponse::Ok().json(HealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: chrono::Utc::now(),
    })
}

/// Work out who is asking: the session token when verification is
/// configured, otherwise the `userId` in the body
fn viewer_identity(
    state: &AppState,
    req: &FindMatchesRequest,
    http_req: &HttpRequest,
) -> Result<String, HttpResponse> {
    match &state.session {
        Some(verifier) => {
            let header = http_req
                .headers()
                .get(header::AUTHORIZATION)
                .and_then(|value| value.to_str().ok());

            verifier
                .verify_header(header)
                .map(|claims| claims.sub)
                .map_err(|e| {
                    tracing::info!("Rejected session on {}: {}", http_req.path(), e);
                    HttpResponse::Unauthorized().json(ErrorResponse::new(
                        "unauthorized",
                        "A valid session is required",
                        401,
                    ))
                })
        }
        None => req.user_id.clone().filter(|id| !id.trim().is_empty()).ok_or_else(|| {
            HttpResponse::BadRequest().json(ErrorResponse::new(
                "Validation failed",
                "userId is required",
                400,
            ))
        }),
    }
}

fn store_failure(context: &str, user_id: &str, e: &StoreError) -> HttpResponse {
    if e.is_not_found() {
        tracing::info!("{} for {}: {}", context, user_id, e);
        return HttpResponse::NotFound().json(ErrorResponse::generic("not_found", 404));
    }

    tracing::error!("{} for {}: {}", context, user_id, e);
    HttpResponse::InternalServerError().json(ErrorResponse::generic("internal_error", 500))
}

/// Find matches endpoint
///
/// POST /api/v1/matches/find
///
/// Request body:
/// ```json
/// {
///   "userId": "string",
///   "mode": "exchange|learn|share",
///   "limit": 20,
///   "excludeProfileIds": ["string"]
/// }
/// ```
async fn find_matches(
    state: web::Data<AppState>,
    req: web::Json<FindMatchesRequest>,
    http_req: HttpRequest,
) -> impl Responder {
    // Validate request
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for find_matches request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let user_id = match viewer_identity(&state, &req, &http_req) {
        Ok(id) => id,
        Err(response) => return response,
    };

    let limit = state.matching.effective_limit(req.limit);

    tracing::info!("Finding matches for user: {}, mode: {:?}, limit: {}", user_id, req.mode, limit);

    // Fetch the viewer's profile
    let viewer_profile = match state.snapshots.store().profile_for_user(&user_id).await {
        Ok(profile) => profile,
        Err(e) => return store_failure("Failed to fetch profile", &user_id, &e),
    };

    let catalog = match state.snapshots.catalog().await {
        Ok(catalog) => catalog,
        Err(e) => return store_failure("Failed to fetch categories", &user_id, &e),
    };

    let viewer = match state.snapshots.load(viewer_profile, &catalog).await {
        Ok(snapshot) => snapshot,
        Err(e) => return store_failure("Failed to load viewer snapshot", &user_id, &e),
    };

    // Query candidates from the store
    let pool_query = CandidateQuery::for_viewer(
        &viewer.profile,
        state.matching.opposite_role_only,
        &req.exclude_profile_ids,
        state.matching.candidate_pool_size,
    );

    let candidate_profiles = match state.snapshots.store().candidate_profiles(&pool_query).await {
        Ok(candidates) => candidates,
        Err(e) => return store_failure("Failed to query candidates", &user_id, &e),
    };

    tracing::debug!("Found {} candidates for {}", candidate_profiles.len(), user_id);

    // Every snapshot is materialised before scoring starts
    let candidates = match state.snapshots.load_many(candidate_profiles, &catalog).await {
        Ok(candidates) => candidates,
        Err(e) => return store_failure("Failed to load candidate snapshots", &user_id, &e),
    };

    // Run matching algorithm
    let query = CandidateQuery {
        limit,
        ..pool_query
    };
    let result = state.matcher.find_matches(&viewer, candidates, &query, req.mode);

    let response = FindMatchesResponse {
        matches: result.matches,
        total_candidates: result.total_candidates,
        mode: req.mode,
    };

    tracing::info!(
        "Returning {} matches for user {} (from {} candidates)",
        response.matches.len(),
        user_id,
        result.total_candidates
    );

    HttpResponse::Ok().json(response)
}

/// Score a single pair without touching the store
///
/// POST /api/v1/matches/score
///
/// Request body:
/// ```json
/// {
///   "viewer": {"profile": {...}, "offerings": [...], "wants": [...]},
///   "candidate": {"profile": {...}, "offerings": [...], "wants": [...]}
/// }
/// ```
async fn score_pair(
    state: web::Data<AppState>,
    req: web::Json<ScoreRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for score request: field_errors={:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let breakdown = state.matcher.score(&req.viewer, &req.candidate);

    HttpResponse::Ok().json(ScoreResponse {
        score: breakdown.score,
        hits: breakdown.hits,
        denominator: breakdown.denominator,
        can_share: breakdown.can_share,
        wants_to_learn: breakdown.wants_to_learn,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_check_response() {
        let response = HealthResponse {
            status: "healthy".to_string(),
            version: "0.1.0".to_string(),
            timestamp: chrono::Utc::now(),
        };

        assert_eq!(response.status, "healthy");
    }

    #[test]
    fn test_not_found_is_generic() {
        let response = store_failure("Failed", "u1", &StoreError::NotFound("secret detail".into()));
        assert_eq!(response.status(), actix_web::http::StatusCode::NOT_FOUND);

        let response = store_failure("Failed", "u1", &StoreError::ApiError("boom".into()));
        assert_eq!(response.status(), actix_web::http::StatusCode::INTERNAL_SERVER_ERROR);
    }
}
