use crate::core::scoring::MatchBreakdown;
use crate::models::{CandidateQuery, MatchMode, Profile};

/// Check if a profile satisfies the candidate retrieval policy
///
/// This is Stage 1 of the pipeline: it never looks at offerings or wants.
#[inline]
pub fn matches_query_constraints(profile: &Profile, query: &CandidateQuery) -> bool {
    // Check excluded profiles (the viewer is always among them)
    if query.exclude_profile_ids.contains(&profile.id) {
        return false;
    }

    // Check role restriction
    if let Some(role) = query.role {
        if profile.role != role {
            return false;
        }
    }

    true
}

/// Check if `candidate` may be shown to `viewer` at all
#[inline]
pub fn is_eligible_candidate(viewer: &Profile, candidate: &Profile, query: &CandidateQuery) -> bool {
    // One profile per user, but guard against a stale duplicate row too
    if candidate.id == viewer.id || candidate.user_id == viewer.user_id {
        return false;
    }

    matches_query_constraints(candidate, query)
}

/// Check if a scored candidate belongs in the requested direction of the exchange
///
/// This is Stage 3: the mode filters, it never changes the score.
#[inline]
pub fn matches_mode(breakdown: &MatchBreakdown, mode: MatchMode) -> bool {
    match mode {
        MatchMode::Exchange => true,
        MatchMode::Learn => !breakdown.can_share.is_empty(),
        MatchMode::Share => !breakdown.wants_to_learn.is_empty(),
    }
}
