use crate::models::{CandidateQuery, MatchMode, ProfileSnapshot, ScoredMatch, ScoringPolicy};
use crate::core::{
    filters::{is_eligible_candidate, matches_mode},
    scoring::{rank_by_score, score_breakdown, MatchBreakdown},
};

/// Result of the matching process
#[derive(Debug)]
pub struct MatchResult {
    pub matches: Vec<ScoredMatch>,
    pub total_candidates: usize,
}

/// Main matching orchestrator
///
/// # Pipeline Stages
/// 1. Eligibility (self, exclusions, role)
/// 2. Scoring, each candidate independently
/// 3. Match direction filter
/// 4. Stable ranking and truncation
#[derive(Debug, Clone, Copy, Default)]
pub struct Matcher {
    policy: ScoringPolicy,
}

impl Matcher {
    pub fn new(policy: ScoringPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> ScoringPolicy {
        self.policy
    }

    /// Score one candidate with the configured policy
    pub fn score(&self, viewer: &ProfileSnapshot, candidate: &ProfileSnapshot) -> MatchBreakdown {
        let mut breakdown = score_breakdown(viewer, candidate, &self.policy.label_matching);
        if self.policy.clamp_to_100 {
            breakdown.score = breakdown.clamped_score();
        }
        breakdown
    }

    /// Find exchange partners for a viewer
    ///
    /// `candidates` must be fully loaded snapshots in retrieval order; ties in
    /// score keep that order.
    pub fn find_matches(
        &self,
        viewer: &ProfileSnapshot,
        candidates: Vec<ProfileSnapshot>,
        query: &CandidateQuery,
        mode: MatchMode,
    ) -> MatchResult {
        let total_candidates = candidates.len();

        let scored: Vec<(ScoredMatch, u32)> = candidates
            .into_iter()
            // Stage 1: Eligibility
            .filter(|candidate| is_eligible_candidate(&viewer.profile, &candidate.profile, query))
            // Stage 2 & 3: Score, then keep the requested direction
            .filter_map(|candidate| {
                let breakdown = self.score(viewer, &candidate);
                if !matches_mode(&breakdown, mode) {
                    return None;
                }
                let score = breakdown.score;
                Some((to_scored_match(candidate, breakdown), score))
            })
            .collect();

        // Stage 4: Rank and limit
        let mut matches: Vec<ScoredMatch> = rank_by_score(scored)
            .into_iter()
            .map(|(scored_match, _)| scored_match)
            .collect();
        matches.truncate(query.limit);

        MatchResult {
            matches,
            total_candidates,
        }
    }
}

fn to_scored_match(candidate: ProfileSnapshot, breakdown: MatchBreakdown) -> ScoredMatch {
    let ProfileSnapshot {
        profile,
        offerings,
        wants,
    } = candidate;

    ScoredMatch {
        profile_id: profile.id,
        user_id: profile.user_id,
        name: profile.display_name,
        age: profile.age,
        role: profile.role,
        bio: profile.bio,
        match_score: breakdown.score,
        can_share: breakdown.can_share,
        wants_to_learn: breakdown.wants_to_learn,
        offerings,
        wants,
    }
}
