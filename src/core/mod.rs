// Core algorithm exports
pub mod filters;
pub mod labels;
pub mod matcher;
pub mod scoring;

pub use filters::{is_eligible_candidate, matches_mode, matches_query_constraints};
pub use labels::{CategoryCatalog, ExactLabels, LabelMatcher, NormalizedLabels};
pub use matcher::{Matcher, MatchResult};
pub use scoring::{calculate_match_score, percentage, rank_by_score, score_breakdown, MatchBreakdown};
