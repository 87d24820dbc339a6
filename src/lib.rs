//! Intergen Match - partner matching service for the generation-exchange app
//!
//! Youth and senior members list what they can offer and what they want to
//! learn. This library scores how well a candidate's offerings and wants
//! line up with a viewer's, and ranks candidates by that score.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{calculate_match_score, rank_by_score, Matcher, MatchBreakdown};
pub use crate::models::{
    CategoryLabel, ExchangeItem, FindMatchesRequest, FindMatchesResponse, MatchMode, Profile,
    ProfileSnapshot, Role, ScoredMatch, ScoringPolicy,
};
