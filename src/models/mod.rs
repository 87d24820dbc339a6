// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{
    CandidateQuery, Category, CategoryLabel, ExchangeItem, ItemRow, LabelMatching, MatchMode,
    Offering, Profile, ProfileSnapshot, Role, ScoredMatch, ScoringPolicy, Want,
};
pub use requests::{FindMatchesRequest, ScoreRequest};
pub use responses::{ErrorResponse, FindMatchesResponse, HealthResponse, ScoreResponse};
