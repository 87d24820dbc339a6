use crate::core::labels::{ExactLabels, LabelMatcher};
use crate::models::{CategoryLabel, ProfileSnapshot};

/// Outcome of scoring one candidate against one viewer
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MatchBreakdown {
    /// Unclamped percentage
    pub score: u32,
    pub hits: usize,
    pub denominator: usize,
    /// Candidate offerings that satisfy a viewer want
    pub can_share: Vec<CategoryLabel>,
    /// Candidate wants the viewer can offer
    pub wants_to_learn: Vec<CategoryLabel>,
}

impl MatchBreakdown {
    pub fn clamped_score(&self) -> u32 {
        self.score.min(100)
    }
}

/// Calculate the overlap score (percentage) of `candidate` as seen by `viewer`
///
/// Scoring formula:
/// ```text
/// denominator = max(1, |viewer.wants| + |viewer.offerings|)
/// hits = #{candidate offerings matching some viewer want}
///      + #{candidate wants matching some viewer offering}
/// score = round(100 * hits / denominator)
/// ```
///
/// The denominator depends on the viewer only, so the score is not
/// symmetric. Hits can exceed the denominator, in which case the score is
/// above 100.
pub fn calculate_match_score(viewer: &ProfileSnapshot, candidate: &ProfileSnapshot) -> u32 {
    score_breakdown(viewer, candidate, &ExactLabels).score
}

/// Score with an explicit label equality strategy, keeping the matched labels
pub fn score_breakdown<M>(
    viewer: &ProfileSnapshot,
    candidate: &ProfileSnapshot,
    labels: &M,
) -> MatchBreakdown
where
    M: LabelMatcher + ?Sized,
{
    let denominator = (viewer.wants.len() + viewer.offerings.len()).max(1);

    // Each candidate item counts once, however many viewer items it matches
    let can_share: Vec<CategoryLabel> = candidate
        .offerings
        .iter()
        .filter(|o| viewer.wants.iter().any(|w| labels.matches(&w.label, &o.label)))
        .map(|o| o.label.clone())
        .collect();

    let wants_to_learn: Vec<CategoryLabel> = candidate
        .wants
        .iter()
        .filter(|w| viewer.offerings.iter().any(|o| labels.matches(&w.label, &o.label)))
        .map(|w| w.label.clone())
        .collect();

    let hits = can_share.len() + wants_to_learn.len();

    MatchBreakdown {
        score: percentage(hits, denominator),
        hits,
        denominator,
        can_share,
        wants_to_learn,
    }
}

/// `round(100 * hits / denominator)` with halves rounded up
///
/// Integer arithmetic, so 1/8 gives exactly 13 rather than depending on
/// float representation. A zero denominator is treated as 1.
#[inline]
pub fn percentage(hits: usize, denominator: usize) -> u32 {
    let denominator = denominator.max(1) as u64;
    let hits = hits as u64;
    let rounded = (200 * hits + denominator) / (2 * denominator);
    u32::try_from(rounded).unwrap_or(u32::MAX)
}

/// Order scored entries by descending score, keeping retrieval order on ties
pub fn rank_by_score<T>(mut scored: Vec<(T, u32)>) -> Vec<(T, u32)> {
    // sort_by is stable
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
}
