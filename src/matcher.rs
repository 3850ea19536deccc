//! Similarity matcher
//!
//! Scores candidate records against a proposed opportunity name by edit
//! distance and keeps the ones close enough to warrant a duplicate warning.
//!
//! Rules, in order:
//! 1. Empty/whitespace proposed name → clean result, nothing scored
//! 2. Candidates with empty/whitespace names are skipped
//! 3. The candidate whose id equals `exclude_id` is skipped (a record being
//!    edited never flags itself)
//! 4. Only `0 < distance <= threshold` is kept; exact normalized matches are
//!    not reported as "similar"
//! 5. Stable ascending sort by distance, ties keep input order

use crate::distance::distance_within;
use crate::types::{CandidateId, NamedCandidate, SimilarityCheckResult, SimilarityMatch};

/// Threshold used when a call site does not pick one.
pub const DEFAULT_THRESHOLD: usize = 3;

/// Find candidates whose names are within `threshold` edits of
/// `proposed_name`.
///
/// Pure: `candidates` is only read, and repeated calls with the same input
/// return the same result.
pub fn find_similar(
    candidates: &[NamedCandidate],
    proposed_name: &str,
    threshold: usize,
    exclude_id: Option<&CandidateId>,
) -> SimilarityCheckResult {
    if proposed_name.trim().is_empty() {
        return SimilarityCheckResult::clean();
    }

    let mut matches: Vec<SimilarityMatch> = candidates
        .iter()
        .filter(|c| c.has_name())
        .filter(|c| exclude_id != Some(&c.id))
        .filter_map(|c| {
            distance_within(proposed_name, &c.name, threshold)
                .filter(|&d| d > 0)
                .map(|distance| SimilarityMatch {
                    candidate: c.clone(),
                    distance,
                })
        })
        .collect();

    // Vec::sort_by_key is stable
    matches.sort_by_key(|m| m.distance);

    SimilarityCheckResult::from_matches(matches)
}

/// Matcher settings for one call site
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimilarityMatcher {
    threshold: usize,
    limit: Option<usize>,
}

impl Default for SimilarityMatcher {
    fn default() -> Self {
        Self::new(DEFAULT_THRESHOLD)
    }
}

impl SimilarityMatcher {
    pub fn new(threshold: usize) -> Self {
        Self {
            threshold,
            limit: None,
        }
    }

    /// Keep at most `limit` matches (the closest ones) after sorting.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn threshold(&self) -> usize {
        self.threshold
    }

    pub fn limit(&self) -> Option<usize> {
        self.limit
    }

    pub fn find(
        &self,
        candidates: &[NamedCandidate],
        proposed_name: &str,
        exclude_id: Option<&CandidateId>,
    ) -> SimilarityCheckResult {
        let mut result = find_similar(candidates, proposed_name, self.threshold, exclude_id);
        if let Some(limit) = self.limit {
            result.matches.truncate(limit);
            result.has_similar = !result.matches.is_empty();
        }
        result
    }
}
