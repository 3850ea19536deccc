//! Candidate retrieval abstraction
//!
//! The session asks a `CandidateSource` for the records to compare a
//! proposed name against. Implementations may hand back a list the caller
//! pre-fetched, or run a remote query scoped to the proposed name; the
//! matcher does not care which. Retries, backoff and timeouts belong to the
//! implementation.

use async_trait::async_trait;
use std::sync::Arc;

use crate::error::SourceError;
use crate::types::NamedCandidate;

/// Supplies candidate records for a duplicate check.
///
/// Implementations must be Send + Sync for use in async contexts.
#[async_trait]
pub trait CandidateSource: Send + Sync {
    /// Fetch the candidates to compare `proposed_name` against
    async fn fetch_candidates(
        &self,
        proposed_name: &str,
    ) -> Result<Vec<NamedCandidate>, SourceError>;
}

#[async_trait]
impl<T: CandidateSource + ?Sized> CandidateSource for Arc<T> {
    async fn fetch_candidates(
        &self,
        proposed_name: &str,
    ) -> Result<Vec<NamedCandidate>, SourceError> {
        (**self).fetch_candidates(proposed_name).await
    }
}

/// A fixed, pre-fetched candidate list.
#[derive(Debug, Clone, Default)]
pub struct StaticCandidates {
    candidates: Vec<NamedCandidate>,
}

impl StaticCandidates {
    pub fn new(candidates: Vec<NamedCandidate>) -> Self {
        Self { candidates }
    }

    pub fn len(&self) -> usize {
        self.candidates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty()
    }

    pub fn as_slice(&self) -> &[NamedCandidate] {
        &self.candidates
    }
}

impl From<Vec<NamedCandidate>> for StaticCandidates {
    fn from(candidates: Vec<NamedCandidate>) -> Self {
        Self::new(candidates)
    }
}

#[async_trait]
impl CandidateSource for StaticCandidates {
    async fn fetch_candidates(
        &self,
        _proposed_name: &str,
    ) -> Result<Vec<NamedCandidate>, SourceError> {
        Ok(self.candidates.clone())
    }
}
