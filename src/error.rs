//! Error types for duplicate detection.
//!
//! The edit-distance engine and the similarity matcher are total functions and
//! never fail. Errors only arise from injected collaborators (candidate
//! retrieval, opportunity lookup), from the exact-duplicate guard, and from
//! caller-side input limits.

use crate::types::CandidateId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Failure reported by a candidate or opportunity lookup collaborator.
#[derive(Debug, Clone, thiserror::Error)]
pub enum SourceError {
    #[error("Candidate lookup unavailable: {0}")]
    Unavailable(String),
    #[error("Candidate lookup failed: {0}")]
    QueryFailed(String),
}

/// Summary of an already-stored opportunity, reported when a hard duplicate
/// is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExistingOpportunity {
    pub id: CandidateId,
    pub name: String,
    pub stage: String,
}

/// Field-keyed validation failure in the shape the CRM form layer renders
/// next to inputs.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
#[error("{message}")]
pub struct ValidationErrors {
    pub message: String,
    pub body: ValidationBody,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationBody {
    /// field name -> message
    pub errors: BTreeMap<String, String>,
}

impl ValidationErrors {
    pub fn for_field(field: &str, message: impl Into<String>) -> Self {
        let mut errors = BTreeMap::new();
        errors.insert(field.to_string(), message.into());
        Self {
            message: "Validation failed".to_string(),
            body: ValidationBody { errors },
        }
    }
}

/// Top-level error for the crate.
#[derive(Debug, thiserror::Error)]
pub enum DedupError {
    /// Same principal, customer and product as an existing opportunity.
    #[error(
        "Duplicate opportunity detected. Existing opportunity: \"{}\" (ID: {}, Stage: {})",
        .existing.name,
        .existing.id,
        .existing.stage
    )]
    DuplicateOpportunity { existing: ExistingOpportunity },

    /// A caller-side input limit was exceeded.
    #[error("{what} exceeds limit: {actual} > {max}")]
    LimitExceeded {
        what: &'static str,
        actual: usize,
        max: usize,
    },

    #[error(transparent)]
    Validation(#[from] ValidationErrors),

    #[error(transparent)]
    Lookup(#[from] SourceError),

    #[error("Invalid configuration: {0}")]
    Config(String),
}

impl DedupError {
    /// Stable machine-readable code, matching the codes the CRM form layer
    /// already understands.
    pub fn code(&self) -> &'static str {
        match self {
            DedupError::DuplicateOpportunity { .. } => "DUPLICATE_OPPORTUNITY",
            DedupError::LimitExceeded { .. } => "LIMIT_EXCEEDED",
            DedupError::Validation(_) => "VALIDATION_FAILED",
            DedupError::Lookup(_) => "LOOKUP_FAILED",
            DedupError::Config(_) => "INVALID_CONFIG",
        }
    }
}

pub type Result<T> = std::result::Result<T, DedupError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_message_format() {
        let err = DedupError::DuplicateOpportunity {
            existing: ExistingOpportunity {
                id: CandidateId::from("opp-123"),
                name: "McCRUM - Sysco - Chicago".to_string(),
                stage: "sample_visit_offered".to_string(),
            },
        };

        assert_eq!(
            err.to_string(),
            "Duplicate opportunity detected. Existing opportunity: \"McCRUM - Sysco - Chicago\" \
             (ID: opp-123, Stage: sample_visit_offered)"
        );
        assert_eq!(err.code(), "DUPLICATE_OPPORTUNITY");
    }

    #[test]
    fn test_validation_errors_shape() {
        let err = ValidationErrors::for_field("product_id", "Duplicate opportunity detected");
        let json = serde_json::to_value(&err).unwrap();

        assert_eq!(err.to_string(), "Validation failed");
        assert_eq!(
            json["body"]["errors"]["product_id"],
            "Duplicate opportunity detected"
        );
    }

    #[test]
    fn test_lookup_error_is_transparent() {
        let err: DedupError = SourceError::Unavailable("connection reset".to_string()).into();
        assert_eq!(
            err.to_string(),
            "Candidate lookup unavailable: connection reset"
        );
        assert_eq!(err.code(), "LOOKUP_FAILED");
    }
}
