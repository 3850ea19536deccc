//! Opportunity Dedup - Duplicate detection for CRM opportunity names
//!
//! Warns a user creating or renaming an opportunity when an existing
//! opportunity already has a near-identical name, and blocks saving an
//! opportunity that repeats an existing principal/customer/product triple.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │  Caller: opportunity form submit handler                        │
//! └─────────────────────────────────────────────────────────────────┘
//!                               │
//!                               ▼
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                 DuplicateCheckSession                           │
//! │   Idle → CheckedClean / CheckedWarned → Confirmed               │
//! └─────────────────────────────────────────────────────────────────┘
//!                │                                │
//!                ▼                                ▼
//! ┌──────────────────────────────┐   ┌──────────────────────────────┐
//! │  CandidateSource (injected)  │   │     Similarity Matcher       │
//! │  pre-fetched list or query   │   │  threshold, exclude, sort    │
//! └──────────────────────────────┘   └──────────────────────────────┘
//!                                                 │
//!                                                 ▼
//!                                    ┌──────────────────────────────┐
//!                                    │   Edit-Distance Engine       │
//!                                    │   (Levenshtein, normalized)  │
//!                                    └──────────────────────────────┘
//! ```
//!
//! The exact-duplicate guard ([`exact`]) sits beside the session and talks to
//! the record store through [`OpportunityLookup`].
//!
//! # Usage
//!
//! ```ignore
//! use opportunity_dedup::{DuplicateCheckSession, NamedCandidate, StaticCandidates};
//!
//! let candidates = StaticCandidates::new(vec![
//!     NamedCandidate::new(1, "ABC Corp - Widget Deal"),
//! ]);
//! let session = DuplicateCheckSession::new(candidates);
//!
//! let result = session.check("ABC Corp - Widget Deals").await;
//! if result.has_similar {
//!     // render session.snapshot() as a warning dialog
//! }
//! ```

pub mod config;
pub mod distance;
pub mod error;
pub mod exact;
pub mod matcher;
pub mod session;
pub mod source;
pub mod types;

// Re-export main types
pub use config::{DedupConfig, InputLimits};
pub use distance::{distance, distance_within, normalize};
pub use error::{DedupError, ExistingOpportunity, Result, SourceError, ValidationErrors};
pub use exact::{
    check_exact_duplicate, validate_no_duplicate, ExactDuplicateParams, OpportunityLookup,
    OpportunitySummary,
};
pub use matcher::{find_similar, SimilarityMatcher, DEFAULT_THRESHOLD};
pub use session::{DuplicateCheckSession, SessionSnapshot, SessionState};
pub use source::{CandidateSource, StaticCandidates};
pub use types::{CandidateId, NamedCandidate, SimilarityCheckResult, SimilarityMatch};
