//! Duplicate-check session
//!
//! One session backs one "check before save" interaction on an opportunity
//! form. It records what was last checked, what matched, whether the warning
//! dialog should be open, and whether the user chose to create anyway.
//!
//! ```text
//!            check: no matches               check: matches
//!   Idle ─────────────────────► CheckedClean ◄──────────► CheckedWarned
//!    ▲                               │                          │
//!    │ reset_confirmation            │ confirm_create           │ confirm_create
//!    │                               ▼                          ▼
//!    └───────────────────────────── Confirmed ◄─────────────────┘
//! ```
//!
//! `close_dialog` only hides the dialog; the user is expected to edit the
//! name and submit again. While `Confirmed`, every `check` short-circuits to
//! a clean result until `reset_confirmation`.
//!
//! ## Superseded checks
//!
//! Each `check` takes a request token before awaiting the candidate source.
//! When the lookup resolves, the result is applied only if no newer check,
//! confirmation or reset happened in the meantime. A superseded check leaves
//! session state alone but still returns its matches, so its caller never
//! mistakes it for a clean result. Ordering is by call, not by resolution,
//! so a slow earlier lookup cannot reopen a dismissed dialog.
//!
//! ## Failure
//!
//! Candidate lookup errors are logged and treated as "no matches". The check
//! is advisory and must never stop a user from saving.

use serde::{Deserialize, Serialize};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};
use tracing::{debug, warn};

use crate::config::DedupConfig;
use crate::matcher::{SimilarityMatcher, DEFAULT_THRESHOLD};
use crate::source::CandidateSource;
use crate::types::{CandidateId, SimilarityCheckResult, SimilarityMatch};

/// Where the session is in its check/confirm cycle
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    /// Nothing checked yet, or reset since
    #[default]
    Idle,
    /// Last check found nothing; the caller may proceed
    CheckedClean,
    /// Last check found matches; the warning dialog applies
    CheckedWarned,
    /// The user chose to proceed despite the warning
    Confirmed,
}

/// Point-in-time copy of session state, for rendering and inspection
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub proposed_name: String,
    pub matches: Vec<SimilarityMatch>,
    pub dialog_visible: bool,
    pub confirmed: bool,
}

/// Per-interaction duplicate check over an injected candidate source.
pub struct DuplicateCheckSession<S> {
    source: S,
    matcher: SimilarityMatcher,
    /// Record being edited; never reported as its own duplicate
    exclude_id: Option<CandidateId>,
    inner: Mutex<SessionSnapshot>,
    /// Token of the most recently started check/confirm/reset
    latest: AtomicU64,
}

impl<S: CandidateSource> DuplicateCheckSession<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            matcher: SimilarityMatcher::new(DEFAULT_THRESHOLD),
            exclude_id: None,
            inner: Mutex::new(SessionSnapshot::default()),
            latest: AtomicU64::new(0),
        }
    }

    /// Session using the threshold and display limit from `config`
    pub fn from_config(source: S, config: &DedupConfig) -> Self {
        Self::new(source).with_matcher(config.matcher())
    }

    /// Change the threshold, keeping any display limit already set
    pub fn with_threshold(mut self, threshold: usize) -> Self {
        let matcher = SimilarityMatcher::new(threshold);
        self.matcher = match self.matcher.limit() {
            Some(limit) => matcher.with_limit(limit),
            None => matcher,
        };
        self
    }

    pub fn with_matcher(mut self, matcher: SimilarityMatcher) -> Self {
        self.matcher = matcher;
        self
    }

    /// Exclude the record being edited from its own duplicate check
    pub fn excluding(mut self, id: impl Into<CandidateId>) -> Self {
        self.exclude_id = Some(id.into());
        self
    }

    /// Check `name` for near-duplicates.
    ///
    /// Returns a clean result without touching the source when the session
    /// is confirmed or `name` is blank.
    pub async fn check(&self, name: &str) -> SimilarityCheckResult {
        let token = self.next_token();

        if name.trim().is_empty() {
            return SimilarityCheckResult::clean();
        }
        if self.lock().confirmed {
            debug!(proposed_name = %name, "Duplicate check skipped, already confirmed");
            return SimilarityCheckResult::clean();
        }

        let candidates = match self.source.fetch_candidates(name).await {
            Ok(candidates) => candidates,
            Err(e) => {
                warn!(
                    error = %e,
                    proposed_name = %name,
                    "Candidate lookup failed, treating as no duplicates"
                );
                Vec::new()
            }
        };

        let result = self
            .matcher
            .find(&candidates, name, self.exclude_id.as_ref());

        let mut inner = self.lock();
        if self.latest.load(Ordering::SeqCst) != token {
            debug!(
                proposed_name = %name,
                token,
                matches = result.matches.len(),
                "Duplicate check superseded, session state left unchanged"
            );
            return result;
        }

        inner.proposed_name = name.to_string();
        inner.matches = result.matches.clone();
        inner.dialog_visible = result.has_similar;
        inner.state = if result.has_similar {
            SessionState::CheckedWarned
        } else {
            SessionState::CheckedClean
        };

        debug!(
            proposed_name = %name,
            candidates = candidates.len(),
            matches = result.matches.len(),
            "Duplicate check complete"
        );

        result
    }

    /// "Go back": hide the dialog, keep everything else
    pub fn close_dialog(&self) {
        self.lock().dialog_visible = false;
    }

    /// "Create anyway": suppress further checks until reset
    pub fn confirm_create(&self) {
        let mut inner = self.lock();
        self.next_token();
        inner.confirmed = true;
        inner.dialog_visible = false;
        inner.state = SessionState::Confirmed;
    }

    /// Forget the confirmation and the last check, back to `Idle`.
    ///
    /// Call whenever the compared name changes meaningfully so a stale
    /// confirmation cannot hide a new duplicate.
    pub fn reset_confirmation(&self) {
        let mut inner = self.lock();
        self.next_token();
        *inner = SessionSnapshot::default();
    }

    pub fn state(&self) -> SessionState {
        self.lock().state
    }

    pub fn dialog_visible(&self) -> bool {
        self.lock().dialog_visible
    }

    pub fn confirmed(&self) -> bool {
        self.lock().confirmed
    }

    pub fn proposed_name(&self) -> String {
        self.lock().proposed_name.clone()
    }

    pub fn matches(&self) -> Vec<SimilarityMatch> {
        self.lock().matches.clone()
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        self.lock().clone()
    }

    fn next_token(&self) -> u64 {
        self.latest.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn lock(&self) -> MutexGuard<'_, SessionSnapshot> {
        // Plain data with no cross-field invariant a panic could break
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
