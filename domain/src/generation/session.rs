//! Continuation session state machine.
//!
//! One [`ContinuationSession`] exists per generation request. It owns the
//! ordered fragments, the merged text, the attempt counter and the current
//! provider, and moves through these states:
//!
//! ```text
//!            push_fragment / begin_continuation / replace_provider
//!                         ┌──────────┐
//!                         ▼          │
//!  new() ──────────────► Active ─────┘
//!                         │ │ │
//!             complete()  │ │ │ abort()
//!           ┌─────────────┘ │ └──────────────┐
//!           ▼               ▼ exhaust()      ▼
//!       Complete        Exhausted         Aborted
//! ```
//!
//! Terminal states reject further mutation with
//! [`DomainError::SessionClosed`], so a finished session is never
//! half-updated. The merged text is always a valid best-effort answer.

use super::fragment::ResponseFragment;
use super::merge::overlap_len;
use crate::core::error::DomainError;
use crate::providers::descriptor::ProviderId;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a [`ContinuationSession`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    Active,
    Complete,
    Exhausted,
    Aborted,
}

impl SessionState {
    pub fn as_str(&self) -> &'static str {
        match self {
            SessionState::Active => "active",
            SessionState::Complete => "complete",
            SessionState::Exhausted => "exhausted",
            SessionState::Aborted => "aborted",
        }
    }

    pub fn is_terminal(&self) -> bool {
        !matches!(self, SessionState::Active)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why a session ended in [`SessionState::Aborted`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum AbortReason {
    /// Every candidate provider failed or was excluded.
    ProvidersExhausted(String),
    /// The consumer cancelled the request.
    Cancelled,
}

impl std::fmt::Display for AbortReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AbortReason::ProvidersExhausted(detail) => {
                write!(f, "no provider left to continue: {}", detail)
            }
            AbortReason::Cancelled => f.write_str("cancelled"),
        }
    }
}

/// Mutable aggregate for one request's continuation loop.
#[derive(Debug, Clone)]
pub struct ContinuationSession {
    fragments: Vec<ResponseFragment>,
    merged: String,
    attempts: u32,
    max_attempts: u32,
    provider: ProviderId,
    tried: Vec<ProviderId>,
    reselections: u32,
    state: SessionState,
    abort_reason: Option<AbortReason>,
}

impl ContinuationSession {
    /// Start an active session against `provider`.
    pub fn new(provider: ProviderId, max_attempts: u32) -> Self {
        Self {
            fragments: Vec::new(),
            merged: String::new(),
            attempts: 0,
            max_attempts,
            tried: vec![provider.clone()],
            provider,
            reselections: 0,
            state: SessionState::Active,
            abort_reason: None,
        }
    }

    fn ensure_active(&self) -> Result<(), DomainError> {
        if self.state.is_terminal() {
            return Err(DomainError::SessionClosed(self.state));
        }
        Ok(())
    }

    /// Append the text of one provider call, trimming any overlap with the
    /// merged text. Returns the part that extended the answer.
    pub fn push_fragment(&mut self, text: impl Into<String>) -> Result<&str, DomainError> {
        self.ensure_active()?;
        let text = text.into();
        let overlap = overlap_len(&self.merged, &text);
        let fragment =
            ResponseFragment::new(self.fragments.len(), self.provider.clone(), text, overlap);
        self.merged.push_str(fragment.contributed());
        self.fragments.push(fragment);
        Ok(self
            .fragments
            .last()
            .map(ResponseFragment::contributed)
            .unwrap_or_default())
    }

    /// Count one continuation attempt. Fails once the bound is reached.
    pub fn begin_continuation(&mut self) -> Result<u32, DomainError> {
        self.ensure_active()?;
        if !self.has_attempts_left() {
            return Err(DomainError::AttemptsExhausted(self.max_attempts));
        }
        self.attempts += 1;
        Ok(self.attempts)
    }

    /// Hand the session to another provider after a transport failure.
    ///
    /// Counted as a reselection, not as a continuation attempt.
    pub fn replace_provider(&mut self, next: ProviderId) -> Result<(), DomainError> {
        self.ensure_active()?;
        if !self.tried.contains(&next) {
            self.tried.push(next.clone());
        }
        self.provider = next;
        self.reselections += 1;
        Ok(())
    }

    pub fn complete(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.state = SessionState::Complete;
        Ok(())
    }

    pub fn exhaust(&mut self) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.state = SessionState::Exhausted;
        Ok(())
    }

    pub fn abort(&mut self, reason: AbortReason) -> Result<(), DomainError> {
        self.ensure_active()?;
        self.state = SessionState::Aborted;
        self.abort_reason = Some(reason);
        Ok(())
    }

    pub fn has_attempts_left(&self) -> bool {
        self.attempts < self.max_attempts
    }

    pub fn merged_text(&self) -> &str {
        &self.merged
    }

    pub fn fragments(&self) -> &[ResponseFragment] {
        &self.fragments
    }

    pub fn attempts(&self) -> u32 {
        self.attempts
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    pub fn provider(&self) -> &ProviderId {
        &self.provider
    }

    /// Every provider that served this session, in the order used.
    pub fn tried_providers(&self) -> &[ProviderId] {
        &self.tried
    }

    pub fn reselections(&self) -> u32 {
        self.reselections
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn abort_reason(&self) -> Option<&AbortReason> {
        self.abort_reason.as_ref()
    }

    /// True unless the session reached [`SessionState::Complete`].
    pub fn is_possibly_incomplete(&self) -> bool {
        self.state != SessionState::Complete
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::generation::merge::merge;

    fn id(s: &str) -> ProviderId {
        s.parse().unwrap()
    }

    #[test]
    fn new_session_is_active_and_empty() {
        let session = ContinuationSession::new(id("A"), 3);
        assert_eq!(session.state(), SessionState::Active);
        assert_eq!(session.merged_text(), "");
        assert_eq!(session.tried_providers(), &[id("A")]);
        assert!(session.is_possibly_incomplete());
    }

    #[test]
    fn fragments_merge_with_overlap_trimmed() {
        let mut session = ContinuationSession::new(id("A"), 3);
        session.push_fragment("...the quick brown").unwrap();
        session.begin_continuation().unwrap();
        let added = session.push_fragment("brown fox jumps").unwrap().to_string();
        assert_eq!(added, " fox jumps");
        assert_eq!(session.merged_text(), "...the quick brown fox jumps");
        assert_eq!(session.fragments()[1].overlap(), 5);
        assert_eq!(session.fragments()[1].text(), "brown fox jumps");
    }

    #[test]
    fn merged_fragments_are_prefix_of_final_text() {
        let mut session = ContinuationSession::new(id("A"), 5);
        let parts = ["Rust is fast", "fast and safe, and", "and it has great tooling."];
        let mut expected = String::new();
        for part in parts {
            session.push_fragment(part).unwrap();
            expected = merge(&expected, part);
            let concatenated: String =
                session.fragments().iter().map(|f| f.contributed()).collect();
            assert!(expected.starts_with(&concatenated));
            assert_eq!(concatenated, session.merged_text());
        }
        assert_eq!(
            session.merged_text(),
            "Rust is fast and safe, and it has great tooling."
        );
    }

    #[test]
    fn attempt_counter_never_exceeds_bound() {
        let mut session = ContinuationSession::new(id("A"), 2);
        assert_eq!(session.begin_continuation().unwrap(), 1);
        assert_eq!(session.begin_continuation().unwrap(), 2);
        assert_eq!(
            session.begin_continuation(),
            Err(DomainError::AttemptsExhausted(2))
        );
        assert_eq!(session.attempts(), 2);
    }

    #[test]
    fn zero_attempts_allows_no_continuation() {
        let mut session = ContinuationSession::new(id("A"), 0);
        assert!(!session.has_attempts_left());
        assert!(session.begin_continuation().is_err());
    }

    #[test]
    fn replace_provider_counts_reselection_not_attempt() {
        let mut session = ContinuationSession::new(id("A"), 3);
        session.begin_continuation().unwrap();
        session.replace_provider(id("B")).unwrap();
        assert_eq!(session.provider(), &id("B"));
        assert_eq!(session.reselections(), 1);
        assert_eq!(session.attempts(), 1);
        assert_eq!(session.tried_providers(), &[id("A"), id("B")]);
    }

    #[test]
    fn terminal_states_reject_mutation() {
        let mut session = ContinuationSession::new(id("A"), 3);
        session.push_fragment("Done.").unwrap();
        session.complete().unwrap();
        assert!(!session.is_possibly_incomplete());
        assert!(session.push_fragment("more").unwrap_err().is_session_closed());
        assert!(session.begin_continuation().is_err());
        assert!(session.exhaust().is_err());
        assert_eq!(session.merged_text(), "Done.");
    }

    #[test]
    fn abort_keeps_partial_text_and_reason() {
        let mut session = ContinuationSession::new(id("A"), 3);
        session.push_fragment("Partial answer, and").unwrap();
        session.abort(AbortReason::Cancelled).unwrap();
        assert_eq!(session.state(), SessionState::Aborted);
        assert_eq!(session.abort_reason(), Some(&AbortReason::Cancelled));
        assert_eq!(session.merged_text(), "Partial answer, and");
        assert!(session.is_possibly_incomplete());
    }
}
