//! Name matching between a start-list participant and a runner-database candidate.
//!
//! Both names are transliterated to ASCII and hyphens become spaces. Tokens
//! written entirely in capitals stand in for surnames, since rosters and the
//! runner database both tend to spell the family name in upper case.
//!
//! A candidate is accepted on ANY of these signals:
//! - every capitalized token of the local name is among the candidate's
//! - every capitalized token of the candidate is among the local name's
//! - the names are equal ignoring case
//! - the names are equal ignoring case once the candidate's tokens are reversed
//!
//! The subset signals need at least one capitalized token on the side being
//! checked, so an all-lowercase name never matches by vacuous inclusion.

use bitflags::bitflags;
use deunicode::deunicode;

use super::domain::RunnerCandidate;
use crate::model::{Participant, RunnerMatch};

bitflags! {
    /// Signals that fired when comparing two names.
    ///
    /// A candidate is accepted when any flag is set.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct MatchSignals: u8 {
        /// Local surname tokens are a subset of the candidate's
        const LOCAL_SUBSET = 1 << 0;
        /// Candidate surname tokens are a subset of the local name's
        const CANDIDATE_SUBSET = 1 << 1;
        /// Case-insensitive equality
        const EXACT = 1 << 2;
        /// Case-insensitive equality with the candidate's tokens reversed
        const REVERSED = 1 << 3;
    }
}

impl MatchSignals {
    pub fn is_match(self) -> bool {
        !self.is_empty()
    }
}

/// What happened when a lookup result was applied to a participant.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchOutcome {
    Accepted(MatchSignals),
    Rejected,
    NoCandidate,
}

/// Transliterate to ASCII and turn hyphens into spaces.
pub fn normalize_name(name: &str) -> String {
    deunicode(name).replace('-', " ")
}

/// Tokens written entirely in upper case (and containing at least one letter).
pub fn capitalized_tokens(name: &str) -> Vec<&str> {
    name.split_whitespace()
        .filter(|token| {
            token.chars().any(char::is_alphabetic) && token.to_uppercase() == *token
        })
        .collect()
}

/// Compare a start-list name with a candidate name.
pub fn match_names(local: &str, candidate: &str) -> MatchSignals {
    let local = normalize_name(local);
    let candidate = normalize_name(candidate);

    let local_caps = capitalized_tokens(&local);
    let candidate_caps = capitalized_tokens(&candidate);

    let mut signals = MatchSignals::empty();
    if !local_caps.is_empty() && local_caps.iter().all(|t| candidate_caps.contains(t)) {
        signals |= MatchSignals::LOCAL_SUBSET;
    }
    if !candidate_caps.is_empty() && candidate_caps.iter().all(|t| local_caps.contains(t)) {
        signals |= MatchSignals::CANDIDATE_SUBSET;
    }

    let local_lower = lowered_tokens(&local);
    let mut candidate_lower = lowered_tokens(&candidate);
    if !local_lower.is_empty() && local_lower == candidate_lower {
        signals |= MatchSignals::EXACT;
    }
    candidate_lower.reverse();
    if !local_lower.is_empty() && local_lower == candidate_lower {
        signals |= MatchSignals::REVERSED;
    }

    signals
}

fn lowered_tokens(name: &str) -> Vec<String> {
    name.split_whitespace().map(str::to_lowercase).collect()
}

/// Apply the top lookup result to a participant.
///
/// Match fields are written only when the candidate is accepted; otherwise
/// the participant is left untouched.
pub fn apply_lookup(
    participant: &mut Participant,
    candidate: Option<&RunnerCandidate>,
    profile_base_url: &str,
) -> MatchOutcome {
    // A match always carries a nonzero index; 0 marks unmatched rows
    let Some(candidate) = candidate.filter(|c| c.index > 0) else {
        return MatchOutcome::NoCandidate;
    };

    let signals = match_names(&participant.name, &candidate.full_name);
    if !signals.is_match() {
        tracing::warn!(
            startlist_name = %normalize_name(&participant.name),
            utmb_name = %normalize_name(&candidate.full_name),
            "Name mismatch"
        );
        return MatchOutcome::Rejected;
    }

    participant.runner = Some(RunnerMatch {
        index: candidate.index,
        age_group: candidate.age_group.clone(),
        uri: profile_url(profile_base_url, &candidate.profile_path),
        name: candidate.full_name.clone(),
    });
    MatchOutcome::Accepted(signals)
}

/// Join the public profile base with a relative profile path.
pub fn profile_url(base: &str, path: &str) -> String {
    format!("{}/{}", base.trim_end_matches('/'), path.trim_start_matches('/'))
}
