//! Internal domain models for runner lookups.
//!
//! These types are OUR types - they don't change when the runner database API changes.
//! All external API responses get converted into these types via adapters.

use crate::model::{Participant, Sex};

/// One search request against the runner database
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerQuery {
    /// Full name as given by the roster
    pub name: String,
    pub sex: Sex,
    /// ISO2 code, empty when unknown
    pub nationality: String,
}

impl RunnerQuery {
    pub fn for_participant(participant: &Participant) -> Self {
        Self {
            name: participant.name.clone(),
            sex: participant.sex,
            nationality: participant.nationality.code().to_string(),
        }
    }
}

/// A runner returned by the search
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerCandidate {
    /// UTMB index; candidates without one are dropped by the adapter
    pub index: u32,
    pub full_name: String,
    pub age_group: Option<String>,
    /// Profile path relative to the public runner page
    pub profile_path: String,
}

/// Errors that can occur during enrichment
#[derive(Debug, Clone, thiserror::Error)]
pub enum EnrichmentError {
    #[error("Network error: {0}")]
    Network(String),

    #[error("Rate limited - try again later")]
    RateLimited,

    #[error("HTTP {0}")]
    HttpStatus(u16),

    #[error("Failed to parse response: {0}")]
    Parse(String),

    #[error("API contract violation: expected {expected}, got {actual}")]
    ContractViolation { expected: String, actual: String },

    #[error("Giving up after {attempts} attempts: {last}")]
    RetriesExhausted { attempts: u32, last: String },
}

impl EnrichmentError {
    /// Whether another attempt may succeed.
    ///
    /// Transport failures, rate limiting and server errors are transient;
    /// client errors and unexpected response shapes abort the batch.
    pub fn is_retryable(&self) -> bool {
        match self {
            EnrichmentError::Network(_) | EnrichmentError::RateLimited => true,
            EnrichmentError::HttpStatus(status) => *status >= 500,
            _ => false,
        }
    }
}
