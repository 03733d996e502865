//! Adapter layer: Convert UTMB DTOs to domain models
//!
//! This is the ONLY place where DTO types are converted to domain types.

use super::dto;
use crate::enrichment::domain::{EnrichmentError, RunnerCandidate};

/// Convert a search response to candidates, preserving the API's ranking.
///
/// Runners without a UTMB index (null or 0) are dropped: 0 is the export
/// value of an unmatched participant and cannot rank a match.
pub fn to_candidates(response: dto::SearchResponse) -> Result<Vec<RunnerCandidate>, EnrichmentError> {
    response
        .runners
        .into_iter()
        .filter_map(|runner| to_candidate(runner).transpose())
        .collect()
}

fn to_candidate(runner: dto::Runner) -> Result<Option<RunnerCandidate>, EnrichmentError> {
    if runner.uri.trim().is_empty() {
        return Err(EnrichmentError::ContractViolation {
            expected: "runner with a profile uri".to_string(),
            actual: format!("empty uri for {:?}", runner.fullname),
        });
    }

    let Some(index) = runner.ip.filter(|&ip| ip > 0) else {
        tracing::debug!(runner = %runner.fullname, "Skipping runner without UTMB index");
        return Ok(None);
    };

    Ok(Some(RunnerCandidate {
        index,
        full_name: runner.fullname,
        age_group: runner.age_group,
        profile_path: runner.uri,
    }))
}
