//! Test utilities and fixtures for utmb-enricher tests.
//!
//! # Example
//!
//! ```ignore
//! use utmb_enricher::test_utils::{participant, matched, candidate};
//!
//! let p = matched(participant("Ann LEE", Sex::F), 610);
//! let c = candidate("LEE Ann", 610);
//! ```

use crate::enrichment::RunnerCandidate;
use crate::model::{Nationality, Participant, RunnerMatch, Sex};
use crate::roster::UNKNOWN_FLAG;

/// Creates an unmatched participant with sensible defaults.
///
/// Customize using struct update syntax:
///
/// ```ignore
/// let p = Participant {
///     bib: Some("101".to_string()),
///     ..participant("Ann LEE", Sex::F)
/// };
/// ```
pub fn participant(name: &str, sex: Sex) -> Participant {
    Participant {
        name: name.to_string(),
        bib: None,
        sex,
        nationality: Nationality::Unknown,
        flag: UNKNOWN_FLAG.to_string(),
        race: "Race #1".to_string(),
        runner: None,
    }
}

/// Marks `participant` as matched with the given index.
pub fn matched(mut participant: Participant, index: u32) -> Participant {
    let slug = slug(&participant.name);
    participant.runner = Some(RunnerMatch {
        index,
        age_group: Some("20-34".to_string()),
        uri: format!("https://utmb.world/en/runner/{index}.{slug}"),
        name: participant.name.clone(),
    });
    participant
}

/// Creates a search candidate with a relative profile path.
pub fn candidate(full_name: &str, index: u32) -> RunnerCandidate {
    RunnerCandidate {
        index,
        full_name: full_name.to_string(),
        age_group: Some("20-34".to_string()),
        profile_path: format!("{index}.{}", slug(full_name)),
    }
}

fn slug(name: &str) -> String {
    name.to_lowercase().split_whitespace().collect::<Vec<_>>().join(".")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_participant_defaults() {
        let p = participant("Ann LEE", Sex::F);
        assert_eq!(p.name, "Ann LEE");
        assert_eq!(p.nationality, Nationality::Unknown);
        assert_eq!(p.flag, UNKNOWN_FLAG);
        assert!(!p.is_matched());
    }

    #[test]
    fn test_matched_sets_runner() {
        let p = matched(participant("Ann LEE", Sex::F), 610);
        assert_eq!(p.rank(), 610);
        assert_eq!(p.runner.unwrap().uri, "https://utmb.world/en/runner/610.ann.lee");
    }

    #[test]
    fn test_candidate_path_is_relative() {
        let c = candidate("LEE Ann", 610);
        assert_eq!(c.profile_path, "610.lee.ann");
    }
}
