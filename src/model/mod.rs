//! Core data models for race participants.
//!
//! Defines the canonical [`Participant`] record that every roster format is
//! parsed into, plus the [`RunnerMatch`] attached to it by enrichment.
//!
//! # Match fields
//!
//! A participant is either unmatched (`runner == None`) or carries a complete
//! [`RunnerMatch`]. Matched status, ranking value and external identifier are
//! kept apart:
//! - matched: `runner.is_some()`
//! - rank: [`RunnerMatch::index`], used for ordering exports
//! - identifier: [`RunnerMatch::uri`], the profile slug on the runner database

use std::cmp::{Ordering, Reverse};
use std::fmt;

/// Participant sex after normalization.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Sex {
    M,
    F,
}

impl Sex {
    /// Both sexes, in the order batches and exports are processed.
    pub const ALL: [Sex; 2] = [Sex::M, Sex::F];

    pub fn as_str(self) -> &'static str {
        match self {
            Sex::M => "M",
            Sex::F => "F",
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Participant nationality.
///
/// Never holds a raw source string: either a resolved ISO 3166-1 alpha-2
/// code (uppercase) or the explicit unknown marker.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum Nationality {
    Known(String),
    #[default]
    Unknown,
}

impl Nationality {
    /// ISO2 code, or an empty string when unknown.
    pub fn code(&self) -> &str {
        match self {
            Nationality::Known(code) => code,
            Nationality::Unknown => "",
        }
    }

    pub fn is_known(&self) -> bool {
        matches!(self, Nationality::Known(_))
    }
}

/// Profile data copied from an accepted runner-database candidate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunnerMatch {
    /// Ranking value reported by the runner database (UTMB index)
    pub index: u32,
    /// Age group, e.g. "M 40-44"
    pub age_group: Option<String>,
    /// Absolute profile URL
    pub uri: String,
    /// Full name as stored by the runner database
    pub name: String,
}

/// Canonical race participant, independent of the roster format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Participant {
    /// Full display name as given by the roster
    pub name: String,
    /// Race bib, when the roster has one
    pub bib: Option<String>,
    pub sex: Sex,
    pub nationality: Nationality,
    /// Emoji flag plus country name, or the unknown placeholder
    pub flag: String,
    /// Race label this participant is registered for
    pub race: String,
    /// Set by enrichment when a candidate was accepted
    pub runner: Option<RunnerMatch>,
}

impl Participant {
    pub fn is_matched(&self) -> bool {
        self.runner.is_some()
    }

    /// Ranking value used for ordering; 0 when unmatched.
    pub fn rank(&self) -> u32 {
        self.runner.as_ref().map_or(0, |r| r.index)
    }

    /// Export ordering: matched first, then descending rank, then name.
    pub fn export_order(a: &Participant, b: &Participant) -> Ordering {
        let key = |p: &Participant| (!p.is_matched(), Reverse(p.rank()));
        key(a).cmp(&key(b)).then_with(|| a.name.cmp(&b.name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_utils::{matched, participant};

    #[test]
    fn test_nationality_code() {
        assert_eq!(Nationality::Known("FR".to_string()).code(), "FR");
        assert_eq!(Nationality::Unknown.code(), "");
        assert!(!Nationality::default().is_known());
    }

    #[test]
    fn test_rank_defaults_to_zero() {
        let p = participant("Amy", Sex::F);
        assert_eq!(p.rank(), 0);
        assert!(!p.is_matched());
    }

    #[test]
    fn test_export_order_matched_first() {
        let mut list = vec![
            participant("Bob", Sex::M),
            matched(participant("Amy", Sex::M), 5),
            participant("Zoe", Sex::M),
            matched(participant("Dan", Sex::M), 3),
        ];
        list.sort_by(Participant::export_order);
        let names: Vec<_> = list.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Amy", "Dan", "Bob", "Zoe"]);
    }

    #[test]
    fn test_export_order_ties_by_name() {
        let mut list = vec![
            matched(participant("Zed", Sex::F), 700),
            matched(participant("Ann", Sex::F), 700),
        ];
        list.sort_by(Participant::export_order);
        assert_eq!(list[0].name, "Ann");
    }

    #[test]
    fn test_matched_with_zero_index_sorts_before_unmatched() {
        let mut list = vec![participant("Aaron", Sex::M), matched(participant("Zack", Sex::M), 0)];
        list.sort_by(Participant::export_order);
        assert_eq!(list[0].name, "Zack");
    }
}
