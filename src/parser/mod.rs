//! Roster parsing - maps raw roster rows to canonical [`Participant`] records.
//!
//! Each roster layout has its own [`ParticipantParser`]; [`parser_for`] picks
//! the right one for a loaded [`RosterDocument`]. Output order always matches
//! input row order.

mod fixed;
mod schema;

use crate::config::FixedFormatConfig;
use crate::model::{Participant, Sex};
use crate::roster::{CountryResolver, RaceRows, RosterDocument};

pub use fixed::FixedPositionParser;
pub use schema::SchemaDrivenParser;

/// Errors that stop parsing a roster
#[derive(Debug, thiserror::Error)]
pub enum ParseError {
    #[error("No field label contains {0:?}")]
    MissingField(&'static str),

    #[error("Several field labels contain {role:?}: {labels:?}")]
    AmbiguousField {
        role: &'static str,
        labels: Vec<String>,
    },
}

/// Turns the rows of one race into participants.
pub trait ParticipantParser: Send + Sync {
    fn parse_race(&self, race: &RaceRows) -> Vec<Participant>;
}

/// Build the parser matching the roster layout.
pub fn parser_for(
    document: &RosterDocument,
    countries: CountryResolver,
    fixed_format: &FixedFormatConfig,
) -> Result<Box<dyn ParticipantParser>, ParseError> {
    match document {
        RosterDocument::SchemaDriven { fields, .. } => {
            Ok(Box::new(SchemaDrivenParser::new(fields, countries)?))
        }
        RosterDocument::FixedPosition { .. } => Ok(Box::new(FixedPositionParser::new(
            countries,
            fixed_format.clone(),
        ))),
    }
}

/// Normalize a roster sex code.
///
/// The roster uses non-English single letters: `W` and `H` are rewritten to
/// `F`, and anything other than `M` afterwards is treated as `F`.
pub fn normalize_sex(raw: &str) -> Sex {
    let code = raw.trim().to_uppercase().replace('W', "F").replace('H', "F");
    if code == "M" { Sex::M } else { Sex::F }
}

/// Undo UTF-8 text that was mis-decoded as Latin-1 ("Ã©" -> "é").
///
/// Returns the input unchanged when it is not representable in Latin-1 or
/// the re-encoded bytes are not valid UTF-8.
pub fn repair_latin1(text: &str) -> String {
    let bytes: Option<Vec<u8>> = text.chars().map(|c| u8::try_from(c).ok()).collect();
    bytes
        .and_then(|bytes| String::from_utf8(bytes).ok())
        .unwrap_or_else(|| text.to_string())
}
