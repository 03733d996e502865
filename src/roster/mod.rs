//! Roster loading - reads start lists and country alias tables from disk.
//!
//! Two roster layouts are recognised from their top-level keys:
//!
//! - **Schema-driven**: `{"list": {"Fields": [{"Expression": ..}, ..]}, "data": {race: [row, ..]}}`.
//!   Row position 0 is the bib, position `i + 1` holds field `i`.
//! - **Fixed-position**: `{"races": {race: [row, ..]}}` with rows laid out as
//!   `[bib, name, sex, flag image URL, ..]`.
//!
//! Cells are kept as strings; races keep their document order.

pub mod country;

use serde::Deserialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub use country::{CountryResolver, ResolvedCountry, UNKNOWN_FLAG};

/// Rows of one race, cells stringified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RaceRows {
    pub race: String,
    pub rows: Vec<Vec<String>>,
}

/// A loaded start list, tagged by its layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RosterDocument {
    SchemaDriven {
        /// Field labels, in row order (offset by one for the bib)
        fields: Vec<String>,
        races: Vec<RaceRows>,
    },
    FixedPosition {
        races: Vec<RaceRows>,
    },
}

impl RosterDocument {
    pub fn races(&self) -> &[RaceRows] {
        match self {
            RosterDocument::SchemaDriven { races, .. } => races,
            RosterDocument::FixedPosition { races } => races,
        }
    }

    pub fn format_name(&self) -> &'static str {
        match self {
            RosterDocument::SchemaDriven { .. } => "schema-driven",
            RosterDocument::FixedPosition { .. } => "fixed-position",
        }
    }
}

/// Country alias table: non-standard name or federation code -> canonical identifier.
pub type CountryAliases = HashMap<String, String>;

/// Roster loading errors
#[derive(Debug, thiserror::Error)]
pub enum RosterError {
    #[error("Failed to read {0}: {1}")]
    Read(PathBuf, std::io::Error),

    #[error("Invalid JSON in {0}: {1}")]
    Json(PathBuf, serde_json::Error),

    #[error("Unrecognized roster format in {0}: expected `list.Fields` + `data` or `races`")]
    UnrecognizedFormat(PathBuf),

    #[error("Race {race:?}: {message}")]
    InvalidRows { race: String, message: String },
}

#[derive(Deserialize)]
struct SchemaRosterDto {
    list: FieldListDto,
    data: Map<String, Value>,
}

#[derive(Deserialize)]
struct FieldListDto {
    #[serde(rename = "Fields")]
    fields: Vec<FieldDto>,
}

#[derive(Deserialize)]
struct FieldDto {
    #[serde(rename = "Expression")]
    expression: String,
}

#[derive(Deserialize)]
struct FixedRosterDto {
    races: Map<String, Value>,
}

#[derive(Deserialize)]
struct FifaAliasDto {
    fifa: String,
    id: String,
}

/// Load and classify a roster file.
pub fn load_roster(path: &Path) -> Result<RosterDocument, RosterError> {
    let value = read_json(path)?;
    parse_roster(value).map_err(|e| match e {
        RosterError::UnrecognizedFormat(_) => RosterError::UnrecognizedFormat(path.to_path_buf()),
        RosterError::Json(_, source) => RosterError::Json(path.to_path_buf(), source),
        other => other,
    })
}

/// Classify an already-parsed roster document.
pub fn parse_roster(value: Value) -> Result<RosterDocument, RosterError> {
    let is_schema = value
        .get("list")
        .and_then(|list| list.get("Fields"))
        .is_some()
        && value.get("data").is_some();

    if is_schema {
        let dto: SchemaRosterDto =
            serde_json::from_value(value).map_err(|e| RosterError::Json(PathBuf::new(), e))?;
        return Ok(RosterDocument::SchemaDriven {
            fields: dto.list.fields.into_iter().map(|f| f.expression).collect(),
            races: race_rows(dto.data)?,
        });
    }

    if value.get("races").is_some() {
        let dto: FixedRosterDto =
            serde_json::from_value(value).map_err(|e| RosterError::Json(PathBuf::new(), e))?;
        return Ok(RosterDocument::FixedPosition {
            races: race_rows(dto.races)?,
        });
    }

    Err(RosterError::UnrecognizedFormat(PathBuf::new()))
}

fn race_rows(races: Map<String, Value>) -> Result<Vec<RaceRows>, RosterError> {
    races
        .into_iter()
        .map(|(race, rows)| {
            let Value::Array(rows) = rows else {
                return Err(RosterError::InvalidRows {
                    race,
                    message: "participants must be an array".to_string(),
                });
            };
            let rows = rows
                .into_iter()
                .map(|row| match row {
                    Value::Array(cells) => Ok(cells.into_iter().map(cell_to_string).collect()),
                    other => Err(format!("row must be an array, got {other}")),
                })
                .collect::<Result<Vec<_>, _>>()
                .map_err(|message| RosterError::InvalidRows {
                    race: race.clone(),
                    message,
                })?;
            Ok(RaceRows { race, rows })
        })
        .collect()
}

fn cell_to_string(cell: Value) -> String {
    match cell {
        Value::String(s) => s,
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

/// Load and merge the two country alias tables.
///
/// The name table is an object `{alias: id}`, the FIFA table an array of
/// `{"fifa": code, "id": id}`; FIFA entries win on conflict. A missing file
/// is logged and treated as empty.
pub fn load_country_aliases(
    names_path: &Path,
    fifa_path: &Path,
) -> Result<CountryAliases, RosterError> {
    let mut aliases = CountryAliases::new();

    if let Some(value) = read_optional_json(names_path)? {
        let names: HashMap<String, String> = serde_json::from_value(value)
            .map_err(|e| RosterError::Json(names_path.to_path_buf(), e))?;
        aliases.extend(names);
    }

    if let Some(value) = read_optional_json(fifa_path)? {
        let fifa: Vec<FifaAliasDto> = serde_json::from_value(value)
            .map_err(|e| RosterError::Json(fifa_path.to_path_buf(), e))?;
        aliases.extend(fifa.into_iter().map(|entry| (entry.fifa, entry.id)));
    }

    tracing::debug!("Loaded {} country aliases", aliases.len());
    Ok(aliases)
}

fn read_json(path: &Path) -> Result<Value, RosterError> {
    let contents =
        std::fs::read_to_string(path).map_err(|e| RosterError::Read(path.to_path_buf(), e))?;
    serde_json::from_str(&contents).map_err(|e| RosterError::Json(path.to_path_buf(), e))
}

fn read_optional_json(path: &Path) -> Result<Option<Value>, RosterError> {
    if !path.exists() {
        tracing::warn!("Country alias table {:?} not found, skipping", path);
        return Ok(None);
    }
    read_json(path).map(Some)
}
