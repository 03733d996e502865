//! Export of enriched participants to CSV and JSON.
//!
//! Every export writes two files with the same stem:
//! - `<csv_dir>/<stem>.csv` with a chosen subset of [`Column`]s
//! - `<json_dir>/<stem>.json` with every field, indented by 4 spaces
//!
//! Participants are sorted with [`Participant::export_order`] before writing.
//! An empty participant list writes nothing.

use serde::Serialize;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use crate::model::{Participant, Sex};

/// Stem prefix of the cross-race exports.
pub const AGGREGATE_PREFIX: &str = "all_participants";

/// CSV columns in output order
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Column {
    Name,
    Bib,
    Sex,
    Nationality,
    Flag,
    Race,
    UtmbIndex,
    UtmbAgeGroup,
    UtmbUri,
    UtmbName,
}

impl Column {
    pub const ALL: [Column; 10] = [
        Column::Name,
        Column::Bib,
        Column::Sex,
        Column::Nationality,
        Column::Flag,
        Column::Race,
        Column::UtmbIndex,
        Column::UtmbAgeGroup,
        Column::UtmbUri,
        Column::UtmbName,
    ];

    /// Columns left out of per-race files: every row shares them.
    pub const PER_RACE_DROPPED: [Column; 3] = [Column::Sex, Column::Nationality, Column::Race];

    /// Columns left out of the cross-race files.
    pub const AGGREGATE_DROPPED: [Column; 1] = [Column::Nationality];

    pub fn header(self) -> &'static str {
        match self {
            Column::Name => "name",
            Column::Bib => "bib",
            Column::Sex => "sex",
            Column::Nationality => "nationality",
            Column::Flag => "flag",
            Column::Race => "race",
            Column::UtmbIndex => "utmb_index",
            Column::UtmbAgeGroup => "utmb_agegroup",
            Column::UtmbUri => "utmb_uri",
            Column::UtmbName => "utmb_name",
        }
    }

    fn value(self, participant: &Participant) -> String {
        let runner = participant.runner.as_ref();
        match self {
            Column::Name => participant.name.clone(),
            Column::Bib => participant.bib.clone().unwrap_or_default(),
            Column::Sex => participant.sex.to_string(),
            Column::Nationality => participant.nationality.code().to_string(),
            Column::Flag => participant.flag.clone(),
            Column::Race => participant.race.clone(),
            Column::UtmbIndex => participant.rank().to_string(),
            Column::UtmbAgeGroup => runner
                .and_then(|r| r.age_group.clone())
                .unwrap_or_default(),
            Column::UtmbUri => runner.map(|r| r.uri.clone()).unwrap_or_default(),
            Column::UtmbName => runner.map(|r| r.name.clone()).unwrap_or_default(),
        }
    }
}

/// Full-fidelity JSON shape of a participant
#[derive(Debug, Serialize)]
struct ExportRecord<'a> {
    name: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    bib: Option<&'a str>,
    sex: &'a str,
    nationality: &'a str,
    flag: &'a str,
    race: &'a str,
    utmb_index: u32,
    /// Present (possibly null) only for matched participants
    #[serde(skip_serializing_if = "Option::is_none")]
    utmb_agegroup: Option<Option<&'a str>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    utmb_uri: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    utmb_name: Option<&'a str>,
}

impl<'a> From<&'a Participant> for ExportRecord<'a> {
    fn from(p: &'a Participant) -> Self {
        let runner = p.runner.as_ref();
        Self {
            name: &p.name,
            bib: p.bib.as_deref(),
            sex: p.sex.as_str(),
            nationality: p.nationality.code(),
            flag: &p.flag,
            race: &p.race,
            utmb_index: p.rank(),
            utmb_agegroup: runner.map(|r| r.age_group.as_deref()),
            utmb_uri: runner.map(|r| r.uri.as_str()),
            utmb_name: runner.map(|r| r.name.as_str()),
        }
    }
}

/// Export errors
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("Failed to write {0}: {1}")]
    Io(PathBuf, std::io::Error),

    #[error("Failed to write CSV {0}: {1}")]
    Csv(PathBuf, csv::Error),

    #[error("Failed to write JSON {0}: {1}")]
    Json(PathBuf, serde_json::Error),
}

/// Paths produced by one export
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportFiles {
    pub csv: PathBuf,
    pub json: PathBuf,
}

/// File stem for one race and sex: `#` removed, spaces to underscores.
pub fn race_file_stem(race: &str, sex: Sex) -> String {
    let base: String = race
        .chars()
        .filter(|&c| c != '#')
        .map(|c| match c {
            ' ' | '/' | '\\' => '_',
            other => other,
        })
        .collect();
    format!("{base}_{sex}")
}

/// File stem for the cross-race export of one sex.
pub fn aggregate_file_stem(sex: Sex) -> String {
    format!("{AGGREGATE_PREFIX}_{sex}")
}

/// Writes CSV and JSON exports into fixed directories
#[derive(Debug, Clone)]
pub struct Exporter {
    csv_dir: PathBuf,
    json_dir: PathBuf,
}

impl Exporter {
    pub fn new(csv_dir: impl Into<PathBuf>, json_dir: impl Into<PathBuf>) -> Self {
        Self {
            csv_dir: csv_dir.into(),
            json_dir: json_dir.into(),
        }
    }

    /// Sort `participants` in place and write both files.
    ///
    /// Returns `Ok(None)` without touching the filesystem when the list is empty.
    pub fn write(
        &self,
        participants: &mut [Participant],
        stem: &str,
        dropped: &[Column],
    ) -> Result<Option<ExportFiles>, ExportError> {
        if participants.is_empty() {
            tracing::debug!(stem, "Nothing to export");
            return Ok(None);
        }

        participants.sort_by(Participant::export_order);

        let files = ExportFiles {
            csv: self.csv_dir.join(format!("{stem}.csv")),
            json: self.json_dir.join(format!("{stem}.json")),
        };
        let columns: Vec<Column> = Column::ALL
            .into_iter()
            .filter(|column| !dropped.contains(column))
            .collect();

        write_csv(&files.csv, participants, &columns)?;
        write_json(&files.json, participants)?;

        tracing::info!(
            stem,
            rows = participants.len(),
            csv = %files.csv.display(),
            "Exported"
        );
        Ok(Some(files))
    }
}

fn ensure_parent(path: &Path) -> Result<(), ExportError> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent).map_err(|e| ExportError::Io(parent.to_path_buf(), e))?;
    }
    Ok(())
}

fn write_csv(path: &Path, participants: &[Participant], columns: &[Column]) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let csv_err = |e| ExportError::Csv(path.to_path_buf(), e);

    let mut writer = csv::Writer::from_path(path).map_err(csv_err)?;
    writer
        .write_record(columns.iter().map(|c| c.header()))
        .map_err(csv_err)?;
    for participant in participants {
        writer
            .write_record(columns.iter().map(|c| c.value(participant)))
            .map_err(csv_err)?;
    }
    writer
        .flush()
        .map_err(|e| ExportError::Io(path.to_path_buf(), e))
}

fn write_json(path: &Path, participants: &[Participant]) -> Result<(), ExportError> {
    ensure_parent(path)?;
    let file = File::create(path).map_err(|e| ExportError::Io(path.to_path_buf(), e))?;
    let mut writer = BufWriter::new(file);

    let records: Vec<ExportRecord<'_>> = participants.iter().map(ExportRecord::from).collect();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut writer, formatter);
    records
        .serialize(&mut serializer)
        .map_err(|e| ExportError::Json(path.to_path_buf(), e))?;

    writer
        .flush()
        .map_err(|e| ExportError::Io(path.to_path_buf(), e))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Nationality;
    use crate::test_utils::{matched, participant};

    fn exporter(dir: &Path) -> Exporter {
        Exporter::new(dir, dir.join("json"))
    }

    fn sample() -> Vec<Participant> {
        let mut amy = matched(participant("Amy", Sex::F), 5);
        amy.nationality = Nationality::Known("FR".to_string());
        vec![
            participant("Bob", Sex::F),
            amy,
            participant("Zoe", Sex::F),
            matched(participant("Dan", Sex::F), 3),
        ]
    }

    #[test]
    fn test_race_file_stem() {
        assert_eq!(race_file_stem("Race #1 Night", Sex::M), "Race_1_Night_M");
        assert_eq!(race_file_stem("UTMB", Sex::F), "UTMB_F");
        assert_eq!(race_file_stem("50K/Trail", Sex::F), "50K_Trail_F");
    }

    #[test]
    fn test_aggregate_file_stem() {
        assert_eq!(aggregate_file_stem(Sex::M), "all_participants_M");
        assert_eq!(aggregate_file_stem(Sex::F), "all_participants_F");
    }

    #[test]
    fn test_empty_list_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let result = exporter(dir.path())
            .write(&mut [], "Empty_F", &Column::PER_RACE_DROPPED)
            .unwrap();

        assert!(result.is_none());
        assert!(!dir.path().join("Empty_F.csv").exists());
        assert!(!dir.path().join("json").exists());
    }

    #[test]
    fn test_write_sorts_and_drops_columns() {
        let dir = tempfile::tempdir().unwrap();
        let mut participants = sample();

        let files = exporter(dir.path())
            .write(&mut participants, "Race_1_F", &Column::PER_RACE_DROPPED)
            .unwrap()
            .unwrap();

        let names: Vec<_> = participants.iter().map(|p| p.name.as_str()).collect();
        assert_eq!(names, ["Amy", "Dan", "Bob", "Zoe"]);

        let csv = std::fs::read_to_string(&files.csv).unwrap();
        let mut lines = csv.lines();
        assert_eq!(
            lines.next().unwrap(),
            "name,bib,flag,utmb_index,utmb_agegroup,utmb_uri,utmb_name"
        );
        assert!(lines.next().unwrap().starts_with("Amy,"));
        let bob = lines.nth(1).unwrap();
        assert!(bob.starts_with("Bob,"));
        assert!(bob.ends_with(",0,,,"));
    }

    #[test]
    fn test_aggregate_keeps_sex_and_race() {
        let dir = tempfile::tempdir().unwrap();
        let files = exporter(dir.path())
            .write(&mut sample(), "all_participants_F", &Column::AGGREGATE_DROPPED)
            .unwrap()
            .unwrap();

        let csv = std::fs::read_to_string(&files.csv).unwrap();
        assert_eq!(
            csv.lines().next().unwrap(),
            "name,bib,sex,flag,race,utmb_index,utmb_agegroup,utmb_uri,utmb_name"
        );
    }

    #[test]
    fn test_json_is_full_fidelity() {
        let dir = tempfile::tempdir().unwrap();
        let files = exporter(dir.path())
            .write(&mut sample(), "Race_1_F", &Column::PER_RACE_DROPPED)
            .unwrap()
            .unwrap();

        assert_eq!(files.json, dir.path().join("json").join("Race_1_F.json"));
        let text = std::fs::read_to_string(&files.json).unwrap();
        assert!(text.contains("\n    {\n        \"name\": \"Amy\""));

        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        let records = value.as_array().unwrap();
        assert_eq!(records.len(), 4);

        let amy = &records[0];
        assert_eq!(amy["nationality"], "FR");
        assert_eq!(amy["sex"], "F");
        assert_eq!(amy["utmb_index"], 5);
        assert!(amy.get("utmb_uri").is_some());
        assert!(amy.get("utmb_agegroup").is_some());

        let bob = &records[2];
        assert_eq!(bob["utmb_index"], 0);
        assert!(bob.get("utmb_uri").is_none());
        assert!(bob.get("utmb_name").is_none());
        assert!(bob.get("utmb_agegroup").is_none());
    }

    #[test]
    fn test_json_keeps_unicode() {
        let dir = tempfile::tempdir().unwrap();
        let mut list = vec![participant("Zoé MÜLLER", Sex::F)];
        let files = exporter(dir.path())
            .write(&mut list, "R_F", &[])
            .unwrap()
            .unwrap();
        let text = std::fs::read_to_string(files.json).unwrap();
        assert!(text.contains("Zoé MÜLLER"));
    }

    mod proptests {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Stems never contain characters that break file names here
            #[test]
            fn stem_has_no_separators(race in "[a-zA-Z0-9 #/_-]{0,30}") {
                let stem = race_file_stem(&race, Sex::M);
                prop_assert!(!stem.contains('#'));
                prop_assert!(!stem.contains(' '));
                prop_assert!(!stem.contains('/'));
                prop_assert!(stem.ends_with("_M"));
            }
        }
    }
}
