//! Schema-driven rosters: field roles are discovered from the field labels.

use super::{ParseError, ParticipantParser, normalize_sex, repair_latin1};
use crate::model::Participant;
use crate::roster::{CountryResolver, RaceRows};

/// Parser for rosters that ship a field descriptor list.
///
/// Field roles are found by case-insensitive substring match on the labels:
/// - name: contains "name" but not "nation" (several fields are joined with spaces)
/// - sex: contains "gender" (exactly one)
/// - nationality: contains "nation" (exactly one)
#[derive(Debug, Clone)]
pub struct SchemaDrivenParser {
    name_fields: Vec<usize>,
    gender_field: usize,
    nationality_field: usize,
    countries: CountryResolver,
}

impl SchemaDrivenParser {
    pub fn new(fields: &[String], countries: CountryResolver) -> Result<Self, ParseError> {
        let lowered: Vec<String> = fields.iter().map(|f| f.to_lowercase()).collect();

        let name_fields = lowered
            .iter()
            .enumerate()
            .filter(|(_, label)| label.contains("name") && !label.contains("nation"))
            .map(|(idx, _)| idx)
            .collect::<Vec<_>>();
        if name_fields.is_empty() {
            tracing::warn!("No name field in roster schema, names will be empty");
        }

        Ok(Self {
            name_fields,
            gender_field: single_field(fields, &lowered, "gender")?,
            nationality_field: single_field(fields, &lowered, "nation")?,
            countries,
        })
    }
}

fn single_field(
    fields: &[String],
    lowered: &[String],
    role: &'static str,
) -> Result<usize, ParseError> {
    let matches: Vec<usize> = lowered
        .iter()
        .enumerate()
        .filter(|(_, label)| label.contains(role))
        .map(|(idx, _)| idx)
        .collect();

    match matches.as_slice() {
        [] => Err(ParseError::MissingField(role)),
        [idx] => Ok(*idx),
        _ => Err(ParseError::AmbiguousField {
            role,
            labels: matches.iter().map(|&idx| fields[idx].clone()).collect(),
        }),
    }
}

impl ParticipantParser for SchemaDrivenParser {
    fn parse_race(&self, race: &RaceRows) -> Vec<Participant> {
        race.rows
            .iter()
            .map(|row| {
                // Position 0 is the bib; field i lives at i + 1
                let cell = |field: usize| {
                    row.get(field + 1)
                        .map(|value| repair_latin1(value))
                        .unwrap_or_default()
                };

                let name = self
                    .name_fields
                    .iter()
                    .map(|&idx| cell(idx))
                    .collect::<Vec<_>>()
                    .join(" ");

                let country = self.countries.resolve(&cell(self.nationality_field));
                if !country.nationality.is_known() {
                    tracing::error!(race = %race.race, ?row, "Participant has unknown nationality");
                }

                Participant {
                    name,
                    bib: row.first().filter(|bib| !bib.is_empty()).cloned(),
                    sex: normalize_sex(&cell(self.gender_field)),
                    nationality: country.nationality,
                    flag: country.flag,
                    race: race.race.clone(),
                    runner: None,
                }
            })
            .collect()
    }
}
