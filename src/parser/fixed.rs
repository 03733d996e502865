//! Fixed-position rosters: `[bib, name, sex, flag image URL, ..]`.

use super::{ParticipantParser, normalize_sex};
use crate::config::FixedFormatConfig;
use crate::model::Participant;
use crate::roster::{CountryResolver, RaceRows, ResolvedCountry};

const BIB: usize = 0;
const NAME: usize = 1;
const SEX: usize = 2;
const FLAG_IMAGE: usize = 3;

/// Parser for rosters whose columns sit at fixed positions.
///
/// Nationality comes from the 2-letter country token in the flag image file
/// name (`.../flags/fr.png`). Rows without a usable image fall back to the
/// federation bib prefix from [`FixedFormatConfig`].
#[derive(Debug, Clone)]
pub struct FixedPositionParser {
    countries: CountryResolver,
    config: FixedFormatConfig,
}

impl FixedPositionParser {
    pub fn new(countries: CountryResolver, config: FixedFormatConfig) -> Self {
        Self { countries, config }
    }

    fn nationality(&self, bib: &str, image: &str) -> ResolvedCountry {
        if let Some(country) = country_token(image)
            .and_then(|token| self.countries.resolve_alpha2(token))
        {
            return country;
        }

        let prefix = &self.config.bib_prefix;
        if !prefix.is_empty()
            && bib.to_uppercase().starts_with(&prefix.to_uppercase())
            && let Some(country) = self.countries.resolve_alpha2(&self.config.bib_prefix_country)
        {
            return country;
        }

        tracing::warn!(bib, image, "Could not derive nationality");
        ResolvedCountry::unknown()
    }
}

/// Find the 2-letter token in the file name of an image URL.
fn country_token(image: &str) -> Option<&str> {
    let path = image.split(['?', '#']).next().unwrap_or(image);
    let file_name = path.rsplit('/').next().unwrap_or(path);
    let stem = file_name
        .rsplit_once('.')
        .map_or(file_name, |(stem, _ext)| stem);

    stem.split(|c: char| !c.is_ascii_alphanumeric())
        .find(|token| token.len() == 2 && token.chars().all(|c| c.is_ascii_alphabetic()))
}

impl ParticipantParser for FixedPositionParser {
    fn parse_race(&self, race: &RaceRows) -> Vec<Participant> {
        race.rows
            .iter()
            .map(|row| {
                let cell = |idx: usize| row.get(idx).map(String::as_str).unwrap_or_default();
                let bib = cell(BIB);
                let country = self.nationality(bib, cell(FLAG_IMAGE));

                Participant {
                    name: cell(NAME).trim().to_string(),
                    bib: (!bib.is_empty()).then(|| bib.to_string()),
                    sex: normalize_sex(cell(SEX)),
                    nationality: country.nationality,
                    flag: country.flag,
                    race: race.race.clone(),
                    runner: None,
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Nationality, Sex};

    fn parser() -> FixedPositionParser {
        FixedPositionParser::new(CountryResolver::default(), FixedFormatConfig::default())
    }

    fn race(rows: &[&[&str]]) -> RaceRows {
        RaceRows {
            race: "Ultra".to_string(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|s| s.to_string()).collect())
                .collect(),
        }
    }

    #[test]
    fn test_country_token() {
        assert_eq!(country_token("https://cdn.example/flags/fr.png"), Some("fr"));
        assert_eq!(country_token("/img/flag_it.svg?v=2"), Some("it"));
        assert_eq!(country_token("flags/GB.gif"), Some("GB"));
        assert_eq!(country_token("https://cdn.example/flags/unknown.png"), None);
        assert_eq!(country_token(""), None);
    }

    #[test]
    fn test_nationality_from_image() {
        let p = &parser().parse_race(&race(&[&["101", "Kilian JORNET", "M", "/flags/es.png"]]))[0];
        assert_eq!(p.nationality, Nationality::Known("ES".to_string()));
        assert_eq!(p.sex, Sex::M);
        assert_eq!(p.bib.as_deref(), Some("101"));
        assert_eq!(p.race, "Ultra");
    }

    #[test]
    fn test_nationality_from_bib_prefix() {
        let p = &parser().parse_race(&race(&[&["AND042", "Joan PI", "M", ""]]))[0];
        assert_eq!(p.nationality, Nationality::Known("AD".to_string()));
    }

    #[test]
    fn test_nationality_unknown() {
        let p = &parser().parse_race(&race(&[&["12", "Ann LEE", "F", "/flags/none.png"]]))[0];
        assert_eq!(p.nationality, Nationality::Unknown);
        assert_eq!(p.nationality.code(), "");
    }

    #[test]
    fn test_missing_columns() {
        let p = &parser().parse_race(&race(&[&["", "Solo"]]))[0];
        assert_eq!(p.name, "Solo");
        assert!(p.bib.is_none());
        assert_eq!(p.sex, Sex::F);
    }
}
