//! Country resolution: alias table, ISO 3166 lookup and flag labels.

use celes::Country;

use super::CountryAliases;
use crate::model::Nationality;

/// Placeholder flag label for unresolvable nationalities.
pub const UNKNOWN_FLAG: &str = "🏳 (unknown)";

/// Outcome of resolving a raw country string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCountry {
    pub nationality: Nationality,
    /// "🇫🇷 (France)" style label, or [`UNKNOWN_FLAG`]
    pub flag: String,
}

impl ResolvedCountry {
    pub fn unknown() -> Self {
        Self {
            nationality: Nationality::Unknown,
            flag: UNKNOWN_FLAG.to_string(),
        }
    }
}

/// Converts roster country strings to ISO2 codes through a caller-supplied alias table.
#[derive(Debug, Clone, Default)]
pub struct CountryResolver {
    aliases: CountryAliases,
}

impl CountryResolver {
    pub fn new(aliases: CountryAliases) -> Self {
        Self { aliases }
    }

    /// Resolve a raw country name, FIFA code or ISO code.
    ///
    /// Unresolvable input logs a warning and yields [`ResolvedCountry::unknown`].
    pub fn resolve(&self, raw: &str) -> ResolvedCountry {
        let trimmed = raw.trim();
        let input = self
            .aliases
            .get(trimmed)
            .map(String::as_str)
            .unwrap_or(trimmed);

        match lookup(input) {
            Some(country) => resolved(&country),
            None => {
                tracing::warn!(input_country = input, "Unknown nationality");
                ResolvedCountry::unknown()
            }
        }
    }

    /// Resolve a value already expected to be an ISO2 code, bypassing aliases.
    pub fn resolve_alpha2(&self, code: &str) -> Option<ResolvedCountry> {
        Country::from_alpha2(code.trim().to_uppercase())
            .ok()
            .map(|country| resolved(&country))
    }
}

fn lookup(input: &str) -> Option<Country> {
    if input.is_empty() {
        return None;
    }
    let upper = input.to_uppercase();
    let by_code = match upper.len() {
        2 => Country::from_alpha2(&upper).ok(),
        3 => Country::from_alpha3(&upper).ok(),
        _ => None,
    };
    by_code
        .or_else(|| Country::from_name(input).ok())
        .or_else(|| Country::from_alias(input).ok())
        .or_else(|| Country::from_name(input.replace(' ', "")).ok())
        .or_else(|| Country::from_alias(input.replace(' ', "")).ok())
}

fn resolved(country: &Country) -> ResolvedCountry {
    let code = country.alpha2.to_uppercase();
    ResolvedCountry {
        flag: format!("{} ({})", flag_emoji(&code), short_name(country)),
        nationality: Nationality::Known(code),
    }
}

/// Common short names for countries whose ISO name is the official long form.
const SHORT_NAMES: &[(&str, &str)] = &[
    ("BO", "Bolivia"),
    ("CD", "DR Congo"),
    ("CG", "Congo Republic"),
    ("FM", "Micronesia"),
    ("GB", "United Kingdom"),
    ("IR", "Iran"),
    ("KP", "North Korea"),
    ("KR", "South Korea"),
    ("LA", "Laos"),
    ("MD", "Moldova"),
    ("MK", "North Macedonia"),
    ("PS", "Palestine"),
    ("RU", "Russia"),
    ("SY", "Syria"),
    ("TW", "Taiwan"),
    ("TZ", "Tanzania"),
    ("US", "United States"),
    ("VA", "Vatican"),
    ("VE", "Venezuela"),
    ("VN", "Vietnam"),
];

/// Everyday country name: "United Kingdom", "Netherlands", "France".
pub fn short_name(country: &Country) -> &'static str {
    let name: &'static str = country.long_name;
    SHORT_NAMES
        .iter()
        .find(|(code, _)| code.eq_ignore_ascii_case(country.alpha2))
        .map(|&(_, short)| short)
        .unwrap_or_else(|| name.strip_prefix("The ").unwrap_or(name))
}

/// Regional-indicator flag emoji for an ISO2 code.
pub fn flag_emoji(alpha2: &str) -> String {
    alpha2
        .chars()
        .filter(char::is_ascii_alphabetic)
        .filter_map(|c| {
            let offset = c.to_ascii_uppercase() as u32 - 'A' as u32;
            char::from_u32(0x1F1E6 + offset)
        })
        .collect()
}
