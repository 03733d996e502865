//! UTMB runner search HTTP client
//!
//! Handles communication with the public runner search used by utmb.world.
//!
//! ## API Quirks
//!
//! ### Sex codes
//! The API is French: men are `H` (homme), women are `F`.
//!
//! ### Search terms
//! Name tokens are joined with a literal `+`. Each token is percent-encoded on
//! its own so the separator itself is never encoded to `%2B`; the URL is
//! therefore built by hand rather than with reqwest's `.query()`.

use super::{adapter, dto};
use crate::config::EnrichmentSettings;
use crate::enrichment::domain::{EnrichmentError, RunnerCandidate, RunnerQuery};
use crate::model::Sex;

/// Only the best-ranked runner is ever inspected.
const RESULT_LIMIT: u32 = 1;

/// UTMB runner search client
///
/// Cheap to clone; clones share the underlying connection pool.
#[derive(Debug, Clone)]
pub struct UtmbClient {
    http_client: reqwest::Client,
    search_url: String,
    category: String,
}

impl UtmbClient {
    /// Create a new client
    ///
    /// The client is configured to:
    /// - Accept gzip-compressed responses
    /// - Send a User-Agent header identifying the application
    pub fn new(settings: &EnrichmentSettings) -> Result<Self, EnrichmentError> {
        let http_client = reqwest::Client::builder()
            .gzip(true)
            .user_agent(settings.user_agent.as_str())
            .build()
            .map_err(|e| EnrichmentError::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            http_client,
            search_url: settings.search_url.clone(),
            category: settings.category.clone(),
        })
    }

    /// Search for runners matching a participant
    pub async fn search(&self, query: &RunnerQuery) -> Result<Vec<RunnerCandidate>, EnrichmentError> {
        let response = self.send_search_request(query).await?;
        adapter::to_candidates(response)
    }

    /// Build the search URL for a query
    pub fn search_url(&self, query: &RunnerQuery) -> String {
        format!(
            "{}?category={}&sex={}&ageGroup=&nationality={}&limit={}&offset=0&search={}",
            self.search_url,
            urlencoding::encode(&self.category),
            sex_code(query.sex),
            urlencoding::encode(&query.nationality),
            RESULT_LIMIT,
            search_terms(&query.name)
        )
    }

    /// Send the HTTP request and parse the response
    async fn send_search_request(
        &self,
        query: &RunnerQuery,
    ) -> Result<dto::SearchResponse, EnrichmentError> {
        let url = self.search_url(query);

        let response = self
            .http_client
            .get(&url)
            .send()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(EnrichmentError::RateLimited);
        }

        if !status.is_success() {
            return Err(EnrichmentError::HttpStatus(status.as_u16()));
        }

        // A body cut off mid-transfer surfaces as a decode error; treat it as transport
        let body = response
            .bytes()
            .await
            .map_err(|e| EnrichmentError::Network(e.to_string()))?;

        serde_json::from_slice::<dto::SearchResponse>(&body)
            .map_err(|e| EnrichmentError::Parse(e.to_string()))
    }
}

/// Map a participant sex to the API's code
fn sex_code(sex: Sex) -> &'static str {
    match sex {
        Sex::F => "F",
        Sex::M => "H",
    }
}

/// Join percent-encoded name tokens with `+`
fn search_terms(name: &str) -> String {
    name.split_whitespace()
        .map(|token| urlencoding::encode(token).into_owned())
        .collect::<Vec<_>>()
        .join("+")
}
