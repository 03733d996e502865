//! UTMB runner search Data Transfer Objects
//!
//! These types match what the runner search endpoint returns.
//! DO NOT use these types outside the utmb module - convert to domain types.
//!
//! Endpoint: `GET https://api.utmb.world/search/runners`
//! Only the fields the enrichment needs are declared; the rest are ignored.

use serde::{Deserialize, Serialize};

/// Search response
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SearchResponse {
    /// Matching runners, best first
    pub runners: Vec<Runner>,
}

/// One runner entry
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Runner {
    /// UTMB index; absent for runners without a rated result
    pub ip: Option<u32>,
    /// Full name as stored by UTMB, usually "LAST First"
    pub fullname: String,
    /// Age group label, e.g. "50-54"
    pub age_group: Option<String>,
    /// Profile slug relative to https://utmb.world/en/runner/
    pub uri: String,
}

// ============================================================================
// CONTRACT TESTS
// These verify our DTOs match what the real API returns.
// If these fail, the API has changed and we need to update our DTOs.
// ============================================================================
