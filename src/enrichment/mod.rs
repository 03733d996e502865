//! Participant enrichment - finds participants in the UTMB runner database.
//!
//! # Architecture
//!
//! This module follows a clean separation between:
//! - **Domain models** (`domain.rs`) - Internal query/candidate types
//! - **API DTOs** (`utmb/dto.rs`) - Exact API response shapes
//! - **Adapters** - Convert DTOs to domain models
//! - **Clients** - HTTP client for the runner search
//! - **Matching** - Decide whether a candidate is the same person
//! - **Retry** - Jittered retry of transient failures
//! - **Service** - Concurrent batch orchestration
//!
//! # Usage
//!
//! ```ignore
//! use enrichment::EnrichmentService;
//!
//! let service = EnrichmentService::from_config(&config)?;
//! let (participants, stats) = service.enrich_batch(participants).await?;
//! println!("{} matched", stats.matched);
//! ```

pub mod domain;
pub mod matching;
pub mod retry;
pub mod service;
pub mod traits;
pub mod utmb;

pub use domain::{EnrichmentError, RunnerCandidate, RunnerQuery};
pub use matching::{MatchOutcome, MatchSignals, apply_lookup, match_names};
pub use retry::RetryPolicy;
pub use service::{BatchStats, EnrichmentConfig, EnrichmentService};
pub use traits::RunnerSearchApi;
pub use utmb::UtmbClient;
