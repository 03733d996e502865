//! Enrichment service - looks up a batch of participants concurrently
//!
//! A batch is the participants of one sex within one race:
//! 1. Build one runner query per participant
//! 2. Run the lookups with at most `max_concurrent_requests` in flight,
//!    retrying transient failures with jitter
//! 3. Wait for every lookup of the batch to finish
//! 4. Apply the top candidate of each lookup to its participant, in input order

use futures::{StreamExt, stream};

use crate::config::{Config, EnrichmentSettings};
use crate::enrichment::{
    domain::{EnrichmentError, RunnerCandidate, RunnerQuery},
    matching::{self, MatchOutcome},
    retry::RetryPolicy,
    traits::RunnerSearchApi,
    utmb::UtmbClient,
};
use crate::model::Participant;

/// Configuration for the enrichment service
#[derive(Debug, Clone)]
pub struct EnrichmentConfig {
    /// Upper bound on in-flight lookups
    pub max_concurrent_requests: usize,
    /// Prefix for accepted runners' profile links
    pub profile_base_url: String,
    pub retry: RetryPolicy,
}

impl Default for EnrichmentConfig {
    fn default() -> Self {
        let settings = EnrichmentSettings::default();
        Self {
            max_concurrent_requests: settings.max_concurrent_requests,
            profile_base_url: settings.profile_base_url,
            retry: RetryPolicy::default(),
        }
    }
}

impl EnrichmentConfig {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_concurrent_requests: config.enrichment.max_concurrent_requests.max(1),
            profile_base_url: config.enrichment.profile_base_url.clone(),
            retry: RetryPolicy::from_config(&config.retry),
        }
    }
}

/// Match counts for one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStats {
    pub matched: usize,
    pub mismatched: usize,
    pub not_found: usize,
}

impl BatchStats {
    fn record(&mut self, outcome: MatchOutcome) {
        match outcome {
            MatchOutcome::Accepted(_) => self.matched += 1,
            MatchOutcome::Rejected => self.mismatched += 1,
            MatchOutcome::NoCandidate => self.not_found += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.matched + self.mismatched + self.not_found
    }
}

/// Service for enriching participants from the runner database
pub struct EnrichmentService<A: RunnerSearchApi = UtmbClient> {
    config: EnrichmentConfig,
    api: A,
}

impl EnrichmentService<UtmbClient> {
    /// Create a service backed by the UTMB search client
    pub fn from_config(config: &Config) -> Result<Self, EnrichmentError> {
        let client = UtmbClient::new(&config.enrichment)?;
        Ok(Self::new(EnrichmentConfig::from_config(config), client))
    }
}

impl<A: RunnerSearchApi> EnrichmentService<A> {
    pub fn new(config: EnrichmentConfig, api: A) -> Self {
        Self { config, api }
    }

    #[cfg(test)]
    pub(crate) fn api(&self) -> &A {
        &self.api
    }

    /// Look up one participant, retrying transient failures
    async fn lookup(&self, query: &RunnerQuery) -> Result<Vec<RunnerCandidate>, EnrichmentError> {
        self.config
            .retry
            .run(&query.name, || self.api.search(query))
            .await
    }

    /// Enrich a batch of participants.
    ///
    /// Returns the same participants in the same order. No participant is
    /// touched until every lookup of the batch has completed; a lookup that
    /// fails for good fails the whole batch.
    pub async fn enrich_batch(
        &self,
        participants: Vec<Participant>,
    ) -> Result<(Vec<Participant>, BatchStats), EnrichmentError> {
        let mut stats = BatchStats::default();
        if participants.is_empty() {
            return Ok((participants, stats));
        }

        let queries: Vec<RunnerQuery> = participants
            .iter()
            .map(RunnerQuery::for_participant)
            .collect();

        // `buffered` yields in input order regardless of completion order
        let lookups: Vec<Result<Vec<RunnerCandidate>, EnrichmentError>> = stream::iter(&queries)
            .map(|query| self.lookup(query))
            .buffered(self.config.max_concurrent_requests.max(1))
            .collect()
            .await;
        let lookups = lookups.into_iter().collect::<Result<Vec<_>, _>>()?;

        let enriched = participants
            .into_iter()
            .zip(lookups)
            .map(|(mut participant, candidates)| {
                let outcome = matching::apply_lookup(
                    &mut participant,
                    candidates.first(),
                    &self.config.profile_base_url,
                );
                stats.record(outcome);
                participant
            })
            .collect();

        tracing::info!(
            matched = stats.matched,
            mismatched = stats.mismatched,
            not_found = stats.not_found,
            "Batch enriched"
        );
        Ok((enriched, stats))
    }
}
