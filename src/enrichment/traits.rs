//! Trait definitions for external API clients.
//!
//! These traits enable dependency injection and mocking for tests.
//! Production code uses the real client implementation, while tests
//! can substitute mock implementations.
//!
//! # Example
//!
//! ```ignore
//! use utmb_enricher::enrichment::traits::RunnerSearchApi;
//!
//! // In production code:
//! async fn lookup<T: RunnerSearchApi>(client: &T, query: &RunnerQuery) {
//!     let candidates = client.search(query).await?;
//! }
//!
//! // In tests:
//! struct MockRunnerSearch { ... }
//! impl RunnerSearchApi for MockRunnerSearch { ... }
//! ```

use async_trait::async_trait;

use super::domain::{EnrichmentError, RunnerCandidate, RunnerQuery};

/// Trait for runner database search.
///
/// Implement this trait to create mock implementations for testing.
#[async_trait]
pub trait RunnerSearchApi: Send + Sync {
    /// Search for runners matching the query, best candidate first.
    async fn search(&self, query: &RunnerQuery) -> Result<Vec<RunnerCandidate>, EnrichmentError>;
}

// Implement traits for real clients

#[async_trait]
impl RunnerSearchApi for super::utmb::UtmbClient {
    async fn search(&self, query: &RunnerQuery) -> Result<Vec<RunnerCandidate>, EnrichmentError> {
        self.search(query).await
    }
}

/// Mock runner search for testing.
///
/// Returns configurable responses for testing different scenarios.
#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    /// Mock runner search keyed by participant name.
    #[derive(Default)]
    pub struct MockRunnerSearch {
        /// Candidates returned per queried name; unknown names get no candidates
        pub results: HashMap<String, Vec<RunnerCandidate>>,
        /// Error to return for every query (takes precedence over results)
        pub error: Option<EnrichmentError>,
        /// Transient failures to emit per name before answering
        pub transient_failures: usize,
        /// Artificial latency per name
        pub delays: HashMap<String, Duration>,
        calls: AtomicUsize,
        in_flight: AtomicUsize,
        max_in_flight: AtomicUsize,
        failures_seen: Mutex<HashMap<String, usize>>,
        queries: Mutex<Vec<RunnerQuery>>,
    }

    impl MockRunnerSearch {
        /// Create a mock that never finds anyone.
        pub fn no_matches() -> Self {
            Self::default()
        }

        /// Create a mock returning one candidate for one name.
        pub fn single(name: &str, candidate: RunnerCandidate) -> Self {
            Self::default().with_result(name, candidate)
        }

        /// Create a mock that returns an error.
        pub fn with_error(error: EnrichmentError) -> Self {
            Self {
                error: Some(error),
                ..Default::default()
            }
        }

        pub fn with_result(mut self, name: &str, candidate: RunnerCandidate) -> Self {
            self.results.insert(name.to_string(), vec![candidate]);
            self
        }

        pub fn with_delay(mut self, name: &str, delay: Duration) -> Self {
            self.delays.insert(name.to_string(), delay);
            self
        }

        pub fn with_transient_failures(mut self, count: usize) -> Self {
            self.transient_failures = count;
            self
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        pub fn max_in_flight(&self) -> usize {
            self.max_in_flight.load(Ordering::SeqCst)
        }

        pub fn queries(&self) -> Vec<RunnerQuery> {
            self.queries.lock().unwrap().clone()
        }

        fn take_failure(&self, name: &str) -> bool {
            let mut seen = self.failures_seen.lock().unwrap();
            let count = seen.entry(name.to_string()).or_insert(0);
            if *count < self.transient_failures {
                *count += 1;
                true
            } else {
                false
            }
        }
    }

    #[async_trait]
    impl RunnerSearchApi for MockRunnerSearch {
        async fn search(
            &self,
            query: &RunnerQuery,
        ) -> Result<Vec<RunnerCandidate>, EnrichmentError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.queries.lock().unwrap().push(query.clone());

            let now = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.max_in_flight.fetch_max(now, Ordering::SeqCst);
            let delay = self.delays.get(&query.name).copied().unwrap_or(Duration::from_millis(1));
            tokio::time::sleep(delay).await;
            self.in_flight.fetch_sub(1, Ordering::SeqCst);

            if let Some(ref err) = self.error {
                return Err(err.clone());
            }
            if self.take_failure(&query.name) {
                return Err(EnrichmentError::Network("connection reset".to_string()));
            }
            Ok(self.results.get(&query.name).cloned().unwrap_or_default())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;
        use crate::model::Sex;
        use crate::test_utils::candidate;

        fn query(name: &str) -> RunnerQuery {
            RunnerQuery {
                name: name.to_string(),
                sex: Sex::M,
                nationality: "FR".to_string(),
            }
        }

        #[tokio::test]
        async fn test_mock_no_matches() {
            let mock = MockRunnerSearch::no_matches();
            let results = mock.search(&query("Bob SMITH")).await.unwrap();
            assert!(results.is_empty());
            assert_eq!(mock.calls(), 1);
        }

        #[tokio::test]
        async fn test_mock_single_match() {
            let mock = MockRunnerSearch::single("Bob SMITH", candidate("SMITH Bob", 700));
            let results = mock.search(&query("Bob SMITH")).await.unwrap();
            assert_eq!(results.len(), 1);
            assert_eq!(results[0].index, 700);
        }

        #[tokio::test]
        async fn test_mock_error() {
            let mock = MockRunnerSearch::with_error(EnrichmentError::HttpStatus(400));
            let result = mock.search(&query("Bob SMITH")).await;
            assert!(matches!(result, Err(EnrichmentError::HttpStatus(400))));
        }

        #[tokio::test]
        async fn test_mock_transient_failures() {
            let mock = MockRunnerSearch::no_matches().with_transient_failures(1);
            assert!(mock.search(&query("Bob")).await.is_err());
            assert!(mock.search(&query("Bob")).await.is_ok());
            assert_eq!(mock.queries().len(), 2);
        }
    }
}
