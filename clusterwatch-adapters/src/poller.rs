//! Submit / poll / delete lifecycle for server-side queries.
//!
//! Some NiFi searches (provenance in particular) are asynchronous: a POST
//! creates a query resource, repeated GETs report progress until the query
//! is `finished`, and a DELETE releases it. [`QueryPoller`] drives that
//! lifecycle with bounded exponential backoff, an overall deadline and a
//! cancellation token, and always deletes the query once it was created.
//!
//! ## Example
//!
//! ```rust,no_run
//! # use clusterwatch_adapters::poller::{AsyncQuery, PollPolicy, QueryPoller};
//! # async fn example(query: &dyn AsyncQuery) -> Result<(), clusterwatch_adapters::AdapterError> {
//! let poller = QueryPoller::new(PollPolicy::default());
//! let results = poller.run(query).await?;
//! println!("{}", results);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use serde_json::Value;
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::AdapterError;

/// Default delay before the second poll.
pub const DEFAULT_INITIAL_DELAY: Duration = Duration::from_millis(250);

/// Default cap on the delay between polls.
pub const DEFAULT_MAX_DELAY: Duration = Duration::from_secs(2);

/// Default overall wait before giving up.
pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(60);

/// State of a server-side query as reported by submit or poll.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryStatus {
    pub id: String,
    pub finished: bool,
    /// Results payload; meaningful once `finished` is set.
    pub results: Value,
}

/// A query resource with a submit / poll / cleanup lifecycle.
#[async_trait]
pub trait AsyncQuery: Send + Sync {
    /// Create the query on the server.
    async fn submit(&self) -> Result<QueryStatus, AdapterError>;

    /// Fetch the current state of the query.
    async fn poll(&self, id: &str) -> Result<QueryStatus, AdapterError>;

    /// Delete the query on the server.
    async fn cleanup(&self, id: &str) -> Result<(), AdapterError>;
}

/// Backoff and deadline for polling.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollPolicy {
    pub initial_delay: Duration,
    pub max_delay: Duration,
    pub max_wait: Duration,
}

impl Default for PollPolicy {
    fn default() -> Self {
        Self {
            initial_delay: DEFAULT_INITIAL_DELAY,
            max_delay: DEFAULT_MAX_DELAY,
            max_wait: DEFAULT_MAX_WAIT,
        }
    }
}

impl PollPolicy {
    /// Delays between consecutive polls: doubling from `initial_delay`,
    /// capped at `max_delay`.
    ///
    /// With defaults: 250ms, 500ms, 1s, 2s, 2s, ...
    pub fn delays(&self) -> impl Iterator<Item = Duration> {
        let max_delay = self.max_delay;
        std::iter::successors(Some(self.initial_delay.min(max_delay)), move |d| {
            Some(d.saturating_mul(2).min(max_delay))
        })
    }
}

/// Runs [`AsyncQuery`] lifecycles.
#[derive(Debug, Clone)]
pub struct QueryPoller {
    policy: PollPolicy,
    cancel: CancellationToken,
}

impl QueryPoller {
    pub fn new(policy: PollPolicy) -> Self {
        Self {
            policy,
            cancel: CancellationToken::new(),
        }
    }

    /// Stop waiting as soon as `cancel` fires.
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    pub fn policy(&self) -> &PollPolicy {
        &self.policy
    }

    /// Run the query to completion and return its results payload.
    pub async fn run<Q>(&self, query: &Q) -> Result<Value, AdapterError>
    where
        Q: AsyncQuery + ?Sized,
    {
        self.run_with(query, Ok).await
    }

    /// Run the query and hand its results to `consume`.
    ///
    /// Once the submit succeeded the query is deleted whatever happens
    /// afterwards: poll failure, timeout, cancellation or a failing
    /// `consume`. The first error is returned; a cleanup error after an
    /// earlier error is only logged.
    pub async fn run_with<Q, T, F>(&self, query: &Q, consume: F) -> Result<T, AdapterError>
    where
        Q: AsyncQuery + ?Sized,
        F: FnOnce(Value) -> Result<T, AdapterError>,
    {
        let submitted = query.submit().await?;
        let id = submitted.id;
        debug!(query_id = %id, "query submitted");

        let outcome = match self.wait_for(query, &id).await {
            Ok(results) => consume(results),
            Err(e) => Err(e),
        };

        let cleanup = query.cleanup(&id).await;
        debug!(query_id = %id, ok = cleanup.is_ok(), "query deleted");

        match (outcome, cleanup) {
            (Ok(value), Ok(())) => Ok(value),
            (Ok(_), Err(e)) => Err(e),
            (Err(e), Ok(())) => Err(e),
            (Err(e), Err(cleanup_err)) => {
                warn!(query_id = %id, error = %cleanup_err, "failed to delete query");
                Err(e)
            }
        }
    }

    async fn wait_for<Q>(&self, query: &Q, id: &str) -> Result<Value, AdapterError>
    where
        Q: AsyncQuery + ?Sized,
    {
        let started = Instant::now();
        let mut delays = self.policy.delays();
        let mut polls = 0usize;

        loop {
            if self.cancel.is_cancelled() {
                return Err(AdapterError::Cancelled);
            }

            let status = query.poll(id).await?;
            polls += 1;
            if status.finished {
                debug!(query_id = %id, polls, "query finished");
                return Ok(status.results);
            }

            let waited = started.elapsed();
            if waited >= self.policy.max_wait {
                return Err(AdapterError::PollTimeout {
                    id: id.to_string(),
                    waited,
                });
            }

            let delay = delays
                .next()
                .unwrap_or(self.policy.max_delay)
                .min(self.policy.max_wait - waited);

            tokio::select! {
                _ = self.cancel.cancelled() => return Err(AdapterError::Cancelled),
                _ = tokio::time::sleep(delay) => {}
            }
        }
    }
}
