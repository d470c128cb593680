//! Resilient transactor: schema-alter and mutate with retry/reconnect.

use crate::error::ClientError;
use crate::pool::Pool;
use crate::retry::{classify, FailureClass, RetryPolicy, Step};
use dgraph_quads::{Quads, Request};
use std::time::Duration;
use tracing::warn;

/// Default cap on retries per operation.
pub const DEFAULT_MAX_RETRIES: u32 = 10;
/// Initial wait between retries; doubles on every retryable failure.
const RETRY_BASE_WAIT: Duration = Duration::from_secs(10);
/// Fixed cool-down between tearing a pool down and redialing it.
const RECONNECT_PAUSE: Duration = Duration::from_secs(5);

#[derive(Clone, Copy)]
enum Op<'a> {
    Alter(&'a str),
    Mutate(&'a Request),
}

/// One logical client over a pool of alpha endpoints.
///
/// Requests rotate across the pool's channels. On a transient conflict the
/// same payload is resubmitted after a doubling wait; on a dead channel the
/// whole pool is rebuilt first. The pool swap is whole-value: the new pool
/// is fully dialed before it replaces the old one.
#[derive(Debug)]
pub struct GraphClient {
    endpoints: Vec<String>,
    pool: Option<Pool>,
    max_retries: u32,
    rotation: usize,
}

impl GraphClient {
    /// Dial every endpoint and assemble the client. All-or-nothing: any
    /// unreachable endpoint fails the connect.
    pub async fn connect(endpoints: Vec<String>) -> Result<GraphClient, ClientError> {
        let pool = Pool::connect(&endpoints).await?;
        Ok(GraphClient {
            endpoints,
            pool: Some(pool),
            max_retries: DEFAULT_MAX_RETRIES,
            rotation: 0,
        })
    }

    /// Override the retry cap.
    pub fn with_max_retries(mut self, max_retries: u32) -> GraphClient {
        self.max_retries = max_retries;
        self
    }

    /// True only if a pool exists and every channel in it is ready.
    pub fn ready(&self) -> bool {
        self.pool.as_ref().is_some_and(Pool::ready)
    }

    /// Release every channel. Safe to call repeatedly or before connect.
    pub fn close(&mut self) {
        if let Some(pool) = self.pool.as_mut() {
            pool.close();
        }
        self.pool = None;
    }

    /// Apply a schema-alter operation, retrying per the shared policy.
    pub async fn alter_schema(&mut self, schema: &str) -> Result<(), ClientError> {
        self.run_with_retry("alter schema", Op::Alter(schema)).await
    }

    /// Submit the batch as one commit-now transaction, retrying per the
    /// shared policy. The payload is built once; retries resubmit it
    /// verbatim.
    pub async fn mutate(&mut self, quads: &Quads) -> Result<(), ClientError> {
        let request = quads.request();
        self.run_with_retry("transaction", Op::Mutate(&request))
            .await
    }

    async fn run_with_retry(&mut self, what: &'static str, op: Op<'_>) -> Result<(), ClientError> {
        let mut policy = RetryPolicy::new(self.max_retries, RETRY_BASE_WAIT);
        loop {
            let index = self.rotation;
            self.rotation = self.rotation.wrapping_add(1);

            let result = {
                let pool = self.pool.as_ref().ok_or(ClientError::Closed)?;
                let channel = pool.channel(index);
                match op {
                    Op::Alter(schema) => channel.alter(schema).await,
                    Op::Mutate(request) => channel.mutate(request).await,
                }
            };

            let err = match result {
                Ok(()) => {
                    if policy.retries() > 0 {
                        warn!(
                            "dgraph {what} retry successful (attempt {})",
                            policy.retries()
                        );
                    }
                    return Ok(());
                }
                Err(err) => err,
            };

            let text = err.to_string();
            let class = match classify(&text) {
                // A connection-level failure is a dead channel even when its
                // message matches no known server pattern.
                FailureClass::Fatal if err.is_transport() => FailureClass::BrokenTransport,
                class => class,
            };

            match policy.apply(class) {
                Step::Fail => return Err(ClientError::Unclassified(text)),
                Step::Exhausted { attempts } => {
                    return Err(ClientError::Exhausted {
                        op: what,
                        attempts,
                        last: text,
                    })
                }
                Step::Backoff(wait) => {
                    warn!(
                        "dgraph {what} failed ({text}), retrying in {wait:?} (attempt {})",
                        policy.retries()
                    );
                    tokio::time::sleep(wait).await;
                }
                Step::Reconnect { wait } => {
                    warn!(
                        "dgraph {what} hit a dead transport ({text}), rebuilding the pool \
                         (attempt {})",
                        policy.retries()
                    );
                    if let Err(reopen_err) = self.reopen().await {
                        return Err(ClientError::Reconnect(Box::new(reopen_err)));
                    }
                    tokio::time::sleep(wait).await;
                }
            }
        }
    }

    /// Tear the pool down, pause, and dial a replacement. The new pool is
    /// fully built before it is published.
    async fn reopen(&mut self) -> Result<(), ClientError> {
        if let Some(pool) = self.pool.as_mut() {
            pool.close();
        }
        self.pool = None;
        tokio::time::sleep(RECONNECT_PAUSE).await;
        let pool = Pool::connect(&self.endpoints).await?;
        self.pool = Some(pool);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn connect_with_no_endpoints_fails() {
        let err = GraphClient::connect(Vec::new()).await.unwrap_err();
        assert!(matches!(err, ClientError::NoEndpoints));
    }
}
