//! One HTTP transport channel to a single alpha endpoint.

use dgraph_quads::Request;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, warn};

/// Per-attempt connect timeout while dialing.
const CONNECT_TIMEOUT: Duration = Duration::from_secs(20);
/// Initial delay between dial attempts.
const DIAL_BASE_DELAY: Duration = Duration::from_secs(1);
/// Ceiling for the dial backoff delay.
const DIAL_MAX_DELAY: Duration = Duration::from_secs(30);
/// Dial attempts before the endpoint is reported unreachable.
const DIAL_MAX_ATTEMPTS: u32 = 10;

/// Failure of a single request on one channel. The text form is what the
/// transactor classifies, so server messages pass through unmodified.
#[derive(Error, Debug)]
pub enum RequestError {
    #[error("{0}")]
    Http(#[from] reqwest::Error),

    #[error("{0}")]
    Server(String),
}

impl RequestError {
    /// True when the failure happened at the connection level rather than
    /// inside the server, independent of what the message text says.
    pub fn is_transport(&self) -> bool {
        matches!(self, RequestError::Http(e) if e.is_connect())
    }
}

/// Transport state of a channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    Ready,
    Shutdown,
}

/// One transport channel to one alpha endpoint.
///
/// A channel is dialed once, used for any number of requests, and marked
/// shutdown when its pool is torn down. There is no in-place reconnect; a
/// broken channel is replaced together with the rest of its pool.
#[derive(Debug)]
pub struct Channel {
    endpoint: String,
    http: reqwest::Client,
    state: ChannelState,
}

impl Channel {
    /// Dial one endpoint: probe its health endpoint until it answers,
    /// backing off exponentially up to a capped delay. Connection-level
    /// failures are retried; anything else fails the dial immediately.
    pub async fn dial(endpoint: &str) -> Result<Channel, reqwest::Error> {
        let endpoint = normalize_endpoint(endpoint);
        let http = reqwest::Client::builder()
            .connect_timeout(CONNECT_TIMEOUT)
            .build()?;

        let mut delay = DIAL_BASE_DELAY;
        let mut attempt = 0;
        loop {
            match probe(&http, &endpoint).await {
                Ok(()) => {
                    debug!("dialed dgraph alpha at {endpoint}");
                    return Ok(Channel {
                        endpoint,
                        http,
                        state: ChannelState::Ready,
                    });
                }
                Err(e) if e.is_connect() || e.is_timeout() => {
                    attempt += 1;
                    if attempt >= DIAL_MAX_ATTEMPTS {
                        return Err(e);
                    }
                    warn!(
                        "dial of {endpoint} failed ({e}), retrying in {delay:?} (attempt {attempt})"
                    );
                    tokio::time::sleep(delay).await;
                    delay = next_dial_delay(delay);
                }
                Err(e) => return Err(e),
            }
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn state(&self) -> ChannelState {
        self.state
    }

    /// Mark the channel released. The underlying HTTP client is dropped
    /// with the channel; this only flips the observable state.
    pub fn close(&mut self) {
        self.state = ChannelState::Shutdown;
    }

    /// Submit a schema-alter operation. The schema text is opaque here.
    pub async fn alter(&self, schema: &str) -> Result<(), RequestError> {
        let url = format!("{}/alter", self.endpoint);
        let resp = self.http.post(&url).body(schema.to_string()).send().await?;
        check(resp).await
    }

    /// Submit a commit-now mutate request.
    pub async fn mutate(&self, request: &Request) -> Result<(), RequestError> {
        let url = format!("{}/mutate?commitNow=true", self.endpoint);
        let resp = self.http.post(&url).json(request).send().await?;
        check(resp).await
    }
}

/// Doubling dial backoff, capped. The cap applies to dialing only; the
/// transactor's retry backoff grows unbounded.
fn next_dial_delay(delay: Duration) -> Duration {
    (delay * 2).min(DIAL_MAX_DELAY)
}

async fn probe(http: &reqwest::Client, endpoint: &str) -> Result<(), reqwest::Error> {
    http.get(format!("{endpoint}/health"))
        .send()
        .await?
        .error_for_status()?;
    Ok(())
}

async fn check(resp: reqwest::Response) -> Result<(), RequestError> {
    let status = resp.status();
    let body = resp.text().await?;
    match response_error(status, &body) {
        Some(message) => Err(RequestError::Server(message)),
        None => Ok(()),
    }
}

/// Ensure the endpoint has a scheme and no trailing slash. Addresses are
/// commonly given as bare `host:port`.
fn normalize_endpoint(endpoint: &str) -> String {
    let trimmed = endpoint.trim_end_matches('/');
    if trimmed.contains("://") {
        trimmed.to_string()
    } else {
        format!("http://{trimmed}")
    }
}

#[derive(Deserialize)]
struct ApiResponse {
    #[serde(default)]
    errors: Vec<ApiError>,
}

#[derive(Deserialize)]
struct ApiError {
    message: String,
}

/// Extract the server-reported error from a response, if any. The server
/// reports failures in an `errors` array even on HTTP 200, so the body is
/// inspected before the status line.
fn response_error(status: reqwest::StatusCode, body: &str) -> Option<String> {
    if let Ok(api) = serde_json::from_str::<ApiResponse>(body) {
        if !api.errors.is_empty() {
            let joined = api
                .errors
                .into_iter()
                .map(|e| e.message)
                .collect::<Vec<_>>()
                .join("; ");
            return Some(joined);
        }
    }
    if !status.is_success() {
        return Some(format!("server returned {status}: {body}"));
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::StatusCode;

    #[test]
    fn normalize_adds_scheme_to_bare_addresses() {
        assert_eq!(normalize_endpoint("127.0.0.1:9080"), "http://127.0.0.1:9080");
        assert_eq!(
            normalize_endpoint("http://alpha1:9080/"),
            "http://alpha1:9080"
        );
        assert_eq!(
            normalize_endpoint("https://alpha1:9080"),
            "https://alpha1:9080"
        );
    }

    #[test]
    fn dial_delay_doubles_up_to_the_cap() {
        let mut delay = DIAL_BASE_DELAY;
        let mut seen = Vec::new();
        for _ in 0..8 {
            seen.push(delay);
            delay = next_dial_delay(delay);
        }
        assert_eq!(seen[0], Duration::from_secs(1));
        assert_eq!(seen[1], Duration::from_secs(2));
        assert_eq!(seen[5], Duration::from_secs(30));
        assert_eq!(seen[7], Duration::from_secs(30));
    }

    #[test]
    fn error_array_is_reported_even_on_http_200() {
        let body = r#"{"errors":[{"message":"Transaction has been aborted. Please retry"}]}"#;
        let msg = response_error(StatusCode::OK, body).unwrap();
        assert!(msg.contains("aborted"));
    }

    #[test]
    fn multiple_errors_are_joined() {
        let body = r#"{"errors":[{"message":"first"},{"message":"second"}]}"#;
        assert_eq!(response_error(StatusCode::OK, body).unwrap(), "first; second");
    }

    #[test]
    fn success_body_is_clean() {
        assert_eq!(response_error(StatusCode::OK, r#"{"data":{"code":"Success"}}"#), None);
        assert_eq!(response_error(StatusCode::OK, "not json"), None);
    }

    #[test]
    fn non_success_status_is_reported() {
        let msg = response_error(StatusCode::INTERNAL_SERVER_ERROR, "boom").unwrap();
        assert!(msg.contains("500"));
        assert!(msg.contains("boom"));
    }
}
