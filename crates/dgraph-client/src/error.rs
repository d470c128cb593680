//! Error types for the Dgraph client.

use thiserror::Error;

/// Errors surfaced by [`GraphClient`](crate::GraphClient) operations.
///
/// Transient write conflicts and broken transport are not variants here;
/// they are internal retry states. Only outcomes that end an operation
/// appear in this taxonomy.
#[derive(Error, Debug)]
pub enum ClientError {
    /// No endpoints were supplied at connect time.
    #[error("must provide at least one dgraph endpoint")]
    NoEndpoints,

    /// One or more endpoints could not be dialed at startup. The pool is
    /// all-or-nothing, so a single unreachable endpoint fails the connect.
    #[error("unable to dial dgraph alpha server(s) at {unreachable:?}: {reason}")]
    Dial {
        unreachable: Vec<String>,
        reason: String,
    },

    /// The pool could not be rebuilt after a transport failure. The
    /// original operation is not retried past this point.
    #[error("unable to reconnect to dgraph: {0}")]
    Reconnect(#[source] Box<ClientError>),

    /// A retryable failure persisted past the attempt cap.
    #[error("unable to perform dgraph {op} in {attempts} attempts: {last}")]
    Exhausted {
        op: &'static str,
        attempts: u32,
        last: String,
    },

    /// Error text matching no known transient pattern. Fatal immediately;
    /// the underlying message is preserved verbatim.
    #[error("{0}")]
    Unclassified(String),

    /// Operation issued after [`close`](crate::GraphClient::close).
    #[error("client is closed")]
    Closed,
}
