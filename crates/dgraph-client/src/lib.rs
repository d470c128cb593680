//! Resilient connection pool and transactor for Dgraph load testing.
//!
//! This crate owns the transport half of the load harness: it dials one
//! channel per configured alpha endpoint, fronts them with a single
//! [`GraphClient`], and wraps schema-alter and mutate submissions in a
//! retry/reconnect state machine that distinguishes transient write
//! conflicts from dead transport from fatal errors.
//!
//! # Overview
//!
//! ```ignore
//! use dgraph_client::GraphClient;
//! use dgraph_quads::{NodeRef, Quads};
//!
//! let mut client = GraphClient::connect(vec!["http://localhost:9080".into()]).await?;
//! client.alter_schema("name: string @index(term) .").await?;
//!
//! let mut quads = Quads::new();
//! quads.set_str(NodeRef::blank("a"), "name", "A");
//! client.mutate(&quads).await?;
//! client.close();
//! ```

mod channel;
mod client;
mod error;
mod pool;
mod retry;

pub use channel::{Channel, ChannelState, RequestError};
pub use client::{GraphClient, DEFAULT_MAX_RETRIES};
pub use error::ClientError;
pub use pool::Pool;
pub use retry::{classify, FailureClass, RetryPolicy, Step};
