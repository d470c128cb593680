//! Quad batch builder and wire types for Dgraph load testing.
//!
//! This crate is the pure, I/O-free half of the load harness: it normalizes
//! free-form strings ([`sanitize`]), accumulates one transaction's worth of
//! graph facts and edges ([`Quads`]), and lowers the batch to the wire-level
//! request shape ([`api::Request`]) submitted by the transport crate.
//!
//! # Example
//!
//! ```
//! use dgraph_quads::{NodeRef, Quads};
//!
//! let mut quads = Quads::new();
//! let person = NodeRef::blank("p");
//! quads.set_str(person.clone(), "name", "Ada");
//!
//! // Reference a node we only know by name; the server resolves it as part
//! // of the same transaction.
//! let team = quads.add_upsert_query("name", "Compilers", "Team");
//! quads.set_edge(person, "member_of", NodeRef::upsert(team));
//!
//! let request = quads.request();
//! assert!(request.query.is_some());
//! assert_eq!(request.set.len(), 2);
//! ```

pub mod api;
mod filter;
mod quads;

pub use api::{Facet, FacetKind, Request};
pub use filter::sanitize;
pub use quads::{NodeRef, Quads, UpsertId};
