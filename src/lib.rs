//! Synthetic graph workload generator and load harness for Dgraph clusters.
//!
//! The binary drives three scenarios against a cluster: batches of
//! unconnected nodes, fully connected subgraphs, and a growing fully
//! connected graph addressed through server-resolved upsert lookups. Batch
//! construction lives in [`dgraph_quads`], transport and retry in
//! [`dgraph_client`]; this crate supplies the CLI, schema text, payload
//! generators, and the scenario loops.

pub mod generate;
pub mod scenarios;
