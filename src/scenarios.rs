//! Scenario drivers: build a batch shape, submit it round after round, and
//! print one CSV timing line per round to stdout.
//!
//! The CSV lines are the program's measurement output; diagnostics go to
//! tracing so they can be filtered out without losing the data.

use crate::generate::{less_random_string, random_string};
use dgraph_client::{ClientError, GraphClient};
use dgraph_quads::{NodeRef, Quads};
use std::time::Instant;
use tracing::debug;

/// Fan-out knobs shared by every scenario.
#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub node_type_count: usize,
    pub node_pred_count: usize,
    pub pred_string_len: usize,
    pub rounds: usize,
}

/// Batch of unconnected nodes: one blank node per node type carrying its
/// type, name, and random-string predicates.
pub fn build_unconnected_batch(cfg: &ScenarioConfig) -> Quads {
    let mut quads = Quads::new();
    for i in 0..cfg.node_type_count {
        let subject = NodeRef::blank(&i.to_string());
        quads.set_str(subject.clone(), "dgraph.type", &format!("Node{i}"));
        quads.set_str(subject.clone(), "name", &format!("Node{i}"));
        for j in 0..cfg.node_pred_count {
            quads.set_str(
                subject.clone(),
                &format!("pred{j}"),
                &random_string(cfg.pred_string_len),
            );
        }
    }
    quads
}

/// As [`build_unconnected_batch`], plus a `LINKk` edge from every node to
/// every node, forming fully connected subgraphs within the batch.
pub fn build_connected_subgraphs_batch(cfg: &ScenarioConfig) -> Quads {
    let mut quads = build_unconnected_batch(cfg);
    for i in 0..cfg.node_type_count {
        let subject = NodeRef::blank(&i.to_string());
        for k in 0..cfg.node_type_count {
            quads.set_edge(
                subject.clone(),
                &format!("LINK{k}"),
                NodeRef::blank(&k.to_string()),
            );
        }
    }
    quads
}

/// Add one fully-connected round to the batch. Every node is addressed by
/// an upsert lookup on its name, so repeated rounds keep writing to the
/// same nodes; node type 0 additionally chains a `NEXT` edge to its
/// next-round successor.
pub fn add_fully_connected_round(quads: &mut Quads, cfg: &ScenarioConfig, round: usize) {
    for i in 0..cfg.node_type_count {
        let node_name = format!("Node-{round}.{i}");
        let node_type = format!("Node{i}");
        let current = NodeRef::upsert(quads.add_upsert_query("name", &node_name, &node_type));

        quads.set_str(current.clone(), "dgraph.type", &node_type);
        quads.set_str(current.clone(), "name", &node_name);
        for j in 0..cfg.node_pred_count {
            quads.set_str(
                current.clone(),
                &format!("pred{j}"),
                &less_random_string(cfg.pred_string_len),
            );
        }

        if i == 0 {
            let next_name = format!("Node-{}.{i}", round + 1);
            let next = NodeRef::upsert(quads.add_upsert_query("name", &next_name, &node_type));
            quads.set_str(next.clone(), "dgraph.type", &node_type);
            quads.set_str(next.clone(), "name", &next_name);
            quads.set_edge(current.clone(), "NEXT", next);
        }

        for k in 0..cfg.node_type_count {
            let link = quads.add_upsert_query("name", &format!("Node-{round}.{k}"), &format!("Node{k}"));
            quads.set_edge(current.clone(), &format!("LINK{k}"), NodeRef::upsert(link));
        }
    }
}

/// Submit the same batch of unconnected nodes every round.
pub async fn run_unconnected(
    client: &mut GraphClient,
    cfg: &ScenarioConfig,
) -> Result<(), ClientError> {
    let quads = build_unconnected_batch(cfg);
    println!(
        "# Test Unconnected: {} rounds; {} node types; {} predicates",
        cfg.rounds, cfg.node_type_count, cfg.node_pred_count
    );
    println!("round,time (ms)");
    for round in 0..cfg.rounds {
        let start = Instant::now();
        client.mutate(&quads).await?;
        println!("{round},{}", start.elapsed().as_millis());
    }
    Ok(())
}

/// Submit the same batch of fully connected subgraphs every round.
pub async fn run_connected_subgraphs(
    client: &mut GraphClient,
    cfg: &ScenarioConfig,
) -> Result<(), ClientError> {
    let quads = build_connected_subgraphs_batch(cfg);
    println!(
        "# Test Connected Subgraphs: {} rounds; {} node types; {} predicates",
        cfg.rounds, cfg.node_type_count, cfg.node_pred_count
    );
    println!("round,time (ms)");
    for round in 0..cfg.rounds {
        let start = Instant::now();
        client.mutate(&quads).await?;
        println!("{round},{}", start.elapsed().as_millis());
    }
    Ok(())
}

/// Rebuild the batch every round, addressing nodes through upsert lookups
/// so the graph grows into one fully connected whole across rounds.
pub async fn run_fully_connected(
    client: &mut GraphClient,
    cfg: &ScenarioConfig,
) -> Result<(), ClientError> {
    let mut quads = Quads::new();
    println!(
        "# Test Fully Connected: {} rounds; {} node types; {} predicates of {} length",
        cfg.rounds, cfg.node_type_count, cfg.node_pred_count, cfg.pred_string_len
    );
    println!("round,quad-count,time (ms)");
    for round in 0..cfg.rounds {
        add_fully_connected_round(&mut quads, cfg, round);
        debug!("round {round} batch:\n{quads}");

        let start = Instant::now();
        client.mutate(&quads).await?;
        println!("{round},{},{}", quads.size(), start.elapsed().as_millis());
        quads.clear();
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_cfg() -> ScenarioConfig {
        ScenarioConfig {
            node_type_count: 3,
            node_pred_count: 2,
            pred_string_len: 20,
            rounds: 1,
        }
    }

    #[test]
    fn unconnected_batch_has_no_query_block() {
        let cfg = small_cfg();
        let quads = build_unconnected_batch(&cfg);
        // type + name + preds per node type
        assert_eq!(quads.size(), cfg.node_type_count * (2 + cfg.node_pred_count));
        assert!(quads.request().query.is_none());
    }

    #[test]
    fn connected_subgraphs_batch_adds_all_edges() {
        let cfg = small_cfg();
        let quads = build_connected_subgraphs_batch(&cfg);
        let expected = cfg.node_type_count * (2 + cfg.node_pred_count)
            + cfg.node_type_count * cfg.node_type_count;
        assert_eq!(quads.size(), expected);
        assert!(quads.request().query.is_none());
    }

    #[test]
    fn fully_connected_round_resolves_every_node_by_upsert() {
        let cfg = small_cfg();
        let mut quads = Quads::new();
        add_fully_connected_round(&mut quads, &cfg, 0);
        let query = quads.request().query.expect("query block");
        // One stanza per node of this round, plus the next-round successor
        // of node type 0.
        assert_eq!(
            query.matches("as uid").count(),
            cfg.node_type_count + 1
        );
        assert!(query.contains("eq(name, \"Node-0.0\")"));
        assert!(query.contains("eq(name, \"Node-1.0\")"));
        assert!(query.contains("@filter(type(Node2))"));
    }

    #[test]
    fn fully_connected_round_reuses_variables_for_link_edges() {
        let cfg = small_cfg();
        let mut quads = Quads::new();
        add_fully_connected_round(&mut quads, &cfg, 4);
        // Properties: (2 + preds) per node + 2 for the successor node.
        // Edges: NEXT + the full LINK fan-out.
        let props = cfg.node_type_count * (2 + cfg.node_pred_count) + 2;
        let edges = 1 + cfg.node_type_count * cfg.node_type_count;
        assert_eq!(quads.size(), props + edges);
    }
}
