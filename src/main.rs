//! Command-line interface for dgraph-stress.
//!
//! # Usage Examples
//!
//! ```bash
//! # Default fully-connected workload against a local alpha
//! dgraph-stress --dgraph-addr http://127.0.0.1:9080
//!
//! # Small unconnected workload against a three-alpha cluster
//! dgraph-stress --scenario unconnected \
//!   --dgraph-addr http://alpha1:9080 \
//!   --dgraph-addr http://alpha2:9080 \
//!   --dgraph-addr http://alpha3:9080 \
//!   --node-type-count 10 --node-pred-count 10 --rounds 1000
//! ```
//!
//! Timing output is CSV on stdout; diagnostics go to stderr and are
//! controlled with `RUST_LOG`.

use anyhow::Context;
use clap::{Parser, ValueEnum};
use dgraph_client::GraphClient;
use dgraph_stress::generate;
use dgraph_stress::scenarios::{self, ScenarioConfig};

#[derive(Parser)]
#[command(name = "dgraph-stress", about = "Create a synthetic graph workload against a Dgraph cluster")]
struct Cli {
    /// Dgraph alpha address (host:port or URL); repeat for multiple servers
    #[arg(long, env = "DGRAPH_ADDR", default_value = "http://127.0.0.1:9080")]
    dgraph_addr: Vec<String>,

    /// Number of node types
    #[arg(long, default_value_t = 50)]
    node_type_count: usize,

    /// Number of predicates per node
    #[arg(long, default_value_t = 50)]
    node_pred_count: usize,

    /// Length of the string stored in each predicate
    #[arg(long, default_value_t = 20)]
    pred_string_len: usize,

    /// Number of rounds to perform
    #[arg(long, default_value_t = 500_000)]
    rounds: usize,

    /// Workload shape to run
    #[arg(long, value_enum, default_value = "fully-connected")]
    scenario: Scenario,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Scenario {
    /// Unconnected nodes, same batch every round
    Unconnected,
    /// Fully connected subgraphs, same batch every round
    ConnectedSubgraphs,
    /// Growing fully connected graph via upsert lookups
    FullyConnected,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    println!("# dgraph-addr(s): {:?}", cli.dgraph_addr);

    let mut client = GraphClient::connect(cli.dgraph_addr.clone())
        .await
        .context("connecting to dgraph")?;

    let schema = generate::schema_text(cli.node_type_count, cli.node_pred_count);
    println!("Schema:\n{schema}");
    client
        .alter_schema(&schema)
        .await
        .context("loading schema")?;

    let cfg = ScenarioConfig {
        node_type_count: cli.node_type_count,
        node_pred_count: cli.node_pred_count,
        pred_string_len: cli.pred_string_len,
        rounds: cli.rounds,
    };

    let result = match cli.scenario {
        Scenario::Unconnected => scenarios::run_unconnected(&mut client, &cfg).await,
        Scenario::ConnectedSubgraphs => {
            scenarios::run_connected_subgraphs(&mut client, &cfg).await
        }
        Scenario::FullyConnected => scenarios::run_fully_connected(&mut client, &cfg).await,
    };
    client.close();
    result.context("running scenario")?;

    Ok(())
}
