use clap::{Parser, Subcommand};
use svs_common::config::{RouterConfig, ShardConfig};
use svs_common::metrics::ScoreMetric;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "svs", about = "Sharded vector similarity search service")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start a shard node serving a local vector index
    Shard {
        /// Port to listen on
        port: u16,

        /// Vector dimension this shard accepts
        dimensions: usize,

        /// Similarity metric for the local index
        #[arg(long, default_value = "inner_product")]
        metric: ScoreMetric,
    },

    /// Start the router in front of a set of shard nodes
    Router {
        /// Port to listen on
        port: u16,

        /// Vector dimension the cluster accepts
        dimensions: usize,

        /// Maximum number of vectors per shard
        shard_capacity: u32,

        /// Shard endpoints in fill order
        #[arg(required = true)]
        shard_addrs: Vec<String>,
    },
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("svs=info".parse()?)
                .add_directive("svs_core=info".parse()?)
                .add_directive("svs_server=info".parse()?),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Shard {
            port,
            dimensions,
            metric,
        } => {
            svs_server::run_shard_server(ShardConfig {
                port,
                dimensions,
                metric,
            })
            .await?;
        }
        Commands::Router {
            port,
            dimensions,
            shard_capacity,
            shard_addrs,
        } => {
            svs_server::run_router_server(RouterConfig {
                port,
                dimensions,
                shard_capacity,
                shard_addrs,
            })
            .await?;
        }
    }

    Ok(())
}
