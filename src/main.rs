//! Crosssell - Main Entry Point
//!
//! CLI for the insurance cross-sell prediction pipeline: run training,
//! serve predictions, or load data into the document store.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::info;

use crosssell::config::PipelineConfig;
use crosssell::pipeline::TrainingPipeline;
use crosssell::server::{run_server, ServerConfig};
use crosssell::storage::MongoStore;

#[derive(Parser)]
#[command(name = "crosssell", about = "Insurance cross-sell prediction pipeline")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the full training pipeline
    Train,
    /// Serve the prediction API
    Serve {
        #[arg(long)]
        host: Option<String>,
        #[arg(long)]
        port: Option<u16>,
    },
    /// Bulk-insert a CSV file into the configured collection
    LoadData { file: PathBuf },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "crosssell=info".into()),
        )
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig::from_env()?;

    match cli.command {
        Commands::Train => {
            let summary = TrainingPipeline::new(config).run().await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
        Commands::Serve { host, port } => {
            let mut server_config = ServerConfig::default();
            if let Some(host) = host {
                server_config.host = host;
            }
            if let Some(port) = port {
                server_config.port = port;
            }
            run_server(server_config, config).await?;
        }
        Commands::LoadData { file } => {
            let store = MongoStore::connect(&config.mongo).await?;
            let inserted = store.insert_csv(&file).await?;
            info!(inserted, file = %file.display(), "data loaded");
        }
    }

    Ok(())
}
