//! container-manager - start one runner container per catalog entry, or tear them down.

use std::sync::Arc;

use api_fleet::catalog::ApiCatalog;
use api_fleet::containers::{ContainerManager, DockerCli};
use api_fleet::{config, logging, Config};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "container-manager", about = "Run the API catalog in Docker containers")]
struct Args {
    #[command(subcommand)]
    command: Option<Command>,

    /// Container CLI to invoke
    #[arg(long, env = "CONTAINER_CLI", default_value = "docker")]
    cli: String,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
enum Command {
    /// Build the runner image and start every container (default)
    Up,
    /// Stop and remove the container of every catalog entry
    Down,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("api_fleet=info");
    config::load_dotenv();

    let args = Args::parse();
    let config = Config::from_env()?;
    let catalog = ApiCatalog::load(&config.db_path)?;

    let runtime = Arc::new(DockerCli::with_cli(args.cli));
    let mut manager = ContainerManager::new(runtime, catalog, &config)?;

    match args.command.unwrap_or(Command::Up) {
        Command::Up => {
            let started = tokio::select! {
                result = manager.start_all() => Some(result),
                _ = tokio::signal::ctrl_c() => None,
            };
            match started {
                Some(result) => result?,
                None => {
                    info!("Shutting down...");
                    manager.stop_all().await;
                }
            }
        }
        Command::Down => manager.down_all().await,
    }

    Ok(())
}
