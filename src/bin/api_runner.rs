//! api-runner - call the catalog entry selected by `API_ID` once and store the result.

use api_fleet::{config, logging, runner, Config};
use tracing::{error, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("api_fleet=info");
    config::load_dotenv();

    let config = Config::from_env()?;
    info!(
        "Running API {} from {}",
        config.api_id,
        config.db_path.display()
    );

    match runner::run(&config).await {
        Ok(path) => {
            info!("Finished, result at {}", path.display());
            Ok(())
        }
        Err(e) => {
            error!("Fatal error: {}", e);
            Err(e.into())
        }
    }
}
