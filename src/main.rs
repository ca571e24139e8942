//! api-fleet - Interactive agent entry point
//!
//! Answers questions from the responses the runners stored on disk.

use std::io::Write;
use std::sync::Arc;

use api_fleet::agent::{is_exit_command, AgentManager, Chatbot};
use api_fleet::llm::OpenAiClient;
use api_fleet::responses::ResponseStore;
use api_fleet::{config, logging, Config};
use tokio::io::{AsyncBufReadExt, BufReader};
use tracing::{info, warn};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    logging::init("api_fleet=info");
    config::load_dotenv();

    let config = Config::from_env()?;
    let api_key = match config.agent.require_api_key() {
        Ok(key) => key.to_string(),
        Err(_) => {
            println!("Error: OPENAI_API_KEY environment variable not set");
            return Ok(());
        }
    };
    info!("Loaded configuration: model={}", config.agent.model);

    let llm = Arc::new(OpenAiClient::with_base_url(api_key, &config.agent.base_url));
    let mut manager = AgentManager::new(
        llm,
        config.agent.clone(),
        config.db_path.clone(),
        ResponseStore::new(&config.responses_dir),
    );
    if let Err(e) = manager.load_apis() {
        warn!("Continuing without API descriptions: {}", e);
    }

    let mut chatbot = Chatbot::new(manager);
    println!("Chatbot initialized. Type 'quit' to exit.");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    loop {
        print!("You: ");
        std::io::stdout().flush()?;

        let line = tokio::select! {
            line = lines.next_line() => line,
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        };

        let query = match line {
            Ok(Some(line)) => line,
            Ok(None) => break,
            Err(e) => {
                println!("\nError: {}", e);
                break;
            }
        };

        let query = query.trim();
        if query.is_empty() {
            continue;
        }
        if is_exit_command(query) {
            break;
        }

        let response = tokio::select! {
            response = chatbot.process_query(query) => response,
            _ = tokio::signal::ctrl_c() => {
                println!("\nShutting down...");
                break;
            }
        };
        println!("Bot: {}", response);
    }

    Ok(())
}
