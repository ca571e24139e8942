//! Configuration management for api-fleet.
//!
//! Configuration can be set via environment variables (a `.env` file in the
//! working directory is loaded first when present):
//! - `API_DB_PATH` - Optional. Path to the API catalog. Defaults to `db.json`.
//! - `RESPONSES_DIR` - Optional. Directory for stored responses. Defaults to `responses`.
//! - `API_ID` - Optional. Catalog id the runner calls. Defaults to `1`.
//! - `BASE_PORT` - Optional. First port handed out to containers. Defaults to `8000`.
//! - `RUNNER_IMAGE` - Optional. Image tag for runner containers. Defaults to `api-runner:latest`.
//! - `BUILD_CONTEXT` - Optional. Docker build context. Defaults to `.`.
//! - `OPENAI_API_KEY` - Required by the agent only.
//! - `OPENAI_BASE_URL` - Optional. Defaults to `https://api.openai.com/v1`.
//! - `DEFAULT_MODEL` - Optional. Defaults to `gpt-3.5-turbo`.
//! - `RELEVANCE_THRESHOLD` - Optional. Minimum score for a stored response. Defaults to `0.7`.
//! - `MAX_ITERATIONS` - Optional. ReAct iteration cap. Defaults to `3`.

use std::path::PathBuf;
use std::str::FromStr;
use thiserror::Error;

pub const DEFAULT_DB_PATH: &str = "db.json";
pub const DEFAULT_RESPONSES_DIR: &str = "responses";
pub const DEFAULT_IMAGE: &str = "api-runner:latest";
pub const DEFAULT_MODEL: &str = "gpt-3.5-turbo";
pub const DEFAULT_OPENAI_BASE_URL: &str = "https://api.openai.com/v1";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Container orchestration configuration.
#[derive(Debug, Clone)]
pub struct ContainerConfig {
    /// First host port; descriptor `i` gets `base_port + i`
    pub base_port: u16,

    /// Tag of the shared runner image
    pub image: String,

    /// Directory handed to `docker build`
    pub build_context: PathBuf,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            base_port: 8000,
            image: DEFAULT_IMAGE.to_string(),
            build_context: PathBuf::from("."),
        }
    }
}

/// Language model and agent loop configuration.
#[derive(Debug, Clone)]
pub struct AgentConfig {
    /// OpenAI API key (only the agent needs it)
    pub api_key: Option<String>,

    /// Base URL of an OpenAI-compatible API
    pub base_url: String,

    /// Chat model identifier
    pub model: String,

    /// A stored response must score strictly above this to be used
    pub relevance_threshold: f64,

    /// Maximum ReAct iterations per query
    pub max_iterations: usize,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_OPENAI_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            relevance_threshold: 0.7,
            max_iterations: 3,
        }
    }
}

impl AgentConfig {
    /// The API key, or `ConfigError::MissingEnvVar` when unset.
    pub fn require_api_key(&self) -> Result<&str, ConfigError> {
        self.api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| ConfigError::MissingEnvVar("OPENAI_API_KEY".to_string()))
    }
}

/// Shared configuration for all three binaries.
#[derive(Debug, Clone)]
pub struct Config {
    /// API catalog file
    pub db_path: PathBuf,

    /// Directory holding one `<api_name>.json` per API
    pub responses_dir: PathBuf,

    /// Catalog id selected by the runner
    pub api_id: u32,

    pub containers: ContainerConfig,

    pub agent: AgentConfig,
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidValue` if a numeric variable does not parse
    /// or `RELEVANCE_THRESHOLD` lies outside `[0, 1]`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from `lookup`, which maps a variable name to its value.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or =
            |name: &str, default: &str| lookup(name).unwrap_or_else(|| default.to_string());

        let api_id = parse_var(&lookup, "API_ID", 1u32)?;

        let containers = ContainerConfig {
            base_port: parse_var(&lookup, "BASE_PORT", 8000u16)?,
            image: var_or("RUNNER_IMAGE", DEFAULT_IMAGE),
            build_context: PathBuf::from(var_or("BUILD_CONTEXT", ".")),
        };

        let relevance_threshold = parse_var(&lookup, "RELEVANCE_THRESHOLD", 0.7f64)?;
        if !(0.0..=1.0).contains(&relevance_threshold) {
            return Err(ConfigError::InvalidValue(
                "RELEVANCE_THRESHOLD".to_string(),
                format!("{} is outside [0, 1]", relevance_threshold),
            ));
        }

        let agent = AgentConfig {
            api_key: lookup("OPENAI_API_KEY"),
            base_url: var_or("OPENAI_BASE_URL", DEFAULT_OPENAI_BASE_URL),
            model: var_or("DEFAULT_MODEL", DEFAULT_MODEL),
            relevance_threshold,
            max_iterations: parse_var(&lookup, "MAX_ITERATIONS", 3usize)?,
        };

        Ok(Self {
            db_path: PathBuf::from(var_or("API_DB_PATH", DEFAULT_DB_PATH)),
            responses_dir: PathBuf::from(var_or("RESPONSES_DIR", DEFAULT_RESPONSES_DIR)),
            api_id,
            containers,
            agent,
        })
    }

    /// Create a config with custom paths (useful for testing).
    pub fn new(db_path: PathBuf, responses_dir: PathBuf) -> Self {
        Self {
            db_path,
            responses_dir,
            api_id: 1,
            containers: ContainerConfig::default(),
            agent: AgentConfig::default(),
        }
    }
}

/// Load a `.env` file from the working directory if one exists.
pub fn load_dotenv() {
    match dotenvy::dotenv() {
        Ok(path) => tracing::debug!("Loaded environment from {}", path.display()),
        Err(e) if e.not_found() => tracing::warn!(".env file not found"),
        Err(e) => tracing::warn!("Failed to load .env file: {}", e),
    }
}

fn parse_var<T, F>(lookup: &F, name: &str, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    match lookup(name) {
        Some(raw) => parse_value(name, &raw),
        None => Ok(default),
    }
}

fn parse_value<T>(name: &str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue(name.to_string(), format!("{}", e)))
}
