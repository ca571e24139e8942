//! # api-fleet
//!
//! Call a catalog of HTTP APIs from containers and answer questions from
//! the responses they leave behind.
//!
//! This library provides:
//! - An API runner that calls one catalog entry and stores the result
//! - A container manager that starts one runner container per entry
//! - A ReAct agent that turns the best-matching stored response into a tool
//!
//! ## Architecture
//!
//! The three programs share nothing but files:
//! 1. `db.json` lists the APIs (see [`catalog`])
//! 2. each runner writes `responses/<api_name>.json` (see [`responses`])
//! 3. the agent reads that directory, scores each file against the user's
//!    query and answers through the best one
//!
//! ## Example
//!
//! ```rust,ignore
//! use api_fleet::{config::Config, runner};
//!
//! let config = Config::from_env()?;
//! let path = runner::run(&config).await?;
//! ```

pub mod agent;
pub mod catalog;
pub mod config;
pub mod containers;
pub mod llm;
pub mod logging;
pub mod responses;
pub mod runner;
pub mod tools;

pub use config::Config;
