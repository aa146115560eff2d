//! # Research Agent
//!
//! A conversational company-research agent with human-in-the-loop tool
//! approval.
//!
//! This library provides:
//! - An HTTP API for turn-based conversations
//! - An orchestrator loop that routes model-requested actions either to the
//!   frontend renderer or through an approval gate to backend tools
//! - Pluggable conversation checkpointing (in-memory or SQLite)
//!
//! ## Architecture
//!
//! Each turn follows the same cycle:
//! 1. Receive a user message (or an approval reply) via the API
//! 2. Call the LLM with the system prompt, transcript, and the union of
//!    frontend actions and backend tool schemas
//! 3. Forward presentation actions to the renderer; park execution actions
//!    behind the approval gate
//! 4. On approval, execute tools sequentially, feed results back, repeat
//!    until the model answers with no further actions
//!
//! ## Example
//!
//! ```rust,ignore
//! use research_agent::{api, config::Config};
//!
//! let config = Config::from_env()?;
//! api::serve(config).await?;
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod error;
pub mod llm;
pub mod store;
pub mod tools;

pub use config::Config;
