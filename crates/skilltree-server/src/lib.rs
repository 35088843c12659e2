//! Skill Tree Server
//!
//! HTTP and WebSocket surface over the skill tree engine.
//!
//! # Architecture
//!
//! - **REST API**: one route per editor intent (add, edit, connect, delete,
//!   raw canvas changes, points), plus snapshot and search reads
//! - **WebSocket**: streams every engine commit to connected canvases
//! - **Persistence**: a background task saves the state file after each
//!   burst of commits
//!
//! # Usage
//!
//! ```ignore
//! let config = ServerConfig::from_env()?;
//! let server = SkillTreeServer::load(config)?;
//! server.serve().await?;
//! ```

mod config;
mod error;
mod server;

pub use config::ServerConfig;
pub use error::{ApiError, Error, Result};
pub use server::{persist_latest, router, spawn_persistence, AppState, SkillTreeServer};
