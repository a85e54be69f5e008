//! Configuration management for the refund desk.

#![warn(missing_docs, clippy::pedantic)]

pub mod loader;
pub mod schema;

pub use loader::{ENV_LOG, ENV_SWEEP_INTERVAL_MS, apply_env, load_from_path, load_from_str};
pub use schema::DeskConfig;
