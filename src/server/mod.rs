//! Server module for Dropdeck
//!
//! # Module Structure
//!
//! - `config`: Configuration structures
//! - `loader`: Configuration loading from files and environment
//! - `validation`: Production configuration validation
//! - `shutdown`: Signal handling for graceful shutdown
//! - `init`: Store, resolver and router construction, and the run loop

pub mod config;
mod init;
mod loader;
mod shutdown;
mod validation;

// Re-export public API
pub use init::{build_state, connect_store, run};
pub use loader::{load_config, source_selection};
