//! Server Module
//!
//! Server setup for the sync backend.
//!
//! - **`init`** - application construction
//! - **`state`** - shared application state
//! - **`config`** - environment configuration

pub mod config;
pub mod init;
pub mod state;

pub use config::ServerConfig;
pub use init::create_app;
pub use state::AppState;
