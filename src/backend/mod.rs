//! Backend Module
//!
//! Reference sync server (only compiled with the `ssr` feature). It
//! implements the server side of the push/pull contract over an in-memory
//! record store so the client can be exercised end to end.
//!
//! # Module Structure
//!
//! - **`server`** - initialization, state and configuration
//! - **`sync`** - record store and push/pull handlers
//! - **`routes`** - router assembly
//! - **`middleware`** - bearer-token authentication
//! - **`error`** - error types and HTTP conversion

pub mod error;
pub mod middleware;
pub mod routes;
pub mod server;
pub mod sync;
