//! Middleware Module
//!
//! HTTP middleware applied before requests reach the sync handlers.
//!
//! - **`auth`** - bearer-token check for the push and pull endpoints

pub mod auth;

pub use auth::auth_middleware;
