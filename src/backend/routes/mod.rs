//! Routes Module
//!
//! Route configuration for the sync server.

pub mod router;

pub use router::create_router;
