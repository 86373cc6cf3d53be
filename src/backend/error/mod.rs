//! Backend Error Module
//!
//! Error types for the sync server and their conversion to HTTP responses.
//!
//! # Module Structure
//!
//! ```text
//! error/
//! ├── mod.rs        - Module exports and documentation
//! ├── types.rs      - Error type definitions
//! └── conversion.rs - IntoResponse implementation
//! ```
//!
//! # Example
//!
//! ```rust,no_run
//! use crmsync::backend::error::BackendError;
//! use axum::Json;
//! use crmsync::shared::PushResponse;
//!
//! async fn handler() -> Result<Json<PushResponse>, BackendError> {
//!     Err(BackendError::conflict("Lead L1 already exists"))
//! }
//! ```

pub mod conversion;
pub mod types;

pub use types::BackendError;
