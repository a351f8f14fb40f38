//! Common utilities and shared types for palaver.
//!
//! This crate provides the foundational components used across all palaver
//! crates:
//!
//! - **Configuration**: application settings via [`Config`]
//! - **Error handling**: unified error types via [`AppError`] and [`AppResult`]
//! - **ID generation**: ULID-based unique identifiers via [`IdGenerator`]
//! - **Telemetry**: `tracing` subscriber bootstrap via [`telemetry::init`]

pub mod config;
pub mod error;
pub mod id;
pub mod telemetry;

pub use config::Config;
pub use error::{AppError, AppResult};
pub use id::IdGenerator;
