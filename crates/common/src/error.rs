//! Error types for palaver.

use thiserror::Error;

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
///
/// Every variant except the server-class ones is recoverable at the caller
/// boundary and maps to a user-facing rejection.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Self reference: {0}")]
    SelfReference(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Blocked: {0}")]
    Blocked(String),

    #[error("Already banned: {0}")]
    AlreadyBanned(String),

    #[error("Invalid expiry: {0}")]
    InvalidExpiry(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Validation error: {0}")]
    Validation(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Returns the stable error code used at the caller boundary.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::SelfReference(_) => "SELF_REFERENCE",
            Self::Duplicate(_) => "DUPLICATE",
            Self::Blocked(_) => "BLOCKED",
            Self::AlreadyBanned(_) => "ALREADY_BANNED",
            Self::InvalidExpiry(_) => "INVALID_EXPIRY",
            Self::NotFound(_) => "NOT_FOUND",
            Self::Authorization(_) => "NOT_AUTHORIZED",
            Self::Validation(_) => "VALIDATION_ERROR",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether this error is a recoverable caller-side rejection.
    ///
    /// Server-class errors (a failed store transaction, broken configuration)
    /// are the only ones that should be escalated as transient or systemic
    /// failures.
    #[must_use]
    pub const fn is_client_error(&self) -> bool {
        !matches!(
            self,
            Self::Database(_) | Self::Config(_) | Self::Internal(_)
        )
    }
}

// === From implementations ===

impl From<validator::ValidationErrors> for AppError {
    fn from(err: validator::ValidationErrors) -> Self {
        Self::Validation(err.to_string())
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}
