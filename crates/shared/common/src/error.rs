//! Unified error handling.
//!
//! A single error type shared by the data-access layer, the verification
//! harness and the command-line tool. Variants follow the failure
//! categories of the workspace:
//! - configuration and mapping errors
//! - schema script (DDL) errors
//! - database and connectivity errors

use thiserror::Error;

/// Application error types.
#[derive(Error, Debug)]
pub enum AppError {
    // Configuration & mapping
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Mapping error: {0}")]
    Mapping(String),

    // Schema scripts
    #[error("Script error: {0}")]
    Script(String),

    // Resource errors
    #[error("Resource not found")]
    NotFound,

    // External service errors
    #[cfg(feature = "database")]
    #[error("Database error: {0}")]
    Database(#[from] sea_orm::DbErr),

    // Internal
    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Get a stable error code for reporting
    pub fn code(&self) -> &'static str {
        match self {
            AppError::Configuration(_) => "CONFIGURATION_ERROR",
            AppError::Mapping(_) => "MAPPING_ERROR",
            AppError::Script(_) => "SCRIPT_ERROR",
            AppError::NotFound => "NOT_FOUND",
            #[cfg(feature = "database")]
            AppError::Database(_) => "DATABASE_ERROR",
            AppError::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Whether the error comes from the environment rather than from data.
    ///
    /// Infrastructure errors abort a verification run instead of being
    /// reported as a property mismatch.
    pub fn is_infrastructure(&self) -> bool {
        match self {
            AppError::Configuration(_) | AppError::Script(_) | AppError::Internal(_) => true,
            #[cfg(feature = "database")]
            AppError::Database(_) => true,
            AppError::Mapping(_) | AppError::NotFound => false,
        }
    }
}

/// Result type alias
pub type AppResult<T> = Result<T, AppError>;

/// Extension trait for Option -> AppError conversion
pub trait OptionExt<T> {
    fn ok_or_not_found(self) -> AppResult<T>;
}

impl<T> OptionExt<T> for Option<T> {
    fn ok_or_not_found(self) -> AppResult<T> {
        self.ok_or(AppError::NotFound)
    }
}

/// Convenience constructors
impl AppError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        AppError::Configuration(msg.into())
    }

    pub fn mapping(msg: impl Into<String>) -> Self {
        AppError::Mapping(msg.into())
    }

    pub fn script(msg: impl Into<String>) -> Self {
        AppError::Script(msg.into())
    }

    pub fn internal(msg: impl Into<String>) -> Self {
        AppError::Internal(msg.into())
    }
}
