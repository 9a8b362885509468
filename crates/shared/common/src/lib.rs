//! Common utilities shared across the workspace.
//!
//! This crate provides:
//! - Unified error handling
//! - Database configuration and named connection strings
//! - Pagination parameters for repository queries

pub mod config;
pub mod error;
pub mod pagination;

pub use config::*;
pub use error::{AppError, AppResult, OptionExt};
pub use pagination::PaginationParams;
