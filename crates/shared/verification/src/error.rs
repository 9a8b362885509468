//! Verification failures.

use std::fmt;

use common::AppError;
use thiserror::Error;

/// A property whose reloaded value differs from the value written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PropertyMismatch {
    pub property: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for PropertyMismatch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "'{}' expected {} but was {}",
            self.property, self.expected, self.actual
        )
    }
}

/// Why a verification run failed.
#[derive(Error, Debug)]
pub enum VerificationError {
    /// The same property was checked twice
    #[error("property '{0}' is checked more than once")]
    DuplicateProperty(String),

    /// Mapped properties without a check
    #[error("properties without a check: {}", .0.join(", "))]
    Uncovered(Vec<String>),

    /// Nothing came back for the persisted identity
    #[error("entity was not found after it was persisted")]
    NotReloaded,

    /// One or more properties did not round-trip
    #[error("{}", describe_mismatches(.0))]
    Mismatch(Vec<PropertyMismatch>),

    /// A storage-assigned property came back without a value
    #[error("property '{0}' was not assigned by storage")]
    NotAssigned(String),

    /// Storage failed while persisting or reloading
    #[error(transparent)]
    Store(#[from] AppError),
}

impl VerificationError {
    /// Names of the properties that did not round-trip.
    pub fn mismatched_properties(&self) -> Vec<&str> {
        match self {
            VerificationError::Mismatch(mismatches) => {
                mismatches.iter().map(|m| m.property.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }
}

fn describe_mismatches(mismatches: &[PropertyMismatch]) -> String {
    let noun = if mismatches.len() == 1 { "property" } else { "properties" };
    let details = mismatches
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ");
    format!("{} {} did not round-trip: {}", mismatches.len(), noun, details)
}

/// Result type alias
pub type VerificationResult<T> = Result<T, VerificationError>;
