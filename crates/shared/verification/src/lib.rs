//! Persistence verification toolkit.
//!
//! Checks that an entity mapping round-trips: every property is set to a
//! representative value, the entity is persisted once, reloaded, and each
//! property is compared against what was written.
//!
//! - **store**: the port through which entities are persisted and reloaded
//! - **comparer**: equality strategies, including tolerances for lossy columns
//! - **specification**: the property checks and the verification run
//! - **random**: bounded random values for column domains

pub mod comparer;
pub mod error;
pub mod random;
pub mod specification;
pub mod store;

pub use comparer::{Comparer, DecimalScale, Nullable, ValueEquality, WithinTolerance};
pub use error::{PropertyMismatch, VerificationError, VerificationResult};
pub use random::{RandomValues, TemporalPrecision};
pub use specification::PersistenceSpecification;
pub use store::EntityStore;

#[cfg(any(test, feature = "test-utils"))]
pub use store::MockEntityStore;
