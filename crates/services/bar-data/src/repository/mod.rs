//! Repository layer - Data access abstraction

mod bar_repository;
mod base;
pub mod entities;

pub use bar_repository::BarStore;
pub use base::{CrudRepository, DeleteRepository, PrimaryKeyOf, ReadRepository, WriteRepository};
