//! Infrastructure layer - database session, scripts and migrations.

mod db;
pub mod migrations;
pub mod scripts;

pub use db::{Database, BAR_SCHEMA};
pub use migrations::Migrator;
pub use scripts::{run_script, CREATE_BAR, DROP_BAR};
