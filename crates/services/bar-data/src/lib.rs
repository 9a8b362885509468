//! Bar Data Library
//!
//! Data access for the bar entity: the SeaORM mapping of about thirty
//! column types, a repository over the generic CRUD base, embedded DDL
//! scripts, and the round-trip verification of the mapping.

pub mod config;
pub mod infra;
pub mod mapping;
pub mod repository;
pub mod verification;

use ::verification::RandomValues;
use tracing::{info, warn};

use crate::config::BarDataConfig;
use crate::infra::Database;
use crate::mapping::BAR_MAPPING;
use crate::verification::TableFixture;

/// Run migrations (for CLI commands).
pub async fn run_migrations(
    config: &BarDataConfig,
    action: MigrateAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;

    match action {
        MigrateAction::Up => {
            db.run_migrations().await?;
            info!("Migrations applied successfully");
        }
        MigrateAction::Down => {
            db.rollback_migration().await?;
            info!("Rolled back last migration");
        }
        MigrateAction::Status => {
            let status = db.migration_status().await?;
            for (name, applied) in status {
                let marker = if applied { "[x]" } else { "[ ]" };
                println!("{} {}", marker, name);
            }
        }
        MigrateAction::Fresh => {
            db.fresh_migrations().await?;
            info!("Database reset and migrations applied");
        }
    }

    db.close().await?;
    Ok(())
}

/// Migration action type.
#[derive(Debug, Clone, Copy)]
pub enum MigrateAction {
    Up,
    Down,
    Status,
    Fresh,
}

/// Table action type.
#[derive(Debug, Clone, Copy)]
pub enum SchemaAction {
    Create,
    Drop,
}

/// Recreate or drop the bar table through the fixture scripts.
pub async fn run_schema(
    config: &BarDataConfig,
    action: SchemaAction,
) -> Result<(), Box<dyn std::error::Error>> {
    let db = Database::connect_without_migrations(&config.database).await?;
    let fixture = TableFixture::new(db.connection());

    match action {
        SchemaAction::Create => fixture.recreate().await?,
        SchemaAction::Drop => fixture.drop_table().await?,
    }

    db.close().await?;
    Ok(())
}

/// Verify the bar mapping round-trips against the configured database.
pub async fn run_verification(config: &BarDataConfig) -> Result<(), Box<dyn std::error::Error>> {
    let mut values = match config.seed {
        Some(seed) => {
            info!(seed, "Using seeded values");
            RandomValues::seeded(seed)
        }
        None => RandomValues::from_os_rng(),
    };

    let db = Database::connect_without_migrations(&config.database).await?;
    let outcome = crate::verification::verify_bar_mapping(db.connection(), &mut values).await;
    if let Err(e) = db.close().await {
        warn!(error = %e, "Failed to close database session");
    }

    let reloaded = outcome?;
    println!(
        "{}: {} properties round-tripped (row version {})",
        BAR_MAPPING.qualified_table(),
        BAR_MAPPING.writable_properties().len(),
        reloaded.timestamp_column
    );
    Ok(())
}

/// Print the column mapping, as a table or as JSON.
pub fn print_mapping(json: bool) -> Result<(), Box<dyn std::error::Error>> {
    BAR_MAPPING.validate()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&BAR_MAPPING)?);
        return Ok(());
    }

    println!("{}", BAR_MAPPING.qualified_table());
    for column in BAR_MAPPING.columns {
        let storage = column
            .storage
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-".to_string());
        let mut flags = Vec::new();
        if column.property == BAR_MAPPING.identity {
            flags.push("identity");
        }
        if column.nullable {
            flags.push("nullable");
        }
        if column.read_only {
            flags.push("read-only");
        }
        println!(
            "  {:<26} {:<26} {:<16} {}",
            column.property,
            column.column_name(),
            storage,
            flags.join(",")
        );
    }
    Ok(())
}
