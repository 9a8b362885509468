//! Bar Data - schema and mapping verification commands.

use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use bar_data::config::BarDataConfig;
use bar_data::{MigrateAction, SchemaAction};
use common::INTEGRATION_TESTS_CONNECTION;

#[derive(Parser)]
#[command(name = "bar-data")]
#[command(about = "Bar entity mapping and round-trip verification")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Database migration commands
    Migrate {
        /// Named connection; DATABASE_URL when omitted
        #[arg(long)]
        connection: Option<String>,
        #[command(subcommand)]
        action: MigrateCommands,
    },
    /// Create or drop the bar table
    Schema {
        /// Named connection; DATABASE_URL when omitted
        #[arg(long)]
        connection: Option<String>,
        #[command(subcommand)]
        action: SchemaCommands,
    },
    /// Recreate the table, round-trip every property, drop the table
    Verify {
        #[arg(long, default_value = INTEGRATION_TESTS_CONNECTION)]
        connection: String,
        /// Seed for reproducible values
        #[arg(long, env = "BAR_DATA_SEED")]
        seed: Option<u64>,
    },
    /// Print the column mapping
    Mapping {
        #[arg(long)]
        json: bool,
    },
}

#[derive(Subcommand)]
enum MigrateCommands {
    /// Run pending migrations
    Up,
    /// Rollback last migration
    Down,
    /// Show migration status
    Status,
    /// Reset database and run all migrations
    Fresh,
}

#[derive(Subcommand)]
enum SchemaCommands {
    /// Drop the table if present, then create it
    Create,
    /// Drop the table if present
    Drop,
}

fn load_config(connection: Option<&str>) -> Result<BarDataConfig, Box<dyn std::error::Error>> {
    match connection {
        Some(name) => Ok(BarDataConfig::for_connection(name)?),
        None => Ok(BarDataConfig::from_env()),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load environment variables
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Migrate { connection, action } => {
            let config = load_config(connection.as_deref())?;
            let migrate_action = match action {
                MigrateCommands::Up => MigrateAction::Up,
                MigrateCommands::Down => MigrateAction::Down,
                MigrateCommands::Status => MigrateAction::Status,
                MigrateCommands::Fresh => MigrateAction::Fresh,
            };
            bar_data::run_migrations(&config, migrate_action).await?;
        }
        Commands::Schema { connection, action } => {
            let config = load_config(connection.as_deref())?;
            let schema_action = match action {
                SchemaCommands::Create => SchemaAction::Create,
                SchemaCommands::Drop => SchemaAction::Drop,
            };
            bar_data::run_schema(&config, schema_action).await?;
        }
        Commands::Verify { connection, seed } => {
            let config = BarDataConfig::for_connection(&connection)?.with_seed(seed);
            bar_data::run_verification(&config).await?;
        }
        Commands::Mapping { json } => {
            bar_data::print_mapping(json)?;
        }
    }

    Ok(())
}
