//! Database session and migration management.

use std::time::Duration;

use sea_orm::{
    ConnectOptions, ConnectionTrait, Database as SeaDatabase, DatabaseConnection, DbBackend, DbErr,
    Statement,
};
use sea_orm_migration::MigratorTrait;
use tracing::info;

use common::DatabaseConfig;

use super::migrations::Migrator;
use super::scripts::{self, DROP_BAR};

/// Schema the bar table lives in.
pub const BAR_SCHEMA: &str = "dbo";

/// Database wrapper for connection management
#[derive(Clone)]
pub struct Database {
    connection: DatabaseConnection,
}

impl Database {
    /// Open a session and run pending migrations.
    pub async fn connect(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let db = Self::connect_without_migrations(config).await?;

        Migrator::up(&db.connection, None).await?;
        info!("Database connected and migrations applied");

        Ok(db)
    }

    /// Open a session without touching the schema.
    ///
    /// On SQLite the pool is pinned to a single connection so an in-memory
    /// database and the attached `dbo` schema live as long as the session.
    pub async fn connect_without_migrations(config: &DatabaseConfig) -> Result<Self, DbErr> {
        let mut options = ConnectOptions::new(config.url.clone());
        options
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .sqlx_logging(config.sqlx_logging);

        if config.is_sqlite() {
            options.max_connections(1).min_connections(1);
        } else {
            options
                .max_connections(config.max_connections)
                .min_connections(config.min_connections);
        }

        let connection = SeaDatabase::connect(options).await?;
        let db = Self { connection };
        db.attach_schema().await?;

        info!(backend = config.backend_name(), "Database session opened");
        Ok(db)
    }

    /// Get a reference to the database connection.
    pub fn connection(&self) -> &DatabaseConnection {
        &self.connection
    }

    /// Get a clone of the database connection.
    pub fn get_connection(&self) -> DatabaseConnection {
        self.connection.clone()
    }

    /// Backend of the open session.
    pub fn backend(&self) -> DbBackend {
        self.connection.get_database_backend()
    }

    /// Run pending migrations.
    pub async fn run_migrations(&self) -> Result<(), DbErr> {
        Migrator::up(&self.connection, None).await
    }

    /// Rollback the last migration.
    pub async fn rollback_migration(&self) -> Result<(), DbErr> {
        Migrator::down(&self.connection, Some(1)).await
    }

    /// Get migration status (list all migrations with applied status).
    pub async fn migration_status(&self) -> Result<Vec<(String, bool)>, DbErr> {
        use sea_orm::{EntityTrait, QueryOrder};
        use sea_orm_migration::seaql_migrations;

        let applied: std::collections::HashSet<String> = seaql_migrations::Entity::find()
            .order_by_asc(seaql_migrations::Column::Version)
            .all(&self.connection)
            .await?
            .into_iter()
            .map(|m| m.version)
            .collect();

        let migrations: Vec<(String, bool)> = Migrator::migrations()
            .iter()
            .map(|m| {
                let name = m.name().to_string();
                let is_applied = applied.contains(&name);
                (name, is_applied)
            })
            .collect();

        Ok(migrations)
    }

    /// Reset the schema and run all migrations fresh.
    pub async fn fresh_migrations(&self) -> Result<(), DbErr> {
        // `fresh` only clears the default schema; the bar table lives in `dbo`.
        scripts::run_script(&self.connection, DROP_BAR)
            .await
            .map_err(|e| DbErr::Migration(e.to_string()))?;
        Migrator::fresh(&self.connection).await
    }

    /// Check database connectivity by executing a simple query.
    pub async fn ping(&self) -> Result<(), DbErr> {
        self.connection
            .execute(Statement::from_string(
                self.connection.get_database_backend(),
                "SELECT 1".to_string(),
            ))
            .await?;
        Ok(())
    }

    /// Close the session, releasing its connections.
    pub async fn close(self) -> Result<(), DbErr> {
        self.connection.close().await?;
        info!("Database session closed");
        Ok(())
    }

    async fn attach_schema(&self) -> Result<(), DbErr> {
        if self.backend() != DbBackend::Sqlite {
            return Ok(());
        }

        let attached = self
            .connection
            .query_one(Statement::from_string(
                DbBackend::Sqlite,
                format!(
                    "SELECT name FROM pragma_database_list WHERE name = '{}'",
                    BAR_SCHEMA
                ),
            ))
            .await?;
        if attached.is_none() {
            self.connection
                .execute_unprepared(&format!("ATTACH DATABASE ':memory:' AS {}", BAR_SCHEMA))
                .await?;
        }
        Ok(())
    }
}
