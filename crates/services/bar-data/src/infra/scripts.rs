//! Embedded DDL scripts, resolved by name for the connected backend.

use sea_orm::{ConnectionTrait, DbBackend};
use tracing::info;

use common::{AppError, AppResult};

/// Creates `dbo.bar` with its row-version machinery
pub const CREATE_BAR: &str = "create_bar";
/// Drops `dbo.bar` if present
pub const DROP_BAR: &str = "drop_bar";

#[derive(Debug, Clone, Copy)]
struct Script {
    backend: DbBackend,
    name: &'static str,
    sql: &'static str,
}

const SCRIPTS: &[Script] = &[
    Script {
        backend: DbBackend::Postgres,
        name: CREATE_BAR,
        sql: include_str!("sql/postgres/create_bar.sql"),
    },
    Script {
        backend: DbBackend::Postgres,
        name: DROP_BAR,
        sql: include_str!("sql/postgres/drop_bar.sql"),
    },
    Script {
        backend: DbBackend::Sqlite,
        name: CREATE_BAR,
        sql: include_str!("sql/sqlite/create_bar.sql"),
    },
    Script {
        backend: DbBackend::Sqlite,
        name: DROP_BAR,
        sql: include_str!("sql/sqlite/drop_bar.sql"),
    },
];

/// Look up the SQL text of `name` for `backend`.
pub fn script(backend: DbBackend, name: &str) -> AppResult<&'static str> {
    SCRIPTS
        .iter()
        .find(|s| s.backend == backend && s.name == name)
        .map(|s| s.sql)
        .ok_or_else(|| AppError::script(format!("no script '{}' for {:?}", name, backend)))
}

/// Execute the named script against `db`.
///
/// Scripts hold several statements, so they go through the unprepared path.
pub async fn run_script<C>(db: &C, name: &str) -> AppResult<()>
where
    C: ConnectionTrait,
{
    let backend = db.get_database_backend();
    let sql = script(backend, name)?;

    info!(script = name, backend = ?backend, "Running script");
    db.execute_unprepared(sql)
        .await
        .map_err(|e| AppError::script(format!("script '{}' failed: {}", name, e)))?;
    Ok(())
}
