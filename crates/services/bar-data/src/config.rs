//! Bar data configuration.

use std::env;

use tracing::warn;

use common::{AppResult, DatabaseConfig, INTEGRATION_TESTS_CONNECTION};

/// Bar data configuration.
#[derive(Debug, Clone)]
pub struct BarDataConfig {
    /// Connection the commands run against
    pub database: DatabaseConfig,
    /// Seed for verification values; fresh values each run when unset
    pub seed: Option<u64>,
}

impl BarDataConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Self {
        Self {
            database: DatabaseConfig::from_env(),
            seed: env::var("BAR_DATA_SEED").ok().and_then(|s| s.parse().ok()),
        }
    }

    /// Configuration for the named connection.
    ///
    /// `IntegrationTests` falls back to a private in-memory SQLite database
    /// when it is not configured; any other unconfigured name is an error.
    pub fn for_connection(name: &str) -> AppResult<Self> {
        let database = match DatabaseConfig::named(name) {
            Ok(database) => database,
            Err(_) if name == INTEGRATION_TESTS_CONNECTION => {
                warn!(
                    connection = name,
                    "Connection not configured, using in-memory SQLite"
                );
                DatabaseConfig::sqlite_in_memory()
            }
            Err(e) => return Err(e),
        };

        Ok(Self {
            database,
            ..Self::from_env()
        })
    }

    pub fn with_seed(mut self, seed: Option<u64>) -> Self {
        if seed.is_some() {
            self.seed = seed;
        }
        self
    }
}

impl Default for BarDataConfig {
    fn default() -> Self {
        Self {
            database: DatabaseConfig::default(),
            seed: None,
        }
    }
}
