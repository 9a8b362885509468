//! Bar repository: the generic CRUD base specialized for `bar`.

use sea_orm::DatabaseConnection;

use super::base::{DeleteRepository, ReadRepository, WriteRepository};
use super::entities::bar::{ActiveModel, Entity as BarEntity, Model};

/// CRUD over the bar table
pub struct BarStore {
    db: DatabaseConnection,
}

impl BarStore {
    /// Create new repository instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl ReadRepository<BarEntity, Model> for BarStore {
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl WriteRepository<BarEntity, Model, ActiveModel> for BarStore {
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}

impl DeleteRepository<BarEntity> for BarStore {
    fn db(&self) -> &DatabaseConnection {
        &self.db
    }
}
