//! Migration: create the bar table from the embedded scripts.

use sea_orm_migration::prelude::*;

use crate::infra::scripts::{self, CREATE_BAR, DROP_BAR};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        scripts::run_script(manager.get_connection(), CREATE_BAR)
            .await
            .map_err(|e| DbErr::Migration(e.to_string()))
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        scripts::run_script(manager.get_connection(), DROP_BAR)
            .await
            .map_err(|e| DbErr::Migration(e.to_string()))
    }
}
