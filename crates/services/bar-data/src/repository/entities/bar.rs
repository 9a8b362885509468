//! Bar database entity for SeaORM.
//!
//! One property per supported column type. Property names follow the
//! entity; where the stored column is spelled differently the
//! `column_name` attribute carries it.

use async_trait::async_trait;
use sea_orm::entity::prelude::*;
use sea_orm::ActiveValue::NotSet;

#[derive(Clone, Debug, PartialEq, Default, DeriveEntityModel)]
#[sea_orm(schema_name = "dbo", table_name = "bar")]
pub struct Model {
    /// Assigned by the caller before insert
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub big_int_column: i64,
    #[sea_orm(column_type = "Binary(16)")]
    pub binary_column: Vec<u8>,
    pub bit_column: bool,
    #[sea_orm(column_type = "Char(Some(10))")]
    pub char_column: String,
    pub date_column: Option<Date>,
    #[sea_orm(column_type = "Timestamp")]
    pub date_time_column: DateTime,
    #[sea_orm(column_name = "datetime2_column")]
    pub date_time2_column: DateTime,
    pub date_time_offset_column: DateTimeWithTimeZone,
    #[sea_orm(column_type = "Decimal(Some((18, 4)))")]
    pub decimal_column: Decimal,
    pub float_column: f64,
    /// Well-known text
    #[sea_orm(column_type = "Text", nullable)]
    pub geography_column: Option<String>,
    /// Well-known text
    #[sea_orm(column_type = "Text", nullable)]
    pub geometry_column: Option<String>,
    /// Slash-delimited node path, e.g. `/1/3/`
    #[sea_orm(
        column_name = "hierarchyid_column",
        column_type = "String(StringLen::N(892))",
        nullable
    )]
    pub hierarchy_id_column: Option<String>,
    #[sea_orm(column_type = "Blob")]
    pub image_column: Vec<u8>,
    pub int_column: i32,
    #[sea_orm(column_type = "Decimal(Some((19, 4)))")]
    pub money_column: Decimal,
    #[sea_orm(column_type = "Char(Some(10))")]
    pub nchar_column: String,
    #[sea_orm(column_type = "Text")]
    pub ntext_column: String,
    #[sea_orm(column_type = "Decimal(Some((10, 5)))")]
    pub numeric_column: Decimal,
    #[sea_orm(column_type = "String(StringLen::N(50))")]
    pub nvarchar_column: String,
    #[sea_orm(column_type = "Text")]
    pub nvarchar_max_column: String,
    pub real_column: f32,
    #[sea_orm(column_name = "smalldatetime_column", column_type = "Timestamp")]
    pub small_date_time_column: DateTime,
    pub small_int_column: i16,
    #[sea_orm(column_name = "smallmoney_column", column_type = "Decimal(Some((10, 4)))")]
    pub small_money_column: Decimal,
    #[sea_orm(column_type = "JsonBinary")]
    pub sql_variant_column: Json,
    #[sea_orm(column_type = "Text")]
    pub text_column: String,
    #[sea_orm(column_type = "Time")]
    pub time_column: Time,
    /// Row version, maintained by the database on insert and update
    pub timestamp_column: i64,
    /// 0..=255
    #[sea_orm(column_name = "tinyint_column", column_type = "SmallInteger")]
    pub tiny_int_column: i16,
    pub unique_identifier_column: Uuid,
    #[sea_orm(column_name = "varbinary_column", column_type = "VarBinary(StringLen::N(50))")]
    pub var_binary_column: Vec<u8>,
    #[sea_orm(column_name = "varbinary_max_column", column_type = "VarBinary(StringLen::Max)")]
    pub var_binary_max_column: Vec<u8>,
    #[sea_orm(column_name = "varchar_column", column_type = "String(StringLen::N(50))")]
    pub var_char_column: String,
    #[sea_orm(column_name = "varchar_max_column", column_type = "Text")]
    pub var_char_max_column: String,
    #[sea_orm(column_type = "Text")]
    pub xml_column: String,
}

#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {}

#[async_trait]
impl ActiveModelBehavior for ActiveModel {
    /// The row version is read-only: whatever the caller set is dropped so
    /// inserts and updates leave it to the database.
    async fn before_save<C>(mut self, _db: &C, _insert: bool) -> Result<Self, DbErr>
    where
        C: ConnectionTrait,
    {
        self.timestamp_column = NotSet;
        Ok(self)
    }
}
