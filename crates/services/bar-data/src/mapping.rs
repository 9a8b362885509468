//! Column mapping table for the bar entity.
//!
//! The SeaORM entity carries the bindings the ORM uses at runtime. This
//! table restates them as data: which property lands in which column, the
//! storage type where it is not inferred from the Rust type, nullability
//! and the read-only row version. The verification routine takes its
//! coverage from here, and the tests below keep it in step with the entity
//! and the DDL scripts.

use std::collections::HashSet;
use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

use common::{AppError, AppResult};

static IDENTIFIER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z_][A-Za-z0-9_]*$").expect("valid identifier pattern"));

/// How the primary key gets its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentityStrategy {
    /// Supplied by the caller before insert
    Assigned,
}

/// Storage type override for a column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StorageType {
    Binary(u32),
    Blob,
    Char(u32),
    Decimal { precision: u32, scale: u32 },
    JsonBinary,
    SmallInteger,
    String(u32),
    Text,
    Time,
    Timestamp,
    /// `None` is unbounded
    VarBinary(Option<u32>),
}

impl fmt::Display for StorageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StorageType::Binary(len) => write!(f, "binary({})", len),
            StorageType::Blob => f.write_str("blob"),
            StorageType::Char(len) => write!(f, "char({})", len),
            StorageType::Decimal { precision, scale } => {
                write!(f, "decimal({},{})", precision, scale)
            }
            StorageType::JsonBinary => f.write_str("jsonb"),
            StorageType::SmallInteger => f.write_str("smallint"),
            StorageType::String(len) => write!(f, "varchar({})", len),
            StorageType::Text => f.write_str("text"),
            StorageType::Time => f.write_str("time"),
            StorageType::Timestamp => f.write_str("timestamp"),
            StorageType::VarBinary(Some(len)) => write!(f, "varbinary({})", len),
            StorageType::VarBinary(None) => f.write_str("varbinary(max)"),
        }
    }
}

/// One property bound to one column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ColumnMapping {
    pub property: &'static str,
    /// Explicit column name; the property name when absent
    pub column: Option<&'static str>,
    pub storage: Option<StorageType>,
    pub nullable: bool,
    pub read_only: bool,
}

impl ColumnMapping {
    pub const fn new(property: &'static str) -> Self {
        Self {
            property,
            column: None,
            storage: None,
            nullable: false,
            read_only: false,
        }
    }

    pub const fn column(mut self, column: &'static str) -> Self {
        self.column = Some(column);
        self
    }

    pub const fn storage(mut self, storage: StorageType) -> Self {
        self.storage = Some(storage);
        self
    }

    pub const fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    pub const fn read_only(mut self) -> Self {
        self.read_only = true;
        self
    }

    /// Column the property is stored in.
    pub fn column_name(&self) -> &'static str {
        self.column.unwrap_or(self.property)
    }
}

/// Table-level mapping of an entity.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct EntityMapping {
    pub schema: &'static str,
    pub table: &'static str,
    /// Property holding the primary key
    pub identity: &'static str,
    pub strategy: IdentityStrategy,
    pub columns: &'static [ColumnMapping],
}

impl EntityMapping {
    /// `schema.table`
    pub fn qualified_table(&self) -> String {
        format!("{}.{}", self.schema, self.table)
    }

    pub fn column(&self, property: &str) -> Option<&ColumnMapping> {
        self.columns.iter().find(|c| c.property == property)
    }

    /// Properties application code may write.
    pub fn writable_properties(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| !c.read_only)
            .map(|c| c.property)
            .collect()
    }

    pub fn nullable_properties(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.nullable)
            .map(|c| c.property)
            .collect()
    }

    pub fn read_only_properties(&self) -> Vec<&'static str> {
        self.columns
            .iter()
            .filter(|c| c.read_only)
            .map(|c| c.property)
            .collect()
    }

    /// Startup checks: identifiers, uniqueness, a writable non-null identity.
    pub fn validate(&self) -> AppResult<()> {
        for name in [self.schema, self.table] {
            check_identifier(name)?;
        }

        let mut properties = HashSet::new();
        let mut columns = HashSet::new();
        for mapping in self.columns {
            check_identifier(mapping.property)?;
            check_identifier(mapping.column_name())?;
            if !properties.insert(mapping.property) {
                return Err(AppError::mapping(format!(
                    "property '{}' is mapped more than once",
                    mapping.property
                )));
            }
            if !columns.insert(mapping.column_name()) {
                return Err(AppError::mapping(format!(
                    "column '{}' is mapped more than once",
                    mapping.column_name()
                )));
            }
        }

        let identity = self.column(self.identity).ok_or_else(|| {
            AppError::mapping(format!("identity property '{}' is not mapped", self.identity))
        })?;
        if identity.read_only || identity.nullable {
            return Err(AppError::mapping(format!(
                "identity property '{}' must be writable and not null",
                self.identity
            )));
        }

        Ok(())
    }
}

fn check_identifier(name: &str) -> AppResult<()> {
    if IDENTIFIER.is_match(name) {
        Ok(())
    } else {
        Err(AppError::mapping(format!("'{}' is not a valid identifier", name)))
    }
}

/// Mapping of the bar entity onto `dbo.bar`.
pub static BAR_MAPPING: EntityMapping = EntityMapping {
    schema: "dbo",
    table: "bar",
    identity: "id",
    strategy: IdentityStrategy::Assigned,
    columns: &[
        ColumnMapping::new("id"),
        ColumnMapping::new("big_int_column"),
        ColumnMapping::new("binary_column").storage(StorageType::Binary(16)),
        ColumnMapping::new("bit_column"),
        ColumnMapping::new("char_column").storage(StorageType::Char(10)),
        ColumnMapping::new("date_column").nullable(),
        ColumnMapping::new("date_time_column").storage(StorageType::Timestamp),
        ColumnMapping::new("date_time2_column").column("datetime2_column"),
        ColumnMapping::new("date_time_offset_column"),
        ColumnMapping::new("decimal_column").storage(StorageType::Decimal {
            precision: 18,
            scale: 4,
        }),
        ColumnMapping::new("float_column"),
        ColumnMapping::new("geography_column")
            .storage(StorageType::Text)
            .nullable(),
        ColumnMapping::new("geometry_column")
            .storage(StorageType::Text)
            .nullable(),
        ColumnMapping::new("hierarchy_id_column")
            .column("hierarchyid_column")
            .storage(StorageType::String(892))
            .nullable(),
        ColumnMapping::new("image_column").storage(StorageType::Blob),
        ColumnMapping::new("int_column"),
        ColumnMapping::new("money_column").storage(StorageType::Decimal {
            precision: 19,
            scale: 4,
        }),
        ColumnMapping::new("nchar_column").storage(StorageType::Char(10)),
        ColumnMapping::new("ntext_column").storage(StorageType::Text),
        ColumnMapping::new("numeric_column").storage(StorageType::Decimal {
            precision: 10,
            scale: 5,
        }),
        ColumnMapping::new("nvarchar_column").storage(StorageType::String(50)),
        ColumnMapping::new("nvarchar_max_column").storage(StorageType::Text),
        ColumnMapping::new("real_column"),
        ColumnMapping::new("small_date_time_column")
            .column("smalldatetime_column")
            .storage(StorageType::Timestamp),
        ColumnMapping::new("small_int_column"),
        ColumnMapping::new("small_money_column")
            .column("smallmoney_column")
            .storage(StorageType::Decimal {
                precision: 10,
                scale: 4,
            }),
        ColumnMapping::new("sql_variant_column").storage(StorageType::JsonBinary),
        ColumnMapping::new("text_column").storage(StorageType::Text),
        ColumnMapping::new("time_column").storage(StorageType::Time),
        ColumnMapping::new("timestamp_column").read_only(),
        ColumnMapping::new("tiny_int_column")
            .column("tinyint_column")
            .storage(StorageType::SmallInteger),
        ColumnMapping::new("unique_identifier_column"),
        ColumnMapping::new("var_binary_column")
            .column("varbinary_column")
            .storage(StorageType::VarBinary(Some(50))),
        ColumnMapping::new("var_binary_max_column")
            .column("varbinary_max_column")
            .storage(StorageType::VarBinary(None)),
        ColumnMapping::new("var_char_column")
            .column("varchar_column")
            .storage(StorageType::String(50)),
        ColumnMapping::new("var_char_max_column")
            .column("varchar_max_column")
            .storage(StorageType::Text),
        ColumnMapping::new("xml_column").storage(StorageType::Text),
    ],
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::scripts::{script, CREATE_BAR};
    use crate::repository::entities::bar;
    use sea_orm::{ColumnTrait, DbBackend, EntityName, IdenStatic, Iterable};

    #[test]
    fn test_bar_mapping_is_valid() {
        BAR_MAPPING.validate().unwrap();
        assert_eq!(BAR_MAPPING.qualified_table(), "dbo.bar");
        assert_eq!(BAR_MAPPING.strategy, IdentityStrategy::Assigned);
    }

    #[test]
    fn test_row_version_is_the_only_read_only_property() {
        assert_eq!(BAR_MAPPING.read_only_properties(), vec!["timestamp_column"]);
        assert!(!BAR_MAPPING
            .writable_properties()
            .contains(&"timestamp_column"));
        assert_eq!(
            BAR_MAPPING.writable_properties().len(),
            BAR_MAPPING.columns.len() - 1
        );
    }

    #[test]
    fn test_nullable_properties() {
        assert_eq!(
            BAR_MAPPING.nullable_properties(),
            vec![
                "date_column",
                "geography_column",
                "geometry_column",
                "hierarchy_id_column"
            ]
        );
    }

    #[test]
    fn test_column_name_defaults_to_property() {
        let int = BAR_MAPPING.column("int_column").unwrap();
        assert_eq!(int.column_name(), "int_column");

        let tiny = BAR_MAPPING.column("tiny_int_column").unwrap();
        assert_eq!(tiny.column_name(), "tinyint_column");
        assert_eq!(tiny.storage.unwrap().to_string(), "smallint");

        assert!(BAR_MAPPING.column("missing").is_none());
    }

    #[test]
    fn test_matches_entity_table() {
        assert_eq!(bar::Entity.schema_name(), Some(BAR_MAPPING.schema));
        assert_eq!(bar::Entity.table_name(), BAR_MAPPING.table);
    }

    #[test]
    fn test_matches_entity_columns() {
        let entity_columns: Vec<bar::Column> = bar::Column::iter().collect();
        assert_eq!(entity_columns.len(), BAR_MAPPING.columns.len());

        for column in entity_columns {
            let name = column.as_str();
            let mapping = BAR_MAPPING
                .columns
                .iter()
                .find(|c| c.column_name() == name)
                .unwrap_or_else(|| panic!("entity column '{}' is not mapped", name));
            assert_eq!(
                column.def().is_null(),
                mapping.nullable,
                "nullability of '{}'",
                name
            );
        }
    }

    #[test]
    fn test_matches_create_scripts() {
        for backend in [DbBackend::Postgres, DbBackend::Sqlite] {
            let sql = script(backend, CREATE_BAR).unwrap();
            for mapping in BAR_MAPPING.columns {
                let name = mapping.column_name();
                let line = sql
                    .lines()
                    .map(str::trim)
                    .find(|line| line.split_whitespace().next() == Some(name))
                    .unwrap_or_else(|| panic!("{:?} script has no column '{}'", backend, name));
                assert_eq!(
                    !line.contains("NOT NULL"),
                    mapping.nullable,
                    "{:?} nullability of '{}'",
                    backend,
                    name
                );
            }
        }
    }

    static DUPLICATE_COLUMN: EntityMapping = EntityMapping {
        schema: "dbo",
        table: "foo",
        identity: "id",
        strategy: IdentityStrategy::Assigned,
        columns: &[
            ColumnMapping::new("id"),
            ColumnMapping::new("a").column("value"),
            ColumnMapping::new("b").column("value"),
        ],
    };

    static READ_ONLY_IDENTITY: EntityMapping = EntityMapping {
        schema: "dbo",
        table: "foo",
        identity: "id",
        strategy: IdentityStrategy::Assigned,
        columns: &[ColumnMapping::new("id").read_only()],
    };

    static MISSING_IDENTITY: EntityMapping = EntityMapping {
        schema: "dbo",
        table: "foo",
        identity: "id",
        strategy: IdentityStrategy::Assigned,
        columns: &[ColumnMapping::new("value")],
    };

    static BAD_TABLE: EntityMapping = EntityMapping {
        schema: "dbo",
        table: "foo; drop",
        identity: "id",
        strategy: IdentityStrategy::Assigned,
        columns: &[ColumnMapping::new("id")],
    };

    #[test]
    fn test_validate_rejects_duplicate_column() {
        let err = DUPLICATE_COLUMN.validate().unwrap_err();
        assert_eq!(err.code(), "MAPPING_ERROR");
        assert!(err.to_string().contains("'value'"));
    }

    #[test]
    fn test_validate_rejects_bad_identity() {
        assert!(READ_ONLY_IDENTITY.validate().is_err());
        let err = MISSING_IDENTITY.validate().unwrap_err();
        assert!(err.to_string().contains("not mapped"));
    }

    #[test]
    fn test_validate_rejects_bad_identifier() {
        assert!(BAD_TABLE.validate().is_err());
    }

    #[test]
    fn test_storage_display() {
        assert_eq!(StorageType::VarBinary(None).to_string(), "varbinary(max)");
        assert_eq!(
            StorageType::Decimal {
                precision: 19,
                scale: 4
            }
            .to_string(),
            "decimal(19,4)"
        );
    }
}
