//! Shared helpers for the bar data integration tests.
//!
//! Tests run against the `IntegrationTests` connection when it is
//! configured and against a private in-memory SQLite database otherwise.
//! A configured server is shared by every test in the binary, so tests
//! serialize on [`serial`].

#![allow(dead_code)]

use chrono::{FixedOffset, NaiveDate, NaiveTime, TimeZone};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use sea_orm::{ConnectionTrait, DatabaseConnection, DbBackend, Statement};
use serde_json::json;
use tokio::sync::{Mutex, MutexGuard};
use uuid::Uuid;

use bar_data::config::BarDataConfig;
use bar_data::infra::Database;
use bar_data::repository::entities::bar;
use common::INTEGRATION_TESTS_CONNECTION;

static SERIAL: Lazy<Mutex<()>> = Lazy::new(|| Mutex::new(()));

/// Hold for the duration of a test touching `dbo.bar`.
pub async fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().await
}

pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_test_writer()
        .try_init();
}

/// Open a session on the integration test connection.
pub async fn open_session() -> Database {
    init_tracing();
    let config = BarDataConfig::for_connection(INTEGRATION_TESTS_CONNECTION).unwrap();
    Database::connect_without_migrations(&config.database)
        .await
        .unwrap()
}

/// Whether `dbo.bar` currently exists.
pub async fn table_exists(db: &DatabaseConnection) -> bool {
    let backend = db.get_database_backend();
    let sql = match backend {
        DbBackend::Sqlite => {
            "SELECT COUNT(*) AS present FROM dbo.sqlite_master WHERE type = 'table' AND name = 'bar'"
        }
        _ => "SELECT COUNT(*) AS present FROM information_schema.tables \
              WHERE table_schema = 'dbo' AND table_name = 'bar'",
    };
    let row = db
        .query_one(Statement::from_string(backend, sql.to_string()))
        .await
        .unwrap()
        .unwrap();
    row.try_get::<i64>("", "present").unwrap() > 0
}

/// A bar with every column inside its domain.
pub fn sample_bar(id: Uuid) -> bar::Model {
    let day = NaiveDate::from_ymd_opt(2024, 2, 29).unwrap();
    let offset = FixedOffset::east_opt(5 * 3600 + 30 * 60).unwrap();

    bar::Model {
        id,
        big_int_column: 9_000_000_000,
        binary_column: (0u8..16).collect(),
        bit_column: true,
        char_column: "abcdefghij".to_string(),
        date_column: Some(day),
        date_time_column: day.and_hms_milli_opt(13, 45, 30, 250).unwrap(),
        date_time2_column: day.and_hms_micro_opt(13, 45, 30, 123_456).unwrap(),
        date_time_offset_column: offset.with_ymd_and_hms(2024, 2, 29, 8, 0, 0).unwrap(),
        decimal_column: Decimal::new(123_456_789, 4),
        float_column: 1234.5678,
        geography_column: Some("POINT(-122.349 47.651)".to_string()),
        geometry_column: Some("POINT(3 4)".to_string()),
        hierarchy_id_column: Some("/1/3/".to_string()),
        image_column: vec![0xFF; 512],
        int_column: 42,
        money_column: Decimal::new(99_999_999, 4),
        nchar_column: "ÄÖÜäöüßéèê".to_string(),
        ntext_column: "Строка юникода".to_string(),
        numeric_column: Decimal::new(1_234_567, 5),
        nvarchar_column: "日本語のテキスト".to_string(),
        nvarchar_max_column: "λ".repeat(300),
        real_column: 3.5,
        small_date_time_column: day.and_hms_opt(13, 45, 0).unwrap(),
        small_int_column: -1234,
        small_money_column: Decimal::new(2_147_483, 4),
        sql_variant_column: json!(42),
        text_column: "plain text".to_string(),
        time_column: NaiveTime::from_hms_opt(23, 59, 0).unwrap(),
        timestamp_column: 0,
        tiny_int_column: 255,
        unique_identifier_column: Uuid::new_v4(),
        var_binary_column: vec![1, 2, 3],
        var_binary_max_column: vec![9; 10_000],
        var_char_column: "varchar".to_string(),
        var_char_max_column: "x".repeat(5000),
        xml_column: "<Bar />".to_string(),
    }
}
