//! Round-trip verification of the bar mapping.
//!
//! `TableFixture` owns the table lifecycle: drop-if-exists and create
//! before the body, drop after it whatever the outcome. The specifications
//! give every writable property of `bar` a value from its column domain and
//! the comparer its storage calls for.

use std::future::Future;
use std::panic::AssertUnwindSafe;

use async_trait::async_trait;
use futures::FutureExt;
use rand::Rng;
use sea_orm::{DatabaseConnection, IntoActiveModel};
use tracing::{error, info, warn};

use common::{AppError, AppResult};
use verification::{
    DecimalScale, EntityStore, Nullable, PersistenceSpecification, RandomValues,
    TemporalPrecision, ValueEquality, VerificationError, VerificationResult, WithinTolerance,
};

use crate::infra::{run_script, CREATE_BAR, DROP_BAR};
use crate::mapping::BAR_MAPPING;
use crate::repository::entities::bar::Model;
use crate::repository::{BarStore, ReadRepository, WriteRepository};

/// Literal stored in the XML column.
pub const XML_VALUE: &str = "<Bar />";

const HIERARCHY_MAX_DEPTH: usize = 6;
const VARBINARY_MAX_LEN: usize = 50;
const LARGE_BINARY_LEN: usize = 4096;
const LARGE_TEXT_LEN: usize = 2000;

#[async_trait]
impl EntityStore<Model> for BarStore {
    async fn persist(&self, entity: Model) -> AppResult<()> {
        self.insert(entity.into_active_model()).await?;
        Ok(())
    }

    async fn reload(&self, entity: &Model) -> AppResult<Option<Model>> {
        self.find_by_id(entity.id).await
    }
}

macro_rules! property {
    ($spec:expr, $field:ident, $value:expr) => {
        $spec.check_property(stringify!($field), $value, |bar: &mut Model| &mut bar.$field)
    };
    ($spec:expr, $field:ident, $value:expr, $comparer:expr) => {
        $spec.check_property_with(
            stringify!($field),
            $value,
            |bar: &mut Model| &mut bar.$field,
            $comparer,
        )
    };
}

/// Every writable property set to a representative value.
pub fn bar_specification<'s, S, R>(
    store: &'s S,
    values: &mut RandomValues<R>,
) -> PersistenceSpecification<'s, Model, S>
where
    S: EntityStore<Model> + ?Sized,
    R: Rng,
{
    build_specification(store, values, false)
}

/// As [`bar_specification`], with every nullable column left null.
pub fn nullable_bar_specification<'s, S, R>(
    store: &'s S,
    values: &mut RandomValues<R>,
) -> PersistenceSpecification<'s, Model, S>
where
    S: EntityStore<Model> + ?Sized,
    R: Rng,
{
    build_specification(store, values, true)
}

fn build_specification<'s, S, R>(
    store: &'s S,
    values: &mut RandomValues<R>,
    nulls: bool,
) -> PersistenceSpecification<'s, Model, S>
where
    S: EntityStore<Model> + ?Sized,
    R: Rng,
{
    let date = (!nulls).then(|| values.date());
    let geography = (!nulls).then(|| values.wkt_point());
    let geometry = (!nulls).then(|| values.wkt_point());
    let hierarchy = (!nulls).then(|| values.hierarchy_path(HIERARCHY_MAX_DEPTH));

    let mut spec = PersistenceSpecification::new(store);
    spec = property!(spec, id, values.uuid());
    spec = property!(spec, big_int_column, values.i64());
    spec = property!(spec, binary_column, values.bytes(16));
    spec = property!(spec, bit_column, values.bool());
    spec = property!(spec, char_column, values.ascii_string(10));
    spec = property!(spec, date_column, date, Nullable(ValueEquality));
    spec = property!(
        spec,
        date_time_column,
        values.datetime(TemporalPrecision::Milliseconds),
        WithinTolerance::one_second()
    );
    spec = property!(
        spec,
        date_time2_column,
        values.datetime(TemporalPrecision::Microseconds)
    );
    spec = property!(
        spec,
        date_time_offset_column,
        values.datetime_offset(TemporalPrecision::Microseconds)
    );
    spec = property!(spec, decimal_column, values.decimal(18, 4), DecimalScale::new(4));
    spec = property!(spec, float_column, values.f64());
    spec = property!(spec, geography_column, geography, Nullable(ValueEquality));
    spec = property!(spec, geometry_column, geometry, Nullable(ValueEquality));
    spec = property!(spec, hierarchy_id_column, hierarchy, Nullable(ValueEquality));
    spec = property!(spec, image_column, values.bytes(LARGE_BINARY_LEN));
    spec = property!(spec, int_column, values.i32());
    spec = property!(spec, money_column, values.decimal(19, 4), DecimalScale::new(4));
    spec = property!(spec, nchar_column, values.unicode_string(10));
    spec = property!(spec, ntext_column, values.unicode_string_up_to(LARGE_TEXT_LEN));
    spec = property!(spec, numeric_column, values.decimal(10, 5), DecimalScale::new(5));
    spec = property!(spec, nvarchar_column, values.unicode_string_up_to(50));
    spec = property!(
        spec,
        nvarchar_max_column,
        values.unicode_string_up_to(LARGE_TEXT_LEN)
    );
    spec = property!(spec, real_column, values.f32());
    spec = property!(
        spec,
        small_date_time_column,
        values.datetime(TemporalPrecision::Minutes),
        WithinTolerance::one_minute()
    );
    spec = property!(spec, small_int_column, values.i16());
    spec = property!(
        spec,
        small_money_column,
        values.decimal(10, 4),
        DecimalScale::new(4)
    );
    spec = property!(spec, sql_variant_column, values.variant());
    spec = property!(spec, text_column, values.ascii_string_up_to(LARGE_TEXT_LEN));
    spec = property!(
        spec,
        time_column,
        values.time(TemporalPrecision::Seconds),
        WithinTolerance::one_minute()
    );
    spec = property!(spec, tiny_int_column, values.tiny_int());
    spec = property!(spec, unique_identifier_column, values.uuid());
    spec = property!(spec, var_binary_column, values.bytes_up_to(VARBINARY_MAX_LEN));
    spec = property!(spec, var_binary_max_column, values.bytes(LARGE_BINARY_LEN));
    spec = property!(spec, var_char_column, values.ascii_string_up_to(50));
    spec = property!(
        spec,
        var_char_max_column,
        values.ascii_string_up_to(LARGE_TEXT_LEN)
    );
    spec = property!(spec, xml_column, XML_VALUE.to_string());

    spec.check_storage_assigned("timestamp_column", |bar: &Model| bar.timestamp_column > 0)
        .require_coverage(BAR_MAPPING.writable_properties())
}

/// Drops and recreates the bar table around a body of work.
pub struct TableFixture<'a> {
    db: &'a DatabaseConnection,
}

impl<'a> TableFixture<'a> {
    pub fn new(db: &'a DatabaseConnection) -> Self {
        Self { db }
    }

    /// Drop the table if it exists, then create it.
    pub async fn recreate(&self) -> AppResult<()> {
        run_script(self.db, DROP_BAR).await?;
        run_script(self.db, CREATE_BAR).await?;
        info!(table = %BAR_MAPPING.qualified_table(), "Table recreated");
        Ok(())
    }

    /// Drop the table if it exists.
    pub async fn drop_table(&self) -> AppResult<()> {
        run_script(self.db, DROP_BAR).await?;
        info!(table = %BAR_MAPPING.qualified_table(), "Table dropped");
        Ok(())
    }

    /// Recreate the table, run `body`, then drop the table.
    ///
    /// The drop also runs when setup or the body fails or panics; the
    /// original failure wins over a failed drop, and a panic is resumed
    /// after the drop.
    pub async fn run<F, Fut, T, E>(&self, body: F) -> Result<T, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, E>>,
        E: From<AppError>,
    {
        if let Err(e) = self.recreate().await {
            self.drop_quietly().await;
            return Err(e.into());
        }

        let outcome = AssertUnwindSafe(body()).catch_unwind().await;

        match outcome {
            Ok(Ok(value)) => {
                self.drop_table().await?;
                Ok(value)
            }
            Ok(Err(e)) => {
                self.drop_quietly().await;
                Err(e)
            }
            Err(panic) => {
                self.drop_quietly().await;
                std::panic::resume_unwind(panic)
            }
        }
    }

    async fn drop_quietly(&self) {
        if let Err(e) = self.drop_table().await {
            warn!(error = %e, "Failed to drop table during teardown");
        }
    }
}

/// Recreate the table, verify every property of `bar` round-trips, drop
/// the table. Returns the reloaded entity.
pub async fn verify_bar_mapping<R: Rng>(
    db: &DatabaseConnection,
    values: &mut RandomValues<R>,
) -> VerificationResult<Model> {
    BAR_MAPPING.validate()?;

    let store = BarStore::new(db.clone());
    let specification = bar_specification(&store, values);
    info!(
        table = %BAR_MAPPING.qualified_table(),
        checks = specification.check_count(),
        "Verifying mapping"
    );

    let result = TableFixture::new(db)
        .run(|| specification.verify_the_mappings())
        .await;
    match &result {
        Ok(_) => info!("Mapping verified"),
        Err(VerificationError::Store(e)) if e.is_infrastructure() => {
            error!(error = %e, code = e.code(), "Verification aborted")
        }
        Err(e) => error!(error = %e, "Mapping verification failed"),
    }
    result
}
