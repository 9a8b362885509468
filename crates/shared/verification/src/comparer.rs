//! Equality strategies for reloaded values.
//!
//! Most columns round-trip exactly and use [`ValueEquality`]. Columns whose
//! storage drops precision (coarse date-times, times, fixed-scale decimals)
//! need a comparer that accepts the loss.

use chrono::{DateTime, Duration, FixedOffset, NaiveDateTime, NaiveTime};
use rust_decimal::Decimal;

/// Decides whether a reloaded value matches the value written.
pub trait Comparer<V>: Send + Sync {
    fn equals(&self, expected: &V, actual: &V) -> bool;
}

impl<V, F> Comparer<V> for F
where
    F: Fn(&V, &V) -> bool + Send + Sync,
{
    fn equals(&self, expected: &V, actual: &V) -> bool {
        self(expected, actual)
    }
}

/// Plain `PartialEq` comparison.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValueEquality;

impl<V: PartialEq> Comparer<V> for ValueEquality {
    fn equals(&self, expected: &V, actual: &V) -> bool {
        expected == actual
    }
}

/// Temporal values equal within a fixed tolerance (inclusive).
#[derive(Debug, Clone, Copy)]
pub struct WithinTolerance {
    tolerance: Duration,
}

impl WithinTolerance {
    pub fn new(tolerance: Duration) -> Self {
        Self {
            tolerance: if tolerance < Duration::zero() { -tolerance } else { tolerance },
        }
    }

    pub fn one_second() -> Self {
        Self::new(Duration::seconds(1))
    }

    pub fn one_minute() -> Self {
        Self::new(Duration::minutes(1))
    }

    fn accepts(&self, delta: Duration) -> bool {
        delta <= self.tolerance && delta >= -self.tolerance
    }
}

impl Comparer<NaiveDateTime> for WithinTolerance {
    fn equals(&self, expected: &NaiveDateTime, actual: &NaiveDateTime) -> bool {
        self.accepts(actual.signed_duration_since(*expected))
    }
}

impl Comparer<DateTime<FixedOffset>> for WithinTolerance {
    fn equals(&self, expected: &DateTime<FixedOffset>, actual: &DateTime<FixedOffset>) -> bool {
        self.accepts(actual.signed_duration_since(*expected))
    }
}

impl Comparer<NaiveTime> for WithinTolerance {
    fn equals(&self, expected: &NaiveTime, actual: &NaiveTime) -> bool {
        // Rounding up near midnight wraps to the start of the day.
        let delta = actual.signed_duration_since(*expected);
        let day = Duration::days(1);
        self.accepts(delta) || self.accepts(delta - day) || self.accepts(delta + day)
    }
}

/// Decimals equal once both are rounded to the column scale.
#[derive(Debug, Clone, Copy)]
pub struct DecimalScale {
    scale: u32,
}

impl DecimalScale {
    pub fn new(scale: u32) -> Self {
        Self { scale }
    }
}

impl Comparer<Decimal> for DecimalScale {
    fn equals(&self, expected: &Decimal, actual: &Decimal) -> bool {
        expected.round_dp(self.scale) == actual.round_dp(self.scale)
    }
}

/// Lifts a comparer over nullable values: null only equals null.
#[derive(Debug, Clone, Copy, Default)]
pub struct Nullable<C>(pub C);

impl<V, C> Comparer<Option<V>> for Nullable<C>
where
    C: Comparer<V>,
{
    fn equals(&self, expected: &Option<V>, actual: &Option<V>) -> bool {
        match (expected, actual) {
            (None, None) => true,
            (Some(expected), Some(actual)) => self.0.equals(expected, actual),
            _ => false,
        }
    }
}
