//! Bounded random values for column domains.
//!
//! Every generator returns a value inside the domain of the column it is
//! meant for: exact or bounded lengths for strings and binaries, decimals
//! that fit a precision/scale, date-times truncated to a precision.

use chrono::{
    DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime, Offset, TimeZone, Utc,
};
use rand::distr::uniform::{SampleRange, SampleUniform};
use rand::distr::Alphanumeric;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rust_decimal::Decimal;
use serde_json::{json, Value as JsonValue};
use uuid::{Builder, Uuid};

/// First day generated by date generators (1900-01-01).
const MIN_DAY_FROM_CE: i32 = 693_596;

/// Last day generated by date generators (2078-12-31).
const MAX_DAY_FROM_CE: i32 = 758_974;

const SECONDS_PER_DAY: u32 = 86_400;

/// Mantissa cap: SQLite carries decimals as doubles.
const MAX_DECIMAL_DIGITS: u32 = 15;

const MAX_DECIMAL_SCALE: u32 = 28;

/// Offsets are whole quarter hours within ±14:00.
const MAX_OFFSET_QUARTERS: i32 = 56;

/// Mixed-script alphabet for national character columns.
const UNICODE_ALPHABET: &[char] = &[
    'a', 'b', 'c', 'x', 'y', 'z', 'A', 'Q', 'Z', '0', '7', 'é', 'ü', 'ñ', 'ß', 'ø', 'Ж', 'я', 'λ',
    'Ω', 'ש', 'ع', '中', '文', '日', '本', 'ह', 'ก',
];

/// Sub-second precision kept by a date-time generator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalPrecision {
    Minutes,
    Seconds,
    Milliseconds,
    Microseconds,
}

impl TemporalPrecision {
    fn truncate_seconds(self, seconds: u32) -> u32 {
        match self {
            TemporalPrecision::Minutes => seconds - seconds % 60,
            _ => seconds,
        }
    }

    fn nanos<R: Rng>(self, rng: &mut R) -> u32 {
        match self {
            TemporalPrecision::Minutes | TemporalPrecision::Seconds => 0,
            TemporalPrecision::Milliseconds => rng.random_range(0..1_000u32) * 1_000_000,
            TemporalPrecision::Microseconds => rng.random_range(0..1_000_000u32) * 1_000,
        }
    }
}

/// Random value source for property checks.
pub struct RandomValues<R: Rng = StdRng> {
    rng: R,
}

impl RandomValues<StdRng> {
    /// Reproducible values for a given seed.
    pub fn seeded(seed: u64) -> Self {
        Self::new(StdRng::seed_from_u64(seed))
    }

    /// Values seeded from the operating system.
    pub fn from_os_rng() -> Self {
        Self::new(StdRng::from_os_rng())
    }
}

impl<R: Rng> RandomValues<R> {
    pub fn new(rng: R) -> Self {
        Self { rng }
    }

    /// Uniform value in `range`.
    pub fn in_range<T, Rg>(&mut self, range: Rg) -> T
    where
        T: SampleUniform,
        Rg: SampleRange<T>,
    {
        self.rng.random_range(range)
    }

    pub fn bool(&mut self) -> bool {
        self.rng.random_bool(0.5)
    }

    pub fn i16(&mut self) -> i16 {
        let magnitude = self.rng.random_range(1..=i16::MAX);
        self.signed(magnitude)
    }

    pub fn i32(&mut self) -> i32 {
        let magnitude = self.rng.random_range(1..=i32::MAX);
        self.signed(magnitude)
    }

    pub fn i64(&mut self) -> i64 {
        let magnitude = self.rng.random_range(1..=i64::MAX);
        self.signed(magnitude)
    }

    /// Unsigned byte, widened for storage without an unsigned tiny integer.
    pub fn tiny_int(&mut self) -> i16 {
        self.rng.random_range(1..=255)
    }

    pub fn f32(&mut self) -> f32 {
        self.rng.random_range(-1.0e6f32..1.0e6f32)
    }

    pub fn f64(&mut self) -> f64 {
        self.rng.random_range(-1.0e12f64..1.0e12f64)
    }

    /// Exactly `len` random bytes.
    pub fn bytes(&mut self, len: usize) -> Vec<u8> {
        let mut buffer = vec![0u8; len];
        self.rng.fill(buffer.as_mut_slice());
        buffer
    }

    /// Between one and `max_len` random bytes.
    pub fn bytes_up_to(&mut self, max_len: usize) -> Vec<u8> {
        let len = self.length_up_to(max_len);
        self.bytes(len)
    }

    /// Exactly `len` alphanumeric ASCII characters.
    pub fn ascii_string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| char::from(self.rng.sample(Alphanumeric)))
            .collect()
    }

    /// Between one and `max_len` alphanumeric ASCII characters.
    pub fn ascii_string_up_to(&mut self, max_len: usize) -> String {
        let len = self.length_up_to(max_len);
        self.ascii_string(len)
    }

    /// Exactly `len` characters drawn from several scripts.
    pub fn unicode_string(&mut self, len: usize) -> String {
        (0..len)
            .map(|_| UNICODE_ALPHABET[self.rng.random_range(0..UNICODE_ALPHABET.len())])
            .collect()
    }

    /// Between one and `max_len` characters drawn from several scripts.
    pub fn unicode_string_up_to(&mut self, max_len: usize) -> String {
        let len = self.length_up_to(max_len);
        self.unicode_string(len)
    }

    /// Day between 1900-01-01 and 2078-12-31.
    pub fn date(&mut self) -> NaiveDate {
        let day = self.rng.random_range(MIN_DAY_FROM_CE..=MAX_DAY_FROM_CE);
        NaiveDate::from_num_days_from_ce_opt(day).unwrap_or_default()
    }

    /// Time of day truncated to `precision`.
    pub fn time(&mut self, precision: TemporalPrecision) -> NaiveTime {
        let seconds = precision.truncate_seconds(self.rng.random_range(0..SECONDS_PER_DAY));
        let nanos = precision.nanos(&mut self.rng);
        NaiveTime::from_num_seconds_from_midnight_opt(seconds, nanos).unwrap_or_default()
    }

    /// Date-time truncated to `precision`.
    pub fn datetime(&mut self, precision: TemporalPrecision) -> NaiveDateTime {
        let date = self.date();
        let time = self.time(precision);
        NaiveDateTime::new(date, time)
    }

    /// Date-time with a random quarter-hour offset.
    pub fn datetime_offset(&mut self, precision: TemporalPrecision) -> DateTime<FixedOffset> {
        let quarters = self.rng.random_range(-MAX_OFFSET_QUARTERS..=MAX_OFFSET_QUARTERS);
        let offset = FixedOffset::east_opt(quarters * 15 * 60).unwrap_or_else(|| Utc.fix());
        let utc = self.datetime(precision);
        offset.from_utc_datetime(&utc)
    }

    /// Non-zero decimal fitting `numeric(precision, scale)`.
    pub fn decimal(&mut self, precision: u32, scale: u32) -> Decimal {
        let digits = precision.clamp(1, MAX_DECIMAL_DIGITS);
        let bound = 10i64.pow(digits) - 1;
        let mantissa = self.rng.random_range(1..=bound);
        let mantissa = self.signed(mantissa);
        Decimal::new(mantissa, scale.min(MAX_DECIMAL_SCALE))
    }

    pub fn uuid(&mut self) -> Uuid {
        Builder::from_random_bytes(self.rng.random()).into_uuid()
    }

    /// Well-known-text point with six decimal places.
    pub fn wkt_point(&mut self) -> String {
        let longitude = self.rng.random_range(-180.0f64..=180.0);
        let latitude = self.rng.random_range(-90.0f64..=90.0);
        format!("POINT({:.6} {:.6})", longitude, latitude)
    }

    /// Hierarchy path such as `/3/1/12/`, between one and `max_depth` levels.
    pub fn hierarchy_path(&mut self, max_depth: usize) -> String {
        let depth = self.length_up_to(max_depth);
        let mut path = String::from("/");
        for _ in 0..depth {
            let node: u16 = self.rng.random_range(1..=999);
            path.push_str(&node.to_string());
            path.push('/');
        }
        path
    }

    /// Scalar of a random kind, as stored in a variant column.
    pub fn variant(&mut self) -> JsonValue {
        match self.rng.random_range(0..3u8) {
            0 => json!(self.i32()),
            1 => json!(self.ascii_string_up_to(24)),
            _ => json!(self.bool()),
        }
    }

    fn length_up_to(&mut self, max_len: usize) -> usize {
        self.rng.random_range(1..=max_len.max(1))
    }

    fn signed<T: std::ops::Neg<Output = T>>(&mut self, magnitude: T) -> T {
        if self.rng.random_bool(0.5) {
            -magnitude
        } else {
            magnitude
        }
    }
}
