//! Conversion of stored scalars into the portable [`Value`] model.
//!
//! Three producers feed the model:
//! - Parquet row fields decoded by the record API ([`field_value`]).
//! - Parquet column-chunk statistics, which carry raw physical values that
//!   must be interpreted through the column's logical annotation
//!   ([`stat_bounds`]).
//! - JSON values from record-oriented files ([`json_value`]).
//!
//! All three are total: every input maps to some `Value`. Missing markers,
//! NaN and infinities become `Null`; timestamps, dates and times of day
//! become ISO-8601 text; decimals become exact decimal text; integers that do
//! not fit in `i64` and composite values become their textual form.
//! Normalizing an already-normalized value (through JSON text) yields the
//! same value.
//!
//! Row values and chunk statistics of one column always land on the same
//! `Value` kind.

use std::cmp::Ordering;

use chrono::{DateTime, NaiveDate, NaiveTime, SecondsFormat, TimeZone, Utc};
use parquet::basic::{ConvertedType, LogicalType, TimeUnit};
use parquet::data_type::ByteArray;
use parquet::file::statistics::Statistics;
use parquet::record::Field;
use parquet::schema::types::ColumnDescriptor;

use crate::value::Value;

/// Days from 0001-01-01 (day 1 of the common era) to 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Normalize one decoded Parquet field.
pub fn field_value(field: &Field) -> Value {
    match field {
        Field::Null => Value::Null,
        Field::Bool(v) => Value::Bool(*v),
        Field::Byte(v) => Value::Int(i64::from(*v)),
        Field::Short(v) => Value::Int(i64::from(*v)),
        Field::Int(v) => Value::Int(i64::from(*v)),
        Field::Long(v) => Value::Int(*v),
        Field::UByte(v) => Value::Int(i64::from(*v)),
        Field::UShort(v) => Value::Int(i64::from(*v)),
        Field::UInt(v) => Value::Int(i64::from(*v)),
        Field::ULong(v) => unsigned_value(*v),
        Field::Float16(v) => Value::float(f64::from(*v)),
        Field::Float(v) => Value::float(f64::from(*v)),
        Field::Double(v) => Value::float(*v),
        Field::Str(v) => Value::String(v.clone()),
        Field::Date(days) => date_value(*days),
        Field::TimestampMillis(v) => timestamp_value(&TimeUnit::MILLIS, *v),
        Field::TimestampMicros(v) => timestamp_value(&TimeUnit::MICROS, *v),
        Field::TimeMillis(v) => time_value(&TimeUnit::MILLIS, i64::from(*v)),
        Field::TimeMicros(v) => time_value(&TimeUnit::MICROS, *v),
        Field::Decimal(d) => {
            decimal_value(d.data(), d.scale()).unwrap_or_else(|| Value::String(field.to_string()))
        }
        // Binary and nested groups/lists/maps.
        other => Value::String(other.to_string()),
    }
}

/// Normalize a top-level row field of a column annotated with `logical`.
///
/// The record API only decodes units it has a converted type for, so
/// nanosecond timestamps and times arrive as plain `Long`s. Those are
/// rendered here the way their statistics are.
pub(crate) fn column_value(field: &Field, logical: Option<&LogicalType>) -> Value {
    match (field, logical) {
        (Field::Long(v), Some(LogicalType::Timestamp { unit, .. })) => timestamp_value(unit, *v),
        (Field::Long(v), Some(LogicalType::Time { unit, .. })) => time_value(unit, *v),
        (Field::Int(v), Some(LogicalType::Time { unit, .. })) => {
            time_value(unit, i64::from(*v))
        }
        _ => field_value(field),
    }
}

/// Normalize a JSON value from a record-oriented file.
pub fn json_value(value: &serde_json::Value) -> Value {
    match value {
        serde_json::Value::Null => Value::Null,
        serde_json::Value::Bool(v) => Value::Bool(*v),
        serde_json::Value::Number(n) => {
            if let Some(i) = n.as_i64() {
                Value::Int(i)
            } else if n.is_u64() {
                Value::String(n.to_string())
            } else {
                n.as_f64().map(Value::float).unwrap_or(Value::Null)
            }
        }
        serde_json::Value::String(s) => Value::String(s.clone()),
        composite @ (serde_json::Value::Array(_) | serde_json::Value::Object(_)) => {
            Value::String(composite.to_string())
        }
    }
}

/// Interpret one column chunk's min/max statistics.
///
/// Returns `(min, max)`; either side is `None` when the statistic is absent
/// or the column's type has no meaningful ordering in the value model
/// (INT96, non-decimal fixed-length binary). Decimal bounds are exact
/// decimal text; fold them with [`BoundOrder`].
pub(crate) fn stat_bounds(
    stats: &Statistics,
    column: &ColumnDescriptor,
) -> (Option<Value>, Option<Value>) {
    let logical = column.logical_type_ref();
    match stats {
        Statistics::Boolean(s) => bounds(s.min_opt(), s.max_opt(), |v| Some(Value::Bool(*v))),
        Statistics::Int32(s) => bounds(s.min_opt(), s.max_opt(), |v| int32_stat(*v, logical)),
        Statistics::Int64(s) => bounds(s.min_opt(), s.max_opt(), |v| int64_stat(*v, logical)),
        Statistics::Int96(_) => (None, None),
        Statistics::Float(s) => bounds(s.min_opt(), s.max_opt(), |v| {
            non_null(Value::float(f64::from(*v)))
        }),
        Statistics::Double(s) => bounds(s.min_opt(), s.max_opt(), |v| non_null(Value::float(*v))),
        Statistics::ByteArray(s) => {
            bounds(s.min_opt(), s.max_opt(), |v| byte_array_stat(v, column))
        }
        Statistics::FixedLenByteArray(s) => match logical {
            Some(LogicalType::Decimal { scale, .. }) => {
                bounds(s.min_opt(), s.max_opt(), |v| decimal_value(v.data(), *scale))
            }
            _ => (None, None),
        },
    }
}

fn bounds<T>(
    min: Option<&T>,
    max: Option<&T>,
    convert: impl Fn(&T) -> Option<Value>,
) -> (Option<Value>, Option<Value>) {
    (min.and_then(&convert), max.and_then(&convert))
}

fn non_null(value: Value) -> Option<Value> {
    (!value.is_null()).then_some(value)
}

fn int32_stat(v: i32, logical: Option<&LogicalType>) -> Option<Value> {
    match logical {
        Some(LogicalType::Date) => Some(date_value(v)),
        Some(LogicalType::Time { unit, .. }) => Some(time_value(unit, i64::from(v))),
        Some(LogicalType::Decimal { scale, .. }) => {
            Some(Value::String(decimal_text(i128::from(v), *scale)))
        }
        Some(LogicalType::Integer {
            is_signed: false, ..
        }) => Some(Value::Int(i64::from(v as u32))),
        _ => Some(Value::Int(i64::from(v))),
    }
}

fn int64_stat(v: i64, logical: Option<&LogicalType>) -> Option<Value> {
    match logical {
        Some(LogicalType::Timestamp { unit, .. }) => Some(timestamp_value(unit, v)),
        Some(LogicalType::Time { unit, .. }) => Some(time_value(unit, v)),
        Some(LogicalType::Decimal { scale, .. }) => {
            Some(Value::String(decimal_text(i128::from(v), *scale)))
        }
        Some(LogicalType::Integer {
            is_signed: false, ..
        }) => Some(unsigned_value(v as u64)),
        _ => Some(Value::Int(v)),
    }
}

fn byte_array_stat(v: &ByteArray, column: &ColumnDescriptor) -> Option<Value> {
    match column.logical_type_ref() {
        Some(LogicalType::Decimal { scale, .. }) => decimal_value(v.data(), *scale),
        Some(LogicalType::String | LogicalType::Json | LogicalType::Enum) => utf8_value(v.data()),
        _ if matches!(
            column.converted_type(),
            ConvertedType::UTF8 | ConvertedType::JSON | ConvertedType::ENUM
        ) =>
        {
            utf8_value(v.data())
        }
        _ => Some(Value::String(String::from_utf8_lossy(v.data()).into_owned())),
    }
}

fn utf8_value(bytes: &[u8]) -> Option<Value> {
    std::str::from_utf8(bytes)
        .ok()
        .map(|s| Value::String(s.to_string()))
}

fn unsigned_value(v: u64) -> Value {
    i64::try_from(v)
        .map(Value::Int)
        .unwrap_or_else(|_| Value::String(v.to_string()))
}

/// Exact text of a big-endian two's complement unscaled decimal.
///
/// `None` for empty or wider-than-128-bit values.
fn decimal_value(bytes: &[u8], scale: i32) -> Option<Value> {
    if bytes.is_empty() || bytes.len() > 16 {
        return None;
    }
    let fill = if bytes[0] & 0x80 != 0 { 0xff } else { 0x00 };
    let mut wide = [fill; 16];
    wide[16 - bytes.len()..].copy_from_slice(bytes);
    Some(Value::String(decimal_text(i128::from_be_bytes(wide), scale)))
}

/// Render `unscaled * 10^-scale` without exponent, e.g. `-0.05` or `1200`.
pub(crate) fn decimal_text(unscaled: i128, scale: i32) -> String {
    let sign = if unscaled < 0 { "-" } else { "" };
    let mut digits = unscaled.unsigned_abs().to_string();

    if scale <= 0 {
        if unscaled != 0 {
            digits.extend(std::iter::repeat_n('0', scale.unsigned_abs() as usize));
        }
        return format!("{sign}{digits}");
    }

    let scale = scale as usize;
    if digits.len() <= scale {
        digits.insert_str(0, &"0".repeat(scale + 1 - digits.len()));
    }
    let point = digits.len() - scale;
    format!("{sign}{}.{}", &digits[..point], &digits[point..])
}

/// How the chunk bounds of one column compare in the stats fold.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum BoundOrder {
    /// [`Value::compare`].
    Natural,
    /// Decimal text compared numerically.
    Decimal,
    /// RFC 3339 text compared as instants.
    Timestamp,
}

impl BoundOrder {
    pub(crate) fn of(logical: Option<&LogicalType>) -> Self {
        match logical {
            Some(LogicalType::Decimal { .. }) => BoundOrder::Decimal,
            Some(LogicalType::Timestamp { .. }) => BoundOrder::Timestamp,
            _ => BoundOrder::Natural,
        }
    }

    /// Order `a` against `b`; `None` when they are incomparable.
    pub(crate) fn compare(self, a: &Value, b: &Value) -> Option<Ordering> {
        match (self, a, b) {
            (BoundOrder::Natural, ..) => a.compare(b),
            (BoundOrder::Decimal, Value::String(a), Value::String(b)) => {
                Some(unscaled_digits(a)?.cmp(&unscaled_digits(b)?))
            }
            (BoundOrder::Timestamp, Value::String(x), Value::String(y)) => {
                match (
                    DateTime::parse_from_rfc3339(x),
                    DateTime::parse_from_rfc3339(y),
                ) {
                    (Ok(x), Ok(y)) => Some(x.cmp(&y)),
                    _ => a.compare(b),
                }
            }
            _ => None,
        }
    }
}

/// Parse decimal text with its point removed. Texts of one column share a
/// scale, so these compare like the decimals themselves.
fn unscaled_digits(text: &str) -> Option<i128> {
    let digits: String = text.chars().filter(|c| *c != '.').collect();
    digits.parse().ok()
}

/// Render a day count since the Unix epoch as `YYYY-MM-DD`.
pub(crate) fn date_value(days: i32) -> Value {
    days.checked_add(UNIX_EPOCH_DAYS_FROM_CE)
        .and_then(NaiveDate::from_num_days_from_ce_opt)
        .map(|d| Value::String(d.to_string()))
        .unwrap_or_else(|| Value::String(days.to_string()))
}

/// Render a time of day since midnight, e.g. `01:02:03.004`.
///
/// Values outside one day fall back to the raw integer as text.
pub(crate) fn time_value(unit: &TimeUnit, v: i64) -> Value {
    let per_second: i64 = match unit {
        TimeUnit::MILLIS => 1_000,
        TimeUnit::MICROS => 1_000_000,
        TimeUnit::NANOS => 1_000_000_000,
    };
    let nanos_per_tick = 1_000_000_000 / per_second;

    let time = u32::try_from(v.div_euclid(per_second))
        .ok()
        .filter(|_| v >= 0)
        .and_then(|secs| {
            let frac = u32::try_from(v.rem_euclid(per_second) * nanos_per_tick).ok()?;
            NaiveTime::from_num_seconds_from_midnight_opt(secs, frac)
        });

    match time {
        Some(t) => Value::String(t.to_string()),
        None => Value::String(v.to_string()),
    }
}

/// Render a raw timestamp as RFC 3339 UTC text, e.g. `2023-11-14T22:13:20Z`.
///
/// Values outside chrono's range fall back to the raw integer as text.
pub(crate) fn timestamp_value(unit: &TimeUnit, v: i64) -> Value {
    let dt: Option<DateTime<Utc>> = match unit {
        TimeUnit::MILLIS => Utc.timestamp_millis_opt(v).single(),
        TimeUnit::MICROS => Utc.timestamp_micros(v).single(),
        TimeUnit::NANOS => {
            let secs = v.div_euclid(1_000_000_000);
            let nanos = v.rem_euclid(1_000_000_000) as u32;
            Utc.timestamp_opt(secs, nanos).single()
        }
    };

    match dt {
        Some(dt) => Value::String(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
        None => Value::String(v.to_string()),
    }
}
