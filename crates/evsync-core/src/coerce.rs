// Type coercion for attribute values
//
// Coercion never fails loudly: any value that cannot be converted to its
// declared type becomes absent (`None`). Downstream code treats "missing"
// as a first-class value, so an unparseable cell must not abort a run.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde_json::Value;

use crate::mapping::AttributeType;

/// Coerce a sanitized value into its declared attribute type.
///
/// - `Number`: base-10 float parse; non-finite results are absent.
/// - `DateTime`: permissive parse, normalized to UTC and serialized as
///   `YYYY-MM-DDTHH:MM:SSZ`.
/// - `Text`: passed through unchanged.
pub fn coerce(value: &Value, ty: AttributeType) -> Option<Value> {
    match value {
        Value::Null => None,
        _ => match ty {
            AttributeType::Number => coerce_number(value),
            AttributeType::DateTime => coerce_datetime(value),
            AttributeType::Text => Some(value.clone()),
        },
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    let parsed = match value {
        Value::Number(n) => n.as_f64()?,
        Value::String(s) => s.trim().parse::<f64>().ok()?,
        _ => return None,
    };
    if !parsed.is_finite() {
        return None;
    }
    serde_json::Number::from_f64(parsed).map(Value::Number)
}

fn coerce_datetime(value: &Value) -> Option<Value> {
    let s = value.as_str()?;
    let dt = parse_datetime_utc(s)?;
    Some(Value::String(format_utc(&dt)))
}

/// Serialize a UTC instant as `YYYY-MM-DDTHH:MM:SSZ`.
pub fn format_utc(dt: &DateTime<Utc>) -> String {
    dt.format("%Y-%m-%dT%H:%M:%SZ").to_string()
}

/// Permissive timestamp parse.
///
/// Accepts RFC 3339 (optional fractional seconds, `Z` or numeric offset),
/// `YYYY-MM-DDTHH:MM:SS` / `YYYY-MM-DD HH:MM:SS` without an offset, and
/// bare `YYYY-MM-DD` or `YYYY/MM/DD` dates. Values without an offset are
/// read as UTC.
pub fn parse_datetime_utc(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(Utc.from_utc_datetime(&naive));
        }
    }
    parse_date(s)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|midnight| Utc.from_utc_datetime(&midnight))
}

/// Tolerant calendar-date parse used by the date filter and the CSV reader.
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    for fmt in ["%Y-%m-%d", "%Y/%m/%d"] {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(d);
        }
    }
    None
}

/// Pull-side display normalization: render a timestamp-bearing value as a
/// bare `YYYY-MM-DD` string, dropping the time of day. Unparseable values
/// become absent.
pub fn display_date(value: &Value) -> Option<Value> {
    let s = value.as_str()?;
    let date = parse_datetime_utc(s)?.date_naive();
    Some(Value::String(date.format("%Y-%m-%d").to_string()))
}
