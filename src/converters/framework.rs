//! String to built-in type conversions.
//!
//! Every parse here is culture invariant: `.` is the only decimal separator,
//! dates are ISO 8601, and leading or trailing whitespace is ignored except for
//! `char` and `string` targets.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use url::Url;
use uuid::Uuid;

use super::table::ConverterTable;
use crate::error::FillfigError;
use crate::types::TypeTag;
use crate::value::Value;

const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

fn text(raw: &Value) -> Result<&str, String> {
    raw.as_str()
        .ok_or_else(|| format!("expected a string, found {}", raw.type_tag()))
}

fn parse_trimmed<T>(raw: &Value) -> Result<T, String>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    text(raw)?.trim().parse::<T>().map_err(|e| e.to_string())
}

fn parse_bool(s: &str) -> Result<bool, String> {
    let s = s.trim();
    if s.eq_ignore_ascii_case("true") {
        Ok(true)
    } else if s.eq_ignore_ascii_case("false") {
        Ok(false)
    } else {
        Err("expected 'true' or 'false'".into())
    }
}

fn parse_char(s: &str) -> Result<char, String> {
    let mut chars = s.chars();
    match (chars.next(), chars.next()) {
        (Some(c), None) => Ok(c),
        _ => Err("expected exactly one character".into()),
    }
}

fn parse_naive_datetime(s: &str) -> Result<NaiveDateTime, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }
    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Ok(dt);
        }
    }
    let date = NaiveDate::parse_from_str(s, "%Y-%m-%d").map_err(|e| e.to_string())?;
    date.and_hms_opt(0, 0, 0)
        .ok_or_else(|| "midnight is out of range".to_string())
}

/// Offset date-times without an offset are read as UTC.
fn parse_datetime(s: &str) -> Result<DateTime<FixedOffset>, String> {
    let s = s.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt);
    }
    parse_naive_datetime(s).map(|naive| naive.and_utc().fixed_offset())
}

fn parse_component(part: Option<&str>, what: &str, max: u64) -> Result<u64, String> {
    let part = part.ok_or_else(|| format!("missing {what}"))?;
    let value: u64 = part
        .parse()
        .map_err(|_| format!("invalid {what} '{part}'"))?;
    if value > max {
        return Err(format!("{what} {value} out of range"));
    }
    Ok(value)
}

fn out_of_range() -> String {
    "duration out of range".to_string()
}

fn days_to_secs(days: u64) -> Result<u64, String> {
    days.checked_mul(86_400).ok_or_else(out_of_range)
}

/// Parse a duration written as `[d.]hh:mm[:ss[.fffffff]]` or as a whole
/// number of days.
pub fn parse_duration(s: &str) -> Result<Duration, String> {
    let s = s.trim();
    if s.starts_with('-') {
        return Err("negative durations are not supported".into());
    }
    let Some(colon) = s.find(':') else {
        let days: u64 = s.parse().map_err(|_| format!("invalid duration '{s}'"))?;
        return days_to_secs(days).map(Duration::from_secs);
    };

    let (days, clock) = match s[..colon].find('.') {
        Some(dot) => (
            s[..dot]
                .parse::<u64>()
                .map_err(|_| format!("invalid days '{}'", &s[..dot]))?,
            &s[dot + 1..],
        ),
        None => (0, s),
    };

    let mut parts = clock.split(':');
    let hours = parse_component(parts.next(), "hours", 23)?;
    let minutes = parse_component(parts.next(), "minutes", 59)?;
    let (seconds, nanos) = match parts.next() {
        None => (0, 0),
        Some(seconds) => {
            let (whole, fraction) = seconds.split_once('.').unwrap_or((seconds, ""));
            let whole = parse_component(Some(whole), "seconds", 59)?;
            if fraction.len() > 7 || !fraction.chars().all(|c| c.is_ascii_digit()) {
                return Err(format!("invalid fraction '{fraction}'"));
            }
            let nanos = if fraction.is_empty() {
                0
            } else {
                format!("{fraction:0<9}")
                    .parse::<u32>()
                    .map_err(|e| e.to_string())?
            };
            (whole, nanos)
        }
    };
    if parts.next().is_some() {
        return Err(format!("invalid duration '{s}'"));
    }

    let secs = days_to_secs(days)?
        .checked_add(hours * 3_600 + minutes * 60 + seconds)
        .ok_or_else(out_of_range)?;
    Ok(Duration::new(secs, nanos))
}

/// Conversions from strings to every built-in leaf type, plus string to string.
pub fn framework_types() -> Result<ConverterTable, FillfigError> {
    let s = || TypeTag::String;
    ConverterTable::new("framework_types")
        .with(s(), TypeTag::String, |raw, _| {
            text(raw).map(|t| Value::String(t.to_string()))
        })?
        .with(s(), TypeTag::Bool, |raw, _| parse_bool(text(raw)?).map(Value::Bool))?
        .with(s(), TypeTag::Char, |raw, _| parse_char(text(raw)?).map(Value::Char))?
        .with(s(), TypeTag::I8, |raw, _| parse_trimmed(raw).map(Value::I8))?
        .with(s(), TypeTag::I16, |raw, _| parse_trimmed(raw).map(Value::I16))?
        .with(s(), TypeTag::I32, |raw, _| parse_trimmed(raw).map(Value::I32))?
        .with(s(), TypeTag::I64, |raw, _| parse_trimmed(raw).map(Value::I64))?
        .with(s(), TypeTag::U8, |raw, _| parse_trimmed(raw).map(Value::U8))?
        .with(s(), TypeTag::U16, |raw, _| parse_trimmed(raw).map(Value::U16))?
        .with(s(), TypeTag::U32, |raw, _| parse_trimmed(raw).map(Value::U32))?
        .with(s(), TypeTag::U64, |raw, _| parse_trimmed(raw).map(Value::U64))?
        .with(s(), TypeTag::F32, |raw, _| parse_trimmed(raw).map(Value::F32))?
        .with(s(), TypeTag::F64, |raw, _| parse_trimmed(raw).map(Value::F64))?
        .with(s(), TypeTag::Uuid, |raw, _| {
            Uuid::parse_str(text(raw)?.trim())
                .map(Value::Uuid)
                .map_err(|e| e.to_string())
        })?
        .with(s(), TypeTag::Duration, |raw, _| {
            parse_duration(text(raw)?).map(Value::Duration)
        })?
        .with(s(), TypeTag::Date, |raw, _| {
            NaiveDate::parse_from_str(text(raw)?.trim(), "%Y-%m-%d")
                .map(Value::Date)
                .map_err(|e| e.to_string())
        })?
        .with(s(), TypeTag::NaiveDateTime, |raw, _| {
            parse_naive_datetime(text(raw)?).map(Value::NaiveDateTime)
        })?
        .with(s(), TypeTag::DateTime, |raw, _| {
            parse_datetime(text(raw)?).map(Value::DateTime)
        })?
        .with(s(), TypeTag::Url, |raw, _| {
            Url::parse(text(raw)?.trim())
                .map(Value::Url)
                .map_err(|e| e.to_string())
        })?
        .with(s(), TypeTag::Path, |raw, _| {
            Ok(Value::Path(PathBuf::from(text(raw)?.trim())))
        })
}
