//! Forgiving field readers for the games file.
//!
//! The file has been written by several frontend versions; numbers sometimes
//! arrive as strings, ids as numbers, and some fields are missing entirely.
//! A bad value reads as the default instead of failing the whole file.

use crate::models::game::clamp_score;
use crate::models::tournament::TournamentPlacement;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer};
use serde_json::Value;

fn as_i64(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().filter(|f| f.is_finite()).map(|f| f as i64)),
        Value::String(s) => {
            let s = s.trim();
            s.parse::<i64>().ok().or_else(|| {
                s.parse::<f64>()
                    .ok()
                    .filter(|f| f.is_finite())
                    .map(|f| f as i64)
            })
        }
        _ => None,
    }
}

/// Integer field; anything unreadable or out of range for `T` becomes `T::default()`.
pub(crate) fn int<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: TryFrom<i64> + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_i64(&value)
        .and_then(|n| T::try_from(n).ok())
        .unwrap_or_default())
}

/// Score field: like [`int`], then clamped to `i32` range.
pub(crate) fn score<'de, D>(deserializer: D) -> Result<i64, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(as_i64(&value).map(clamp_score).unwrap_or(0))
}

/// Optional score: `null` stays `None`, garbage reads as `Some(0)`.
pub(crate) fn opt_score<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Null => None,
        other => Some(as_i64(&other).map(clamp_score).unwrap_or(0)),
    })
}

/// Ids were millisecond timestamps in older files, sometimes stored as numbers.
pub(crate) fn id<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    })
}

/// `YYYY-MM-DD`, or the date part of an RFC 3339 timestamp.
pub(crate) fn date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value.as_str().and_then(|s| {
        let s = s.trim();
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .or_else(|| s.get(..10).and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok()))
    }))
}

pub(crate) fn datetime<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value
        .as_str()
        .and_then(|s| DateTime::parse_from_rfc3339(s.trim()).ok())
        .map(|dt| dt.with_timezone(&Utc)))
}

/// A placement that cannot be read (unknown round name, wrong shape) is dropped
/// with a warning; the match itself is kept.
pub(crate) fn placement<'de, D>(deserializer: D) -> Result<Option<TournamentPlacement>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    if value.is_null() {
        return Ok(None);
    }
    match serde_json::from_value::<TournamentPlacement>(value) {
        Ok(p) => Ok(Some(p)),
        Err(e) => {
            log::warn!("Dropping unreadable tournament placement: {}", e);
            Ok(None)
        }
    }
}
