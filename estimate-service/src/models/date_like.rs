//! Heterogeneous date inputs accepted on a cost estimate.

use chrono::{DateTime, SecondsFormat, Utc};
use serde::de::Deserializer;
use serde::ser::{SerializeMap, Serializer};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A date as it arrives from upstream: a concrete instant, a string to parse,
/// an epoch timestamp record, or nothing usable.
///
/// Only [`crate::pricing::dates::normalize`] narrows this type; the rest of the
/// engine works on `Option<DateTime<Utc>>`.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DateLike {
    Native(DateTime<Utc>),
    Iso(String),
    EpochSeconds {
        seconds: i64,
        nanoseconds: Option<i64>,
    },
    #[default]
    Unknown,
}

/// Implemented by foreign timestamp wrappers that know how to turn
/// themselves into a calendar instant.
pub trait ToDate {
    fn to_date(&self) -> Option<DateTime<Utc>>;
}

impl DateLike {
    /// Converts a [`ToDate`] implementor eagerly so the engine never holds a
    /// reference to the foreign type.
    pub fn from_convertible<T: ToDate + ?Sized>(value: &T) -> Self {
        match value.to_date() {
            Some(date) => DateLike::Native(date),
            None => DateLike::Unknown,
        }
    }

    pub fn is_unknown(&self) -> bool {
        matches!(self, DateLike::Unknown)
    }

    fn from_json(value: Value) -> Self {
        match value {
            Value::String(s) => DateLike::Iso(s),
            Value::Object(map) => {
                let seconds = map
                    .get("seconds")
                    .or_else(|| map.get("_seconds"))
                    .and_then(json_integer);
                match seconds {
                    Some(seconds) => DateLike::EpochSeconds {
                        seconds,
                        nanoseconds: map
                            .get("nanoseconds")
                            .or_else(|| map.get("_nanoseconds"))
                            .and_then(json_integer),
                    },
                    None => DateLike::Unknown,
                }
            }
            _ => DateLike::Unknown,
        }
    }
}

fn json_integer(value: &Value) -> Option<i64> {
    value
        .as_i64()
        .or_else(|| value.as_f64().filter(|f| f.is_finite()).map(|f| f.floor() as i64))
}

impl From<DateTime<Utc>> for DateLike {
    fn from(value: DateTime<Utc>) -> Self {
        DateLike::Native(value)
    }
}

impl From<&str> for DateLike {
    fn from(value: &str) -> Self {
        DateLike::Iso(value.to_string())
    }
}

impl From<String> for DateLike {
    fn from(value: String) -> Self {
        DateLike::Iso(value)
    }
}

impl<'de> Deserialize<'de> for DateLike {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = Value::deserialize(deserializer)?;
        Ok(DateLike::from_json(value))
    }
}

impl Serialize for DateLike {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            DateLike::Native(date) => {
                serializer.serialize_str(&date.to_rfc3339_opts(SecondsFormat::Secs, true))
            }
            DateLike::Iso(s) => serializer.serialize_str(s),
            DateLike::EpochSeconds {
                seconds,
                nanoseconds,
            } => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry("seconds", seconds)?;
                map.serialize_entry("nanoseconds", &nanoseconds.unwrap_or(0))?;
                map.end()
            }
            DateLike::Unknown => serializer.serialize_none(),
        }
    }
}
