//! Input events and the scalar values they carry.
//!
//! Events arrive from the upstream pipeline as one JSON object per line:
//!
//! ```json
//! {"tag": "app.access", "time": "2024-01-01T00:00:00Z", "record": {"status": 200}}
//! ```
//!
//! `time` may be RFC 3339 text or integer epoch seconds; when it is missing the
//! event is stamped with the current time.

use std::collections::HashMap;

use chrono::{DateTime, TimeZone, Utc};
use serde::Deserialize;

use crate::error_handling::EventError;

/// A scalar value bound as a statement parameter.
///
/// Values are passed through to the driver untouched. Nested arrays and
/// objects are kept as JSON and bound as their text form.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Timestamp(DateTime<Utc>),
    Json(serde_json::Value),
}

impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(b),
            serde_json::Value::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                // u64 beyond i64::MAX and all fractional numbers land here
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            serde_json::Value::String(s) => Value::Text(s),
            other => Value::Json(other),
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<i64> for Value {
    fn from(i: i64) -> Self {
        Value::Int(i)
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Self {
        Value::Float(f)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<DateTime<Utc>> for Value {
    fn from(t: DateTime<Utc>) -> Self {
        Value::Timestamp(t)
    }
}

/// One unit of input data: a tag, a timestamp and an unordered field map.
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub tag: String,
    pub time: DateTime<Utc>,
    pub record: HashMap<String, Value>,
}

#[derive(Deserialize)]
struct RawEvent {
    tag: String,
    #[serde(default)]
    time: Option<serde_json::Value>,
    #[serde(default)]
    record: serde_json::Map<String, serde_json::Value>,
}

impl Event {
    pub fn new(tag: impl Into<String>, time: DateTime<Utc>) -> Self {
        Event {
            tag: tag.into(),
            time,
            record: HashMap::new(),
        }
    }

    /// Builder-style helper for attaching a field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.record.insert(key.into(), value.into());
        self
    }

    /// Decodes one JSON-lines event.
    pub fn from_json_line(line: &str) -> Result<Self, EventError> {
        let raw: RawEvent = serde_json::from_str(line)?;
        let time = match raw.time {
            None | Some(serde_json::Value::Null) => Utc::now(),
            Some(t) => parse_time(&t)?,
        };
        Ok(Event {
            tag: raw.tag,
            time,
            record: raw
                .record
                .into_iter()
                .map(|(k, v)| (k, Value::from(v)))
                .collect(),
        })
    }
}

fn parse_time(value: &serde_json::Value) -> Result<DateTime<Utc>, EventError> {
    match value {
        serde_json::Value::String(s) => DateTime::parse_from_rfc3339(s)
            .map(|t| t.with_timezone(&Utc))
            .map_err(|e| EventError::InvalidTime(format!("{s:?}: {e}"))),
        serde_json::Value::Number(n) => n
            .as_i64()
            .and_then(|secs| Utc.timestamp_opt(secs, 0).single())
            .ok_or_else(|| EventError::InvalidTime(n.to_string())),
        other => Err(EventError::InvalidTime(other.to_string())),
    }
}
