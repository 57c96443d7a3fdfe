//! Event-to-row projection.
//!
//! The [`Encoder`] turns one [`Event`] into an [`EncodedRecord`] according to a
//! static [`MappingTable`] of destination column to source selector. Columns
//! whose source field is missing from the event are skipped entirely, so the
//! arity of encoded records varies from event to event.

mod buffer_pool;

use std::sync::Arc;

use indexmap::IndexMap;

use crate::event::{Event, Value};
use crate::storage::EncodedRecord;

pub use buffer_pool::{BufferPool, PooledBuffer};

/// Where a destination column takes its value from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selector {
    /// The event tag (`@tag` or `_tag`).
    Tag,
    /// The event timestamp (`@timestamp` or `_timestamp`).
    Timestamp,
    /// A key in the event's field map.
    Field(String),
}

impl Selector {
    pub fn parse(selector: &str) -> Self {
        match selector {
            "@tag" | "_tag" => Selector::Tag,
            "@timestamp" | "_timestamp" => Selector::Timestamp,
            field => Selector::Field(field.to_string()),
        }
    }

    /// Resolves this selector against `event`; `None` when the field is absent.
    pub fn resolve(&self, event: &Event) -> Option<Value> {
        match self {
            Selector::Tag => Some(Value::Text(event.tag.clone())),
            Selector::Timestamp => Some(Value::Timestamp(event.time)),
            Selector::Field(key) => event.record.get(key).cloned(),
        }
    }
}

/// Ordered destination-column to selector mapping.
///
/// Built once from configuration. Iteration order is the declaration order,
/// fixed for the lifetime of the table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MappingTable {
    entries: Vec<(String, Selector)>,
}

impl MappingTable {
    pub fn new(entries: Vec<(String, Selector)>) -> Self {
        MappingTable { entries }
    }

    /// Number of destination columns, which is also the widest possible row.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Selector)> {
        self.entries.iter().map(|(c, s)| (c.as_str(), s))
    }
}

impl From<&IndexMap<String, String>> for MappingTable {
    fn from(mapping: &IndexMap<String, String>) -> Self {
        MappingTable::new(
            mapping
                .iter()
                .map(|(column, selector)| (column.clone(), Selector::parse(selector)))
                .collect(),
        )
    }
}

/// Projects events into rows.
///
/// Encoding is a pure function of the event and the mapping table; the only
/// shared state is the scratch-buffer pool, which is safe to use from many
/// threads at once.
#[derive(Debug, Clone)]
pub struct Encoder {
    mapping: Arc<MappingTable>,
    buffers: Arc<BufferPool>,
}

impl Encoder {
    pub fn new(mapping: Arc<MappingTable>) -> Self {
        Self::with_buffer_pool(mapping, Arc::new(BufferPool::default()))
    }

    pub fn with_buffer_pool(mapping: Arc<MappingTable>, buffers: Arc<BufferPool>) -> Self {
        Encoder { mapping, buffers }
    }

    pub fn mapping(&self) -> &MappingTable {
        &self.mapping
    }

    /// Encodes `event`, or returns `None` when no mapped column resolves.
    pub fn encode(&self, event: &Event) -> Option<EncodedRecord> {
        let mut columns = self.buffers.acquire();
        let mut values = Vec::with_capacity(self.mapping.len());

        for (column, selector) in self.mapping.iter() {
            let Some(value) = selector.resolve(event) else {
                continue;
            };
            if !values.is_empty() {
                columns.push(',');
            }
            columns.push_str(column);
            values.push(value);
        }

        if values.is_empty() {
            return None;
        }
        Some(EncodedRecord::new(columns.as_str().to_owned(), values))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn mapping(pairs: &[(&str, &str)]) -> Arc<MappingTable> {
        let map: IndexMap<String, String> = pairs
            .iter()
            .map(|(c, s)| (c.to_string(), s.to_string()))
            .collect();
        Arc::new(MappingTable::from(&map))
    }

    fn event() -> Event {
        Event::new("app.access", Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap())
            .with_field("status", 200i64)
            .with_field("path", "/index.html")
    }

    #[test]
    fn test_selector_parse() {
        assert_eq!(Selector::parse("@tag"), Selector::Tag);
        assert_eq!(Selector::parse("_tag"), Selector::Tag);
        assert_eq!(Selector::parse("@timestamp"), Selector::Timestamp);
        assert_eq!(Selector::parse("_timestamp"), Selector::Timestamp);
        assert_eq!(Selector::parse("tag"), Selector::Field("tag".into()));
    }

    #[test]
    fn test_encode_sentinels_and_fields() {
        let encoder = Encoder::new(mapping(&[
            ("tag", "@tag"),
            ("time", "_timestamp"),
            ("code", "status"),
        ]));
        let ev = event();
        let record = encoder.encode(&ev).expect("record");
        assert_eq!(record.columns, "tag,time,code");
        assert_eq!(
            record.values,
            vec![
                Value::Text("app.access".into()),
                Value::Timestamp(ev.time),
                Value::Int(200),
            ]
        );
    }

    #[test]
    fn test_encode_skips_absent_fields() {
        let encoder = Encoder::new(mapping(&[
            ("missing_a", "nope"),
            ("code", "status"),
            ("missing_b", "also_nope"),
            ("path", "path"),
        ]));
        let record = encoder.encode(&event()).expect("record");
        assert_eq!(record.columns, "code,path");
        assert_eq!(record.arity(), 2);
    }

    #[test]
    fn test_encode_keeps_explicit_null() {
        let encoder = Encoder::new(mapping(&[("note", "note")]));
        let ev = event().with_field("note", Value::Null);
        let record = encoder.encode(&ev).expect("record");
        assert_eq!(record.values, vec![Value::Null]);
    }

    #[test]
    fn test_encode_nothing_resolves_is_none() {
        let encoder = Encoder::new(mapping(&[("a", "x"), ("b", "y")]));
        assert_eq!(encoder.encode(&event()), None);
    }

    #[test]
    fn test_columns_follow_mapping_order() {
        let encoder = Encoder::new(mapping(&[("p", "path"), ("s", "status")]));
        let record = encoder.encode(&event()).unwrap();
        assert_eq!(record.columns, "p,s");
        assert_eq!(
            record.values,
            vec![Value::from("/index.html"), Value::Int(200)]
        );
    }

    #[test]
    fn test_encode_is_deterministic_and_returns_buffer() {
        let pool = Arc::new(BufferPool::new(2));
        let encoder = Encoder::with_buffer_pool(
            mapping(&[("tag", "@tag"), ("code", "status")]),
            Arc::clone(&pool),
        );
        let ev = event();
        let first = encoder.encode(&ev);
        let second = encoder.encode(&ev);
        assert_eq!(first, second);
        assert_eq!(pool.idle_count(), 1);
    }
}
