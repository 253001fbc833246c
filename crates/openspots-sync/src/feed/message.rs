//! Push message envelopes.
//!
//! The server sends either a single `{event, reservation}` object or a JSON
//! array of them when it batches. Older producers put the snapshot under
//! `data` instead of `reservation`.

use serde_json::Value;
use tracing::debug;

use openspots_core::types::ReservationSnapshot;

/// Keys that may carry the snapshot, in priority order.
pub const SNAPSHOT_KEYS: [&str; 2] = ["reservation", "data"];

/// Keys that may carry the event name.
const EVENT_KEYS: [&str; 2] = ["event", "type"];

/// One entry of a push message.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedRecord {
    /// Event name, informational only
    pub event: Option<String>,
    pub snapshot: Option<ReservationSnapshot>,
}

impl FeedRecord {
    /// Decode a record. A record without a usable snapshot keeps `snapshot: None`.
    pub fn from_value(value: &Value) -> Self {
        let event = EVENT_KEYS
            .iter()
            .find_map(|key| value.get(*key).and_then(Value::as_str))
            .map(str::to_string);

        let snapshot = SNAPSHOT_KEYS
            .iter()
            .filter_map(|key| value.get(*key))
            .find(|v| is_present(v))
            .and_then(|v| match ReservationSnapshot::from_value(v.clone()) {
                Ok(snapshot) => Some(snapshot),
                Err(e) => {
                    debug!(error = %e, "Undecodable reservation in push message");
                    None
                }
            });

        Self { event, snapshot }
    }
}

/// Parse a text frame into its records.
pub fn parse_records(text: &str) -> Result<Vec<FeedRecord>, serde_json::Error> {
    let payload: Value = serde_json::from_str(text)?;
    Ok(normalize(payload).iter().map(FeedRecord::from_value).collect())
}

/// A single payload becomes a one-element list.
pub fn normalize(payload: Value) -> Vec<Value> {
    match payload {
        Value::Array(items) => items,
        other => vec![other],
    }
}

// Empty strings, zero, false and null do not count as a snapshot.
fn is_present(v: &Value) -> bool {
    match v {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::String(s) => !s.is_empty(),
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::Array(_) | Value::Object(_) => true,
    }
}
