//! Freshness tracker: rejects updates older than the last applied one.
//!
//! Ordering comes from the server's `updated_at`, never from the order in
//! which responses and push messages happen to arrive.

use std::sync::Arc;

use chrono::{DateTime, NaiveDateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use tracing::debug;

use openspots_core::types::{ReservationId, ReservationSnapshot};

use crate::suppression::SuppressionRegistry;

/// Last applied server timestamp per reservation.
#[derive(Debug)]
pub struct FreshnessTracker {
    /// Reservation id → newest applied `updated_at`
    last_applied: DashMap<ReservationId, DateTime<Utc>>,
    /// Fallback guard for snapshots without a timestamp
    suppression: Arc<SuppressionRegistry>,
}

impl FreshnessTracker {
    /// Create a tracker that falls back to `suppression` for untimestamped snapshots.
    pub fn new(suppression: Arc<SuppressionRegistry>) -> Self {
        Self {
            last_applied: DashMap::new(),
            suppression,
        }
    }

    /// Store `ts` for `id` after the caller decided to apply an update.
    ///
    /// The stored value never moves backwards.
    pub fn record_timestamp(&self, id: &ReservationId, ts: DateTime<Utc>) {
        self.last_applied
            .entry(id.clone())
            .and_modify(|current| {
                if ts > *current {
                    *current = ts;
                }
            })
            .or_insert(ts);
    }

    /// Record the timestamp of an authoritative action response.
    ///
    /// Returns `false` when the response is not newer than what is already
    /// applied, in which case the caller must leave the row alone. A
    /// response without a usable timestamp is always applied.
    pub fn record_response(&self, snapshot: &ReservationSnapshot) -> bool {
        let Some(id) = snapshot.id.as_ref() else {
            return false;
        };
        match snapshot.updated_at.as_deref() {
            None => true,
            Some(raw) => match parse_timestamp(raw) {
                Some(ts) => self.advance(id, ts),
                None => {
                    debug!(reservation_id = %id, raw, "Ignoring unparsable updated_at");
                    true
                }
            },
        }
    }

    /// Decide whether `snapshot` is newer than what was applied so far.
    ///
    /// Accepting advances the stored timestamp, so this is not a pure check.
    /// Without a usable timestamp the suppression window is the only guard.
    pub fn should_apply(&self, snapshot: &ReservationSnapshot) -> bool {
        let Some(id) = snapshot.id.as_ref() else {
            return false;
        };
        match snapshot.updated_at.as_deref().and_then(parse_timestamp) {
            Some(ts) => self.advance(id, ts),
            None => !self.suppression.is_suppressed(id),
        }
    }

    // Store `ts` only if it is strictly newer; one shard lock covers check and write.
    fn advance(&self, id: &ReservationId, ts: DateTime<Utc>) -> bool {
        match self.last_applied.entry(id.clone()) {
            Entry::Occupied(mut slot) => {
                if ts <= *slot.get() {
                    return false;
                }
                slot.insert(ts);
                true
            }
            Entry::Vacant(slot) => {
                slot.insert(ts);
                true
            }
        }
    }

    /// Newest applied timestamp for `id`.
    pub fn last_applied(&self, id: &ReservationId) -> Option<DateTime<Utc>> {
        self.last_applied.get(id).map(|r| *r.value())
    }
}

/// Parse a server timestamp.
///
/// Accepts RFC 3339 (what the server emits) and offset-less ISO date-times,
/// which are read as UTC.
pub fn parse_timestamp(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use openspots_core::traits::ManualClock;

    fn tracker() -> (Arc<SuppressionRegistry>, FreshnessTracker) {
        let clock = Arc::new(ManualClock::new(0));
        let suppression = Arc::new(SuppressionRegistry::new(clock));
        let tracker = FreshnessTracker::new(suppression.clone());
        (suppression, tracker)
    }

    fn snap(id: u64, updated_at: Option<&str>) -> ReservationSnapshot {
        ReservationSnapshot {
            id: Some(ReservationId::from(id)),
            updated_at: updated_at.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_monotonic() {
        let (_, tracker) = tracker();
        let t1 = snap(42, Some("2025-01-01T10:00:05Z"));
        let t0 = snap(42, Some("2025-01-01T10:00:02Z"));

        assert!(tracker.should_apply(&t1));
        assert!(!tracker.should_apply(&t0));
        // Same timestamp again is not newer.
        assert!(!tracker.should_apply(&t1));
        assert_eq!(
            tracker.last_applied(&ReservationId::from(42)),
            parse_timestamp("2025-01-01T10:00:05Z")
        );
    }

    #[test]
    fn test_missing_id_rejected() {
        let (_, tracker) = tracker();
        let mut s = snap(1, Some("2025-01-01T10:00:00Z"));
        s.id = None;
        assert!(!tracker.should_apply(&s));
    }

    #[test]
    fn test_no_timestamp_falls_back_to_suppression() {
        let (suppression, tracker) = tracker();
        let s = snap(5, None);
        assert!(tracker.should_apply(&s));

        suppression.suppress(&ReservationId::from(5), Duration::from_millis(3000));
        assert!(!tracker.should_apply(&s));
    }

    #[test]
    fn test_recorded_response_blocks_echo() {
        let (_, tracker) = tracker();
        assert!(tracker.record_response(&snap(7, Some("2025-01-01T10:00:00+00:00"))));

        assert!(!tracker.should_apply(&snap(7, Some("2025-01-01T10:00:00Z"))));
        assert!(tracker.should_apply(&snap(7, Some("2025-01-01T10:00:01Z"))));
    }

    #[test]
    fn test_late_response_rejected() {
        let (_, tracker) = tracker();
        let id = ReservationId::from(3);
        assert!(tracker.should_apply(&snap(3, Some("2025-01-01T10:00:05Z"))));
        assert!(!tracker.record_response(&snap(3, Some("2025-01-01T09:00:00Z"))));
        assert_eq!(tracker.last_applied(&id), parse_timestamp("2025-01-01T10:00:05Z"));
    }

    #[test]
    fn test_response_without_timestamp_applies() {
        let (_, tracker) = tracker();
        assert!(tracker.record_response(&snap(4, None)));
        assert!(tracker.record_response(&snap(4, Some("garbage"))));
        assert!(tracker.last_applied(&ReservationId::from(4)).is_none());
    }

    #[test]
    fn test_record_timestamp_never_decreases() {
        let (_, tracker) = tracker();
        let id = ReservationId::from(5);
        tracker.record_timestamp(&id, parse_timestamp("2025-01-01T10:00:05Z").unwrap());
        tracker.record_timestamp(&id, parse_timestamp("2025-01-01T09:00:00Z").unwrap());
        assert_eq!(tracker.last_applied(&id), parse_timestamp("2025-01-01T10:00:05Z"));
    }

    #[test]
    fn test_parse_formats() {
        assert!(parse_timestamp("2025-01-01T10:00:00.123456+00:00").is_some());
        assert_eq!(
            parse_timestamp("2025-01-01T10:00:00"),
            parse_timestamp("2025-01-01T10:00:00Z")
        );
        assert!(parse_timestamp("yesterday").is_none());
    }
}
