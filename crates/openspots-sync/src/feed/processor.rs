//! Applies push messages to the tables.

use std::sync::Arc;

use serde::Serialize;
use tracing::{debug, error};

use openspots_core::types::{ReservationStatus, TableKind};

use super::message::{FeedRecord, parse_records};
use crate::freshness::FreshnessTracker;
use crate::notification::NotificationCenter;
use crate::suppression::SuppressionRegistry;
use crate::table::{RowOrigin, RowReconciler};

/// What happened to one record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordOutcome {
    /// No snapshot or no id
    Dropped,
    /// Echo of a local action inside the suppression window
    Suppressed,
    /// Not newer than what is already shown
    Stale,
    /// Counted, but its status is not rendered from the feed
    Ignored,
    /// Rendered into a table
    Applied(TableKind),
}

/// Tally of one text frame.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BatchOutcome {
    /// The frame was not valid JSON
    pub malformed: bool,
    pub dropped: usize,
    pub suppressed: usize,
    pub stale: usize,
    pub ignored: usize,
    pub applied: usize,
}

impl BatchOutcome {
    fn count(&mut self, outcome: RecordOutcome) {
        match outcome {
            RecordOutcome::Dropped => self.dropped += 1,
            RecordOutcome::Suppressed => self.suppressed += 1,
            RecordOutcome::Stale => self.stale += 1,
            RecordOutcome::Ignored => self.ignored += 1,
            RecordOutcome::Applied(_) => self.applied += 1,
        }
    }
}

/// Runs each push record through suppression, freshness, and reconciliation.
#[derive(Debug)]
pub struct FeedProcessor {
    suppression: Arc<SuppressionRegistry>,
    freshness: Arc<FreshnessTracker>,
    reconciler: Arc<RowReconciler>,
    notifications: Arc<NotificationCenter>,
    /// Statuses rendered from the feed
    actionable: Vec<ReservationStatus>,
}

impl FeedProcessor {
    pub fn new(
        suppression: Arc<SuppressionRegistry>,
        freshness: Arc<FreshnessTracker>,
        reconciler: Arc<RowReconciler>,
        notifications: Arc<NotificationCenter>,
        actionable: Vec<ReservationStatus>,
    ) -> Self {
        Self {
            suppression,
            freshness,
            reconciler,
            notifications,
            actionable,
        }
    }

    /// Handle one text frame. Malformed JSON is logged and dropped.
    pub fn handle_text(&self, text: &str) -> BatchOutcome {
        let mut outcome = BatchOutcome::default();
        let records = match parse_records(text) {
            Ok(records) => records,
            Err(e) => {
                error!(error = %e, "Push message JSON parse error");
                outcome.malformed = true;
                return outcome;
            }
        };

        for record in &records {
            outcome.count(self.handle_record(record));
        }
        outcome
    }

    /// Handle one record of a push message.
    pub fn handle_record(&self, record: &FeedRecord) -> RecordOutcome {
        let Some(snapshot) = record.snapshot.as_ref() else {
            debug!(event = ?record.event, "Push record without reservation");
            return RecordOutcome::Dropped;
        };
        let Some(id) = snapshot.id.as_ref() else {
            debug!(event = ?record.event, "Push record without reservation id");
            return RecordOutcome::Dropped;
        };

        if self.suppression.is_suppressed(id) {
            debug!(reservation_id = %id, "Skipping push update during suppression window");
            return RecordOutcome::Suppressed;
        }

        self.notifications.record_event();

        if !self.freshness.should_apply(snapshot) {
            debug!(
                reservation_id = %id,
                updated_at = ?snapshot.updated_at,
                "Dropping stale push update"
            );
            return RecordOutcome::Stale;
        }

        let actionable = snapshot
            .status
            .as_ref()
            .is_some_and(|status| self.actionable.contains(status));
        if !actionable {
            debug!(reservation_id = %id, status = ?snapshot.status, "Push update not rendered");
            return RecordOutcome::Ignored;
        }

        match self.reconciler.upsert(snapshot, RowOrigin::Fresh) {
            Some(table) => {
                self.notifications.mark_unseen(id);
                RecordOutcome::Applied(table)
            }
            None => RecordOutcome::Dropped,
        }
    }
}
