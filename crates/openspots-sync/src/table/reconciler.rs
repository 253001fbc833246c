//! Row reconciler: places a reservation snapshot in the right table.
//!
//! Both tables sit behind one lock so that a reconciliation (locate, remove,
//! render, insert) runs to completion before the next one starts. Nothing
//! awaits while the lock is held.

use std::sync::{Arc, Mutex, MutexGuard};

use tokio::sync::broadcast;
use tracing::{debug, trace};

use openspots_core::traits::Clock;
use openspots_core::types::{ReservationId, ReservationSnapshot, TableKind};

use super::routing::RoutingPolicy;
use super::row::RowView;
use super::store::{ReservationTable, TableChange};

/// Where a snapshot being reconciled came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowOrigin {
    /// First sight of the reservation through the push feed
    Fresh,
    /// Result of a local action or an initial page load
    Existing,
}

#[derive(Debug)]
struct Tables {
    upcoming: ReservationTable,
    special: ReservationTable,
}

impl Tables {
    fn get(&self, kind: TableKind) -> &ReservationTable {
        match kind {
            TableKind::Upcoming => &self.upcoming,
            TableKind::Special => &self.special,
        }
    }

    fn get_mut(&mut self, kind: TableKind) -> &mut ReservationTable {
        match kind {
            TableKind::Upcoming => &mut self.upcoming,
            TableKind::Special => &mut self.special,
        }
    }

    fn locate(&self, id: &ReservationId) -> Option<TableKind> {
        TableKind::ALL
            .into_iter()
            .find(|kind| self.get(*kind).contains(id))
    }
}

/// Keeps at most one row per reservation across both tables.
#[derive(Debug)]
pub struct RowReconciler {
    tables: Mutex<Tables>,
    policy: RoutingPolicy,
    /// Flash duration for new requests, in milliseconds
    highlight_ms: i64,
    clock: Arc<dyn Clock>,
}

impl RowReconciler {
    pub fn new(
        policy: RoutingPolicy,
        highlight_ms: u64,
        event_buffer: usize,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            tables: Mutex::new(Tables {
                upcoming: ReservationTable::new(TableKind::Upcoming, event_buffer),
                special: ReservationTable::new(TableKind::Special, event_buffer),
            }),
            policy,
            highlight_ms: highlight_ms as i64,
            clock,
        }
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Render `snapshot` into its target table, replacing any previous row.
    ///
    /// Returns the table the row landed in, or `None` when the snapshot has
    /// no id. Reconciling the same snapshot twice leaves the same state.
    pub fn upsert(&self, snapshot: &ReservationSnapshot, origin: RowOrigin) -> Option<TableKind> {
        let Some(mut row) = RowView::render(snapshot) else {
            debug!("Skipping reservation snapshot without id");
            return None;
        };
        let target = self
            .policy
            .route(snapshot.status.as_ref(), snapshot.arrival_status.as_ref());

        let mut tables = self.lock();
        let previous = tables.locate(&row.id);
        if let Some(kind) = previous {
            tables.get_mut(kind).remove(&row.id);
        }

        if target == TableKind::Upcoming && origin == RowOrigin::Fresh && previous.is_none() {
            row.highlight_until = Some(self.clock.now_millis() + self.highlight_ms);
        }

        trace!(
            reservation_id = %row.id,
            from = ?previous,
            to = %target,
            ?origin,
            "Reconciled reservation row"
        );
        tables.get_mut(target).upsert(row);
        Some(target)
    }

    /// Remove the row for `id` from whichever table holds it.
    pub fn remove(&self, id: &ReservationId) -> Option<TableKind> {
        let mut tables = self.lock();
        let kind = tables.locate(id)?;
        tables.get_mut(kind).remove(id);
        Some(kind)
    }

    /// Table currently holding `id`.
    pub fn locate(&self, id: &ReservationId) -> Option<TableKind> {
        self.lock().locate(id)
    }

    /// Copy of the row for `id`.
    pub fn row(&self, id: &ReservationId) -> Option<RowView> {
        let tables = self.lock();
        let kind = tables.locate(id)?;
        tables.get(kind).get(id).cloned()
    }

    /// Copy of a table's rows in display order.
    pub fn rows(&self, kind: TableKind) -> Vec<RowView> {
        self.lock().get(kind).rows().to_vec()
    }

    /// Rendered `<tr>` markup of a table.
    pub fn render_html(&self, kind: TableKind) -> String {
        let now = self.clock.now_millis();
        self.lock()
            .get(kind)
            .rows()
            .iter()
            .map(|row| row.to_html(now))
            .collect()
    }

    /// The pointer entered the row: end its highlight early.
    ///
    /// Returns the table holding the row.
    pub fn hover(&self, id: &ReservationId) -> Option<TableKind> {
        let mut tables = self.lock();
        let kind = tables.locate(id)?;
        tables.get_mut(kind).clear_highlight(id);
        Some(kind)
    }

    /// Whether the row for `id` is flashing right now.
    pub fn is_highlighted(&self, id: &ReservationId) -> bool {
        let now = self.clock.now_millis();
        self.row(id).is_some_and(|row| row.is_highlighted(now))
    }

    /// Subscribe to a table's change stream.
    pub fn subscribe(&self, kind: TableKind) -> broadcast::Receiver<TableChange> {
        self.lock().get(kind).subscribe()
    }
}
