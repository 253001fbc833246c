//! Ordered, id-keyed reservation table.

use std::cmp::Ordering;

use tokio::sync::broadcast;

use openspots_core::types::{ReservationId, TableKind};

use super::row::RowView;

/// Change notification for presentation subscribers.
#[derive(Debug, Clone)]
pub enum TableChange {
    /// A row was added (or re-added after a state change)
    Inserted {
        table: TableKind,
        row: Box<RowView>,
    },
    /// A row left the table
    Removed {
        table: TableKind,
        id: ReservationId,
    },
    /// The "new request" flash ended early
    HighlightCleared {
        table: TableKind,
        id: ReservationId,
    },
}

/// One dashboard table: at most one row per id, kept in display order.
#[derive(Debug)]
pub struct ReservationTable {
    kind: TableKind,
    /// Rows in display order
    rows: Vec<RowView>,
    /// Change stream
    events: broadcast::Sender<TableChange>,
}

impl ReservationTable {
    /// Create an empty table whose change channel holds `buffer` events.
    pub fn new(kind: TableKind, buffer: usize) -> Self {
        let (events, _) = broadcast::channel(buffer.max(1));
        Self {
            kind,
            rows: Vec::new(),
            events,
        }
    }

    pub fn kind(&self) -> TableKind {
        self.kind
    }

    /// Insert `row`, replacing any row with the same id, then re-sort.
    pub fn upsert(&mut self, row: RowView) {
        self.rows.retain(|r| r.id != row.id);
        let _ = self.events.send(TableChange::Inserted {
            table: self.kind,
            row: Box::new(row.clone()),
        });
        self.rows.push(row);
        self.sort_by(default_order);
    }

    /// Remove the row for `id`, returning it.
    pub fn remove(&mut self, id: &ReservationId) -> Option<RowView> {
        let pos = self.rows.iter().position(|r| &r.id == id)?;
        let row = self.rows.remove(pos);
        let _ = self.events.send(TableChange::Removed {
            table: self.kind,
            id: id.clone(),
        });
        Some(row)
    }

    pub fn get(&self, id: &ReservationId) -> Option<&RowView> {
        self.rows.iter().find(|r| &r.id == id)
    }

    pub fn contains(&self, id: &ReservationId) -> bool {
        self.get(id).is_some()
    }

    /// Clear the highlight of `id`. Returns whether one was set.
    pub fn clear_highlight(&mut self, id: &ReservationId) -> bool {
        let Some(row) = self.rows.iter_mut().find(|r| &r.id == id) else {
            return false;
        };
        if row.highlight_until.take().is_none() {
            return false;
        }
        let _ = self.events.send(TableChange::HighlightCleared {
            table: self.kind,
            id: id.clone(),
        });
        true
    }

    /// Rows in display order.
    pub fn rows(&self) -> &[RowView] {
        &self.rows
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Re-order rows with a custom comparator (stable).
    pub fn sort_by<F>(&mut self, compare: F)
    where
        F: FnMut(&RowView, &RowView) -> Ordering,
    {
        self.rows.sort_by(compare);
    }

    /// Subscribe to row changes.
    pub fn subscribe(&self) -> broadcast::Receiver<TableChange> {
        self.events.subscribe()
    }
}

/// Newest date first, then latest time first.
pub fn default_order(a: &RowView, b: &RowView) -> Ordering {
    b.date_key
        .cmp(&a.date_key)
        .then_with(|| b.time_key.cmp(&a.time_key))
}
