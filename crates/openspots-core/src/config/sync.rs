//! Reservation synchronization configuration.

use serde::{Deserialize, Serialize};

use crate::types::TableKind;

/// Tuning of the suppression window, row highlighting, and table routing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// How long push updates for a reservation are ignored after a local action.
    #[serde(default = "default_suppression_window")]
    pub suppression_window_ms: u64,
    /// How long a freshly pushed request stays highlighted.
    #[serde(default = "default_highlight")]
    pub highlight_ms: u64,
    /// Table for accepted reservations whose arrival is still pending.
    #[serde(default = "default_accepted_before_arrival")]
    pub accepted_before_arrival: TableKind,
    /// Statuses whose push updates are rendered and flagged as unseen.
    #[serde(default = "default_actionable_statuses")]
    pub actionable_statuses: Vec<String>,
    /// Capacity of each table's change-event channel.
    #[serde(default = "default_table_event_buffer")]
    pub table_event_buffer: usize,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            suppression_window_ms: default_suppression_window(),
            highlight_ms: default_highlight(),
            accepted_before_arrival: default_accepted_before_arrival(),
            actionable_statuses: default_actionable_statuses(),
            table_event_buffer: default_table_event_buffer(),
        }
    }
}

fn default_suppression_window() -> u64 {
    3000
}

fn default_highlight() -> u64 {
    2000
}

fn default_accepted_before_arrival() -> TableKind {
    TableKind::Special
}

fn default_actionable_statuses() -> Vec<String> {
    vec!["pending".to_string()]
}

fn default_table_event_buffer() -> usize {
    64
}
