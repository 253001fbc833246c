//! Notification center behind the dashboard's bell badge.
//!
//! Two writers share the badge: every accepted push event bumps the unread
//! counter and shows it, while marking reservations seen or unseen shows the
//! size of the unseen set. Whichever wrote last is what the badge displays.

use std::sync::atomic::{AtomicU64, Ordering};

use dashmap::DashSet;
use serde::Serialize;
use tokio::sync::watch;

use openspots_core::types::ReservationId;

/// What the badge currently shows.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BadgeState {
    /// Number displayed
    pub count: u64,
    /// Whether the badge is displayed at all
    pub visible: bool,
}

#[derive(Debug)]
pub struct NotificationCenter {
    /// Push events that passed the suppression check
    unread_events: AtomicU64,
    /// Reservations the admin has not looked at yet
    unseen: DashSet<ReservationId>,
    badge: watch::Sender<BadgeState>,
}

impl Default for NotificationCenter {
    fn default() -> Self {
        Self::new()
    }
}

impl NotificationCenter {
    pub fn new() -> Self {
        let (badge, _) = watch::channel(BadgeState::default());
        Self {
            unread_events: AtomicU64::new(0),
            unseen: DashSet::new(),
            badge,
        }
    }

    /// Count one incoming push event and show the counter.
    pub fn record_event(&self) -> u64 {
        let count = self.unread_events.fetch_add(1, Ordering::SeqCst) + 1;
        self.badge.send_replace(BadgeState {
            count,
            visible: true,
        });
        count
    }

    /// Flag a reservation as not yet looked at.
    pub fn mark_unseen(&self, id: &ReservationId) {
        self.unseen.insert(id.clone());
        self.publish_unseen();
    }

    /// The admin looked at the reservation.
    pub fn mark_seen(&self, id: &ReservationId) {
        self.unseen.remove(id);
        self.publish_unseen();
    }

    pub fn is_unseen(&self, id: &ReservationId) -> bool {
        self.unseen.contains(id)
    }

    pub fn unseen_count(&self) -> usize {
        self.unseen.len()
    }

    pub fn unread_events(&self) -> u64 {
        self.unread_events.load(Ordering::SeqCst)
    }

    /// Current badge.
    pub fn badge(&self) -> BadgeState {
        *self.badge.borrow()
    }

    /// Watch badge updates.
    pub fn subscribe(&self) -> watch::Receiver<BadgeState> {
        self.badge.subscribe()
    }

    fn publish_unseen(&self) {
        let count = self.unseen.len() as u64;
        self.badge.send_replace(BadgeState {
            count,
            visible: count > 0,
        });
    }
}
