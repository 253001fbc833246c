//! Dashboard session: one instance of every sync service, wired together.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing::{debug, info};

use openspots_core::AppResult;
use openspots_core::config::sync::SyncConfig;
use openspots_core::traits::{ActionTransport, Clock, SystemClock};
use openspots_core::types::{ReservationId, ReservationSnapshot, ReservationStatus, TableKind};

use crate::action::{ActionDispatcher, ActionKind, TriggerControl};
use crate::feed::{BatchOutcome, FeedProcessor, RealtimeFeedClient};
use crate::freshness::FreshnessTracker;
use crate::notification::NotificationCenter;
use crate::suppression::SuppressionRegistry;
use crate::table::{RoutingPolicy, RowOrigin, RowReconciler};

/// State of one open dashboard.
///
/// Every service is owned here rather than living in a global, so two
/// sessions never share suppression windows or timestamps.
#[derive(Clone)]
pub struct DashboardSession {
    pub clock: Arc<dyn Clock>,
    pub suppression: Arc<SuppressionRegistry>,
    pub freshness: Arc<FreshnessTracker>,
    pub reconciler: Arc<RowReconciler>,
    pub notifications: Arc<NotificationCenter>,
    pub dispatcher: Arc<ActionDispatcher>,
    pub feed: Arc<FeedProcessor>,
    shutdown_tx: broadcast::Sender<()>,
}

impl std::fmt::Debug for DashboardSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DashboardSession").finish()
    }
}

impl DashboardSession {
    /// Create a session on the system clock.
    pub fn new(config: &SyncConfig, transport: Arc<dyn ActionTransport>) -> Self {
        Self::with_clock(config, transport, Arc::new(SystemClock))
    }

    /// Create a session reading time from `clock`.
    pub fn with_clock(
        config: &SyncConfig,
        transport: Arc<dyn ActionTransport>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let (shutdown_tx, _) = broadcast::channel(1);

        let suppression = Arc::new(SuppressionRegistry::new(clock.clone()));
        let freshness = Arc::new(FreshnessTracker::new(suppression.clone()));
        let reconciler = Arc::new(RowReconciler::new(
            RoutingPolicy::new(config.accepted_before_arrival),
            config.highlight_ms,
            config.table_event_buffer,
            clock.clone(),
        ));
        let notifications = Arc::new(NotificationCenter::new());
        let dispatcher = Arc::new(ActionDispatcher::new(
            transport,
            suppression.clone(),
            freshness.clone(),
            reconciler.clone(),
            Duration::from_millis(config.suppression_window_ms),
        ));
        let actionable: Vec<ReservationStatus> = config
            .actionable_statuses
            .iter()
            .filter_map(|s| s.parse().ok())
            .collect();
        let feed = Arc::new(FeedProcessor::new(
            suppression.clone(),
            freshness.clone(),
            reconciler.clone(),
            notifications.clone(),
            actionable,
        ));

        info!(
            suppression_window_ms = config.suppression_window_ms,
            accepted_before_arrival = %config.accepted_before_arrival,
            "Dashboard session initialized"
        );

        Self {
            clock,
            suppression,
            freshness,
            reconciler,
            notifications,
            dispatcher,
            feed,
            shutdown_tx,
        }
    }

    /// Render server-provided rows present at page load.
    pub fn load_initial<I>(&self, snapshots: I) -> usize
    where
        I: IntoIterator<Item = ReservationSnapshot>,
    {
        snapshots
            .into_iter()
            .filter(|s| self.reconciler.upsert(s, RowOrigin::Existing).is_some())
            .count()
    }

    /// Control for the `kind` button on the row of `id`.
    ///
    /// The URL is the one rendered on the row; it is absent when the row does
    /// not exist or does not offer the action.
    pub fn control_for(&self, id: &ReservationId, kind: ActionKind) -> TriggerControl {
        let url = self
            .reconciler
            .row(id)
            .and_then(|row| row.action_url(kind).map(str::to_string));
        TriggerControl::new(Some(id.clone()), url)
    }

    /// Trigger `kind` from `control`.
    pub async fn dispatch(
        &self,
        kind: ActionKind,
        control: &TriggerControl,
    ) -> AppResult<ReservationSnapshot> {
        self.dispatcher.dispatch(kind, control).await
    }

    /// Apply one push text frame.
    pub fn handle_push(&self, text: &str) -> BatchOutcome {
        self.feed.handle_text(text)
    }

    /// The pointer entered a row. Upcoming rows are marked seen.
    pub fn hover(&self, id: &ReservationId) {
        if self.reconciler.hover(id) == Some(TableKind::Upcoming) {
            self.notifications.mark_seen(id);
        }
    }

    /// Push feed client bound to this session.
    pub fn feed_client(&self, url: impl Into<String>) -> RealtimeFeedClient {
        RealtimeFeedClient::new(url, self.feed.clone())
    }

    /// Periodically drop expired suppression windows until [`shutdown`](Self::shutdown).
    pub fn spawn_maintenance(&self, every: Duration) -> JoinHandle<()> {
        let suppression = self.suppression.clone();
        let mut shutdown = self.shutdown_tx.subscribe();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(every);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        let purged = suppression.purge_expired();
                        if purged > 0 {
                            debug!(purged, "Purged expired suppression windows");
                        }
                    }
                    _ = shutdown.recv() => break,
                }
            }
        })
    }

    /// Stop background tasks.
    pub fn shutdown(&self) {
        let _ = self.shutdown_tx.send(());
    }
}
