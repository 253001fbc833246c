//! Action dispatcher: posts a state change and reconciles the response.

use std::sync::Arc;
use std::time::Duration;

use serde_json::Value;
use tracing::{debug, error, info, warn};

use openspots_core::error::ErrorKind;
use openspots_core::traits::ActionTransport;
use openspots_core::types::{ReservationId, ReservationSnapshot, ReservationStatus};
use openspots_core::{AppError, AppResult};

use super::control::TriggerControl;
use super::kind::ActionKind;
use crate::freshness::FreshnessTracker;
use crate::suppression::SuppressionRegistry;
use crate::table::{RowOrigin, RowReconciler};

/// Key wrapping the updated reservation in action responses.
const RESERVATION_KEY: &str = "reservation";

/// Extra wrapper key used by the move-to-requests endpoint.
const UPCOMING_KEY: &str = "upcoming";

/// Sends admin actions and applies the authoritative snapshot they return.
#[derive(Debug, Clone)]
pub struct ActionDispatcher {
    transport: Arc<dyn ActionTransport>,
    suppression: Arc<SuppressionRegistry>,
    freshness: Arc<FreshnessTracker>,
    reconciler: Arc<RowReconciler>,
    /// How long push echoes of a local action are ignored
    window: Duration,
}

impl ActionDispatcher {
    pub fn new(
        transport: Arc<dyn ActionTransport>,
        suppression: Arc<SuppressionRegistry>,
        freshness: Arc<FreshnessTracker>,
        reconciler: Arc<RowReconciler>,
        window: Duration,
    ) -> Self {
        Self {
            transport,
            suppression,
            freshness,
            reconciler,
            window,
        }
    }

    /// Run `kind` for the row `control` belongs to.
    ///
    /// Missing id, missing URL, or a control that is already busy abort
    /// before any request is made. A failed request or a response without a
    /// reservation re-enables the control and leaves the tables untouched.
    pub async fn dispatch(
        &self,
        kind: ActionKind,
        control: &TriggerControl,
    ) -> AppResult<ReservationSnapshot> {
        let Some(row_id) = control.reservation_id().cloned() else {
            error!(action = %kind, "Missing reservation id");
            return Err(AppError::precondition("Missing reservation id"));
        };
        let Some(url) = control.url().map(str::to_string) else {
            error!(action = %kind, reservation_id = %row_id, "Missing action URL");
            return Err(AppError::precondition("Missing action URL"));
        };
        if !control.try_begin() {
            warn!(action = %kind, reservation_id = %row_id, "Action already in progress");
            return Err(AppError::precondition("Action already in progress"));
        }

        match self.submit(kind, &url).await {
            Ok(snapshot) => {
                if !self.apply(&row_id, &snapshot) {
                    control.release();
                }
                info!(
                    action = %kind,
                    reservation_id = %row_id,
                    status = ?snapshot.status,
                    "Reservation updated"
                );
                Ok(snapshot)
            }
            Err(err) => {
                error!(
                    action = %kind,
                    reservation_id = %row_id,
                    %url,
                    error = %err,
                    "Error updating reservation"
                );
                control.release();
                Err(err)
            }
        }
    }

    async fn submit(&self, kind: ActionKind, url: &str) -> AppResult<ReservationSnapshot> {
        let body = self.transport.post_json(url).await?;
        let snapshot = extract_snapshot(kind, body)?;

        Ok(match kind {
            ActionKind::MoveBackToRequests => {
                snapshot.with_default_status(ReservationStatus::Pending)
            }
            _ => snapshot,
        })
    }

    /// Reconcile the response. Returns `false` when the row was left as is
    /// because a newer state is already displayed.
    fn apply(&self, row_id: &ReservationId, snapshot: &ReservationSnapshot) -> bool {
        let Some(id) = snapshot.id.as_ref() else {
            return false;
        };
        self.suppression.suppress(id, self.window);

        if !self.freshness.record_response(snapshot) {
            debug!(
                reservation_id = %id,
                updated_at = ?snapshot.updated_at,
                "Action response older than displayed row"
            );
            return false;
        }
        self.reconciler.remove(row_id);
        self.reconciler.upsert(snapshot, RowOrigin::Existing);
        true
    }
}

/// Pull the reservation out of an action response.
///
/// The server wraps it in `reservation` (or `upcoming` for move-back) and
/// older endpoints return it bare.
pub fn extract_snapshot(kind: ActionKind, body: Value) -> AppResult<ReservationSnapshot> {
    let keys: &[&str] = match kind {
        ActionKind::MoveBackToRequests => &[RESERVATION_KEY, UPCOMING_KEY],
        _ => &[RESERVATION_KEY],
    };
    let candidate = match body {
        Value::Object(mut map) => keys
            .iter()
            .find_map(|key| map.remove(*key).filter(Value::is_object))
            .unwrap_or(Value::Object(map)),
        other => other,
    };

    let snapshot = ReservationSnapshot::from_value(candidate).map_err(|e| {
        AppError::with_source(ErrorKind::Protocol, "Server did not return reservation JSON", e)
    })?;
    if snapshot.id.is_none() {
        return Err(AppError::protocol("Server did not return reservation JSON"));
    }
    Ok(snapshot)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::RoutingPolicy;
    use crate::test_support::FakeTransport;
    use openspots_core::traits::ManualClock;
    use openspots_core::types::{ArrivalStatus, TableKind};
    use serde_json::json;

    struct Harness {
        transport: Arc<FakeTransport>,
        suppression: Arc<SuppressionRegistry>,
        freshness: Arc<FreshnessTracker>,
        reconciler: Arc<RowReconciler>,
        dispatcher: ActionDispatcher,
    }

    fn harness() -> Harness {
        let clock = Arc::new(ManualClock::new(0));
        let transport = Arc::new(FakeTransport::default());
        let suppression = Arc::new(SuppressionRegistry::new(clock.clone()));
        let freshness = Arc::new(FreshnessTracker::new(suppression.clone()));
        let reconciler = Arc::new(RowReconciler::new(
            RoutingPolicy::default(),
            2000,
            16,
            clock,
        ));
        let dispatcher = ActionDispatcher::new(
            transport.clone(),
            suppression.clone(),
            freshness.clone(),
            reconciler.clone(),
            Duration::from_millis(3000),
        );
        Harness {
            transport,
            suppression,
            freshness,
            reconciler,
            dispatcher,
        }
    }

    fn pending_row(h: &Harness, id: u64) {
        let snap = ReservationSnapshot {
            id: Some(ReservationId::from(id)),
            status: Some(ReservationStatus::Pending),
            ..Default::default()
        };
        h.reconciler.upsert(&snap, RowOrigin::Existing);
    }

    fn control(id: u64, url: &str) -> TriggerControl {
        TriggerControl::new(Some(ReservationId::from(id)), Some(url.into()))
    }

    #[tokio::test]
    async fn test_accept_moves_row_and_suppresses() {
        let h = harness();
        pending_row(&h, 42);
        h.transport.respond(Ok(json!({
            "success": true,
            "reservation": {
                "id": 42,
                "status": "accepted",
                "arrival_status": "pending",
                "updated_at": "2025-01-01T10:00:00Z"
            }
        })));

        let id = ReservationId::from(42);
        let ctl = control(42, "/reservation/42/status/accepted/");
        let snap = h.dispatcher.dispatch(ActionKind::Accept, &ctl).await.unwrap();

        assert_eq!(snap.status, Some(ReservationStatus::Accepted));
        assert_eq!(h.transport.calls(), vec!["/reservation/42/status/accepted/"]);
        assert_eq!(h.reconciler.locate(&id), Some(TableKind::Special));
        assert!(h.suppression.is_suppressed(&id));
        assert!(h.freshness.last_applied(&id).is_some());
        assert!(ctl.is_busy());
    }

    #[tokio::test]
    async fn test_missing_preconditions_skip_network() {
        let h = harness();
        let no_id = TriggerControl::new(None, Some("/x/".into()));
        let no_url = TriggerControl::new(Some(ReservationId::from(1)), None);

        let err = h.dispatcher.dispatch(ActionKind::Accept, &no_id).await.unwrap_err();
        assert!(err.is_precondition());
        let err = h.dispatcher.dispatch(ActionKind::Reject, &no_url).await.unwrap_err();
        assert!(err.is_precondition());
        assert!(h.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_busy_control_rejected() {
        let h = harness();
        let ctl = control(1, "/x/");
        assert!(ctl.try_begin());
        let err = h.dispatcher.dispatch(ActionKind::Accept, &ctl).await.unwrap_err();
        assert!(err.is_precondition());
        assert!(h.transport.calls().is_empty());
    }

    #[tokio::test]
    async fn test_failure_releases_control_and_keeps_rows() {
        let h = harness();
        pending_row(&h, 7);
        h.transport.respond(Err(AppError::network("Status update failed")));
        let ctl = control(7, "/reservation/7/status/rejected/");

        let err = h.dispatcher.dispatch(ActionKind::Reject, &ctl).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Network);
        assert!(!ctl.is_busy());
        assert_eq!(
            h.reconciler.locate(&ReservationId::from(7)),
            Some(TableKind::Upcoming)
        );
        assert!(!h.suppression.is_suppressed(&ReservationId::from(7)));
    }

    #[tokio::test]
    async fn test_response_without_id_is_protocol_error() {
        let h = harness();
        pending_row(&h, 8);
        h.transport.respond(Ok(json!({"success": true})));
        let ctl = control(8, "/x/");

        let err = h.dispatcher.dispatch(ActionKind::Accept, &ctl).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::Protocol);
        assert!(!ctl.is_busy());
        assert!(h.reconciler.row(&ReservationId::from(8)).is_some());
    }

    #[tokio::test]
    async fn test_move_back_defaults_to_pending() {
        let h = harness();
        let accepted = ReservationSnapshot {
            id: Some(ReservationId::from(9)),
            status: Some(ReservationStatus::Accepted),
            arrival_status: Some(ArrivalStatus::NoShow),
            ..Default::default()
        };
        h.reconciler.upsert(&accepted, RowOrigin::Existing);
        h.transport.respond(Ok(json!({"upcoming": {"id": "9"}})));
        let ctl = control(9, "/reservation/9/move-to-requests/");

        let snap = h
            .dispatcher
            .dispatch(ActionKind::MoveBackToRequests, &ctl)
            .await
            .unwrap();
        assert_eq!(snap.status, Some(ReservationStatus::Pending));
        assert_eq!(snap.arrival_status, None);
        assert_eq!(
            h.reconciler.locate(&ReservationId::from(9)),
            Some(TableKind::Upcoming)
        );
        // Replaced rows are never flashed.
        assert!(!h.reconciler.is_highlighted(&ReservationId::from(9)));
    }

    #[tokio::test]
    async fn test_late_response_keeps_newer_row() {
        let h = harness();
        let id = ReservationId::from(10);
        let newer = ReservationSnapshot {
            id: Some(id.clone()),
            status: Some(ReservationStatus::Pending),
            customer_name: Some("Newer".into()),
            updated_at: Some("2025-01-01T10:00:09Z".into()),
            ..Default::default()
        };
        assert!(h.freshness.should_apply(&newer));
        h.reconciler.upsert(&newer, RowOrigin::Fresh);

        h.transport.respond(Ok(json!({"reservation": {
            "id": 10,
            "status": "accepted",
            "customer_name": "Older",
            "updated_at": "2025-01-01T10:00:01Z"
        }})));
        let ctl = control(10, "/reservation/10/status/accepted/");
        let snap = h.dispatcher.dispatch(ActionKind::Accept, &ctl).await.unwrap();

        assert_eq!(snap.customer_name.as_deref(), Some("Older"));
        let row = h.reconciler.row(&id).unwrap();
        assert_eq!(row.customer, "Newer");
        assert_eq!(h.reconciler.locate(&id), Some(TableKind::Upcoming));
        assert_eq!(
            h.freshness.last_applied(&id),
            crate::freshness::tracker::parse_timestamp("2025-01-01T10:00:09Z")
        );
        assert!(h.suppression.is_suppressed(&id));
        assert!(!ctl.is_busy());
    }

    #[test]
    fn test_extract_snapshot_shapes() {
        let bare = extract_snapshot(ActionKind::Reject, json!({"id": 1, "status": "rejected"}))
            .unwrap();
        assert_eq!(bare.id, Some(ReservationId::from(1)));

        let wrapped = extract_snapshot(
            ActionKind::MoveBackToRequests,
            json!({"reservation": {"id": 2}, "upcoming": {"id": 3}}),
        )
        .unwrap();
        assert_eq!(wrapped.id, Some(ReservationId::from(2)));

        let upcoming =
            extract_snapshot(ActionKind::MoveBackToRequests, json!({"upcoming": {"id": 3}}))
                .unwrap();
        assert_eq!(upcoming.id, Some(ReservationId::from(3)));

        // Only move-back responses use the `upcoming` wrapper.
        assert!(extract_snapshot(ActionKind::Accept, json!({"upcoming": {"id": 3}})).is_err());

        assert!(extract_snapshot(ActionKind::Accept, json!([1, 2])).is_err());
        assert!(extract_snapshot(ActionKind::Accept, json!({"reservation": null})).is_err());
    }
}
