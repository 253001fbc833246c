//! Suppression registry: reservation ids whose push updates are ignored
//! for a short window after the admin changed them locally.

use std::sync::Arc;
use std::time::Duration;

use dashmap::DashMap;
use tracing::trace;

use openspots_core::traits::Clock;
use openspots_core::types::ReservationId;

/// Slack added to the window before the deferred eviction runs.
const EVICTION_GRACE: Duration = Duration::from_millis(50);

/// Reservation id → expiry (Unix milliseconds).
#[derive(Debug, Clone)]
pub struct SuppressionRegistry {
    /// Time source
    clock: Arc<dyn Clock>,
    /// Active suppression windows
    entries: Arc<DashMap<ReservationId, i64>>,
}

impl SuppressionRegistry {
    /// Create an empty registry reading time from `clock`.
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            entries: Arc::new(DashMap::new()),
        }
    }

    /// Ignore push updates for `id` until `now + window`.
    ///
    /// Calling again resets the window. When a tokio runtime is available an
    /// eviction task is scheduled for shortly after the window ends.
    pub fn suppress<'a>(&self, id: impl Into<Option<&'a ReservationId>>, window: Duration) {
        let Some(id) = id.into() else {
            return;
        };
        let expiry = self.clock.now_millis() + window.as_millis() as i64;
        self.entries.insert(id.clone(), expiry);
        trace!(reservation_id = %id, expiry, "Suppressing push updates");

        if let Ok(handle) = tokio::runtime::Handle::try_current() {
            let entries = Arc::clone(&self.entries);
            let clock = Arc::clone(&self.clock);
            let id = id.clone();
            handle.spawn(async move {
                tokio::time::sleep(window + EVICTION_GRACE).await;
                let now = clock.now_millis();
                entries.remove_if(&id, |_, expiry| *expiry <= now);
            });
        }
    }

    /// Whether an unexpired window exists for `id`. Never mutates the map.
    pub fn is_suppressed<'a>(&self, id: impl Into<Option<&'a ReservationId>>) -> bool {
        let Some(id) = id.into() else {
            return false;
        };
        let now = self.clock.now_millis();
        self.entries
            .get(id)
            .map(|expiry| *expiry > now)
            .unwrap_or(false)
    }

    /// Drop every expired entry. Returns how many were removed.
    pub fn purge_expired(&self) -> usize {
        let now = self.clock.now_millis();
        let before = self.entries.len();
        self.entries.retain(|_, expiry| *expiry > now);
        before - self.entries.len()
    }

    /// Number of stored entries, expired or not.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use openspots_core::traits::ManualClock;

    fn registry() -> (Arc<ManualClock>, SuppressionRegistry) {
        let clock = Arc::new(ManualClock::new(1_000_000));
        let registry = SuppressionRegistry::new(clock.clone());
        (clock, registry)
    }

    #[test]
    fn test_window_expires() {
        let (clock, registry) = registry();
        let id = ReservationId::from(42);

        registry.suppress(&id, Duration::from_millis(3000));
        assert!(registry.is_suppressed(&id));

        clock.advance(2_999);
        assert!(registry.is_suppressed(&id));

        clock.advance(51);
        assert!(!registry.is_suppressed(&id));
        // Query alone never evicts.
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_resuppress_resets_window() {
        let (clock, registry) = registry();
        let id = ReservationId::from(1);

        registry.suppress(&id, Duration::from_millis(3000));
        clock.advance(2_500);
        registry.suppress(&id, Duration::from_millis(3000));
        clock.advance(2_500);
        assert!(registry.is_suppressed(&id));
    }

    #[test]
    fn test_missing_id_is_noop() {
        let (_, registry) = registry();
        registry.suppress(None::<&ReservationId>, Duration::from_millis(3000));
        assert!(registry.is_empty());
        assert!(!registry.is_suppressed(None::<&ReservationId>));
    }

    #[test]
    fn test_purge_expired() {
        let (clock, registry) = registry();
        registry.suppress(&ReservationId::from(1), Duration::from_millis(100));
        registry.suppress(&ReservationId::from(2), Duration::from_millis(5_000));
        clock.advance(200);
        assert_eq!(registry.purge_expired(), 1);
        assert_eq!(registry.len(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_eviction() {
        let (clock, registry) = registry();
        let id = ReservationId::from(7);

        registry.suppress(&id, Duration::from_millis(3000));
        clock.advance(3_050);
        tokio::time::sleep(Duration::from_millis(4_000)).await;

        assert!(registry.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn test_deferred_eviction_keeps_extended_window() {
        let (clock, registry) = registry();
        let id = ReservationId::from(8);

        registry.suppress(&id, Duration::from_millis(3000));
        // Extended in manual time before the first eviction task wakes.
        clock.advance(1_000);
        registry.suppress(&id, Duration::from_millis(3000));
        clock.advance(2_050);
        tokio::time::sleep(Duration::from_millis(3_100)).await;

        assert_eq!(registry.len(), 1);
        assert!(registry.is_suppressed(&id));
    }
}
