//! Which table a reservation belongs in.

use openspots_core::types::{ArrivalStatus, ReservationStatus, TableKind};

/// Maps `(status, arrival_status)` to a table.
///
/// Pending requests live in the upcoming table. Everything else, unknown
/// statuses included, lives in the special table, except that accepted
/// reservations still awaiting arrival follow `accepted_before_arrival`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutingPolicy {
    /// Table for accepted reservations whose guest has not arrived yet
    pub accepted_before_arrival: TableKind,
}

impl Default for RoutingPolicy {
    fn default() -> Self {
        Self {
            accepted_before_arrival: TableKind::Special,
        }
    }
}

impl RoutingPolicy {
    pub fn new(accepted_before_arrival: TableKind) -> Self {
        Self {
            accepted_before_arrival,
        }
    }

    /// Target table for a reservation in the given state.
    pub fn route(
        &self,
        status: Option<&ReservationStatus>,
        arrival: Option<&ArrivalStatus>,
    ) -> TableKind {
        match (status, arrival) {
            (Some(ReservationStatus::Pending), _) => TableKind::Upcoming,
            (Some(ReservationStatus::Accepted), None | Some(ArrivalStatus::Pending)) => {
                self.accepted_before_arrival
            }
            _ => TableKind::Special,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_routing() {
        let policy = RoutingPolicy::default();
        assert_eq!(
            policy.route(Some(&ReservationStatus::Pending), None),
            TableKind::Upcoming
        );
        assert_eq!(
            policy.route(Some(&ReservationStatus::Accepted), Some(&ArrivalStatus::Pending)),
            TableKind::Special
        );
        assert_eq!(
            policy.route(Some(&ReservationStatus::Accepted), Some(&ArrivalStatus::CheckedIn)),
            TableKind::Special
        );
        assert_eq!(
            policy.route(Some(&ReservationStatus::Rejected), None),
            TableKind::Special
        );
        assert_eq!(
            policy.route(Some(&ReservationStatus::Other("waitlisted".into())), None),
            TableKind::Special
        );
        assert_eq!(policy.route(None, None), TableKind::Special);
    }

    #[test]
    fn test_accepted_before_arrival_in_upcoming() {
        let policy = RoutingPolicy::new(TableKind::Upcoming);
        assert_eq!(
            policy.route(Some(&ReservationStatus::Accepted), Some(&ArrivalStatus::Pending)),
            TableKind::Upcoming
        );
        assert_eq!(
            policy.route(Some(&ReservationStatus::Accepted), Some(&ArrivalStatus::NoShow)),
            TableKind::Special
        );
    }
}
