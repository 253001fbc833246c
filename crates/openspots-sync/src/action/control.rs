//! The UI control (button) an action is triggered from.

use std::sync::atomic::{AtomicBool, Ordering};

use openspots_core::types::ReservationId;

/// A button bound to one reservation row.
///
/// The busy flag stands in for the button's `disabled` state: it is set when
/// a submission starts and cleared only if the submission fails. After a
/// successful action the row is re-rendered and gets fresh controls.
#[derive(Debug, Default)]
pub struct TriggerControl {
    /// Reservation of the row holding the control
    reservation_id: Option<ReservationId>,
    /// Endpoint the control posts to
    url: Option<String>,
    busy: AtomicBool,
}

impl TriggerControl {
    pub fn new(reservation_id: Option<ReservationId>, url: Option<String>) -> Self {
        Self {
            reservation_id,
            url: url.filter(|u| !u.trim().is_empty()),
            busy: AtomicBool::new(false),
        }
    }

    pub fn reservation_id(&self) -> Option<&ReservationId> {
        self.reservation_id.as_ref()
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    /// Disable the control. Returns `false` if a submission is already running.
    pub fn try_begin(&self) -> bool {
        self.busy
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_ok()
    }

    /// Re-enable the control.
    pub fn release(&self) {
        self.busy.store(false, Ordering::Release);
    }

    pub fn is_busy(&self) -> bool {
        self.busy.load(Ordering::Acquire)
    }
}
