//! Unread badge and unseen-reservation tracking.

pub mod center;

pub use center::{BadgeState, NotificationCenter};
