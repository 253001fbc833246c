//! # openspots-sync
//!
//! Keeps the venue dashboard's reservation tables consistent while admin
//! actions and server push notifications race each other:
//!
//! - Suppression of push echoes right after a local action
//! - Per-reservation ordering by server `updated_at`
//! - Upcoming / special table reconciliation with row highlighting
//! - Unread badge and unseen-reservation tracking
//! - Action dispatch over HTTP and the realtime WebSocket feed

pub mod action;
pub mod feed;
pub mod freshness;
pub mod http;
pub mod notification;
pub mod session;
pub mod suppression;
pub mod table;

#[cfg(test)]
pub(crate) mod test_support;

pub use action::{ActionDispatcher, ActionKind, TriggerControl};
pub use feed::{FeedProcessor, FeedState, RealtimeFeedClient};
pub use freshness::FreshnessTracker;
pub use http::HttpActionTransport;
pub use notification::NotificationCenter;
pub use session::DashboardSession;
pub use suppression::SuppressionRegistry;
pub use table::{RowOrigin, RowReconciler};
