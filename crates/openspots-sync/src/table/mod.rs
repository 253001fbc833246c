//! The upcoming and special reservation tables and their reconciliation.

pub mod format;
pub mod reconciler;
pub mod routing;
pub mod row;
pub mod store;

pub use reconciler::{RowOrigin, RowReconciler};
pub use routing::RoutingPolicy;
pub use row::{RowAction, RowView, StatusBadge};
pub use store::{ReservationTable, TableChange};
