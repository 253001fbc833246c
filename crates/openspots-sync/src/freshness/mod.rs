//! Per-reservation ordering by server timestamp.

pub mod tracker;

pub use tracker::FreshnessTracker;
