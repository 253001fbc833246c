//! Realtime push feed: WebSocket client and message processing.

pub mod client;
pub mod message;
pub mod processor;
pub mod state;

pub use client::RealtimeFeedClient;
pub use message::FeedRecord;
pub use processor::{BatchOutcome, FeedProcessor, RecordOutcome};
pub use state::FeedState;
