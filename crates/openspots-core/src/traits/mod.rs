//! Core traits defined in `openspots-core` and implemented by other crates.

pub mod clock;
pub mod transport;

pub use clock::{Clock, ManualClock, SystemClock};
pub use transport::ActionTransport;
