//! Admin-initiated reservation state changes.

pub mod control;
pub mod dispatcher;
pub mod kind;

pub use control::TriggerControl;
pub use dispatcher::ActionDispatcher;
pub use kind::ActionKind;
