//! Short-lived masking of push echoes after local actions.

pub mod registry;

pub use registry::SuppressionRegistry;
