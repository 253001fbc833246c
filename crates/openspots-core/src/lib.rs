//! # openspots-core
//!
//! Core crate for the OpenSpots venue dashboard. Contains configuration
//! schemas, the reservation snapshot model, the clock and action transport
//! traits, and the unified error system.
//!
//! This crate has **no** internal dependencies on other OpenSpots crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
