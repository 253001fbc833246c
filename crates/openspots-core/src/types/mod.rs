//! Core type definitions used across the OpenSpots workspace.

mod de;
pub mod id;
pub mod reservation;
pub mod table;

pub use id::ReservationId;
pub use reservation::{ActionUrls, ArrivalStatus, ReservationSnapshot, ReservationStatus};
pub use table::TableKind;
