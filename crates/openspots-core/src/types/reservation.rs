//! Reservation snapshot model as delivered by the venue server.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize, Serializer};

use super::de;
use super::id::ReservationId;

/// Primary booking state.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ReservationStatus {
    /// Awaiting the venue's decision.
    Pending,
    /// Accepted by the venue.
    Accepted,
    /// Rejected by the venue.
    Rejected,
    /// Cancelled by the customer.
    Cancelled,
    /// Any value this client does not know about.
    Other(String),
}

impl ReservationStatus {
    /// Wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::Accepted => "accepted",
            Self::Rejected => "rejected",
            Self::Cancelled => "cancelled",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for ReservationStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "pending" => Self::Pending,
            "accepted" => Self::Accepted,
            "rejected" => Self::Rejected,
            "cancelled" | "canceled" => Self::Cancelled,
            _ => Self::Other(lower),
        })
    }
}

impl fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ReservationStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Arrival tracking state; meaningful once the reservation is accepted.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ArrivalStatus {
    /// Guest has not arrived yet.
    Pending,
    /// Guest checked in.
    CheckedIn,
    /// Guest did not show up.
    NoShow,
    /// Any value this client does not know about.
    Other(String),
}

impl ArrivalStatus {
    /// Wire name.
    pub fn as_str(&self) -> &str {
        match self {
            Self::Pending => "pending",
            Self::CheckedIn => "checked_in",
            Self::NoShow => "no_show",
            Self::Other(s) => s,
        }
    }
}

impl FromStr for ArrivalStatus {
    type Err = std::convert::Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_ascii_lowercase();
        Ok(match lower.as_str() {
            "pending" => Self::Pending,
            "checked_in" | "checked-in" => Self::CheckedIn,
            "no_show" | "no-show" | "noshow" => Self::NoShow,
            _ => Self::Other(lower),
        })
    }
}

impl fmt::Display for ArrivalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ArrivalStatus {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(self.as_str())
    }
}

/// Server-supplied endpoints for the transitions legal from the current state.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionUrls {
    /// Accept a pending request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub accept: Option<String>,
    /// Reject a pending request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reject: Option<String>,
    /// Move back to pending requests.
    #[serde(
        rename = "move",
        alias = "move_to_requests",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub move_to_requests: Option<String>,
    /// Mark the guest as checked in.
    #[serde(alias = "check_in", default, skip_serializing_if = "Option::is_none")]
    pub checkin: Option<String>,
    /// Mark the guest as a no-show.
    #[serde(alias = "noshow", default, skip_serializing_if = "Option::is_none")]
    pub no_show: Option<String>,
    /// Non-AJAX edit page.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub edit: Option<String>,
}

/// Point-in-time view of one reservation.
///
/// Snapshots are values: the sync engine never edits one in place, it
/// derives a new snapshot when it needs a corrected copy.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReservationSnapshot {
    /// Reservation identity.
    #[serde(default, deserialize_with = "de::lenient")]
    pub id: Option<ReservationId>,
    /// Booking state.
    #[serde(default, alias = "reservation_status", deserialize_with = "de::lenient")]
    pub status: Option<ReservationStatus>,
    /// Arrival state.
    #[serde(default, deserialize_with = "de::lenient")]
    pub arrival_status: Option<ArrivalStatus>,
    /// Server timestamp of the last mutation.
    #[serde(default, alias = "updatedAt", deserialize_with = "de::lenient")]
    pub updated_at: Option<String>,
    /// Customer display name.
    #[serde(default, deserialize_with = "de::lenient")]
    pub customer_name: Option<String>,
    /// Customer as a name or a nested object (older payloads).
    #[serde(default, deserialize_with = "de::customer", skip_serializing)]
    pub customer: Option<String>,
    /// ISO reservation date.
    #[serde(default, alias = "reservation_date", deserialize_with = "de::lenient")]
    pub date: Option<String>,
    /// Reservation time, `HH:MM[:SS]`.
    #[serde(default, alias = "reservation_time", deserialize_with = "de::lenient")]
    pub time: Option<String>,
    /// Number of guests.
    #[serde(default, alias = "guests", alias = "party", deserialize_with = "de::lenient")]
    pub party_size: Option<u32>,
    /// Legal next transitions.
    #[serde(default)]
    pub urls: ActionUrls,
}

impl ReservationSnapshot {
    /// Decode a snapshot from an already-parsed JSON value.
    pub fn from_value(value: serde_json::Value) -> Result<Self, serde_json::Error> {
        serde_json::from_value(value)
    }

    /// Customer name to display, whichever field carried it.
    pub fn customer_display(&self) -> Option<&str> {
        self.customer_name.as_deref().or(self.customer.as_deref())
    }

    /// Copy of this snapshot with `status` filled in when the server omitted it.
    pub fn with_default_status(&self, status: ReservationStatus) -> Self {
        let mut copy = self.clone();
        if copy.status.is_none() {
            copy.status = Some(status);
        }
        copy
    }
}
