//! The five reservation transitions an admin can trigger.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use openspots_core::types::{ActionUrls, ReservationId};
use openspots_core::AppError;

/// A reservation state change issued from the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    /// Accept a pending request.
    Accept,
    /// Reject a pending request.
    Reject,
    /// Guest arrived.
    CheckIn,
    /// Guest did not arrive.
    NoShow,
    /// Send a processed reservation back to pending requests.
    MoveBackToRequests,
}

impl ActionKind {
    /// All actions.
    pub const ALL: [ActionKind; 5] = [
        ActionKind::Accept,
        ActionKind::Reject,
        ActionKind::CheckIn,
        ActionKind::NoShow,
        ActionKind::MoveBackToRequests,
    ];

    /// Button caption.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Accept => "✅ Accept",
            Self::Reject => "❌ Reject",
            Self::CheckIn => "✅ Checked-in",
            Self::NoShow => "❌ No-show",
            Self::MoveBackToRequests => "Move to Requests",
        }
    }

    /// CSS classes of the button.
    pub fn css_class(&self) -> &'static str {
        match self {
            Self::Accept => "btn btn-success btn-sm me-1 btn-accept-reservation",
            Self::Reject => "btn btn-danger btn-sm btn-reject-reservation",
            Self::CheckIn => "btn btn-success btn-sm me-1 btn-update-arrival",
            Self::NoShow => "btn btn-danger btn-sm btn-update-arrival",
            Self::MoveBackToRequests => "btn btn-sm btn-edit-status",
        }
    }

    /// Target state announced in the button's `data-status` attribute.
    pub fn target_status(&self) -> Option<&'static str> {
        match self {
            Self::Accept => Some("accepted"),
            Self::Reject => Some("rejected"),
            Self::CheckIn => Some("checked_in"),
            Self::NoShow => Some("no_show"),
            Self::MoveBackToRequests => None,
        }
    }

    /// Deterministic endpoint used when the server did not supply one.
    pub fn fallback_url(&self, id: &ReservationId) -> String {
        match self {
            Self::Accept => format!("/reservation/{id}/status/accepted/"),
            Self::Reject => format!("/reservation/{id}/status/rejected/"),
            Self::CheckIn => format!("/reservation/{id}/update-arrival/checked_in/"),
            Self::NoShow => format!("/reservation/{id}/update-arrival/no_show/"),
            Self::MoveBackToRequests => format!("/reservation/{id}/move-to-requests/"),
        }
    }

    /// Endpoint supplied by the server for this action, if any.
    pub fn server_url<'a>(&self, urls: &'a ActionUrls) -> Option<&'a str> {
        match self {
            Self::Accept => urls.accept.as_deref(),
            Self::Reject => urls.reject.as_deref(),
            Self::CheckIn => urls.checkin.as_deref(),
            Self::NoShow => urls.no_show.as_deref(),
            Self::MoveBackToRequests => urls.move_to_requests.as_deref(),
        }
    }

    /// Server endpoint, or the fallback template.
    pub fn resolve_url(&self, urls: &ActionUrls, id: &ReservationId) -> String {
        self.server_url(urls)
            .map(str::to_string)
            .unwrap_or_else(|| self.fallback_url(id))
    }

    /// Command-line name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Accept => "accept",
            Self::Reject => "reject",
            Self::CheckIn => "check-in",
            Self::NoShow => "no-show",
            Self::MoveBackToRequests => "move-back",
        }
    }
}

/// Fallback for the non-AJAX edit page link.
pub fn fallback_edit_url(id: &ReservationId) -> String {
    format!("/reservation/{id}/edit-status/")
}

impl fmt::Display for ActionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ActionKind {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "accept" => Ok(Self::Accept),
            "reject" => Ok(Self::Reject),
            "check-in" | "checkin" | "checked-in" => Ok(Self::CheckIn),
            "no-show" | "noshow" => Ok(Self::NoShow),
            "move-back" | "move" | "move-to-requests" => Ok(Self::MoveBackToRequests),
            other => Err(AppError::precondition(format!("Unknown action: {other}"))),
        }
    }
}
