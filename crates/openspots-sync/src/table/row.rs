//! Rendered reservation row.

use serde::Serialize;

use openspots_core::types::{ArrivalStatus, ReservationId, ReservationSnapshot, ReservationStatus};

use super::format::{
    capitalize, date_sort_key, escape_html, format_date_display, format_time_display,
    time_sort_key,
};
use crate::action::ActionKind;
use crate::action::kind::fallback_edit_url;

/// Placeholder shown when the customer name is missing.
const NO_CUSTOMER: &str = "—";

/// Status badge of a row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusBadge {
    /// Raw display status (`pending`, `checked_in`, ...)
    pub status: String,
    /// Human label (`Checked in`)
    pub label: String,
    /// Bootstrap classes
    pub css_class: &'static str,
}

impl StatusBadge {
    fn for_status(status: &str) -> Self {
        let css_class = match status {
            "pending" => "badge bg-warning text-dark",
            "accepted" | "checked_in" => "badge bg-success",
            "no_show" => "badge bg-danger",
            "cancelled" => "badge bg-secondary",
            _ => "badge bg-danger",
        };
        Self {
            status: status.to_string(),
            label: capitalize(&status.replacen('_', " ", 1)),
            css_class,
        }
    }
}

/// A button on the row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowAction {
    pub kind: ActionKind,
    /// Endpoint the dispatcher posts to
    pub url: String,
    /// Link target when scripting is unavailable
    pub href: String,
}

/// Presentation of one reservation, derived from a snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RowView {
    pub id: ReservationId,
    pub customer: String,
    pub date_display: String,
    pub time_display: String,
    /// `YYYY-MM-DD`
    pub date_key: String,
    /// `HH:MM`
    pub time_key: String,
    pub party: String,
    pub badge: StatusBadge,
    pub actions: Vec<RowAction>,
    /// Unix millis until which the row is flashed as new
    pub highlight_until: Option<i64>,
    /// Snapshot the row was rendered from
    #[serde(skip)]
    pub snapshot: ReservationSnapshot,
}

impl RowView {
    /// Render `snapshot`. Returns `None` when it has no id.
    pub fn render(snapshot: &ReservationSnapshot) -> Option<Self> {
        let id = snapshot.id.clone()?;
        let date_raw = snapshot.date.as_deref().unwrap_or_default();
        let time_raw = snapshot.time.as_deref().unwrap_or_default();

        Some(Self {
            customer: snapshot
                .customer_display()
                .filter(|name| !name.is_empty())
                .unwrap_or(NO_CUSTOMER)
                .to_string(),
            date_display: format_date_display(date_raw),
            time_display: format_time_display(time_raw),
            date_key: date_sort_key(date_raw),
            time_key: time_sort_key(time_raw),
            party: snapshot
                .party_size
                .map(|n| n.to_string())
                .unwrap_or_default(),
            badge: StatusBadge::for_status(&display_status(snapshot)),
            actions: legal_actions(snapshot, &id),
            highlight_until: None,
            snapshot: snapshot.clone(),
            id,
        })
    }

    /// Whether the "new request" flash is still showing at `now`.
    pub fn is_highlighted(&self, now: i64) -> bool {
        self.highlight_until.is_some_and(|until| until > now)
    }

    /// Endpoint bound to the row's `kind` button, if the row shows one.
    pub fn action_url(&self, kind: ActionKind) -> Option<&str> {
        self.actions
            .iter()
            .find(|a| a.kind == kind)
            .map(|a| a.url.as_str())
    }

    /// `<tr>` markup of the row.
    pub fn to_html(&self, now: i64) -> String {
        let id = escape_html(self.id.as_str());
        let class_attr = if self.is_highlighted(now) {
            r#" class="new-reservation flash-once""#
        } else {
            ""
        };
        let actions: String = self.actions.iter().map(action_html).collect();

        format!(
            concat!(
                r#"<tr id="reservation-row-{id}" data-reservation-id="{id}"{class}>"#,
                "<td>{customer}</td>",
                r#"<td data-order="{date_key}">{date}</td>"#,
                r#"<td data-order="{time_key}">{time}</td>"#,
                "<td>{party}</td>",
                r#"<td><span class="{badge_class}">{badge}</span></td>"#,
                "<td>{actions}</td>",
                "</tr>"
            ),
            id = id,
            class = class_attr,
            customer = escape_html(&self.customer),
            date_key = escape_html(&self.date_key),
            date = escape_html(&self.date_display),
            time_key = escape_html(&self.time_key),
            time = escape_html(&self.time_display),
            party = escape_html(&self.party),
            badge_class = self.badge.css_class,
            badge = escape_html(&self.badge.label),
            actions = actions,
        )
    }
}

// Accepted and arrival states show the arrival status on the badge.
fn display_status(snapshot: &ReservationSnapshot) -> String {
    let arrival = || {
        snapshot
            .arrival_status
            .as_ref()
            .unwrap_or(&ArrivalStatus::Pending)
            .as_str()
            .to_string()
    };
    match &snapshot.status {
        Some(ReservationStatus::Accepted) => arrival(),
        Some(ReservationStatus::Other(s)) if s == "checked_in" || s == "no_show" => arrival(),
        Some(status) => status.as_str().to_string(),
        None => "unknown".to_string(),
    }
}

fn legal_actions(snapshot: &ReservationSnapshot, id: &ReservationId) -> Vec<RowAction> {
    let bind = |kind: ActionKind| {
        let url = kind.resolve_url(&snapshot.urls, id);
        RowAction {
            kind,
            href: url.clone(),
            url,
        }
    };

    if snapshot.status == Some(ReservationStatus::Pending) {
        return vec![bind(ActionKind::Accept), bind(ActionKind::Reject)];
    }

    let mut actions = Vec::with_capacity(3);
    if snapshot.status == Some(ReservationStatus::Accepted)
        && snapshot.arrival_status == Some(ArrivalStatus::Pending)
    {
        actions.push(bind(ActionKind::CheckIn));
        actions.push(bind(ActionKind::NoShow));
    }
    actions.push(RowAction {
        kind: ActionKind::MoveBackToRequests,
        url: ActionKind::MoveBackToRequests.resolve_url(&snapshot.urls, id),
        href: snapshot
            .urls
            .edit
            .clone()
            .unwrap_or_else(|| fallback_edit_url(id)),
    });
    actions
}

fn action_html(action: &RowAction) -> String {
    let href = escape_html(&action.href);
    let class = action.kind.css_class();
    let label = action.kind.label();
    match action.kind.target_status() {
        Some(status) => {
            format!(r#"<a href="{href}" class="{class}" data-status="{status}">{label}</a>"#)
        }
        None => format!(
            r#"<a href="{href}" data-move-url="{}" class="{class}">{label}</a>"#,
            escape_html(&action.url)
        ),
    }
}
