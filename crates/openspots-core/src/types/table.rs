//! The two admin-facing reservation tables.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Which dashboard table a reservation row belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TableKind {
    /// Pending reservation requests.
    Upcoming,
    /// Guest arrivals and history.
    Special,
}

impl TableKind {
    /// Both tables, in display order.
    pub const ALL: [TableKind; 2] = [TableKind::Upcoming, TableKind::Special];

    /// Lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Special => "special",
        }
    }
}

impl fmt::Display for TableKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
