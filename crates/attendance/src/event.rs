use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use workpass_core::{CompanyId, EmployeeId, TagId};

/// Presence direction of a ledger event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Direction {
    In,
    Out,
}

impl Direction {
    /// The direction the *next* tap produces.
    pub fn toggled(self) -> Direction {
        match self {
            Direction::In => Direction::Out,
            Direction::Out => Direction::In,
        }
    }
}

impl core::fmt::Display for Direction {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Direction::In => f.write_str("IN"),
            Direction::Out => f.write_str("OUT"),
        }
    }
}

/// How a tap entered the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "UPPERCASE")]
pub enum TapKind {
    /// Physical tag tap.
    #[default]
    Nfc,
    /// Backfilled or corrected by a person.
    Manual,
}

/// One append-only entry in the presence ledger.
///
/// Never mutated or deleted. For a fixed user, each event's direction is the
/// negation of the previous one (IN when no previous event exists).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttendanceEvent {
    pub event_id: Uuid,
    pub user_id: EmployeeId,
    pub company_id: CompanyId,
    pub tag_id: TagId,
    pub direction: Direction,
    /// Server-assigned; clients never supply timestamps.
    pub recorded_at: DateTime<Utc>,
    /// Tap counter as presented by the tag.
    pub counter: u32,
    /// Tap code as presented; stored for audit, not verified here.
    pub signature: Option<String>,
    pub kind: TapKind,
}
