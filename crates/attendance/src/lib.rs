//! `workpass-attendance` — the check-in/check-out presence ledger.
//!
//! Direction is never supplied by the client: each verified tap toggles the
//! user's presence state, derived from the most recent ledger event. The
//! ledger validates ownership and company bindings itself, independently of
//! whatever policy gate ran at the transport layer.

pub mod event;
pub mod ledger;
pub mod store;

pub use event::{AttendanceEvent, Direction, TapKind};
pub use ledger::{
    AttendanceLedger, ForbiddenReason, LedgerError, PresenceStatus, StatusView, TapRecorded,
    TapRequest,
};
pub use store::{AttendanceStore, EmployeeDirectory, StoreError, TagStore};
