//! Collaborator contracts the ledger reads and appends through.
//!
//! No storage assumptions: in-memory implementations serve tests/dev, and a
//! database-backed implementation can slot in behind the same traits.

use std::sync::Arc;

use thiserror::Error;

use workpass_core::{CompanyId, EmployeeId};
use workpass_tags::{TagCredential, TagUid};

use crate::event::AttendanceEvent;

/// Infrastructure failure surfaced by a store implementation.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    #[error("attendance store unavailable: {0}")]
    Unavailable(String),
}

/// Read-only lookup of registered tag credentials.
pub trait TagStore: Send + Sync {
    fn find_by_uid(&self, uid: &TagUid) -> Option<TagCredential>;
}

/// Which company an employee is registered with, if any.
pub trait EmployeeDirectory: Send + Sync {
    fn registered_company(&self, user_id: EmployeeId) -> Option<CompanyId>;
}

/// Append-only presence event storage.
pub trait AttendanceStore: Send + Sync {
    /// Most recent event for a user, by recorded timestamp descending.
    fn most_recent(&self, user_id: EmployeeId) -> Option<AttendanceEvent>;

    /// Append a new event. Events are never updated or deleted.
    fn append(&self, event: AttendanceEvent) -> Result<(), StoreError>;
}

impl<S> TagStore for Arc<S>
where
    S: TagStore + ?Sized,
{
    fn find_by_uid(&self, uid: &TagUid) -> Option<TagCredential> {
        (**self).find_by_uid(uid)
    }
}

impl<S> EmployeeDirectory for Arc<S>
where
    S: EmployeeDirectory + ?Sized,
{
    fn registered_company(&self, user_id: EmployeeId) -> Option<CompanyId> {
        (**self).registered_company(user_id)
    }
}

impl<S> AttendanceStore for Arc<S>
where
    S: AttendanceStore + ?Sized,
{
    fn most_recent(&self, user_id: EmployeeId) -> Option<AttendanceEvent> {
        (**self).most_recent(user_id)
    }

    fn append(&self, event: AttendanceEvent) -> Result<(), StoreError> {
        (**self).append(event)
    }
}
