//! In-memory store implementations.
//!
//! Intended for tests/dev. Not optimized for performance. Lock poisoning is
//! absorbed (reads fall back to "absent", writes surface a store error)
//! rather than propagated as a panic.

use std::collections::HashMap;
use std::sync::RwLock;

use workpass_attendance::{AttendanceEvent, AttendanceStore, EmployeeDirectory, StoreError, TagStore};
use workpass_auth::{HierarchyGraph, HierarchyNode};
use workpass_core::{CompanyId, EmployeeId};
use workpass_tags::{TagCredential, TagUid};

/// In-memory registry of tag credentials, keyed by canonical UID.
#[derive(Default)]
pub struct InMemoryTagStore {
    tags: RwLock<HashMap<TagUid, TagCredential>>,
}

impl InMemoryTagStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register (or replace) a credential.
    pub fn register(&self, credential: TagCredential) {
        if let Ok(mut tags) = self.tags.write() {
            tags.insert(credential.uid.clone(), credential);
        }
    }
}

impl TagStore for InMemoryTagStore {
    fn find_by_uid(&self, uid: &TagUid) -> Option<TagCredential> {
        self.tags.read().ok()?.get(uid).cloned()
    }
}

/// In-memory employee-to-company registry.
#[derive(Default)]
pub struct InMemoryEmployeeDirectory {
    registrations: RwLock<HashMap<EmployeeId, CompanyId>>,
}

impl InMemoryEmployeeDirectory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&self, user_id: EmployeeId, company_id: CompanyId) {
        if let Ok(mut registrations) = self.registrations.write() {
            registrations.insert(user_id, company_id);
        }
    }
}

impl EmployeeDirectory for InMemoryEmployeeDirectory {
    fn registered_company(&self, user_id: EmployeeId) -> Option<CompanyId> {
        self.registrations.read().ok()?.get(&user_id).copied()
    }
}

/// In-memory append-only presence ledger storage.
#[derive(Default)]
pub struct InMemoryAttendanceStore {
    events: RwLock<HashMap<EmployeeId, Vec<AttendanceEvent>>>,
}

impl InMemoryAttendanceStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// All events recorded for a user, in append order.
    pub fn events_for(&self, user_id: EmployeeId) -> Vec<AttendanceEvent> {
        self.events
            .read()
            .ok()
            .and_then(|events| events.get(&user_id).cloned())
            .unwrap_or_default()
    }
}

impl AttendanceStore for InMemoryAttendanceStore {
    fn most_recent(&self, user_id: EmployeeId) -> Option<AttendanceEvent> {
        self.events
            .read()
            .ok()?
            .get(&user_id)?
            .iter()
            .max_by_key(|e| (e.recorded_at, e.event_id))
            .cloned()
    }

    fn append(&self, event: AttendanceEvent) -> Result<(), StoreError> {
        let mut events = self
            .events
            .write()
            .map_err(|_| StoreError::Unavailable("attendance lock poisoned".to_string()))?;
        events.entry(event.user_id).or_default().push(event);
        Ok(())
    }
}

/// In-memory reports-to graph.
#[derive(Default)]
pub struct InMemoryHierarchy {
    nodes: RwLock<HashMap<EmployeeId, HierarchyNode>>,
}

impl InMemoryHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(
        &self,
        id: EmployeeId,
        boss_id: Option<EmployeeId>,
        company_id: CompanyId,
    ) {
        if let Ok(mut nodes) = self.nodes.write() {
            nodes.insert(
                id,
                HierarchyNode {
                    id,
                    boss_id,
                    company_id,
                },
            );
        }
    }
}

impl HierarchyGraph for InMemoryHierarchy {
    fn find_node(&self, id: EmployeeId) -> Option<HierarchyNode> {
        self.nodes.read().ok()?.get(&id).copied()
    }
}
