//! Store wiring shared by handlers.

use std::collections::HashMap;
use std::sync::{Arc, RwLock};

use workpass_attendance::AttendanceLedger;
use workpass_auth::HierarchyGraph;
use workpass_core::TagId;
use workpass_infra::{
    InMemoryAttendanceStore, InMemoryEmployeeDirectory, InMemoryHierarchy, InMemoryTagStore,
};

/// All per-process services the handlers touch.
///
/// Stores are public so dev bootstrap and the black-box tests can seed
/// employees, tags and reports-to edges directly; handlers only read.
pub struct AppServices {
    pub tags: Arc<InMemoryTagStore>,
    pub directory: Arc<InMemoryEmployeeDirectory>,
    pub attendance: Arc<InMemoryAttendanceStore>,
    pub hierarchy: Arc<InMemoryHierarchy>,
    pub ledger: AttendanceLedger,

    /// Highest accepted tap counter per tag (replay high-water marks).
    tap_watermarks: RwLock<HashMap<TagId, u32>>,
}

impl AppServices {
    pub fn new() -> Self {
        let tags = Arc::new(InMemoryTagStore::new());
        let directory = Arc::new(InMemoryEmployeeDirectory::new());
        let attendance = Arc::new(InMemoryAttendanceStore::new());
        let hierarchy = Arc::new(InMemoryHierarchy::new());

        let ledger = AttendanceLedger::new(tags.clone(), directory.clone(), attendance.clone());

        Self {
            tags,
            directory,
            attendance,
            hierarchy,
            ledger,
            tap_watermarks: RwLock::new(HashMap::new()),
        }
    }

    pub fn hierarchy_graph(&self) -> &dyn HierarchyGraph {
        &*self.hierarchy
    }

    pub fn last_seen_counter(&self, tag_id: TagId) -> Option<u32> {
        self.tap_watermarks.read().ok()?.get(&tag_id).copied()
    }

    /// Record an accepted counter; watermarks only move forward.
    pub fn advance_counter(&self, tag_id: TagId, counter: u32) {
        if let Ok(mut marks) = self.tap_watermarks.write() {
            let entry = marks.entry(tag_id).or_insert(counter);
            if *entry < counter {
                *entry = counter;
            }
        }
    }
}

impl Default for AppServices {
    fn default() -> Self {
        Self::new()
    }
}
