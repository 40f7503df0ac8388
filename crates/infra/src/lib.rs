//! `workpass-infra` — store implementations behind the domain's collaborator
//! traits.
//!
//! Only in-memory backends live here today; they serve tests, dev and the
//! black-box API suite. Database-backed stores would slot in behind the same
//! traits.

pub mod memory;

pub use memory::{
    InMemoryAttendanceStore, InMemoryEmployeeDirectory, InMemoryHierarchy, InMemoryTagStore,
};
