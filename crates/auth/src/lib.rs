//! `workpass-auth` — actor identity and authorization boundary (zero-trust).
//!
//! This crate is intentionally decoupled from HTTP and storage: the scope
//! guards are pure decision functions over an already-authenticated actor,
//! request-supplied values and a hierarchy lookup collaborator.

pub mod actor;
pub mod claims;
pub mod hierarchy;
pub mod scope;

pub use actor::{ActorIdentity, Role};
pub use claims::{validate_claims, AccessClaims, ClaimsError};
pub use hierarchy::{is_above, HierarchyGraph, HierarchyNode};
pub use scope::{
    evaluate_company_scope, evaluate_user_scope, CompanyScopePolicy, DenyReason, RequestValues,
    ScopeDecision, TargetSource, UserScopePolicy,
};
