//! Scope guards: per-route policy structs + pure decision functions.
//!
//! Routes declare *where* the target id lives (request source + dotted path)
//! and the guard options; one evaluation function runs before the handler.
//! No route metadata reflection, no middleware magic: the policy is plain
//! data and the decision is a pure function of actor + request + hierarchy.

use std::borrow::Cow;
use std::collections::HashMap;

use serde_json::Value as JsonValue;
use thiserror::Error;

use workpass_core::{CompanyId, EmployeeId};

use crate::actor::{ActorIdentity, Role};
use crate::hierarchy::{is_above, HierarchyGraph};

/// Request location a policy resolves its target value from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TargetSource {
    Body,
    Params,
    Query,
}

/// Values extracted from an inbound request, normalized for policy
/// evaluation. Transport code fills this in; evaluation never touches the
/// framework request type.
#[derive(Debug, Clone, Default)]
pub struct RequestValues {
    pub body: Option<JsonValue>,
    pub params: HashMap<String, String>,
    pub query: HashMap<String, String>,
}

impl RequestValues {
    pub fn with_body(body: JsonValue) -> Self {
        Self {
            body: Some(body),
            ..Self::default()
        }
    }

    pub fn with_query(query: HashMap<String, String>) -> Self {
        Self {
            query,
            ..Self::default()
        }
    }

    /// Resolve an integer value at `path` within `source`.
    ///
    /// For the body, `path` is a dotted property path into the JSON document;
    /// numbers and numeric strings both resolve. Params/query are flat string
    /// maps keyed by the full path.
    fn resolve_i64(&self, source: TargetSource, path: &str) -> Option<i64> {
        match source {
            TargetSource::Body => {
                let mut node = self.body.as_ref()?;
                for segment in path.split('.') {
                    node = node.as_object()?.get(segment)?;
                }
                json_to_i64(node)
            }
            TargetSource::Params => self.params.get(path).and_then(|v| v.parse().ok()),
            TargetSource::Query => self.query.get(path).and_then(|v| v.parse().ok()),
        }
    }
}

fn json_to_i64(value: &JsonValue) -> Option<i64> {
    match value {
        JsonValue::Number(n) => n.as_i64(),
        JsonValue::String(s) => s.parse().ok(),
        _ => None,
    }
}

/// Policy for routes acting on a *target user*: who may touch whose records.
#[derive(Debug, Clone)]
pub struct UserScopePolicy {
    pub source: TargetSource,
    pub path: Cow<'static, str>,
    /// Acting on your own record is allowed regardless of role.
    pub allow_self: bool,
    /// A request without a resolvable target passes the gate (the handler
    /// scopes itself to the actor).
    pub allow_missing: bool,
}

impl UserScopePolicy {
    pub fn new(source: TargetSource, path: impl Into<Cow<'static, str>>) -> Self {
        Self {
            source,
            path: path.into(),
            allow_self: true,
            allow_missing: false,
        }
    }

    pub fn allow_missing(mut self) -> Self {
        self.allow_missing = true;
        self
    }

    pub fn deny_self(mut self) -> Self {
        self.allow_self = false;
        self
    }
}

/// Policy for routes where same-company membership alone is sufficient.
#[derive(Debug, Clone)]
pub struct CompanyScopePolicy {
    pub source: TargetSource,
    pub path: Cow<'static, str>,
}

impl CompanyScopePolicy {
    pub fn new(source: TargetSource, path: impl Into<Cow<'static, str>>) -> Self {
        Self {
            source,
            path: path.into(),
        }
    }
}

/// Why a scope guard denied a request.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    #[error("request carries no authenticated identity")]
    Unauthenticated,

    #[error("target user id could not be resolved from the request")]
    TargetUnresolved,

    #[error("role does not permit acting on another user's records")]
    InsufficientRole,

    #[error("hierarchy check requested but no hierarchy source is wired")]
    MisconfiguredPolicy,

    #[error("target user not found")]
    TargetNotFound,

    #[error("target belongs to a different company")]
    CrossCompany,

    #[error("target is not below the actor in the reports-to chain")]
    NotInHierarchy,

    #[error("company id could not be resolved from the request")]
    UnresolvableCompany,
}

/// Outcome of a scope guard. The sole output type of the authorization
/// components: every denial carries its reason verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScopeDecision {
    Allow,
    Deny(DenyReason),
}

impl ScopeDecision {
    pub fn is_allow(&self) -> bool {
        matches!(self, ScopeDecision::Allow)
    }

    pub fn into_result(self) -> Result<(), DenyReason> {
        match self {
            ScopeDecision::Allow => Ok(()),
            ScopeDecision::Deny(reason) => Err(reason),
        }
    }
}

/// Evaluate a user-scope policy. Ordered, short-circuiting:
///
/// 1. no policy → allow
/// 2. no actor → unauthenticated
/// 3. admin → allow (hierarchy never consulted)
/// 4. unresolvable target → allow iff `allow_missing`
/// 5. self → allow iff `allow_self`
/// 6. non-manager → insufficient role
/// 7. no hierarchy source wired → misconfigured (never a silent allow)
/// 8. unknown target → not found
/// 9. other company → cross-company
/// 10. ancestor walk decides
pub fn evaluate_user_scope(
    policy: Option<&UserScopePolicy>,
    actor: Option<&ActorIdentity>,
    request: &RequestValues,
    graph: Option<&dyn HierarchyGraph>,
) -> ScopeDecision {
    let Some(policy) = policy else {
        return ScopeDecision::Allow;
    };

    let Some(actor) = actor else {
        return ScopeDecision::Deny(DenyReason::Unauthenticated);
    };

    if actor.role == Role::Admin {
        return ScopeDecision::Allow;
    }

    let target = match request.resolve_i64(policy.source, &policy.path) {
        Some(raw) => EmployeeId::new(raw),
        None if policy.allow_missing => return ScopeDecision::Allow,
        None => return ScopeDecision::Deny(DenyReason::TargetUnresolved),
    };

    if policy.allow_self && target == actor.id {
        return ScopeDecision::Allow;
    }

    if actor.role != Role::Manager {
        return ScopeDecision::Deny(DenyReason::InsufficientRole);
    }

    let Some(graph) = graph else {
        return ScopeDecision::Deny(DenyReason::MisconfiguredPolicy);
    };

    let Some(node) = graph.find_node(target) else {
        return ScopeDecision::Deny(DenyReason::TargetNotFound);
    };

    if node.company_id != actor.company_id {
        return ScopeDecision::Deny(DenyReason::CrossCompany);
    }

    if is_above(graph, actor.id, target) {
        ScopeDecision::Allow
    } else {
        ScopeDecision::Deny(DenyReason::NotInHierarchy)
    }
}

/// Evaluate a company-scope policy.
///
/// No role bypass here: cross-company access is denied regardless of role or
/// hierarchy position.
pub fn evaluate_company_scope(
    policy: Option<&CompanyScopePolicy>,
    actor: Option<&ActorIdentity>,
    request: &RequestValues,
) -> ScopeDecision {
    let Some(policy) = policy else {
        return ScopeDecision::Allow;
    };

    let Some(actor) = actor else {
        return ScopeDecision::Deny(DenyReason::Unauthenticated);
    };

    let Some(raw) = request.resolve_i64(policy.source, &policy.path) else {
        return ScopeDecision::Deny(DenyReason::UnresolvableCompany);
    };

    if CompanyId::new(raw) != actor.company_id {
        return ScopeDecision::Deny(DenyReason::CrossCompany);
    }

    ScopeDecision::Allow
}
