//! Route policy gate.
//!
//! Each route declares its scope policies as plain data; `enforce` evaluates
//! them against the request before the handler runs and maps any denial to
//! the HTTP response. One evaluation path for every route, no per-handler
//! authorization code beyond the policy declaration itself.

use axum::http::StatusCode;
use axum::response::Response;

use workpass_auth::{
    evaluate_company_scope, evaluate_user_scope, ActorIdentity, CompanyScopePolicy, DenyReason,
    HierarchyGraph, RequestValues, UserScopePolicy,
};

use crate::app::errors;

/// Scope requirements of one route. `None` entries are skipped.
#[derive(Debug, Clone, Default)]
pub struct RoutePolicy {
    pub company: Option<CompanyScopePolicy>,
    pub user: Option<UserScopePolicy>,
}

impl RoutePolicy {
    pub fn company_scoped(policy: CompanyScopePolicy) -> Self {
        Self {
            company: Some(policy),
            ..Self::default()
        }
    }

    pub fn user_scoped(policy: UserScopePolicy) -> Self {
        Self {
            user: Some(policy),
            ..Self::default()
        }
    }

    pub fn and_user(mut self, policy: UserScopePolicy) -> Self {
        self.user = Some(policy);
        self
    }
}

/// Evaluate the route's policies; `Err` carries the ready-to-return response.
pub fn enforce(
    policy: &RoutePolicy,
    actor: Option<&ActorIdentity>,
    request: &RequestValues,
    graph: Option<&dyn HierarchyGraph>,
) -> Result<(), Response> {
    evaluate_company_scope(policy.company.as_ref(), actor, request)
        .into_result()
        .map_err(deny_to_response)?;

    evaluate_user_scope(policy.user.as_ref(), actor, request, graph)
        .into_result()
        .map_err(deny_to_response)?;

    Ok(())
}

fn deny_to_response(reason: DenyReason) -> Response {
    let (status, code) = match reason {
        DenyReason::Unauthenticated => (StatusCode::UNAUTHORIZED, "unauthenticated"),
        DenyReason::TargetUnresolved => (StatusCode::BAD_REQUEST, "target_unresolved"),
        DenyReason::UnresolvableCompany => (StatusCode::BAD_REQUEST, "unresolvable_company"),
        DenyReason::InsufficientRole => (StatusCode::FORBIDDEN, "insufficient_role"),
        DenyReason::CrossCompany => (StatusCode::FORBIDDEN, "cross_company"),
        DenyReason::NotInHierarchy => (StatusCode::FORBIDDEN, "not_in_hierarchy"),
        DenyReason::TargetNotFound => (StatusCode::NOT_FOUND, "target_not_found"),
        // A policy asked for hierarchy checks nobody wired: configuration
        // fault, not a client error.
        DenyReason::MisconfiguredPolicy => {
            (StatusCode::INTERNAL_SERVER_ERROR, "misconfigured_policy")
        }
    };

    errors::json_error(status, code, reason.to_string())
}
