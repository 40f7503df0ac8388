//! Presence recording and status queries.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::{Extension, Query},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde_json::Value as JsonValue;

use workpass_auth::{
    ActorIdentity, CompanyScopePolicy, RequestValues, TargetSource, UserScopePolicy,
};
use workpass_core::{CompanyId, EmployeeId};
use workpass_tags::{TagUid, COUNTER_MAX};

use crate::app::services::AppServices;
use crate::app::{dto, errors};
use crate::policy::{self, RoutePolicy};

fn record_policy() -> RoutePolicy {
    RoutePolicy::company_scoped(CompanyScopePolicy::new(TargetSource::Body, "companyId"))
        .and_user(UserScopePolicy::new(TargetSource::Body, "userId"))
}

fn status_policy() -> RoutePolicy {
    RoutePolicy::user_scoped(UserScopePolicy::new(TargetSource::Query, "userId"))
}

/// POST /checkincheckout
pub async fn record_tap(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorIdentity>,
    Json(raw): Json<JsonValue>,
) -> axum::response::Response {
    let request_values = RequestValues::with_body(raw.clone());
    if let Err(denied) = policy::enforce(
        &record_policy(),
        Some(&actor),
        &request_values,
        Some(services.hierarchy_graph()),
    ) {
        return denied;
    }

    let body: dto::RecordTapRequest = match serde_json::from_value(raw) {
        Ok(body) => body,
        Err(e) => return errors::json_error(StatusCode::BAD_REQUEST, "invalid_body", e.to_string()),
    };

    let tag_uid = match TagUid::parse(&body.tag_uid) {
        Ok(uid) => uid,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_tag_uid", e.to_string())
        }
    };

    if body.counter > COUNTER_MAX {
        return errors::json_error(
            StatusCode::BAD_REQUEST,
            "invalid_counter",
            format!("counter {} exceeds the 24-bit tap counter range", body.counter),
        );
    }

    let request = workpass_attendance::TapRequest {
        user_id: EmployeeId::new(body.user_id),
        company_id: CompanyId::new(body.company_id),
        tag_uid,
        counter: body.counter,
        signature: body.signature,
        kind: body.kind,
    };

    match services.ledger.record_tap(&actor, &request) {
        Ok(recorded) => (StatusCode::OK, Json(dto::TapResponse::from(recorded))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}

/// GET /checkincheckout?userId=<id>
pub async fn current_status(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorIdentity>,
    Query(query): Query<HashMap<String, String>>,
) -> axum::response::Response {
    let request_values = RequestValues::with_query(query.clone());
    if let Err(denied) = policy::enforce(
        &status_policy(),
        Some(&actor),
        &request_values,
        Some(services.hierarchy_graph()),
    ) {
        return denied;
    }

    // The policy gate resolved this already; a parse failure here means the
    // gate and handler disagree on the path, which is a bug worth a 400.
    let user_id: EmployeeId = match query.get("userId").map(|raw| raw.parse()) {
        Some(Ok(id)) => id,
        _ => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_user_id", "userId missing")
        }
    };

    // Status queries are scoped to the actor's own company.
    match services
        .ledger
        .current_status(&actor, user_id, actor.company_id)
    {
        Ok(view) => (StatusCode::OK, Json(dto::StatusResponse::from(view))).into_response(),
        Err(e) => errors::ledger_error_to_response(e),
    }
}
