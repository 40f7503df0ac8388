//! Standalone tap-code verification.
//!
//! The presence route stores taps without gating on the MAC; this endpoint is
//! the independently callable verification primitive, with a per-tag counter
//! watermark as the replay gate.

use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use workpass_attendance::TagStore;
use workpass_auth::ActorIdentity;
use workpass_tags::{verify_tap, TagUid, TapRejection};

use crate::app::services::AppServices;
use crate::app::{dto, errors};

/// POST /tags/verify
pub async fn verify_tap_code(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(actor): Extension<ActorIdentity>,
    Json(body): Json<dto::VerifyTapRequest>,
) -> axum::response::Response {
    let uid = match TagUid::parse(&body.uid) {
        Ok(uid) => uid,
        Err(e) => {
            return errors::json_error(StatusCode::BAD_REQUEST, "invalid_tag_uid", e.to_string())
        }
    };

    let Some(credential) = services.tags.find_by_uid(&uid) else {
        return errors::json_error(StatusCode::NOT_FOUND, "tag_not_found", "tag not found");
    };

    // Same company-scoping rule as everything else: foreign tags are opaque.
    if credential.company_id != actor.company_id {
        return errors::json_error(
            StatusCode::FORBIDDEN,
            "cross_company",
            "tag is bound to a different company",
        );
    }

    let last_seen = services.last_seen_counter(credential.id);
    match verify_tap(&credential, &body.uid, body.counter, &body.mac, last_seen) {
        Ok(()) => {
            services.advance_counter(credential.id, body.counter);
            (StatusCode::OK, Json(serde_json::json!({ "valid": true }))).into_response()
        }
        Err(TapRejection::Structural(e)) => errors::structural_error_to_response(e),
        Err(rejection) => {
            let reason = match rejection {
                TapRejection::Replay { .. } => "replay",
                TapRejection::UidMismatch => "uid_mismatch",
                _ => "bad_mac",
            };
            (
                StatusCode::OK,
                Json(serde_json::json!({ "valid": false, "reason": reason })),
            )
                .into_response()
        }
    }
}
