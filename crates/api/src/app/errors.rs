use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use workpass_attendance::LedgerError;
use workpass_tags::StructuralError;

pub fn ledger_error_to_response(err: LedgerError) -> axum::response::Response {
    match err {
        LedgerError::Forbidden(reason) => {
            json_error(StatusCode::FORBIDDEN, "forbidden", reason.to_string())
        }
        LedgerError::NotRegistered => {
            json_error(StatusCode::NOT_FOUND, "not_registered", "user has no registered company")
        }
        LedgerError::TagNotFound => json_error(StatusCode::NOT_FOUND, "tag_not_found", "tag not found"),
        LedgerError::Store(e) => {
            json_error(StatusCode::INTERNAL_SERVER_ERROR, "store_error", e.to_string())
        }
    }
}

pub fn structural_error_to_response(err: StructuralError) -> axum::response::Response {
    json_error(StatusCode::BAD_REQUEST, "invalid_tap", err.to_string())
}

pub fn json_error(
    status: StatusCode,
    code: &'static str,
    message: impl Into<String>,
) -> axum::response::Response {
    (
        status,
        axum::Json(json!({
            "error": code,
            "message": message.into(),
        })),
    )
        .into_response()
}
