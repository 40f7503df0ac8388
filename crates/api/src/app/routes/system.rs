use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use workpass_auth::ActorIdentity;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

pub async fn whoami(Extension(actor): Extension<ActorIdentity>) -> impl IntoResponse {
    Json(serde_json::json!({
        "user_id": actor.id,
        "role": actor.role.to_string(),
        "company_id": actor.company_id,
    }))
}
