use axum::{
    routing::{get, post},
    Router,
};

pub mod checkincheckout;
pub mod system;
pub mod tags;

/// Router for all authenticated endpoints.
pub fn router() -> Router {
    Router::new()
        .route("/whoami", get(system::whoami))
        .route(
            "/checkincheckout",
            post(checkincheckout::record_tap).get(checkincheckout::current_status),
        )
        .route("/tags/verify", post(tags::verify_tap_code))
}
