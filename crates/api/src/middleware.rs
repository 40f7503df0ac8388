//! Bearer-token authentication middleware.
//!
//! Token issuance happens in the identity service; this layer only decodes
//! and validates what it is handed, then injects the resulting
//! `ActorIdentity` for handlers and policy gates.

use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    middleware::Next,
    response::Response,
};
use chrono::Utc;
use jsonwebtoken::{Algorithm, DecodingKey, Validation};

use workpass_auth::{validate_claims, AccessClaims};

#[derive(Clone)]
pub struct AuthState {
    decoding_key: DecodingKey,
}

impl AuthState {
    pub fn new(jwt_secret: &str) -> Self {
        Self {
            decoding_key: DecodingKey::from_secret(jwt_secret.as_bytes()),
        }
    }
}

pub async fn auth_middleware(
    State(state): State<AuthState>,
    mut req: axum::http::Request<axum::body::Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = extract_bearer(req.headers())?;

    // Claims carry their own time window; jsonwebtoken's registered-claim
    // checks are disabled in favor of validate_claims below.
    let mut validation = Validation::new(Algorithm::HS256);
    validation.validate_exp = false;
    validation.required_spec_claims.clear();

    let decoded = jsonwebtoken::decode::<AccessClaims>(token, &state.decoding_key, &validation)
        .map_err(|_e| StatusCode::UNAUTHORIZED)?;

    validate_claims(&decoded.claims, Utc::now()).map_err(|_e| StatusCode::UNAUTHORIZED)?;

    req.extensions_mut().insert(decoded.claims.actor());

    Ok(next.run(req).await)
}

fn extract_bearer(headers: &HeaderMap) -> Result<&str, StatusCode> {
    let header = headers
        .get(axum::http::header::AUTHORIZATION)
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let header = header.to_str().map_err(|_| StatusCode::UNAUTHORIZED)?;

    let header = header
        .strip_prefix("Bearer ")
        .ok_or(StatusCode::UNAUTHORIZED)?;

    let token = header.trim();
    if token.is_empty() {
        return Err(StatusCode::UNAUTHORIZED);
    }

    Ok(token)
}
