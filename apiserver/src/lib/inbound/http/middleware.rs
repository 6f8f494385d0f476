use std::sync::Arc;

use auth::Authenticator;
use axum::extract::Request;
use axum::extract::State;
use axum::http::{self};
use axum::middleware::Next;
use axum::response::IntoResponse;
use axum::response::Response;

use crate::domain::user::models::UserId;
use crate::inbound::http::handlers::ApiError;

/// Extension type to store authenticated user ID in request extensions
#[derive(Debug, Clone)]
pub struct AuthenticatedUser {
    pub user_id: UserId,
    /// Bearer token the request was admitted with.
    pub token: String,
}

/// Middleware that validates bearer tokens and adds the subject to request extensions.
///
/// Every rejection produces the same 401 body; the cause is only logged.
pub async fn authenticate(
    State(authenticator): State<Arc<Authenticator>>,
    mut req: Request,
    next: Next,
) -> Result<Response, Response> {
    let token = extract_token_from_header(&req).map_err(|reason| {
        tracing::warn!(reason, "Rejected request without usable credentials");
        unauthorized()
    })?;

    let claims = authenticator.parse(token).map_err(|e| {
        tracing::warn!(error = %e, "Token validation failed");
        unauthorized()
    })?;

    let user_id = UserId::from_string(&claims.subject).map_err(|e| {
        tracing::warn!(error = %e, "Token subject is not a user ID");
        unauthorized()
    })?;

    let token = token.to_string();
    req.extensions_mut()
        .insert(AuthenticatedUser { user_id, token });

    Ok(next.run(req).await)
}

fn unauthorized() -> Response {
    ApiError::Unauthorized.into_response()
}

fn extract_token_from_header(req: &Request) -> Result<&str, &'static str> {
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .ok_or("missing Authorization header")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Authorization header is not valid UTF-8")?;

    match auth_str.strip_prefix("Bearer ") {
        Some(token) if !token.is_empty() => Ok(token),
        _ => Err("Authorization header is not a bearer token"),
    }
}
