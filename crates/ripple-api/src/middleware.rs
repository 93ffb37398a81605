use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use ripple_db::models::UserRow;

use crate::AppState;
use crate::error::ApiError;
use crate::security::TokenKind;

/// The user resolved from a bearer token, injected into request extensions
/// for protected handlers.
#[derive(Debug, Clone)]
pub struct CurrentUser(pub UserRow);

/// Extract and validate the access token from the Authorization header,
/// then resolve its subject to a user row.
pub async fn require_auth(
    State(state): State<AppState>,
    mut req: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = req
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

    let token = auth_header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Not authenticated".into()))?;

    let email = state.tokens.verify(token, TokenKind::Access)?;

    let user = state
        .db
        .get_user_by_email(&email)?
        .ok_or_else(|| ApiError::Unauthorized("Could not find user for this token".into()))?;

    req.extensions_mut().insert(CurrentUser(user));
    Ok(next.run(req).await)
}
