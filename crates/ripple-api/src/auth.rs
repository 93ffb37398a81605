use axum::{
    Form, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::debug;

use ripple_db::Database;
use ripple_db::models::UserRow;
use ripple_types::api::{LoginRequest, RegisterRequest, TokenResponse, UserResponse};

use crate::AppState;
use crate::error::ApiError;
use crate::security::{self, TokenKind};

/// Login failures. All collapse to 401, distinct internally.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("Inexistent user")]
    UserNotFound,
    #[error("Invalid credentials")]
    InvalidCredentials,
    #[error("User has not confirmed email")]
    NotConfirmed,
    #[error(transparent)]
    Db(#[from] anyhow::Error),
}

impl From<AuthError> for ApiError {
    fn from(err: AuthError) -> Self {
        match err {
            AuthError::Db(e) => ApiError::Internal(e),
            other => ApiError::Unauthorized(other.to_string()),
        }
    }
}

pub fn authenticate(db: &Database, email: &str, password: &str) -> Result<UserRow, AuthError> {
    debug!(email, "authenticating user");

    let user = db.get_user_by_email(email)?.ok_or(AuthError::UserNotFound)?;

    if !security::verify_password(password, &user.password) {
        return Err(AuthError::InvalidCredentials);
    }
    if !user.confirmed {
        return Err(AuthError::NotConfirmed);
    }

    Ok(user)
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if !req.email.contains('@') {
        return Err(ApiError::Validation("A valid email address is required".into()));
    }
    if req.password.is_empty() {
        return Err(ApiError::Validation("A password is required".into()));
    }

    if state.db.get_user_by_email(&req.email)?.is_some() {
        return Err(ApiError::Conflict(
            "A user with that email already exists.".into(),
        ));
    }

    let password_hash = security::hash_password(&req.password)?;
    let user_id = state.db.create_user(&req.email, &password_hash)?;

    let token = state.tokens.issue(&req.email, TokenKind::Confirmation)?;
    let confirmation_url = format!("{}/confirm/{}", state.base_url, token);

    match &state.email {
        Some(client) => {
            client
                .send_registration_email(&req.email, &confirmation_url)
                .await?;
        }
        None => {
            debug!(email = %req.email, %confirmation_url, "email client not configured, skipping sign-up email");
        }
    }

    Ok((
        StatusCode::CREATED,
        Json(UserResponse {
            id: user_id,
            email: req.email,
            confirmed: false,
        }),
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let user = authenticate(&state.db, &form.email, &form.password)?;

    let access_token = state.tokens.issue(&user.email, TokenKind::Access)?;

    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer".into(),
    }))
}

/// Consumes a confirmation-type token. Re-confirming an already-confirmed
/// user is an idempotent success.
pub async fn confirm(
    State(state): State<AppState>,
    Path(token): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let email = state.tokens.verify(&token, TokenKind::Confirmation)?;

    if state.db.get_user_by_email(&email)?.is_none() {
        return Err(ApiError::Unauthorized(
            "Could not find user for this token".into(),
        ));
    }

    state.db.mark_confirmed(&email)?;
    debug!(email, "user confirmed");

    Ok(Json(serde_json::json!({ "detail": "User confirmed." })))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn db_with_user(confirmed: bool) -> Database {
        let db = Database::open_in_memory().unwrap();
        let hash = security::hash_password("password").unwrap();
        db.create_user("a@x.com", &hash).unwrap();
        if confirmed {
            db.mark_confirmed("a@x.com").unwrap();
        }
        db
    }

    #[test]
    fn authenticate_unknown_user() {
        let db = Database::open_in_memory().unwrap();
        assert!(matches!(
            authenticate(&db, "a@x.com", "password"),
            Err(AuthError::UserNotFound)
        ));
    }

    #[test]
    fn authenticate_wrong_password() {
        let db = db_with_user(true);
        assert!(matches!(
            authenticate(&db, "a@x.com", "wrong password"),
            Err(AuthError::InvalidCredentials)
        ));
    }

    #[test]
    fn authenticate_unconfirmed_user() {
        // Correct password, unconfirmed account
        let db = db_with_user(false);
        assert!(matches!(
            authenticate(&db, "a@x.com", "password"),
            Err(AuthError::NotConfirmed)
        ));
    }

    #[test]
    fn authenticate_confirmed_user() {
        let db = db_with_user(true);
        let user = authenticate(&db, "a@x.com", "password").unwrap();
        assert_eq!(user.email, "a@x.com");
        assert!(user.confirmed);
    }
}
