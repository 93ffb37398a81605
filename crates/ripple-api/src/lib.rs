pub mod auth;
pub mod comments;
pub mod email;
pub mod error;
pub mod likes;
pub mod middleware;
pub mod posts;
pub mod security;

use std::sync::Arc;

use axum::{
    Router,
    routing::{get, post},
};

use ripple_db::Database;

use crate::email::EmailClient;
use crate::security::TokenService;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub tokens: TokenService,
    pub email: Option<EmailClient>,
    /// Public base URL used to build confirmation links.
    pub base_url: String,
}

/// Build the full application router. Write routes sit behind the auth
/// middleware; reads and the registration flow are public.
pub fn router(state: AppState) -> Router {
    let public = Router::new()
        .route("/register", post(auth::register))
        .route("/login", post(auth::login))
        .route("/confirm/{token}", get(auth::confirm))
        .route("/posts", get(posts::list))
        .route("/posts/{post_id}", get(posts::read))
        .route("/posts/{post_id}/comments", get(comments::list))
        .with_state(state.clone());

    let protected = Router::new()
        .route("/posts", post(posts::create))
        .route("/posts/{post_id}/comments", post(comments::create))
        .route("/posts/{post_id}/like", post(likes::create))
        .layer(axum::middleware::from_fn_with_state(
            state.clone(),
            middleware::require_auth,
        ))
        .with_state(state);

    public.merge(protected)
}
