use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use ripple_types::api::{CommentResponse, CreateCommentRequest};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;
use crate::posts::comment_response;

pub async fn create(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreateCommentRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.body.trim().is_empty() {
        return Err(ApiError::Validation("Comment body must not be empty".into()));
    }

    let db = state.clone();
    let body = req.body.clone();
    let user_id = user.id;
    let id = tokio::task::spawn_blocking(move || {
        // The post must exist at creation time; a missing target is a
        // not-found error, not a constraint failure.
        if db.db.get_post(post_id)?.is_none() {
            return Ok(None);
        }
        db.db.insert_comment(&body, post_id, user_id).map(Some)
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("task join error"))
    })??
    .ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    Ok((
        StatusCode::CREATED,
        Json(CommentResponse {
            id,
            body: req.body,
            post_id,
            user_id: user.id,
        }),
    ))
}

/// Comments for a post. An unknown post yields an empty list, not a 404.
pub async fn list(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_comments(post_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("task join error"))
        })??;

    let comments: Vec<CommentResponse> = rows.into_iter().map(comment_response).collect();
    Ok(Json(comments))
}
