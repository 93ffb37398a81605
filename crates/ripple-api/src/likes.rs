use axum::{
    Extension, Json,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
};
use tracing::error;

use ripple_db::models::LikeRow;
use ripple_types::api::LikeResponse;

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

enum LikeOutcome {
    Created(LikeRow),
    PostMissing,
    AlreadyLiked,
}

/// One like per (post, user); a second like is a conflict, not a toggle.
pub async fn create(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let user_id = user.id;
    let outcome = tokio::task::spawn_blocking(move || {
        if db.db.get_post(post_id)?.is_none() {
            return Ok::<_, anyhow::Error>(LikeOutcome::PostMissing);
        }
        // insert_like classifies the UNIQUE(post_id, user_id) violation
        // itself, so losing a race with a concurrent duplicate still
        // comes back as a conflict
        match db.db.insert_like(post_id, user_id)? {
            Some(like) => Ok(LikeOutcome::Created(like)),
            None => Ok(LikeOutcome::AlreadyLiked),
        }
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("task join error"))
    })??;

    match outcome {
        LikeOutcome::PostMissing => Err(ApiError::NotFound("Post not found".into())),
        LikeOutcome::AlreadyLiked => Err(ApiError::Conflict("Post already liked".into())),
        LikeOutcome::Created(like) => Ok((
            StatusCode::CREATED,
            Json(LikeResponse {
                id: like.id,
                post_id: like.post_id,
                user_id: like.user_id,
            }),
        )),
    }
}
