use axum::{
    Extension, Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::error;

use ripple_db::models::{CommentRow, PostRow};
use ripple_types::api::{
    CommentResponse, CreatePostRequest, PostResponse, PostSorting, PostWithComments,
};

use crate::AppState;
use crate::error::ApiError;
use crate::middleware::CurrentUser;

#[derive(Debug, Deserialize)]
pub struct PostsQuery {
    #[serde(default)]
    pub sorting: PostSorting,
}

pub(crate) fn post_response(row: PostRow) -> PostResponse {
    PostResponse {
        id: row.id,
        body: row.body,
        user_id: row.user_id,
        likes: row.likes,
    }
}

pub(crate) fn comment_response(row: CommentRow) -> CommentResponse {
    CommentResponse {
        id: row.id,
        body: row.body,
        post_id: row.post_id,
        user_id: row.user_id,
    }
}

pub async fn create(
    State(state): State<AppState>,
    Extension(CurrentUser(user)): Extension<CurrentUser>,
    Json(req): Json<CreatePostRequest>,
) -> Result<impl IntoResponse, ApiError> {
    if req.body.trim().is_empty() {
        return Err(ApiError::Validation("Post body must not be empty".into()));
    }

    // Run blocking DB insert off the async runtime
    let db = state.clone();
    let body = req.body.clone();
    let user_id = user.id;
    let id = tokio::task::spawn_blocking(move || db.db.insert_post(&body, user_id))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("task join error"))
        })??;

    Ok((
        StatusCode::CREATED,
        Json(PostResponse {
            id,
            body: req.body,
            user_id: user.id,
            likes: 0,
        }),
    ))
}

pub async fn list(
    State(state): State<AppState>,
    Query(query): Query<PostsQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let rows = tokio::task::spawn_blocking(move || db.db.list_posts(query.sorting))
        .await
        .map_err(|e| {
            error!("spawn_blocking join error: {}", e);
            ApiError::Internal(anyhow::anyhow!("task join error"))
        })??;

    let posts: Vec<PostResponse> = rows.into_iter().map(post_response).collect();
    Ok(Json(posts))
}

pub async fn read(
    State(state): State<AppState>,
    Path(post_id): Path<i64>,
) -> Result<impl IntoResponse, ApiError> {
    let db = state.clone();
    let (post, comments) = tokio::task::spawn_blocking(move || {
        let post = db.db.get_post(post_id)?;
        let comments = db.db.list_comments(post_id)?;
        Ok::<_, anyhow::Error>((post, comments))
    })
    .await
    .map_err(|e| {
        error!("spawn_blocking join error: {}", e);
        ApiError::Internal(anyhow::anyhow!("task join error"))
    })??;

    let post = post.ok_or_else(|| ApiError::NotFound("Post not found".into()))?;

    Ok(Json(PostWithComments {
        post: post_response(post),
        comments: comments.into_iter().map(comment_response).collect(),
    }))
}
