use serde::{Deserialize, Serialize};

// -- Auth --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: i64,
    pub email: String,
    pub confirmed: bool,
}

/// Login is form-encoded, so unknown fields are not rejected here.
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
}

// -- Posts --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreatePostRequest {
    pub body: String,
}

/// Sort order for the post list, spelled the way it arrives in the query
/// string: "+id", "-id", "-likes".
#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub enum PostSorting {
    #[default]
    #[serde(rename = "+id")]
    IdAsc,
    #[serde(rename = "-id")]
    IdDesc,
    #[serde(rename = "-likes")]
    MostLikes,
}

#[derive(Debug, Serialize)]
pub struct PostResponse {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub likes: i64,
}

#[derive(Debug, Serialize)]
pub struct PostWithComments {
    pub post: PostResponse,
    pub comments: Vec<CommentResponse>,
}

// -- Comments --

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CreateCommentRequest {
    pub body: String,
}

#[derive(Debug, Serialize)]
pub struct CommentResponse {
    pub id: i64,
    pub body: String,
    pub post_id: i64,
    pub user_id: i64,
}

// -- Likes --

#[derive(Debug, Serialize)]
pub struct LikeResponse {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
}
