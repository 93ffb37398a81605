//! Database row types that map directly to SQLite rows, kept distinct from
//! the ripple-types API models so the DB layer stays independent.

#[derive(Debug, Clone)]
pub struct UserRow {
    pub id: i64,
    pub email: String,
    pub password: String,
    pub confirmed: bool,
    pub created_at: String,
}

#[derive(Debug, Clone)]
pub struct PostRow {
    pub id: i64,
    pub body: String,
    pub user_id: i64,
    pub likes: i64,
}

#[derive(Debug, Clone)]
pub struct CommentRow {
    pub id: i64,
    pub body: String,
    pub post_id: i64,
    pub user_id: i64,
}

#[derive(Debug, Clone)]
pub struct LikeRow {
    pub id: i64,
    pub post_id: i64,
    pub user_id: i64,
}
