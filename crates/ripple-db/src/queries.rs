use crate::Database;
use crate::models::{CommentRow, LikeRow, PostRow, UserRow};
use anyhow::Result;
use ripple_types::api::PostSorting;
use rusqlite::Connection;

impl Database {
    // -- Users --

    pub fn create_user(&self, email: &str, password_hash: &str) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO users (email, password) VALUES (?1, ?2)",
                (email, password_hash),
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_user_by_email(&self, email: &str) -> Result<Option<UserRow>> {
        self.with_conn(|conn| query_user_by_email(conn, email))
    }

    /// Idempotent: confirming an already-confirmed user is a no-op.
    pub fn mark_confirmed(&self, email: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE users SET confirmed = 1 WHERE email = ?1", [email])?;
            Ok(())
        })
    }

    // -- Posts --

    pub fn insert_post(&self, body: &str, user_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO posts (body, user_id) VALUES (?1, ?2)",
                rusqlite::params![body, user_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn get_post(&self, id: i64) -> Result<Option<PostRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT p.id, p.body, p.user_id, COUNT(l.id) AS likes
                 FROM posts p
                 LEFT JOIN likes l ON l.post_id = p.id
                 WHERE p.id = ?1
                 GROUP BY p.id",
            )?;
            let row = stmt.query_row([id], map_post_row).optional()?;
            Ok(row)
        })
    }

    pub fn list_posts(&self, sorting: PostSorting) -> Result<Vec<PostRow>> {
        // ORDER BY comes from a fixed match, never from user input
        let order_by = match sorting {
            PostSorting::IdAsc => "p.id ASC",
            PostSorting::IdDesc => "p.id DESC",
            PostSorting::MostLikes => "likes DESC, p.id ASC",
        };

        self.with_conn(|conn| {
            let sql = format!(
                "SELECT p.id, p.body, p.user_id, COUNT(l.id) AS likes
                 FROM posts p
                 LEFT JOIN likes l ON l.post_id = p.id
                 GROUP BY p.id
                 ORDER BY {order_by}"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([], map_post_row)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Comments --

    pub fn insert_comment(&self, body: &str, post_id: i64, user_id: i64) -> Result<i64> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (body, post_id, user_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![body, post_id, user_id],
            )?;
            Ok(conn.last_insert_rowid())
        })
    }

    pub fn list_comments(&self, post_id: i64) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT id, body, post_id, user_id FROM comments WHERE post_id = ?1 ORDER BY id",
            )?;
            let rows = stmt
                .query_map([post_id], |row| {
                    Ok(CommentRow {
                        id: row.get(0)?,
                        body: row.get(1)?,
                        post_id: row.get(2)?,
                        user_id: row.get(3)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    // -- Likes --

    /// Insert a like, classifying a duplicate as `None` rather than an
    /// error. The UNIQUE(post_id, user_id) index makes this safe against
    /// two concurrent likes by the same user: the loser sees `None`.
    pub fn insert_like(&self, post_id: i64, user_id: i64) -> Result<Option<LikeRow>> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT INTO likes (post_id, user_id) VALUES (?1, ?2)",
                rusqlite::params![post_id, user_id],
            );
            match inserted {
                Ok(_) => Ok(Some(LikeRow {
                    id: conn.last_insert_rowid(),
                    post_id,
                    user_id,
                })),
                Err(e) if is_unique_violation(&e) => Ok(None),
                Err(e) => Err(e.into()),
            }
        })
    }
}

fn is_unique_violation(err: &rusqlite::Error) -> bool {
    matches!(
        err,
        rusqlite::Error::SqliteFailure(e, _)
            if e.extended_code == rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE
    )
}

fn map_post_row(row: &rusqlite::Row<'_>) -> std::result::Result<PostRow, rusqlite::Error> {
    Ok(PostRow {
        id: row.get(0)?,
        body: row.get(1)?,
        user_id: row.get(2)?,
        likes: row.get(3)?,
    })
}

fn query_user_by_email(conn: &Connection, email: &str) -> Result<Option<UserRow>> {
    let mut stmt = conn
        .prepare("SELECT id, email, password, confirmed, created_at FROM users WHERE email = ?1")?;

    let row = stmt
        .query_row([email], |row| {
            Ok(UserRow {
                id: row.get(0)?,
                email: row.get(1)?,
                password: row.get(2)?,
                confirmed: row.get(3)?,
                created_at: row.get(4)?,
            })
        })
        .optional()?;

    Ok(row)
}

/// Extension trait for optional query results
trait OptionalExt<T> {
    fn optional(self) -> Result<Option<T>>;
}

impl<T> OptionalExt<T> for std::result::Result<T, rusqlite::Error> {
    fn optional(self) -> Result<Option<T>> {
        match self {
            Ok(val) => Ok(Some(val)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::PostSorting;
    use crate::Database;

    fn db() -> Database {
        Database::open_in_memory().unwrap()
    }

    #[test]
    fn create_and_fetch_user() {
        let db = db();
        let id = db.create_user("a@x.com", "hash").unwrap();
        assert_eq!(id, 1);

        let user = db.get_user_by_email("a@x.com").unwrap().unwrap();
        assert_eq!(user.id, 1);
        assert_eq!(user.email, "a@x.com");
        assert!(!user.confirmed);

        assert!(db.get_user_by_email("b@x.com").unwrap().is_none());
    }

    #[test]
    fn duplicate_email_rejected() {
        let db = db();
        db.create_user("a@x.com", "hash").unwrap();
        assert!(db.create_user("a@x.com", "other").is_err());
    }

    #[test]
    fn mark_confirmed_is_idempotent() {
        let db = db();
        db.create_user("a@x.com", "hash").unwrap();

        db.mark_confirmed("a@x.com").unwrap();
        assert!(db.get_user_by_email("a@x.com").unwrap().unwrap().confirmed);

        db.mark_confirmed("a@x.com").unwrap();
        assert!(db.get_user_by_email("a@x.com").unwrap().unwrap().confirmed);
    }

    #[test]
    fn posts_and_comments() {
        let db = db();
        let uid = db.create_user("a@x.com", "hash").unwrap();

        let pid = db.insert_post("hello", uid).unwrap();
        assert_eq!(pid, 1);
        assert_eq!(db.list_posts(PostSorting::IdAsc).unwrap().len(), 1);

        let post = db.get_post(pid).unwrap().unwrap();
        assert_eq!(post.body, "hello");
        assert_eq!(post.likes, 0);
        assert!(db.get_post(99).unwrap().is_none());

        let cid = db.insert_comment("nice", pid, uid).unwrap();
        let comments = db.list_comments(pid).unwrap();
        assert_eq!(comments.len(), 1);
        assert_eq!(comments[0].id, cid);
        assert_eq!(comments[0].post_id, pid);

        assert!(db.list_comments(99).unwrap().is_empty());
    }

    #[test]
    fn list_posts_sorting() {
        let db = db();
        let u1 = db.create_user("a@x.com", "hash").unwrap();
        let u2 = db.create_user("b@x.com", "hash").unwrap();
        let p1 = db.insert_post("first", u1).unwrap();
        let p2 = db.insert_post("second", u1).unwrap();
        db.insert_like(p2, u1).unwrap();
        db.insert_like(p2, u2).unwrap();

        let ids = |sorting: PostSorting| {
            db.list_posts(sorting)
                .unwrap()
                .iter()
                .map(|p| p.id)
                .collect::<Vec<_>>()
        };
        assert_eq!(ids(PostSorting::IdAsc), vec![p1, p2]);
        assert_eq!(ids(PostSorting::IdDesc), vec![p2, p1]);
        assert_eq!(ids(PostSorting::MostLikes), vec![p2, p1]);

        let posts = db.list_posts(PostSorting::MostLikes).unwrap();
        assert_eq!(posts[0].likes, 2);
        assert_eq!(posts[1].likes, 0);
    }

    #[test]
    fn duplicate_like_is_a_conflict_not_an_error() {
        let db = db();
        let uid = db.create_user("a@x.com", "hash").unwrap();
        let pid = db.insert_post("hello", uid).unwrap();

        let like = db.insert_like(pid, uid).unwrap().unwrap();
        assert_eq!(like.post_id, pid);

        // The UNIQUE(post_id, user_id) violation is classified, not
        // propagated, so a lost race never surfaces as an internal error
        assert!(db.insert_like(pid, uid).unwrap().is_none());

        assert_eq!(db.get_post(pid).unwrap().unwrap().likes, 1);
    }
}
