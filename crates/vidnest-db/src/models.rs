/// Database row types — these map directly to SQLite rows.
/// Distinct from vidnest-types API models to keep the DB layer independent.

pub struct UserRow {
    pub id: String,
    pub username: String,
    pub password: String,
    pub role: String,
    pub created_at: String,
}

pub struct VideoRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub video_url: Option<String>,
    pub thumbnail_url: String,
    pub duration: f64,
    pub views: i64,
    pub is_published: bool,
    pub owner_id: String,
    pub owner_username: String,
    pub created_at: String,
}

pub struct CommentRow {
    pub id: String,
    pub video_id: String,
    pub author_id: String,
    pub author_username: String,
    pub content: String,
    pub parent_id: Option<String>,
    pub created_at: String,
}

/// One (comment, liker) pair from the batch liker fetch.
pub struct CommentLikerRow {
    pub comment_id: String,
    pub user_id: String,
}

pub struct TweetRow {
    pub id: String,
    pub author_id: String,
    pub body: String,
    pub like_count: i64,
    pub is_public: bool,
    pub created_at: String,
}

pub struct PlaylistRow {
    pub id: String,
    pub name: String,
    pub description: String,
    pub owner_id: String,
    pub owner_username: String,
    pub is_public: bool,
    pub created_at: String,
}

/// A subscription row joined with the user document on the requested side
/// (the subscriber for subscriber listings, the channel for channel listings).
pub struct SubscriptionUserRow {
    pub user_id: String,
    pub username: String,
    pub subscribed_at: String,
}
