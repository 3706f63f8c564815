use anyhow::Result;
use rusqlite::Connection;
use tracing::info;

/// Schema notes: video references (comments.video_id, likes.target_id,
/// playlist_videos.video_id) carry no foreign key. The like/comment/playlist
/// paths validate ID format but not referential existence, and a hard video
/// delete leaves dependents behind. comment_likers cascades with its comment
/// and playlist_videos with its playlist, matching the embedded collections
/// they replace.
pub fn run(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS users (
            id          TEXT PRIMARY KEY,
            username    TEXT NOT NULL UNIQUE,
            password    TEXT NOT NULL,
            role        TEXT NOT NULL DEFAULT 'user',
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE TABLE IF NOT EXISTS videos (
            id              TEXT PRIMARY KEY,
            title           TEXT NOT NULL,
            description     TEXT NOT NULL,
            video_url       TEXT,
            thumbnail_url   TEXT NOT NULL,
            duration        REAL NOT NULL DEFAULT 0,
            views           INTEGER NOT NULL DEFAULT 0,
            is_published    INTEGER NOT NULL DEFAULT 1,
            is_deleted      INTEGER NOT NULL DEFAULT 0,
            owner_id        TEXT NOT NULL REFERENCES users(id),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at      TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_videos_owner
            ON videos(owner_id, created_at);

        CREATE TABLE IF NOT EXISTS comments (
            id          TEXT PRIMARY KEY,
            video_id    TEXT NOT NULL,
            author_id   TEXT NOT NULL REFERENCES users(id),
            content     TEXT NOT NULL,
            parent_id   TEXT,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_comments_video
            ON comments(video_id, created_at);

        CREATE TABLE IF NOT EXISTS comment_likers (
            comment_id  TEXT NOT NULL REFERENCES comments(id) ON DELETE CASCADE,
            user_id     TEXT NOT NULL REFERENCES users(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(comment_id, user_id)
        );

        CREATE TABLE IF NOT EXISTS likes (
            id          TEXT PRIMARY KEY,
            user_id     TEXT NOT NULL REFERENCES users(id),
            target_kind TEXT NOT NULL CHECK (target_kind IN ('video', 'comment', 'tweet')),
            target_id   TEXT NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(user_id, target_kind, target_id)
        );

        CREATE INDEX IF NOT EXISTS idx_likes_target
            ON likes(target_kind, target_id);

        CREATE TABLE IF NOT EXISTS subscriptions (
            id              TEXT PRIMARY KEY,
            subscriber_id   TEXT NOT NULL REFERENCES users(id),
            channel_id      TEXT NOT NULL REFERENCES users(id),
            created_at      TEXT NOT NULL DEFAULT (datetime('now')),
            UNIQUE(subscriber_id, channel_id)
        );

        CREATE INDEX IF NOT EXISTS idx_subscriptions_channel
            ON subscriptions(channel_id);

        CREATE TABLE IF NOT EXISTS tweets (
            id          TEXT PRIMARY KEY,
            author_id   TEXT NOT NULL REFERENCES users(id),
            body        TEXT NOT NULL,
            like_count  INTEGER NOT NULL DEFAULT 0,
            is_public   INTEGER NOT NULL DEFAULT 1,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_tweets_author
            ON tweets(author_id, created_at);

        CREATE TABLE IF NOT EXISTS playlists (
            id          TEXT PRIMARY KEY,
            name        TEXT NOT NULL,
            description TEXT NOT NULL,
            owner_id    TEXT NOT NULL REFERENCES users(id),
            is_public   INTEGER NOT NULL DEFAULT 0,
            created_at  TEXT NOT NULL DEFAULT (datetime('now')),
            updated_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        CREATE INDEX IF NOT EXISTS idx_playlists_owner
            ON playlists(owner_id);

        CREATE TABLE IF NOT EXISTS playlist_videos (
            playlist_id TEXT NOT NULL REFERENCES playlists(id) ON DELETE CASCADE,
            video_id    TEXT NOT NULL,
            position    INTEGER NOT NULL,
            PRIMARY KEY (playlist_id, video_id)
        );
        ",
    )?;

    info!("Database migrations complete");
    Ok(())
}
