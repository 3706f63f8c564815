use anyhow::Result;

use crate::Database;

/// Channel statistics are four independent reads; the result is a
/// best-effort snapshot with no cross-read transaction.
impl Database {
    pub fn count_channel_videos(&self, channel_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM videos WHERE owner_id = ?1 AND is_deleted = 0",
                [channel_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    pub fn count_channel_subscribers(&self, channel_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE channel_id = ?1",
                [channel_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// SUM over an empty group is NULL; a channel with no videos reports 0.
    pub fn sum_channel_views(&self, channel_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let total: Option<i64> = conn.query_row(
                "SELECT SUM(views) FROM videos WHERE owner_id = ?1 AND is_deleted = 0",
                [channel_id],
                |row| row.get(0),
            )?;
            Ok(total.unwrap_or(0))
        })
    }

    /// Like rows attached to the channel's content: its non-deleted videos,
    /// the comments on those videos, and its tweets.
    pub fn count_channel_content_likes(&self, channel_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM likes l
                 WHERE (l.target_kind = 'video' AND l.target_id IN
                            (SELECT id FROM videos WHERE owner_id = ?1 AND is_deleted = 0))
                    OR (l.target_kind = 'comment' AND l.target_id IN
                            (SELECT c.id FROM comments c
                             JOIN videos v ON c.video_id = v.id
                             WHERE v.owner_id = ?1 AND v.is_deleted = 0))
                    OR (l.target_kind = 'tweet' AND l.target_id IN
                            (SELECT id FROM tweets WHERE author_id = ?1))",
                [channel_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }
}
