use anyhow::Result;

use vidnest_types::models::LikeTarget;

use crate::Database;
use crate::models::VideoRow;
use crate::queries::videos::{VIDEO_COLUMNS, map_video};

impl Database {
    /// Toggle a like relation: removes the row if it exists, inserts it if
    /// not. Returns true when the relation was created, false when removed.
    ///
    /// The delete runs first and reports whether a row existed; the insert
    /// only happens when nothing was deleted. The UNIQUE(user, kind, target)
    /// constraint holds the one-row invariant even if two toggles race.
    pub fn toggle_like(
        &self,
        id: &str,
        user_id: &str,
        target: LikeTarget,
        target_id: &str,
    ) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM likes WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3",
                rusqlite::params![user_id, target.as_str(), target_id],
            )?;

            if deleted > 0 {
                return Ok(false);
            }

            conn.execute(
                "INSERT INTO likes (id, user_id, target_kind, target_id) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, user_id, target.as_str(), target_id],
            )?;
            Ok(true)
        })
    }

    pub fn like_exists(&self, user_id: &str, target: LikeTarget, target_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM likes WHERE user_id = ?1 AND target_kind = ?2 AND target_id = ?3",
                rusqlite::params![user_id, target.as_str(), target_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// The caller's liked videos, composed with the video documents. Like
    /// rows pointing at deleted videos drop out of the join.
    pub fn list_liked_videos(&self, user_id: &str) -> Result<Vec<VideoRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {VIDEO_COLUMNS} FROM likes l
                 JOIN videos v ON l.target_id = v.id
                 LEFT JOIN users u ON v.owner_id = u.id
                 WHERE l.user_id = ?1 AND l.target_kind = 'video'
                 ORDER BY l.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([user_id], map_video)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
