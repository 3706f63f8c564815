use anyhow::Result;
use rusqlite::Row;
use rusqlite::types::ToSql;

use super::OptionalExt;
use crate::Database;
use crate::models::{CommentLikerRow, CommentRow};

const COMMENT_COLUMNS: &str =
    "c.id, c.video_id, c.author_id, u.username, c.content, c.parent_id, c.created_at";

fn map_comment(row: &Row) -> rusqlite::Result<CommentRow> {
    Ok(CommentRow {
        id: row.get(0)?,
        video_id: row.get(1)?,
        author_id: row.get(2)?,
        author_username: row.get::<_, Option<String>>(3)?.unwrap_or_else(|| "unknown".to_string()),
        content: row.get(4)?,
        parent_id: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Database {
    pub fn insert_comment(
        &self,
        id: &str,
        video_id: &str,
        author_id: &str,
        content: &str,
        parent_id: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO comments (id, video_id, author_id, content, parent_id)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                rusqlite::params![id, video_id, author_id, content, parent_id],
            )?;
            Ok(())
        })
    }

    pub fn get_comment(&self, id: &str) -> Result<Option<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments c LEFT JOIN users u ON c.author_id = u.id
                 WHERE c.id = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([id], map_comment).optional()?;
            Ok(row)
        })
    }

    pub fn list_video_comments(&self, video_id: &str, limit: u32, offset: u32) -> Result<Vec<CommentRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {COMMENT_COLUMNS} FROM comments c LEFT JOIN users u ON c.author_id = u.id
                 WHERE c.video_id = ?1
                 ORDER BY c.created_at DESC
                 LIMIT ?2 OFFSET ?3"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(rusqlite::params![video_id, limit, offset], map_comment)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_comment(&self, id: &str, content: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE comments SET content = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, content],
            )?;
            Ok(())
        })
    }

    /// The liker set cascades with the comment.
    pub fn delete_comment(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM comments WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Liker set --

    /// Adds the user to the comment's liker set. Returns false when the user
    /// already liked the comment.
    pub fn add_comment_liker(&self, comment_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO comment_likers (comment_id, user_id) VALUES (?1, ?2)",
                rusqlite::params![comment_id, user_id],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Removes the user from the comment's liker set. Returns false when the
    /// user had not liked the comment.
    pub fn remove_comment_liker(&self, comment_id: &str, user_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM comment_likers WHERE comment_id = ?1 AND user_id = ?2",
                rusqlite::params![comment_id, user_id],
            )?;
            Ok(deleted > 0)
        })
    }

    pub fn get_comment_likers(&self, comment_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT user_id FROM comment_likers WHERE comment_id = ?1 ORDER BY created_at",
            )?;
            let rows = stmt
                .query_map([comment_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Batch-fetch liker sets for a page of comments.
    pub fn likers_for_comments(&self, comment_ids: &[String]) -> Result<Vec<CommentLikerRow>> {
        if comment_ids.is_empty() {
            return Ok(vec![]);
        }

        self.with_conn(|conn| {
            let placeholders: Vec<String> = (1..=comment_ids.len()).map(|i| format!("?{}", i)).collect();
            let sql = format!(
                "SELECT comment_id, user_id FROM comment_likers WHERE comment_id IN ({})",
                placeholders.join(", ")
            );

            let mut stmt = conn.prepare(&sql)?;
            let params: Vec<&dyn ToSql> = comment_ids.iter().map(|id| id as &dyn ToSql).collect();

            let rows = stmt
                .query_map(params.as_slice(), |row| {
                    Ok(CommentLikerRow {
                        comment_id: row.get(0)?,
                        user_id: row.get(1)?,
                    })
                })?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }
}
