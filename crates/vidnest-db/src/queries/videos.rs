use anyhow::Result;
use rusqlite::Row;
use rusqlite::types::ToSql;

use super::OptionalExt;
use crate::Database;
use crate::models::VideoRow;

/// Filter, ordering, and page window for video listings.
#[derive(Debug, Clone, Default)]
pub struct VideoFilter {
    pub owner_id: Option<String>,
    /// Case-insensitive substring match over title and description.
    pub text: Option<String>,
    pub sort_by: Option<String>,
    pub ascending: bool,
    pub limit: u32,
    pub offset: u32,
}

pub(crate) const VIDEO_COLUMNS: &str = "v.id, v.title, v.description, v.video_url, v.thumbnail_url, \
     v.duration, v.views, v.is_published, v.owner_id, u.username, v.created_at";

pub(crate) fn map_video(row: &Row) -> rusqlite::Result<VideoRow> {
    Ok(VideoRow {
        id: row.get(0)?,
        title: row.get(1)?,
        description: row.get(2)?,
        video_url: row.get(3)?,
        thumbnail_url: row.get(4)?,
        duration: row.get(5)?,
        views: row.get(6)?,
        is_published: row.get(7)?,
        owner_id: row.get(8)?,
        owner_username: row.get::<_, Option<String>>(9)?.unwrap_or_else(|| "unknown".to_string()),
        created_at: row.get(10)?,
    })
}

/// Sortable columns are whitelisted; anything else falls back to created_at.
fn sort_column(sort_by: Option<&str>) -> &'static str {
    match sort_by {
        Some("views") => "views",
        Some("duration") => "duration",
        Some("title") => "title",
        _ => "created_at",
    }
}

/// WHERE clauses and their positional params for a listing filter.
/// Non-deleted is always part of the filter.
fn filter_sql(filter: &VideoFilter) -> (String, Vec<String>) {
    let mut clauses = vec!["v.is_deleted = 0".to_string()];
    let mut params: Vec<String> = Vec::new();

    if let Some(owner) = &filter.owner_id {
        params.push(owner.clone());
        clauses.push(format!("v.owner_id = ?{}", params.len()));
    }

    if let Some(text) = &filter.text {
        params.push(format!("%{}%", text));
        let n = params.len();
        clauses.push(format!("(v.title LIKE ?{n} OR v.description LIKE ?{n})"));
    }

    (clauses.join(" AND "), params)
}

impl Database {
    #[allow(clippy::too_many_arguments)]
    pub fn insert_video(
        &self,
        id: &str,
        title: &str,
        description: &str,
        video_url: Option<&str>,
        thumbnail_url: &str,
        duration: f64,
        owner_id: &str,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO videos (id, title, description, video_url, thumbnail_url, duration, owner_id)
                 VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
                rusqlite::params![id, title, description, video_url, thumbnail_url, duration, owner_id],
            )?;
            Ok(())
        })
    }

    pub fn get_video(&self, id: &str) -> Result<Option<VideoRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {VIDEO_COLUMNS} FROM videos v LEFT JOIN users u ON v.owner_id = u.id WHERE v.id = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([id], map_video).optional()?;
            Ok(row)
        })
    }

    /// Unconditional increment, applied after the read on the fetch path.
    pub fn increment_views(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("UPDATE videos SET views = views + 1 WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    pub fn list_videos(&self, filter: &VideoFilter) -> Result<Vec<VideoRow>> {
        self.with_conn(|conn| {
            let (where_sql, text_params) = filter_sql(filter);
            let order = if filter.ascending { "ASC" } else { "DESC" };
            let sql = format!(
                "SELECT {VIDEO_COLUMNS} FROM videos v LEFT JOIN users u ON v.owner_id = u.id
                 WHERE {where_sql}
                 ORDER BY v.{} {}
                 LIMIT ?{} OFFSET ?{}",
                sort_column(filter.sort_by.as_deref()),
                order,
                text_params.len() + 1,
                text_params.len() + 2,
            );

            let mut params: Vec<Box<dyn ToSql>> = text_params
                .into_iter()
                .map(|p| Box::new(p) as Box<dyn ToSql>)
                .collect();
            params.push(Box::new(filter.limit));
            params.push(Box::new(filter.offset));
            let param_refs: Vec<&dyn ToSql> = params.iter().map(|p| p.as_ref()).collect();

            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map(param_refs.as_slice(), map_video)?
                .collect::<std::result::Result<Vec<_>, _>>()?;

            Ok(rows)
        })
    }

    /// Total matches for the same filter, ignoring the page window.
    pub fn count_videos(&self, filter: &VideoFilter) -> Result<i64> {
        self.with_conn(|conn| {
            let (where_sql, text_params) = filter_sql(filter);
            let sql = format!("SELECT COUNT(*) FROM videos v WHERE {where_sql}");

            let param_refs: Vec<&dyn ToSql> =
                text_params.iter().map(|p| p as &dyn ToSql).collect();
            let count = conn.query_row(&sql, param_refs.as_slice(), |row| row.get(0))?;
            Ok(count)
        })
    }

    pub fn update_video(
        &self,
        id: &str,
        title: Option<&str>,
        description: Option<&str>,
        thumbnail_url: Option<&str>,
    ) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE videos SET
                     title = COALESCE(?2, title),
                     description = COALESCE(?3, description),
                     thumbnail_url = COALESCE(?4, thumbnail_url),
                     updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, title, description, thumbnail_url],
            )?;
            Ok(())
        })
    }

    /// Physical delete. Likes, comments, and playlist entries that reference
    /// the video are left in place.
    pub fn delete_video(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM videos WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    /// Flips the publish flag and returns the new state.
    pub fn toggle_publish(&self, id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE videos SET is_published = 1 - is_published, updated_at = datetime('now')
                 WHERE id = ?1",
                [id],
            )?;
            let published = conn.query_row(
                "SELECT is_published FROM videos WHERE id = ?1",
                [id],
                |row| row.get(0),
            )?;
            Ok(published)
        })
    }

    /// Non-deleted videos of one channel, newest first. Used by the dashboard,
    /// which allows an empty result.
    pub fn list_channel_videos(&self, owner_id: &str) -> Result<Vec<VideoRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {VIDEO_COLUMNS} FROM videos v LEFT JOIN users u ON v.owner_id = u.id
                 WHERE v.owner_id = ?1 AND v.is_deleted = 0
                 ORDER BY v.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner_id], map_video)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sort_column_whitelists_known_fields() {
        assert_eq!(sort_column(Some("views")), "views");
        assert_eq!(sort_column(Some("duration")), "duration");
        assert_eq!(sort_column(Some("title")), "title");
        assert_eq!(sort_column(Some("createdAt")), "created_at");
        assert_eq!(sort_column(None), "created_at");
    }

    #[test]
    fn sort_column_rejects_arbitrary_input() {
        assert_eq!(sort_column(Some("views; DROP TABLE videos")), "created_at");
        assert_eq!(sort_column(Some("owner_id")), "created_at");
    }

    #[test]
    fn filter_sql_always_excludes_deleted() {
        let (sql, params) = filter_sql(&VideoFilter::default());
        assert_eq!(sql, "v.is_deleted = 0");
        assert!(params.is_empty());
    }

    #[test]
    fn filter_sql_numbers_params_in_order() {
        let filter = VideoFilter {
            owner_id: Some("abc".into()),
            text: Some("rust".into()),
            ..Default::default()
        };
        let (sql, params) = filter_sql(&filter);
        assert!(sql.contains("v.owner_id = ?1"));
        assert!(sql.contains("v.title LIKE ?2"));
        assert_eq!(params, vec!["abc".to_string(), "%rust%".to_string()]);
    }
}
