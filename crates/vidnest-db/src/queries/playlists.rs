use anyhow::Result;
use rusqlite::Row;

use super::OptionalExt;
use crate::Database;
use crate::models::PlaylistRow;

const PLAYLIST_COLUMNS: &str =
    "p.id, p.name, p.description, p.owner_id, u.username, p.is_public, p.created_at";

fn map_playlist(row: &Row) -> rusqlite::Result<PlaylistRow> {
    Ok(PlaylistRow {
        id: row.get(0)?,
        name: row.get(1)?,
        description: row.get(2)?,
        owner_id: row.get(3)?,
        owner_username: row.get::<_, Option<String>>(4)?.unwrap_or_else(|| "unknown".to_string()),
        is_public: row.get(5)?,
        created_at: row.get(6)?,
    })
}

impl Database {
    pub fn insert_playlist(&self, id: &str, name: &str, description: &str, owner_id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO playlists (id, name, description, owner_id) VALUES (?1, ?2, ?3, ?4)",
                rusqlite::params![id, name, description, owner_id],
            )?;
            Ok(())
        })
    }

    pub fn get_playlist(&self, id: &str) -> Result<Option<PlaylistRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PLAYLIST_COLUMNS} FROM playlists p LEFT JOIN users u ON p.owner_id = u.id
                 WHERE p.id = ?1"
            );
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([id], map_playlist).optional()?;
            Ok(row)
        })
    }

    pub fn list_playlists_by_owner(&self, owner_id: &str) -> Result<Vec<PlaylistRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {PLAYLIST_COLUMNS} FROM playlists p LEFT JOIN users u ON p.owner_id = u.id
                 WHERE p.owner_id = ?1
                 ORDER BY p.created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([owner_id], map_playlist)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Name and description are both replaced, not merged.
    pub fn update_playlist(&self, id: &str, name: &str, description: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE playlists SET name = ?2, description = ?3, updated_at = datetime('now')
                 WHERE id = ?1",
                rusqlite::params![id, name, description],
            )?;
            Ok(())
        })
    }

    /// Entries cascade with the playlist.
    pub fn delete_playlist(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM playlists WHERE id = ?1", [id])?;
            Ok(())
        })
    }

    // -- Entries --

    /// Ordered video ids of a playlist.
    pub fn playlist_video_ids(&self, playlist_id: &str) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT video_id FROM playlist_videos WHERE playlist_id = ?1 ORDER BY position",
            )?;
            let rows = stmt
                .query_map([playlist_id], |row| row.get(0))?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn playlist_contains(&self, playlist_id: &str, video_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM playlist_videos WHERE playlist_id = ?1 AND video_id = ?2",
                rusqlite::params![playlist_id, video_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    pub fn count_playlist_videos(&self, playlist_id: &str) -> Result<i64> {
        self.with_conn(|conn| {
            let count = conn.query_row(
                "SELECT COUNT(*) FROM playlist_videos WHERE playlist_id = ?1",
                [playlist_id],
                |row| row.get(0),
            )?;
            Ok(count)
        })
    }

    /// Appends the video at the end of the playlist. Returns false when the
    /// video is already present.
    pub fn add_playlist_video(&self, playlist_id: &str, video_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO playlist_videos (playlist_id, video_id, position)
                 SELECT ?1, ?2, COALESCE(MAX(position) + 1, 0)
                 FROM playlist_videos WHERE playlist_id = ?1",
                rusqlite::params![playlist_id, video_id],
            )?;
            Ok(inserted > 0)
        })
    }

    /// Returns false when the video was not in the playlist.
    pub fn remove_playlist_video(&self, playlist_id: &str, video_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM playlist_videos WHERE playlist_id = ?1 AND video_id = ?2",
                rusqlite::params![playlist_id, video_id],
            )?;
            Ok(deleted > 0)
        })
    }
}
