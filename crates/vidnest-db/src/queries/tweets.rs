use anyhow::Result;
use rusqlite::Row;

use super::OptionalExt;
use crate::Database;
use crate::models::TweetRow;

const TWEET_COLUMNS: &str = "id, author_id, body, like_count, is_public, created_at";

fn map_tweet(row: &Row) -> rusqlite::Result<TweetRow> {
    Ok(TweetRow {
        id: row.get(0)?,
        author_id: row.get(1)?,
        body: row.get(2)?,
        like_count: row.get(3)?,
        is_public: row.get(4)?,
        created_at: row.get(5)?,
    })
}

impl Database {
    pub fn insert_tweet(&self, id: &str, author_id: &str, body: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO tweets (id, author_id, body) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, author_id, body],
            )?;
            Ok(())
        })
    }

    pub fn get_tweet(&self, id: &str) -> Result<Option<TweetRow>> {
        self.with_conn(|conn| {
            let sql = format!("SELECT {TWEET_COLUMNS} FROM tweets WHERE id = ?1");
            let mut stmt = conn.prepare(&sql)?;
            let row = stmt.query_row([id], map_tweet).optional()?;
            Ok(row)
        })
    }

    pub fn list_tweets_by_author(&self, author_id: &str) -> Result<Vec<TweetRow>> {
        self.with_conn(|conn| {
            let sql = format!(
                "SELECT {TWEET_COLUMNS} FROM tweets WHERE author_id = ?1 ORDER BY created_at DESC"
            );
            let mut stmt = conn.prepare(&sql)?;
            let rows = stmt
                .query_map([author_id], map_tweet)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    pub fn update_tweet(&self, id: &str, body: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE tweets SET body = ?2, updated_at = datetime('now') WHERE id = ?1",
                rusqlite::params![id, body],
            )?;
            Ok(())
        })
    }

    pub fn delete_tweet(&self, id: &str) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute("DELETE FROM tweets WHERE id = ?1", [id])?;
            Ok(())
        })
    }
}
