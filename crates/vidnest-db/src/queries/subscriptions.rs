use anyhow::Result;
use rusqlite::Row;

use crate::Database;
use crate::models::SubscriptionUserRow;

fn map_subscription_user(row: &Row) -> rusqlite::Result<SubscriptionUserRow> {
    Ok(SubscriptionUserRow {
        user_id: row.get(0)?,
        username: row.get::<_, Option<String>>(1)?.unwrap_or_else(|| "unknown".to_string()),
        subscribed_at: row.get(2)?,
    })
}

impl Database {
    /// Toggle a subscription relation; same conditional-delete shape as
    /// [`Database::toggle_like`]. Returns true when subscribed.
    pub fn toggle_subscription(&self, id: &str, subscriber_id: &str, channel_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let deleted = conn.execute(
                "DELETE FROM subscriptions WHERE subscriber_id = ?1 AND channel_id = ?2",
                rusqlite::params![subscriber_id, channel_id],
            )?;

            if deleted > 0 {
                return Ok(false);
            }

            conn.execute(
                "INSERT INTO subscriptions (id, subscriber_id, channel_id) VALUES (?1, ?2, ?3)",
                rusqlite::params![id, subscriber_id, channel_id],
            )?;
            Ok(true)
        })
    }

    pub fn subscription_exists(&self, subscriber_id: &str, channel_id: &str) -> Result<bool> {
        self.with_conn(|conn| {
            let count: i64 = conn.query_row(
                "SELECT COUNT(*) FROM subscriptions WHERE subscriber_id = ?1 AND channel_id = ?2",
                rusqlite::params![subscriber_id, channel_id],
                |row| row.get(0),
            )?;
            Ok(count > 0)
        })
    }

    /// Users subscribed to a channel, composed with the subscriber document.
    pub fn list_channel_subscribers(&self, channel_id: &str) -> Result<Vec<SubscriptionUserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.subscriber_id, u.username, s.created_at
                 FROM subscriptions s LEFT JOIN users u ON s.subscriber_id = u.id
                 WHERE s.channel_id = ?1
                 ORDER BY s.created_at DESC",
            )?;
            let rows = stmt
                .query_map([channel_id], map_subscription_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }

    /// Channels a user is subscribed to, composed with the channel document.
    pub fn list_subscribed_channels(&self, subscriber_id: &str) -> Result<Vec<SubscriptionUserRow>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare(
                "SELECT s.channel_id, u.username, s.created_at
                 FROM subscriptions s LEFT JOIN users u ON s.channel_id = u.id
                 WHERE s.subscriber_id = ?1
                 ORDER BY s.created_at DESC",
            )?;
            let rows = stmt
                .query_map([subscriber_id], map_subscription_user)?
                .collect::<std::result::Result<Vec<_>, _>>()?;
            Ok(rows)
        })
    }
}
