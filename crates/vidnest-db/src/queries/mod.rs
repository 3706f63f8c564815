//! Query methods on [`Database`](crate::Database), one module per entity.

mod comments;
mod dashboard;
mod likes;
mod playlists;
mod subscriptions;
mod tweets;
mod users;
mod videos;

pub use videos::VideoFilter;

use anyhow::Result;

/// Extension trait for optional query results
pub(crate) trait OptionalExt<T> {
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
