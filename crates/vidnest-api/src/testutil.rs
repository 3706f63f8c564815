//! Shared fixtures for handler-level tests.

use std::sync::Arc;

use uuid::Uuid;

use vidnest_db::Database;
use vidnest_types::api::Claims;
use vidnest_types::models::Role;

use crate::auth::{AppState, AppStateInner};
use crate::storage::MediaStore;

pub(crate) fn test_state() -> AppState {
    Arc::new(AppStateInner {
        db: Database::open_in_memory().unwrap(),
        jwt_secret: "test-secret".into(),
        media: MediaStore::new(std::env::temp_dir().join("vidnest-test-media")),
    })
}

/// Registers a user row and returns claims acting as that user.
pub(crate) fn test_claims(state: &AppState, username: &str, role: Role) -> Claims {
    let id = Uuid::new_v4();
    state
        .db
        .create_user(&id.to_string(), username, "argon2id-hash", role.as_str())
        .unwrap();
    Claims {
        sub: id,
        username: username.to_string(),
        role,
        exp: 0,
    }
}

pub(crate) fn seed_video(state: &AppState, owner: &Claims, title: &str) -> String {
    let id = Uuid::new_v4().to_string();
    state
        .db
        .insert_video(&id, title, "a description", None, "/api/media/thumb", 1.0, &owner.sub.to_string())
        .unwrap();
    id
}
