use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use vidnest_db::Database;
use vidnest_db::models::PlaylistRow;
use vidnest_types::api::{Claims, CreatePlaylistRequest, PlaylistResponse, UpdatePlaylistRequest, UserView};

use crate::auth::AppState;
use crate::decode::{row_time, row_uuid};
use crate::error::{ApiError, ApiResult, parse_id, run_blocking};
use crate::ownership::authorize_mutation;
use crate::response::ApiResponse;

fn playlist_response(row: &PlaylistRow, video_ids: &[String]) -> PlaylistResponse {
    PlaylistResponse {
        id: row_uuid(&row.id, "playlist"),
        name: row.name.clone(),
        description: row.description.clone(),
        owner: UserView {
            id: row_uuid(&row.owner_id, "playlist owner"),
            username: row.owner_username.clone(),
        },
        videos: video_ids.iter().map(|id| row_uuid(id, "playlist video")).collect(),
        is_public: row.is_public,
        created_at: row_time(&row.created_at, "playlist"),
    }
}

fn load_playlist(db: &Database, id: &str) -> anyhow::Result<Option<(PlaylistRow, Vec<String>)>> {
    let Some(row) = db.get_playlist(id)? else {
        return Ok(None);
    };
    let video_ids = db.playlist_video_ids(id)?;
    Ok(Some((row, video_ids)))
}

/// POST /api/playlists — playlists start private and empty.
pub async fn create_playlist(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreatePlaylistRequest>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    if req.name.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::invalid("Name and description are required"));
    }

    let playlist_id = Uuid::new_v4();
    let owner_id = claims.sub.to_string();
    let name = req.name.trim().to_string();
    let description = req.description.trim().to_string();

    let db = state.clone();
    let row = run_blocking(move || {
        db.db
            .insert_playlist(&playlist_id.to_string(), &name, &description, &owner_id)?;
        db.db.get_playlist(&playlist_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("created playlist {playlist_id} not readable")))?;

    Ok(ApiResponse::created(
        "Playlist created successfully",
        playlist_response(&row, &[]),
    ))
}

/// GET /api/playlists/user/{userId}
pub async fn get_user_playlists(
    State(state): State<AppState>,
    Path(user_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<PlaylistResponse>>> {
    let owner = parse_id(&user_id, "Invalid user ID")?;

    let db = state.clone();
    let playlists = run_blocking(move || {
        let rows = db.db.list_playlists_by_owner(&owner.to_string())?;
        rows.into_iter()
            .map(|row| {
                let video_ids = db.db.playlist_video_ids(&row.id)?;
                Ok((row, video_ids))
            })
            .collect::<anyhow::Result<Vec<_>>>()
    })
    .await?;

    if playlists.is_empty() {
        return Err(ApiError::not_found("No playlists found"));
    }

    let playlists = playlists
        .iter()
        .map(|(row, video_ids)| playlist_response(row, video_ids))
        .collect();

    Ok(ApiResponse::ok("Playlists fetched successfully", playlists))
}

/// GET /api/playlists/{id}
pub async fn get_playlist_by_id(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    let pid = parse_id(&playlist_id, "Invalid playlist ID")?;

    let db = state.clone();
    let (row, video_ids) = run_blocking(move || load_playlist(&db.db, &pid.to_string()))
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(
        "Playlist fetched successfully",
        playlist_response(&row, &video_ids),
    ))
}

/// PATCH /api/playlists/{id} — owner only; name and description are both
/// replaced.
pub async fn update_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdatePlaylistRequest>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    let pid = parse_id(&playlist_id, "Invalid playlist ID")?;

    if req.name.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::invalid("Name and description are required"));
    }

    let db = state.clone();
    let key = pid.to_string();
    let row = run_blocking(move || db.db.get_playlist(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    authorize_mutation(&claims, &row.owner_id, false)
        .map_err(|_| ApiError::forbidden("You are not authorized to update this playlist"))?;

    let name = req.name.trim().to_string();
    let description = req.description.trim().to_string();
    let db = state.clone();
    let key = pid.to_string();
    let (updated, video_ids) = run_blocking(move || {
        db.db.update_playlist(&key, &name, &description)?;
        load_playlist(&db.db, &key)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    Ok(ApiResponse::ok(
        "Playlist updated successfully",
        playlist_response(&updated, &video_ids),
    ))
}

/// DELETE /api/playlists/{id} — owner only, no admin override.
pub async fn delete_playlist(
    State(state): State<AppState>,
    Path(playlist_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<()>> {
    let pid = parse_id(&playlist_id, "Invalid playlist ID")?;

    let db = state.clone();
    let key = pid.to_string();
    let row = run_blocking(move || db.db.get_playlist(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    authorize_mutation(&claims, &row.owner_id, false)
        .map_err(|_| ApiError::forbidden("You are not authorized to delete this playlist"))?;

    let db = state.clone();
    let key = pid.to_string();
    run_blocking(move || db.db.delete_playlist(&key)).await?;

    Ok(ApiResponse::ok("Playlist deleted successfully", ()))
}

/// POST /api/playlists/{id}/videos/{videoId} — owner only; a video appears
/// at most once per playlist.
pub async fn add_video_to_playlist(
    State(state): State<AppState>,
    Path((playlist_id, video_id)): Path<(String, String)>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    let pid = parse_id(&playlist_id, "Invalid playlist ID")?;
    let vid = parse_id(&video_id, "Invalid video ID")?;

    let db = state.clone();
    let key = pid.to_string();
    let row = run_blocking(move || db.db.get_playlist(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    authorize_mutation(&claims, &row.owner_id, false)
        .map_err(|_| ApiError::forbidden("You are not authorized to modify this playlist"))?;

    let db = state.clone();
    let key = pid.to_string();
    let (added, video_ids) = run_blocking(move || {
        let added = db.db.add_playlist_video(&key, &vid.to_string())?;
        let video_ids = db.db.playlist_video_ids(&key)?;
        Ok((added, video_ids))
    })
    .await?;

    if !added {
        return Err(ApiError::conflict("Video already exists in playlist"));
    }

    Ok(ApiResponse::ok(
        "Video added to playlist successfully",
        playlist_response(&row, &video_ids),
    ))
}

/// DELETE /api/playlists/{id}/videos/{videoId} — owner only; removing the
/// last video is rejected rather than leaving an empty playlist.
pub async fn remove_video_from_playlist(
    State(state): State<AppState>,
    Path((playlist_id, video_id)): Path<(String, String)>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<PlaylistResponse>> {
    let pid = parse_id(&playlist_id, "Invalid playlist ID")?;
    let vid = parse_id(&video_id, "Invalid video ID")?;

    let db = state.clone();
    let key = pid.to_string();
    let row = run_blocking(move || db.db.get_playlist(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Playlist not found"))?;

    authorize_mutation(&claims, &row.owner_id, false)
        .map_err(|_| ApiError::forbidden("You are not authorized to modify this playlist"))?;

    let db = state.clone();
    let key = pid.to_string();
    let outcome = run_blocking(move || {
        if !db.db.playlist_contains(&key, &vid.to_string())? {
            return Ok(RemoveOutcome::NotInPlaylist);
        }
        if db.db.count_playlist_videos(&key)? == 1 {
            return Ok(RemoveOutcome::WouldEmpty);
        }
        db.db.remove_playlist_video(&key, &vid.to_string())?;
        Ok(RemoveOutcome::Removed(db.db.playlist_video_ids(&key)?))
    })
    .await?;

    let video_ids = match outcome {
        RemoveOutcome::NotInPlaylist => {
            return Err(ApiError::invalid("Video not found in playlist"));
        }
        RemoveOutcome::WouldEmpty => return Err(ApiError::invalid("Playlist is empty")),
        RemoveOutcome::Removed(ids) => ids,
    };

    Ok(ApiResponse::ok(
        "Video removed from playlist successfully",
        playlist_response(&row, &video_ids),
    ))
}

enum RemoveOutcome {
    NotInPlaylist,
    WouldEmpty,
    Removed(Vec<String>),
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidnest_types::models::Role;

    use crate::testutil::{seed_video, test_claims, test_state};

    async fn create(state: &AppState, owner: &Claims) -> String {
        let resp = create_playlist(
            State(state.clone()),
            Extension(owner.clone()),
            Json(CreatePlaylistRequest {
                name: "mix".to_string(),
                description: "favourites".to_string(),
            }),
        )
        .await
        .unwrap();
        resp.data.id.to_string()
    }

    #[tokio::test]
    async fn adding_the_same_video_twice_is_a_conflict() {
        let state = test_state();
        let owner = test_claims(&state, "owner", Role::User);
        let playlist = create(&state, &owner).await;
        let video = seed_video(&state, &owner, "clip");

        add_video_to_playlist(
            State(state.clone()),
            Path((playlist.clone(), video.clone())),
            Extension(owner.clone()),
        )
        .await
        .unwrap();

        let err = add_video_to_playlist(
            State(state.clone()),
            Path((playlist, video)),
            Extension(owner),
        )
        .await
        .unwrap_err();

        match err {
            ApiError::Conflict(msg) => assert_eq!(msg, "Video already exists in playlist"),
            other => panic!("expected Conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn removing_the_only_video_is_rejected() {
        let state = test_state();
        let owner = test_claims(&state, "owner", Role::User);
        let playlist = create(&state, &owner).await;
        let video = seed_video(&state, &owner, "clip");
        state.db.add_playlist_video(&playlist, &video).unwrap();

        let err = remove_video_from_playlist(
            State(state.clone()),
            Path((playlist.clone(), video.clone())),
            Extension(owner),
        )
        .await
        .unwrap_err();

        match err {
            ApiError::InvalidArgument(msg) => assert_eq!(msg, "Playlist is empty"),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
        // The rejected removal must not have gone through
        assert!(state.db.playlist_contains(&playlist, &video).unwrap());
    }

    #[tokio::test]
    async fn removing_an_absent_video_is_rejected() {
        let state = test_state();
        let owner = test_claims(&state, "owner", Role::User);
        let playlist = create(&state, &owner).await;
        let in_list = seed_video(&state, &owner, "kept");
        let absent = seed_video(&state, &owner, "never added");
        state.db.add_playlist_video(&playlist, &in_list).unwrap();

        let err = remove_video_from_playlist(
            State(state.clone()),
            Path((playlist, absent)),
            Extension(owner),
        )
        .await
        .unwrap_err();

        match err {
            ApiError::InvalidArgument(msg) => assert_eq!(msg, "Video not found in playlist"),
            other => panic!("expected InvalidArgument, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn admins_get_no_override_on_playlists() {
        let state = test_state();
        let owner = test_claims(&state, "owner", Role::User);
        let admin = test_claims(&state, "admin", Role::Admin);
        let playlist = create(&state, &owner).await;

        let err = delete_playlist(
            State(state.clone()),
            Path(playlist.clone()),
            Extension(admin),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(state.db.get_playlist(&playlist).unwrap().is_some());
    }
}
