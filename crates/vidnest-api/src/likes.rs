use axum::{
    Extension,
    extract::{Path, State},
};
use uuid::Uuid;

use vidnest_types::api::{Claims, ToggleResponse, ToggleState, VideoResponse};
use vidnest_types::models::LikeTarget;

use crate::auth::AppState;
use crate::error::{ApiError, ApiResult, parse_id, run_blocking};
use crate::response::ApiResponse;
use crate::videos::video_response;

/// Shared toggle path for the three like targets. ID format is validated;
/// the target's existence is not.
async fn toggle(
    state: AppState,
    claims: Claims,
    target: LikeTarget,
    target_id: Uuid,
    liked_message: &str,
    unliked_message: &str,
) -> ApiResult<ApiResponse<ToggleResponse>> {
    let relation_id = Uuid::new_v4();
    let user_id = claims.sub.to_string();

    let db = state.clone();
    let created = run_blocking(move || {
        db.db
            .toggle_like(&relation_id.to_string(), &user_id, target, &target_id.to_string())
    })
    .await?;

    let (message, toggle_state) = if created {
        (liked_message, ToggleState::Created)
    } else {
        (unliked_message, ToggleState::Removed)
    };

    Ok(ApiResponse::ok(message, ToggleResponse { state: toggle_state }))
}

/// POST /api/likes/video/{id}/toggle
pub async fn toggle_video_like(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<ToggleResponse>> {
    let vid = parse_id(&video_id, "Invalid video ID")?;
    toggle(
        state,
        claims,
        LikeTarget::Video,
        vid,
        "Video liked successfully",
        "Video unliked successfully",
    )
    .await
}

/// POST /api/likes/comment/{id}/toggle
pub async fn toggle_comment_like(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<ToggleResponse>> {
    let cid = parse_id(&comment_id, "Invalid comment ID")?;
    toggle(
        state,
        claims,
        LikeTarget::Comment,
        cid,
        "Comment liked successfully",
        "Comment unliked successfully",
    )
    .await
}

/// POST /api/likes/tweet/{id}/toggle
pub async fn toggle_tweet_like(
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<ToggleResponse>> {
    let tid = parse_id(&tweet_id, "Invalid tweet ID")?;
    toggle(
        state,
        claims,
        LikeTarget::Tweet,
        tid,
        "Tweet liked successfully",
        "Tweet unliked successfully",
    )
    .await
}

/// GET /api/likes/videos — the caller's liked videos, composed with the
/// video documents.
pub async fn get_liked_videos(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<Vec<VideoResponse>>> {
    let user_id = claims.sub.to_string();

    let db = state.clone();
    let rows = run_blocking(move || db.db.list_liked_videos(&user_id)).await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("No liked videos found"));
    }

    let videos = rows.iter().map(video_response).collect();
    Ok(ApiResponse::ok("Liked videos fetched successfully", videos))
}
