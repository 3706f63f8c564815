use axum::extract::{Path, State};

use vidnest_types::api::{ChannelStatsResponse, VideoResponse};

use crate::auth::AppState;
use crate::error::{ApiResult, parse_id, run_blocking};
use crate::response::ApiResponse;
use crate::videos::video_response;

/// GET /api/dashboard/{channelId}/stats — four independent aggregates; a
/// channel with no content reports zeros. The result is a best-effort
/// snapshot, not a transactionally consistent one.
pub async fn get_channel_stats(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<ChannelStatsResponse>> {
    let channel = parse_id(&channel_id, "Invalid channel ID")?;

    let db = state.clone();
    let stats = run_blocking(move || {
        let key = channel.to_string();
        let total_videos = db.db.count_channel_videos(&key)?;
        let total_subscribers = db.db.count_channel_subscribers(&key)?;
        let total_views = db.db.sum_channel_views(&key)?;
        let total_likes = db.db.count_channel_content_likes(&key)?;
        Ok(ChannelStatsResponse {
            total_videos,
            total_subscribers,
            total_views,
            total_likes,
        })
    })
    .await?;

    Ok(ApiResponse::ok("Channel stats fetched successfully", stats))
}

/// GET /api/dashboard/{channelId}/videos — the channel's non-deleted
/// videos; an empty channel gets an empty list here, unlike the main
/// listing.
pub async fn get_channel_videos(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<VideoResponse>>> {
    let channel = parse_id(&channel_id, "Invalid channel ID")?;

    let db = state.clone();
    let rows = run_blocking(move || db.db.list_channel_videos(&channel.to_string())).await?;

    let videos = rows.iter().map(video_response).collect();
    Ok(ApiResponse::ok("Channel videos fetched successfully", videos))
}
