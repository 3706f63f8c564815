use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use vidnest_db::models::VideoRow;
use vidnest_db::queries::VideoFilter;
use vidnest_types::api::{
    Claims, CreateVideoRequest, ListVideosQuery, PublishStatusResponse, UpdateVideoRequest,
    UserView, VideoListResponse, VideoResponse,
};

use crate::auth::AppState;
use crate::decode::{row_time, row_uuid};
use crate::error::{ApiError, ApiResult, parse_id, run_blocking};
use crate::ownership::authorize_mutation;
use crate::response::ApiResponse;

const MAX_PAGE_SIZE: u32 = 100;

pub(crate) fn video_response(row: &VideoRow) -> VideoResponse {
    VideoResponse {
        id: row_uuid(&row.id, "video"),
        title: row.title.clone(),
        description: row.description.clone(),
        video_url: row.video_url.clone(),
        thumbnail_url: row.thumbnail_url.clone(),
        duration: row.duration,
        views: row.views,
        is_published: row.is_published,
        owner: UserView {
            id: row_uuid(&row.owner_id, "video owner"),
            username: row.owner_username.clone(),
        },
        created_at: row_time(&row.created_at, "video"),
    }
}

/// GET /api/videos — filtered, sorted, paginated listing. An empty result
/// page is a 404, not an empty list.
pub async fn list_videos(
    State(state): State<AppState>,
    Query(q): Query<ListVideosQuery>,
) -> ApiResult<ApiResponse<VideoListResponse>> {
    let owner_id = match &q.user_id {
        Some(raw) => Some(parse_id(raw, "Invalid user ID")?.to_string()),
        None => None,
    };

    let page = q.page.max(1);
    let limit = q.limit.clamp(1, MAX_PAGE_SIZE);

    let filter = VideoFilter {
        owner_id,
        text: q.query.clone(),
        sort_by: q.sort_by.clone(),
        ascending: q.sort_type.as_deref() == Some("asc"),
        limit,
        offset: (page - 1) * limit,
    };

    let db = state.clone();
    let (rows, total) = run_blocking(move || {
        let rows = db.db.list_videos(&filter)?;
        let total = db.db.count_videos(&filter)?;
        Ok((rows, total))
    })
    .await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("No videos found"));
    }

    let videos = rows.iter().map(video_response).collect();

    Ok(ApiResponse::ok(
        "Videos fetched successfully",
        VideoListResponse {
            total,
            page,
            limit,
            videos,
        },
    ))
}

/// POST /api/videos — publishes a new video. The thumbnail upload reference
/// is required and must resolve through the media store.
pub async fn publish_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateVideoRequest>,
) -> ApiResult<ApiResponse<VideoResponse>> {
    if req.title.trim().is_empty() || req.description.trim().is_empty() {
        return Err(ApiError::invalid("Title and description are required"));
    }

    let thumbnail_ref = req
        .thumbnail
        .ok_or_else(|| ApiError::invalid("Video thumbnail file is required"))?;

    let thumbnail_url = state
        .media
        .resolve(thumbnail_ref)
        .await
        .map_err(|_| ApiError::upstream("Failed to upload thumbnail"))?;

    let video_url = match req.video_file {
        Some(reference) => Some(
            state
                .media
                .resolve(reference)
                .await
                .map_err(|_| ApiError::upstream("Failed to upload video file"))?,
        ),
        None => None,
    };

    let video_id = Uuid::new_v4();
    let owner_id = claims.sub.to_string();
    let duration = req.duration.unwrap_or(0.0);

    let db = state.clone();
    let row = run_blocking(move || {
        db.db.insert_video(
            &video_id.to_string(),
            req.title.trim(),
            req.description.trim(),
            video_url.as_deref(),
            &thumbnail_url,
            duration,
            &owner_id,
        )?;
        db.db.get_video(&video_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("created video {video_id} not readable")))?;

    Ok(ApiResponse::created(
        "Video created successfully",
        video_response(&row),
    ))
}

/// GET /api/videos/{id} — fetches one video and bumps its view counter as a
/// side effect. The response carries the pre-increment count.
pub async fn get_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let vid = parse_id(&video_id, "Invalid video ID")?;

    let db = state.clone();
    let row = run_blocking(move || {
        let row = db.db.get_video(&vid.to_string())?;
        if row.is_some() {
            db.db.increment_views(&vid.to_string())?;
        }
        Ok(row)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(ApiResponse::ok(
        "Video fetched successfully",
        video_response(&row),
    ))
}

/// PATCH /api/videos/{id} — owner only; omitted fields keep their values.
pub async fn update_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateVideoRequest>,
) -> ApiResult<ApiResponse<VideoResponse>> {
    let vid = parse_id(&video_id, "Invalid video ID")?;

    let db = state.clone();
    let key = vid.to_string();
    let row = run_blocking(move || db.db.get_video(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    authorize_mutation(&claims, &row.owner_id, false)
        .map_err(|_| ApiError::forbidden("You are not authorized to update this video"))?;

    let db = state.clone();
    let key = vid.to_string();
    let updated = run_blocking(move || {
        db.db.update_video(
            &key,
            req.title.as_deref(),
            req.description.as_deref(),
            req.thumbnail.as_deref(),
        )?;
        db.db.get_video(&key)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Video not found"))?;

    Ok(ApiResponse::ok(
        "Video updated successfully",
        video_response(&updated),
    ))
}

/// DELETE /api/videos/{id} — owner or admin; the record is physically
/// removed.
pub async fn delete_video(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<()>> {
    let vid = parse_id(&video_id, "Invalid video ID")?;

    let db = state.clone();
    let key = vid.to_string();
    let row = run_blocking(move || db.db.get_video(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    authorize_mutation(&claims, &row.owner_id, true)
        .map_err(|_| ApiError::forbidden("You are not authorized to delete this video"))?;

    let db = state.clone();
    let key = vid.to_string();
    run_blocking(move || db.db.delete_video(&key)).await?;

    Ok(ApiResponse::ok("Video deleted successfully", ()))
}

/// PATCH /api/videos/{id}/publish — owner only; flips the publish flag.
pub async fn toggle_publish(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<PublishStatusResponse>> {
    let vid = parse_id(&video_id, "Invalid video ID")?;

    let db = state.clone();
    let key = vid.to_string();
    let row = run_blocking(move || db.db.get_video(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Video not found"))?;

    authorize_mutation(&claims, &row.owner_id, false)
        .map_err(|_| ApiError::forbidden("You are not authorized to update this video"))?;

    let db = state.clone();
    let key = vid.to_string();
    let is_published = run_blocking(move || db.db.toggle_publish(&key)).await?;

    Ok(ApiResponse::ok(
        "Video publish status toggled successfully",
        PublishStatusResponse { is_published },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use vidnest_types::models::Role;

    use crate::testutil::{seed_video, test_claims, test_state};

    #[tokio::test]
    async fn fetching_a_video_bumps_its_view_counter() {
        let state = test_state();
        let owner = test_claims(&state, "owner", Role::User);
        let video = seed_video(&state, &owner, "clip");

        let first = get_video(State(state.clone()), Path(video.clone()))
            .await
            .unwrap();
        assert_eq!(first.data.views, 0);

        let second = get_video(State(state.clone()), Path(video)).await.unwrap();
        assert_eq!(second.data.views, 1);
    }

    #[tokio::test]
    async fn fetching_a_missing_video_is_not_found() {
        let state = test_state();
        let err = get_video(State(state.clone()), Path(uuid::Uuid::new_v4().to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotFound(_)));

        let err = get_video(State(state), Path("not-a-uuid".to_string()))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidArgument(_)));
    }

    #[tokio::test]
    async fn admin_may_delete_but_not_edit_anothers_video() {
        let state = test_state();
        let owner = test_claims(&state, "owner", Role::User);
        let admin = test_claims(&state, "admin", Role::Admin);
        let video = seed_video(&state, &owner, "clip");

        let err = update_video(
            State(state.clone()),
            Path(video.clone()),
            Extension(admin.clone()),
            Json(UpdateVideoRequest {
                title: Some("hijacked".to_string()),
                description: None,
                thumbnail: None,
            }),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));

        delete_video(State(state.clone()), Path(video.clone()), Extension(admin))
            .await
            .unwrap();
        assert!(state.db.get_video(&video).unwrap().is_none());
    }

    #[tokio::test]
    async fn stranger_may_neither_edit_nor_delete() {
        let state = test_state();
        let owner = test_claims(&state, "owner", Role::User);
        let stranger = test_claims(&state, "stranger", Role::User);
        let video = seed_video(&state, &owner, "clip");

        let err = delete_video(
            State(state.clone()),
            Path(video.clone()),
            Extension(stranger),
        )
        .await
        .unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
        assert!(state.db.get_video(&video).unwrap().is_some());
    }
}
