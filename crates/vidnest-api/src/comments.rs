use std::collections::HashMap;

use axum::{
    Extension, Json,
    extract::{Path, Query, State},
};
use uuid::Uuid;

use vidnest_db::models::CommentRow;
use vidnest_types::api::{
    AddCommentRequest, Claims, CommentResponse, PageQuery, UpdateCommentRequest, UserView,
};

use crate::auth::AppState;
use crate::decode::{row_time, row_uuid};
use crate::error::{ApiError, ApiResult, parse_id, run_blocking};
use crate::ownership::authorize_mutation;
use crate::response::ApiResponse;

const MAX_PAGE_SIZE: u32 = 100;

fn comment_response(row: &CommentRow, likers: &[String]) -> CommentResponse {
    CommentResponse {
        id: row_uuid(&row.id, "comment"),
        video_id: row_uuid(&row.video_id, "comment video"),
        author: UserView {
            id: row_uuid(&row.author_id, "comment author"),
            username: row.author_username.clone(),
        },
        content: row.content.clone(),
        parent_comment_id: row.parent_id.as_deref().map(|id| row_uuid(id, "parent comment")),
        likes: likers.iter().map(|id| row_uuid(id, "comment liker")).collect(),
        created_at: row_time(&row.created_at, "comment"),
    }
}

/// GET /api/comments/{videoId} — a page of comments, newest first, each
/// composed with its liker set (single batch fetch, no per-comment query).
pub async fn list_video_comments(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Query(q): Query<PageQuery>,
) -> ApiResult<ApiResponse<Vec<CommentResponse>>> {
    let vid = parse_id(&video_id, "Invalid video ID")?;

    let page = q.page.max(1);
    let limit = q.limit.clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1) * limit;

    let db = state.clone();
    let (rows, liker_rows) = run_blocking(move || {
        let rows = db.db.list_video_comments(&vid.to_string(), limit, offset)?;
        let comment_ids: Vec<String> = rows.iter().map(|r| r.id.clone()).collect();
        let liker_rows = db.db.likers_for_comments(&comment_ids)?;
        Ok((rows, liker_rows))
    })
    .await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("No comments found"));
    }

    // Group likers by comment id
    let mut liker_map: HashMap<String, Vec<String>> = HashMap::new();
    for liker in liker_rows {
        liker_map.entry(liker.comment_id).or_default().push(liker.user_id);
    }

    let comments = rows
        .iter()
        .map(|row| {
            let likers = liker_map.get(&row.id).map(Vec::as_slice).unwrap_or(&[]);
            comment_response(row, likers)
        })
        .collect();

    Ok(ApiResponse::ok("Comments fetched successfully", comments))
}

/// POST /api/comments/{videoId} — adds a comment, optionally as a reply to
/// an existing comment. The video reference itself is not verified.
pub async fn add_comment(
    State(state): State<AppState>,
    Path(video_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<AddCommentRequest>,
) -> ApiResult<ApiResponse<CommentResponse>> {
    let vid = parse_id(&video_id, "Invalid video ID")?;

    if req.content.trim().is_empty() {
        return Err(ApiError::invalid("Comment content is required"));
    }

    let parent_id = match &req.parent_comment_id {
        Some(raw) => Some(parse_id(raw, "Invalid parent comment ID")?.to_string()),
        None => None,
    };

    let comment_id = Uuid::new_v4();
    let author_id = claims.sub.to_string();
    let content = req.content.trim().to_string();

    let db = state.clone();
    let row = run_blocking(move || {
        if let Some(parent) = &parent_id {
            if db.db.get_comment(parent)?.is_none() {
                return Ok(None);
            }
        }
        db.db
            .insert_comment(&comment_id.to_string(), &vid.to_string(), &author_id, &content, parent_id.as_deref())?;
        db.db.get_comment(&comment_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Parent comment not found"))?;

    Ok(ApiResponse::created(
        "Comment added successfully",
        comment_response(&row, &[]),
    ))
}

/// PATCH /api/comments/{id} — author only.
pub async fn update_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateCommentRequest>,
) -> ApiResult<ApiResponse<CommentResponse>> {
    let cid = parse_id(&comment_id, "Invalid comment ID")?;

    if req.content.trim().is_empty() {
        return Err(ApiError::invalid("Comment content is required"));
    }

    let db = state.clone();
    let key = cid.to_string();
    let row = run_blocking(move || db.db.get_comment(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    authorize_mutation(&claims, &row.author_id, false)
        .map_err(|_| ApiError::forbidden("You are not authorized to update this comment"))?;

    let content = req.content.trim().to_string();
    let db = state.clone();
    let key = cid.to_string();
    let (updated, likers) = run_blocking(move || {
        db.db.update_comment(&key, &content)?;
        let updated = db.db.get_comment(&key)?;
        let likers = db.db.get_comment_likers(&key)?;
        Ok((updated, likers))
    })
    .await?;
    let updated = updated.ok_or_else(|| ApiError::not_found("Comment not found"))?;

    Ok(ApiResponse::ok(
        "Comment updated successfully",
        comment_response(&updated, &likers),
    ))
}

/// DELETE /api/comments/{id} — author or admin; the liker set goes with the
/// comment.
pub async fn delete_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<()>> {
    let cid = parse_id(&comment_id, "Invalid comment ID")?;

    let db = state.clone();
    let key = cid.to_string();
    let row = run_blocking(move || db.db.get_comment(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Comment not found"))?;

    authorize_mutation(&claims, &row.author_id, true)
        .map_err(|_| ApiError::forbidden("You are not authorized to delete this comment"))?;

    let db = state.clone();
    let key = cid.to_string();
    run_blocking(move || db.db.delete_comment(&key)).await?;

    Ok(ApiResponse::ok("Comment deleted successfully", ()))
}

/// POST /api/comments/{id}/like — adds the caller to the liker set; liking
/// twice is rejected rather than toggled.
pub async fn like_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<CommentResponse>> {
    let cid = parse_id(&comment_id, "Invalid comment ID")?;
    let user_id = claims.sub.to_string();

    let db = state.clone();
    let key = cid.to_string();
    let outcome = run_blocking(move || {
        let Some(row) = db.db.get_comment(&key)? else {
            return Ok(None);
        };
        let added = db.db.add_comment_liker(&key, &user_id)?;
        let likers = db.db.get_comment_likers(&key)?;
        Ok(Some((row, added, likers)))
    })
    .await?;

    let (row, added, likers) = outcome.ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if !added {
        return Err(ApiError::conflict("You have already liked this comment"));
    }

    Ok(ApiResponse::ok(
        "Comment liked successfully",
        comment_response(&row, &likers),
    ))
}

/// POST /api/comments/{id}/unlike — removes the caller from the liker set.
pub async fn unlike_comment(
    State(state): State<AppState>,
    Path(comment_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<CommentResponse>> {
    let cid = parse_id(&comment_id, "Invalid comment ID")?;
    let user_id = claims.sub.to_string();

    let db = state.clone();
    let key = cid.to_string();
    let outcome = run_blocking(move || {
        let Some(row) = db.db.get_comment(&key)? else {
            return Ok(None);
        };
        let removed = db.db.remove_comment_liker(&key, &user_id)?;
        let likers = db.db.get_comment_likers(&key)?;
        Ok(Some((row, removed, likers)))
    })
    .await?;

    let (row, removed, likers) = outcome.ok_or_else(|| ApiError::not_found("Comment not found"))?;

    if !removed {
        return Err(ApiError::conflict("You have not liked this comment"));
    }

    Ok(ApiResponse::ok(
        "Comment unliked successfully",
        comment_response(&row, &likers),
    ))
}
