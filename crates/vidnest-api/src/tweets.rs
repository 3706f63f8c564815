use axum::{
    Extension, Json,
    extract::{Path, State},
};
use uuid::Uuid;

use vidnest_db::models::TweetRow;
use vidnest_types::api::{Claims, CreateTweetRequest, TweetResponse, UpdateTweetRequest};

use crate::auth::AppState;
use crate::decode::{row_time, row_uuid};
use crate::error::{ApiError, ApiResult, parse_id, run_blocking};
use crate::ownership::authorize_mutation;
use crate::response::ApiResponse;

fn tweet_response(row: &TweetRow) -> TweetResponse {
    TweetResponse {
        id: row_uuid(&row.id, "tweet"),
        author_id: row_uuid(&row.author_id, "tweet author"),
        text: row.body.clone(),
        likes: row.like_count,
        is_public: row.is_public,
        created_at: row_time(&row.created_at, "tweet"),
    }
}

/// POST /api/tweets
pub async fn create_tweet(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<CreateTweetRequest>,
) -> ApiResult<ApiResponse<TweetResponse>> {
    if req.text.trim().is_empty() {
        return Err(ApiError::invalid("Tweet text is required"));
    }

    let tweet_id = Uuid::new_v4();
    let author_id = claims.sub.to_string();
    let body = req.text.trim().to_string();

    let db = state.clone();
    let row = run_blocking(move || {
        db.db.insert_tweet(&tweet_id.to_string(), &author_id, &body)?;
        db.db.get_tweet(&tweet_id.to_string())
    })
    .await?
    .ok_or_else(|| ApiError::Internal(anyhow::anyhow!("created tweet {tweet_id} not readable")))?;

    Ok(ApiResponse::created(
        "Tweet created successfully",
        tweet_response(&row),
    ))
}

/// GET /api/tweets/me — the caller's tweets, newest first.
pub async fn get_my_tweets(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<Vec<TweetResponse>>> {
    let author_id = claims.sub.to_string();

    let db = state.clone();
    let rows = run_blocking(move || db.db.list_tweets_by_author(&author_id)).await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("No tweets found"));
    }

    let tweets = rows.iter().map(tweet_response).collect();
    Ok(ApiResponse::ok("Tweets fetched successfully", tweets))
}

/// PATCH /api/tweets/{id} — author only; a non-owner gets a 401, not a 403.
pub async fn update_tweet(
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    Extension(claims): Extension<Claims>,
    Json(req): Json<UpdateTweetRequest>,
) -> ApiResult<ApiResponse<TweetResponse>> {
    let tid = parse_id(&tweet_id, "Invalid tweet ID")?;

    if req.text.trim().is_empty() {
        return Err(ApiError::invalid("Tweet text is required"));
    }

    let db = state.clone();
    let key = tid.to_string();
    let row = run_blocking(move || db.db.get_tweet(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    authorize_mutation(&claims, &row.author_id, false)
        .map_err(|_| ApiError::unauthorized("Unauthorized"))?;

    let body = req.text.trim().to_string();
    let db = state.clone();
    let key = tid.to_string();
    let updated = run_blocking(move || {
        db.db.update_tweet(&key, &body)?;
        db.db.get_tweet(&key)
    })
    .await?
    .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    Ok(ApiResponse::ok(
        "Tweet updated successfully",
        tweet_response(&updated),
    ))
}

/// DELETE /api/tweets/{id} — author only, no admin override.
pub async fn delete_tweet(
    State(state): State<AppState>,
    Path(tweet_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<()>> {
    let tid = parse_id(&tweet_id, "Invalid tweet ID")?;

    let db = state.clone();
    let key = tid.to_string();
    let row = run_blocking(move || db.db.get_tweet(&key))
        .await?
        .ok_or_else(|| ApiError::not_found("Tweet not found"))?;

    authorize_mutation(&claims, &row.author_id, false)
        .map_err(|_| ApiError::unauthorized("Unauthorized"))?;

    let db = state.clone();
    let key = tid.to_string();
    run_blocking(move || db.db.delete_tweet(&key)).await?;

    Ok(ApiResponse::ok("Tweet deleted successfully", ()))
}
