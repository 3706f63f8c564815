use axum::{
    Extension,
    extract::{Path, State},
};
use uuid::Uuid;

use vidnest_db::models::SubscriptionUserRow;
use vidnest_types::api::{
    Claims, SubscribedChannelResponse, SubscriberResponse, ToggleResponse, ToggleState, UserView,
};

use crate::auth::AppState;
use crate::decode::{row_time, row_uuid};
use crate::error::{ApiError, ApiResult, parse_id, run_blocking};
use crate::response::ApiResponse;

fn user_view(row: &SubscriptionUserRow, context: &str) -> UserView {
    UserView {
        id: row_uuid(&row.user_id, context),
        username: row.username.clone(),
    }
}

/// POST /api/subscriptions/{channelId}/toggle — channel existence is not
/// verified, only the ID format.
pub async fn toggle_subscription(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
    Extension(claims): Extension<Claims>,
) -> ApiResult<ApiResponse<ToggleResponse>> {
    let channel = parse_id(&channel_id, "Invalid channel ID")?;

    let relation_id = Uuid::new_v4();
    let subscriber_id = claims.sub.to_string();

    let db = state.clone();
    let created = run_blocking(move || {
        db.db
            .toggle_subscription(&relation_id.to_string(), &subscriber_id, &channel.to_string())
    })
    .await?;

    let (message, state_value) = if created {
        ("Subscribed successfully", ToggleState::Created)
    } else {
        ("Unsubscribed successfully", ToggleState::Removed)
    };

    Ok(ApiResponse::ok(message, ToggleResponse { state: state_value }))
}

/// GET /api/subscriptions/{channelId}/subscribers
pub async fn get_channel_subscribers(
    State(state): State<AppState>,
    Path(channel_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<SubscriberResponse>>> {
    let channel = parse_id(&channel_id, "Invalid channel ID")?;

    let db = state.clone();
    let rows = run_blocking(move || db.db.list_channel_subscribers(&channel.to_string())).await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("No subscribers found"));
    }

    let subscribers = rows
        .iter()
        .map(|row| SubscriberResponse {
            subscriber: user_view(row, "subscriber"),
            subscribed_at: row_time(&row.subscribed_at, "subscription"),
        })
        .collect();

    Ok(ApiResponse::ok("Subscribers fetched successfully", subscribers))
}

/// GET /api/subscriptions/user/{subscriberId}/channels
pub async fn get_subscribed_channels(
    State(state): State<AppState>,
    Path(subscriber_id): Path<String>,
) -> ApiResult<ApiResponse<Vec<SubscribedChannelResponse>>> {
    let subscriber = parse_id(&subscriber_id, "Invalid subscriber ID")?;

    let db = state.clone();
    let rows = run_blocking(move || db.db.list_subscribed_channels(&subscriber.to_string())).await?;

    if rows.is_empty() {
        return Err(ApiError::not_found("No subscriptions found"));
    }

    let channels = rows
        .iter()
        .map(|row| SubscribedChannelResponse {
            channel: user_view(row, "channel"),
            subscribed_at: row_time(&row.subscribed_at, "subscription"),
        })
        .collect();

    Ok(ApiResponse::ok(
        "Subscribed channels fetched successfully",
        channels,
    ))
}
