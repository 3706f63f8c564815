use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;

use axum::{
    Router, middleware,
    routing::{get, patch, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::info;

use vidnest_api::auth::{self, AppState, AppStateInner};
use vidnest_api::middleware::{jwt_secret, require_auth};
use vidnest_api::storage::MediaStore;
use vidnest_api::{
    comments, dashboard, healthcheck, likes, playlists, storage, subscriptions, tweets, videos,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "vidnest=debug,tower_http=debug".into()),
        )
        .init();

    // Config
    let jwt_secret = jwt_secret();
    let db_path = std::env::var("VIDNEST_DB_PATH").unwrap_or_else(|_| "vidnest.db".into());
    let media_dir = std::env::var("VIDNEST_MEDIA_DIR").unwrap_or_else(|_| "media".into());
    let host = std::env::var("VIDNEST_HOST").unwrap_or_else(|_| "0.0.0.0".into());
    let port: u16 = std::env::var("VIDNEST_PORT")
        .unwrap_or_else(|_| "3000".into())
        .parse()?;

    // Init database
    let db = vidnest_db::Database::open(&PathBuf::from(&db_path))?;

    // Shared state
    let state: AppState = Arc::new(AppStateInner {
        db,
        jwt_secret,
        media: MediaStore::new(media_dir),
    });

    // Routes
    let public_routes = Router::new()
        .route("/api/healthcheck", get(healthcheck::healthcheck))
        .route("/api/auth/register", post(auth::register))
        .route("/api/auth/login", post(auth::login))
        .route("/api/media/{media_id}", get(storage::download))
        .with_state(state.clone());

    let protected_routes = Router::new()
        .route("/api/uploads", post(storage::upload))
        .route(
            "/api/videos",
            get(videos::list_videos).post(videos::publish_video),
        )
        .route(
            "/api/videos/{id}",
            get(videos::get_video)
                .patch(videos::update_video)
                .delete(videos::delete_video),
        )
        .route("/api/videos/{id}/publish", patch(videos::toggle_publish))
        .route(
            "/api/comments/{id}",
            get(comments::list_video_comments)
                .post(comments::add_comment)
                .patch(comments::update_comment)
                .delete(comments::delete_comment),
        )
        .route("/api/comments/{id}/like", post(comments::like_comment))
        .route("/api/comments/{id}/unlike", post(comments::unlike_comment))
        .route("/api/likes/video/{id}/toggle", post(likes::toggle_video_like))
        .route(
            "/api/likes/comment/{id}/toggle",
            post(likes::toggle_comment_like),
        )
        .route("/api/likes/tweet/{id}/toggle", post(likes::toggle_tweet_like))
        .route("/api/likes/videos", get(likes::get_liked_videos))
        .route(
            "/api/subscriptions/{channel_id}/toggle",
            post(subscriptions::toggle_subscription),
        )
        .route(
            "/api/subscriptions/{channel_id}/subscribers",
            get(subscriptions::get_channel_subscribers),
        )
        .route(
            "/api/subscriptions/user/{subscriber_id}/channels",
            get(subscriptions::get_subscribed_channels),
        )
        .route("/api/tweets", post(tweets::create_tweet))
        .route("/api/tweets/me", get(tweets::get_my_tweets))
        .route(
            "/api/tweets/{id}",
            patch(tweets::update_tweet).delete(tweets::delete_tweet),
        )
        .route("/api/playlists", post(playlists::create_playlist))
        .route(
            "/api/playlists/user/{user_id}",
            get(playlists::get_user_playlists),
        )
        .route(
            "/api/playlists/{id}",
            get(playlists::get_playlist_by_id)
                .patch(playlists::update_playlist)
                .delete(playlists::delete_playlist),
        )
        .route(
            "/api/playlists/{id}/videos/{video_id}",
            post(playlists::add_video_to_playlist).delete(playlists::remove_video_from_playlist),
        )
        .route(
            "/api/dashboard/{channel_id}/stats",
            get(dashboard::get_channel_stats),
        )
        .route(
            "/api/dashboard/{channel_id}/videos",
            get(dashboard::get_channel_videos),
        )
        .layer(middleware::from_fn(require_auth))
        .with_state(state);

    let app = Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", host, port).parse()?;
    info!("Vidnest server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    if let Err(err) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to install Ctrl+C handler: {}", err);
    }
}
