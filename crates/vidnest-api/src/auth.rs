use std::sync::Arc;

use argon2::{
    Argon2, PasswordHash, PasswordHasher, PasswordVerifier,
    password_hash::{SaltString, rand_core::OsRng},
};
use axum::{Json, extract::State};
use jsonwebtoken::{EncodingKey, Header, encode};
use uuid::Uuid;

use vidnest_db::Database;
use vidnest_types::api::{Claims, LoginRequest, LoginResponse, RegisterRequest, RegisterResponse};
use vidnest_types::models::Role;

use crate::error::{ApiError, ApiResult, run_blocking};
use crate::response::ApiResponse;
use crate::storage::MediaStore;

pub type AppState = Arc<AppStateInner>;

pub struct AppStateInner {
    pub db: Database,
    pub jwt_secret: String,
    pub media: MediaStore,
}

pub async fn register(
    State(state): State<AppState>,
    Json(req): Json<RegisterRequest>,
) -> ApiResult<ApiResponse<RegisterResponse>> {
    // Validate input
    if req.username.len() < 3 || req.username.len() > 32 {
        return Err(ApiError::invalid("Username must be 3-32 characters"));
    }
    if req.password.len() < 8 {
        return Err(ApiError::invalid("Password must be at least 8 characters"));
    }

    // Check if username is taken
    let db = state.clone();
    let username = req.username.clone();
    if run_blocking(move || db.db.get_user_by_username(&username))
        .await?
        .is_some()
    {
        return Err(ApiError::conflict("Username already exists"));
    }

    // Hash password with Argon2id
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::default();
    let password_hash = argon2
        .hash_password(req.password.as_bytes(), &salt)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("password hashing failed: {e}")))?
        .to_string();

    let user_id = Uuid::new_v4();

    let db = state.clone();
    let username = req.username.clone();
    run_blocking(move || {
        db.db
            .create_user(&user_id.to_string(), &username, &password_hash, Role::User.as_str())
    })
    .await?;

    let token = create_token(&state.jwt_secret, user_id, &req.username, Role::User)?;

    Ok(ApiResponse::created(
        "User registered successfully",
        RegisterResponse { user_id, token },
    ))
}

pub async fn login(
    State(state): State<AppState>,
    Json(req): Json<LoginRequest>,
) -> ApiResult<ApiResponse<LoginResponse>> {
    let db = state.clone();
    let username = req.username.clone();
    let user = run_blocking(move || db.db.get_user_by_username(&username))
        .await?
        .ok_or_else(|| ApiError::unauthorized("Invalid credentials"))?;

    // Verify password
    let parsed_hash = PasswordHash::new(&user.password)
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("stored hash unreadable: {e}")))?;

    Argon2::default()
        .verify_password(req.password.as_bytes(), &parsed_hash)
        .map_err(|_| ApiError::unauthorized("Invalid credentials"))?;

    let user_id: Uuid = user
        .id
        .parse()
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("corrupt user id '{}': {e}", user.id)))?;

    let token = create_token(&state.jwt_secret, user_id, &user.username, Role::parse(&user.role))?;

    Ok(ApiResponse::ok(
        "Logged in successfully",
        LoginResponse {
            user_id,
            username: user.username,
            token,
        },
    ))
}

fn create_token(secret: &str, user_id: Uuid, username: &str, role: Role) -> ApiResult<String> {
    let claims = Claims {
        sub: user_id,
        username: username.to_string(),
        role,
        exp: (chrono::Utc::now() + chrono::Duration::days(30)).timestamp() as usize,
    };

    let token = encode(
        &Header::default(),
        &claims,
        &EncodingKey::from_secret(secret.as_bytes()),
    )
    .map_err(|e| ApiError::Internal(anyhow::anyhow!("token encoding failed: {e}")))?;

    Ok(token)
}
