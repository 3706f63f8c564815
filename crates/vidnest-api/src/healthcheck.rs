use crate::response::ApiResponse;

/// GET /api/healthcheck — liveness probe, no auth, no persistence touch.
pub async fn healthcheck() -> ApiResponse<()> {
    ApiResponse::ok("API is healthy", ())
}
