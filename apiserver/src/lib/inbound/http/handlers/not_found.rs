use super::ApiError;

/// Fallback for requests that match no route.
pub async fn not_found() -> ApiError {
    ApiError::NotFound("Page not found".to_string())
}
