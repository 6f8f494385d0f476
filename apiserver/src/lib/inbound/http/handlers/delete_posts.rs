use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use axum::Json;
use serde::Deserialize;

use super::ApiError;
use super::ApiSuccess;
use crate::domain::post::models::PostId;
use crate::domain::post::ports::PostServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

/// Batch delete of the caller's posts. IDs the caller does not own are ignored.
pub async fn delete_posts(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Json(body): Json<DeletePostsRequest>,
) -> Result<ApiSuccess<()>, ApiError> {
    let ids = body
        .post_ids
        .iter()
        .map(|id| PostId::from_string(id))
        .collect::<Result<Vec<_>, _>>()
        .map_err(|e| ApiError::UnprocessableEntity(e.to_string()))?;

    state
        .post_service
        .delete_posts(&auth_user.user_id, &ids)
        .await
        .map_err(ApiError::from)
        .map(|_| ApiSuccess::new(StatusCode::OK, ()))
}

#[derive(Debug, Deserialize)]
pub struct DeletePostsRequest {
    #[serde(rename = "postIDs")]
    post_ids: Vec<String>,
}
