use axum::extract::Query;
use axum::extract::State;
use axum::http::StatusCode;
use axum::Extension;
use serde::Serialize;

use super::ApiError;
use super::ApiSuccess;
use super::ListQuery;
use super::PostData;
use crate::domain::post::ports::PostServicePort;
use crate::inbound::http::middleware::AuthenticatedUser;
use crate::inbound::http::router::AppState;

pub async fn list_posts(
    State(state): State<AppState>,
    Extension(auth_user): Extension<AuthenticatedUser>,
    Query(query): Query<ListQuery>,
) -> Result<ApiSuccess<ListPostsResponseData>, ApiError> {
    state
        .post_service
        .list_posts(&auth_user.user_id, query.into())
        .await
        .map_err(ApiError::from)
        .map(|page| {
            ApiSuccess::new(
                StatusCode::OK,
                ListPostsResponseData {
                    total_count: page.total_count,
                    posts: page.posts.iter().map(PostData::from).collect(),
                },
            )
        })
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ListPostsResponseData {
    pub total_count: i64,
    pub posts: Vec<PostData>,
}
