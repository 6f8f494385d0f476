use async_trait::async_trait;

use crate::domain::pagination::Pagination;
use crate::domain::post::errors::PostError;
use crate::domain::post::models::CreatePostCommand;
use crate::domain::post::models::NewPost;
use crate::domain::post::models::Post;
use crate::domain::post::models::PostId;
use crate::domain::post::models::PostPage;
use crate::domain::post::models::UpdatePostCommand;
use crate::domain::user::models::UserId;

/// Port for post domain service operations.
///
/// Every operation is scoped to `owner`; posts of other users behave as if
/// they did not exist.
#[async_trait]
pub trait PostServicePort: Send + Sync + 'static {
    /// Create a post owned by `owner`.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn create_post(&self, owner: &UserId, command: CreatePostCommand)
        -> Result<Post, PostError>;

    /// # Errors
    /// * `NotFound` - No such post for this owner
    /// * `DatabaseError` - Database operation failed
    async fn get_post(&self, owner: &UserId, id: &PostId) -> Result<Post, PostError>;

    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_posts(&self, owner: &UserId, page: Pagination) -> Result<PostPage, PostError>;

    /// # Errors
    /// * `NotFound` - No such post for this owner
    /// * `DatabaseError` - Database operation failed
    async fn update_post(
        &self,
        owner: &UserId,
        id: &PostId,
        command: UpdatePostCommand,
    ) -> Result<Post, PostError>;

    /// Delete the listed posts of `owner`. Unknown IDs are ignored.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn delete_posts(&self, owner: &UserId, ids: &[PostId]) -> Result<(), PostError>;
}

/// Persistence operations for posts.
///
/// Same two-write creation protocol as users: `allocate`, then
/// `attach_public_id`, with `discard` to undo a half-created record.
#[async_trait]
pub trait PostRepository: Send + Sync + 'static {
    /// # Returns
    /// The storage-assigned numeric key
    async fn allocate(&self, post: NewPost) -> Result<i64, PostError>;

    async fn attach_public_id(&self, key: i64, post_id: &PostId) -> Result<(), PostError>;

    async fn discard(&self, key: i64) -> Result<(), PostError>;

    async fn find(&self, owner: &UserId, id: &PostId) -> Result<Option<Post>, PostError>;

    /// Posts of `owner`, newest first.
    async fn list_by_owner(&self, owner: &UserId, page: &Pagination)
        -> Result<Vec<Post>, PostError>;

    async fn count_by_owner(&self, owner: &UserId) -> Result<i64, PostError>;

    /// # Errors
    /// * `NotFound` - Post does not exist
    async fn update(&self, post: Post) -> Result<Post, PostError>;

    /// # Returns
    /// Number of deleted posts
    async fn delete_many(&self, owner: &UserId, ids: &[PostId]) -> Result<u64, PostError>;
}
