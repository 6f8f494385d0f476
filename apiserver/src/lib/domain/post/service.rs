use std::sync::Arc;

use async_trait::async_trait;
use auth::IdGenerator;
use auth::ResourceKind;
use chrono::Utc;

use crate::domain::pagination::Pagination;
use crate::domain::post::errors::PostError;
use crate::domain::post::models::CreatePostCommand;
use crate::domain::post::models::NewPost;
use crate::domain::post::models::Post;
use crate::domain::post::models::PostId;
use crate::domain::post::models::PostPage;
use crate::domain::post::models::UpdatePostCommand;
use crate::domain::post::ports::PostRepository;
use crate::domain::post::ports::PostServicePort;
use crate::domain::user::models::UserId;

/// Domain service implementation for post operations.
pub struct PostService<PR>
where
    PR: PostRepository,
{
    repository: Arc<PR>,
    id_generator: Arc<IdGenerator>,
}

impl<PR> PostService<PR>
where
    PR: PostRepository,
{
    pub fn new(repository: Arc<PR>, id_generator: Arc<IdGenerator>) -> Self {
        Self {
            repository,
            id_generator,
        }
    }

    async fn find_existing(&self, owner: &UserId, id: &PostId) -> Result<Post, PostError> {
        self.repository
            .find(owner, id)
            .await?
            .ok_or(PostError::NotFound(id.to_string()))
    }
}

#[async_trait]
impl<PR> PostServicePort for PostService<PR>
where
    PR: PostRepository,
{
    async fn create_post(
        &self,
        owner: &UserId,
        command: CreatePostCommand,
    ) -> Result<Post, PostError> {
        let new_post = NewPost {
            owner: owner.clone(),
            title: command.title,
            content: command.content,
            created_at: Utc::now(),
        };

        let key = self.repository.allocate(new_post.clone()).await?;
        let counter = u64::try_from(key)
            .map_err(|_| PostError::DatabaseError(format!("Negative record key {}", key)))?;
        let post_id = PostId::generated(self.id_generator.generate(ResourceKind::Post, counter));

        if let Err(e) = self.repository.attach_public_id(key, &post_id).await {
            tracing::error!(key, error = %e, "Failed to attach post ID, discarding record");
            if let Err(rollback) = self.repository.discard(key).await {
                tracing::error!(key, error = %rollback, "Failed to discard post record");
            }
            return Err(e);
        }

        tracing::info!(post_id = %post_id, owner = %owner, "Post created");
        Ok(Post::from_new(key, post_id, new_post))
    }

    async fn get_post(&self, owner: &UserId, id: &PostId) -> Result<Post, PostError> {
        self.find_existing(owner, id).await
    }

    async fn list_posts(&self, owner: &UserId, page: Pagination) -> Result<PostPage, PostError> {
        let total_count = self.repository.count_by_owner(owner).await?;
        let posts = self.repository.list_by_owner(owner, &page).await?;

        Ok(PostPage { total_count, posts })
    }

    async fn update_post(
        &self,
        owner: &UserId,
        id: &PostId,
        command: UpdatePostCommand,
    ) -> Result<Post, PostError> {
        let mut post = self.find_existing(owner, id).await?;

        if let Some(title) = command.title {
            post.title = title;
        }

        if let Some(content) = command.content {
            post.content = content;
        }

        post.updated_at = Utc::now();
        self.repository.update(post).await
    }

    async fn delete_posts(&self, owner: &UserId, ids: &[PostId]) -> Result<(), PostError> {
        if ids.is_empty() {
            return Ok(());
        }

        let deleted = self.repository.delete_many(owner, ids).await?;
        tracing::info!(owner = %owner, requested = ids.len(), deleted, "Posts deleted");
        Ok(())
    }
}
