use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::pagination::Pagination;
use crate::domain::post::errors::PostError;
use crate::domain::post::models::Content;
use crate::domain::post::models::NewPost;
use crate::domain::post::models::Post;
use crate::domain::post::models::PostId;
use crate::domain::post::models::Title;
use crate::domain::post::ports::PostRepository;
use crate::domain::user::models::UserId;

const POST_COLUMNS: &str = "id, post_id, user_id, title, content, created_at, updated_at";

pub struct PostgresPostRepository {
    pool: PgPool,
}

impl PostgresPostRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn database_error(e: sqlx::Error) -> PostError {
    PostError::DatabaseError(e.to_string())
}

fn post_from_row(row: &PgRow) -> Result<Post, PostError> {
    let post_id: String = row.try_get("post_id").map_err(database_error)?;
    let owner: String = row.try_get("user_id").map_err(database_error)?;

    Ok(Post {
        key: row.try_get("id").map_err(database_error)?,
        post_id: PostId::from_string(&post_id)?,
        owner: UserId::from_string(&owner)
            .map_err(|e| PostError::DatabaseError(format!("Corrupt owner column: {}", e)))?,
        title: Title::new(row.try_get("title").map_err(database_error)?)?,
        content: Content::new(row.try_get("content").map_err(database_error)?)?,
        created_at: row.try_get("created_at").map_err(database_error)?,
        updated_at: row.try_get("updated_at").map_err(database_error)?,
    })
}

#[async_trait]
impl PostRepository for PostgresPostRepository {
    async fn allocate(&self, post: NewPost) -> Result<i64, PostError> {
        let row = sqlx::query(
            r#"
            INSERT INTO posts (user_id, title, content, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id
            "#,
        )
        .bind(post.owner.as_str())
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(database_error)?;

        row.try_get("id").map_err(database_error)
    }

    async fn attach_public_id(&self, key: i64, post_id: &PostId) -> Result<(), PostError> {
        let result = sqlx::query("UPDATE posts SET post_id = $1 WHERE id = $2")
            .bind(post_id.as_str())
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(PostError::NotFound(key.to_string()));
        }

        Ok(())
    }

    async fn discard(&self, key: i64) -> Result<(), PostError> {
        sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }

    async fn find(&self, owner: &UserId, id: &PostId) -> Result<Option<Post>, PostError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE post_id = $1 AND user_id = $2",
            POST_COLUMNS
        ))
        .bind(id.as_str())
        .bind(owner.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(post_from_row).transpose()
    }

    async fn list_by_owner(
        &self,
        owner: &UserId,
        page: &Pagination,
    ) -> Result<Vec<Post>, PostError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM posts WHERE user_id = $1 AND post_id IS NOT NULL \
             ORDER BY created_at DESC, id DESC OFFSET $2 LIMIT $3",
            POST_COLUMNS
        ))
        .bind(owner.as_str())
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.iter().map(post_from_row).collect()
    }

    async fn count_by_owner(&self, owner: &UserId) -> Result<i64, PostError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM posts WHERE user_id = $1 AND post_id IS NOT NULL")
            .bind(owner.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }

    async fn update(&self, post: Post) -> Result<Post, PostError> {
        let result = sqlx::query(
            r#"
            UPDATE posts
            SET title = $1, content = $2, updated_at = $3
            WHERE post_id = $4 AND user_id = $5
            "#,
        )
        .bind(post.title.as_str())
        .bind(post.content.as_str())
        .bind(post.updated_at)
        .bind(post.post_id.as_str())
        .bind(post.owner.as_str())
        .execute(&self.pool)
        .await
        .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(PostError::NotFound(post.post_id.to_string()));
        }

        Ok(post)
    }

    async fn delete_many(&self, owner: &UserId, ids: &[PostId]) -> Result<u64, PostError> {
        let ids: Vec<String> = ids.iter().map(|id| id.as_str().to_string()).collect();

        let result = sqlx::query("DELETE FROM posts WHERE user_id = $1 AND post_id = ANY($2)")
            .bind(owner.as_str())
            .bind(ids)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(result.rows_affected())
    }
}
