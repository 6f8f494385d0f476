use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::PgPool;
use sqlx::Row;

use crate::domain::pagination::Pagination;
use crate::domain::user::models::EmailAddress;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::Nickname;
use crate::domain::user::models::PhoneNumber;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::Username;
use crate::domain::user::ports::UserRepository;
use crate::user::errors::UserError;

const USER_COLUMNS: &str =
    "id, user_id, username, password_hash, nickname, email, phone, created_at, updated_at";

pub struct PostgresUserRepository {
    pool: PgPool,
}

impl PostgresUserRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn map_write_error(e: sqlx::Error, username: &Username) -> UserError {
    if let Some(db_err) = e.as_database_error() {
        if db_err.is_unique_violation() && db_err.constraint() == Some("users_username_key") {
            return UserError::UsernameAlreadyExists(username.as_str().to_string());
        }
    }
    UserError::DatabaseError(e.to_string())
}

fn database_error(e: sqlx::Error) -> UserError {
    UserError::DatabaseError(e.to_string())
}

fn user_from_row(row: &PgRow) -> Result<User, UserError> {
    let user_id: String = row.try_get("user_id").map_err(database_error)?;
    let nickname: Option<String> = row.try_get("nickname").map_err(database_error)?;

    Ok(User {
        key: row.try_get("id").map_err(database_error)?,
        user_id: UserId::from_string(&user_id)?,
        username: Username::new(row.try_get("username").map_err(database_error)?)?,
        password_hash: row.try_get("password_hash").map_err(database_error)?,
        nickname: nickname.map(Nickname::new).transpose()?,
        email: EmailAddress::new(row.try_get("email").map_err(database_error)?)?,
        phone: PhoneNumber::new(row.try_get("phone").map_err(database_error)?)?,
        created_at: row.try_get("created_at").map_err(database_error)?,
        updated_at: row.try_get("updated_at").map_err(database_error)?,
    })
}

#[async_trait]
impl UserRepository for PostgresUserRepository {
    async fn allocate(&self, user: NewUser) -> Result<i64, UserError> {
        let row = sqlx::query(
            r#"
            INSERT INTO users (username, password_hash, nickname, email, phone, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $6)
            RETURNING id
            "#,
        )
        .bind(user.username.as_str())
        .bind(&user.password_hash)
        .bind(user.nickname.as_ref().map(|n| n.as_str()))
        .bind(user.email.as_str())
        .bind(user.phone.as_str())
        .bind(user.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.username))?;

        row.try_get("id").map_err(database_error)
    }

    async fn attach_public_id(&self, key: i64, user_id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query("UPDATE users SET user_id = $1 WHERE id = $2")
            .bind(user_id.as_str())
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(key.to_string()));
        }

        Ok(())
    }

    async fn discard(&self, key: i64) -> Result<(), UserError> {
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(key)
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        Ok(())
    }

    async fn find_by_user_id(&self, id: &UserId) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE user_id = $1",
            USER_COLUMNS
        ))
        .bind(id.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError> {
        let row = sqlx::query(&format!(
            "SELECT {} FROM users WHERE username = $1 AND user_id IS NOT NULL",
            USER_COLUMNS
        ))
        .bind(username.as_str())
        .fetch_optional(&self.pool)
        .await
        .map_err(database_error)?;

        row.as_ref().map(user_from_row).transpose()
    }

    async fn list(&self, page: &Pagination) -> Result<Vec<User>, UserError> {
        let rows = sqlx::query(&format!(
            "SELECT {} FROM users WHERE user_id IS NOT NULL \
             ORDER BY created_at DESC, id DESC OFFSET $1 LIMIT $2",
            USER_COLUMNS
        ))
        .bind(page.offset)
        .bind(page.limit)
        .fetch_all(&self.pool)
        .await
        .map_err(database_error)?;

        rows.iter().map(user_from_row).collect()
    }

    async fn count(&self) -> Result<i64, UserError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM users WHERE user_id IS NOT NULL")
            .fetch_one(&self.pool)
            .await
            .map_err(database_error)
    }

    async fn update(&self, user: User) -> Result<User, UserError> {
        let result = sqlx::query(
            r#"
            UPDATE users
            SET username = $1, nickname = $2, email = $3, phone = $4, updated_at = $5
            WHERE user_id = $6
            "#,
        )
        .bind(user.username.as_str())
        .bind(user.nickname.as_ref().map(|n| n.as_str()))
        .bind(user.email.as_str())
        .bind(user.phone.as_str())
        .bind(user.updated_at)
        .bind(user.user_id.as_str())
        .execute(&self.pool)
        .await
        .map_err(|e| map_write_error(e, &user.username))?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(user.user_id.to_string()));
        }

        Ok(user)
    }

    async fn update_password(&self, id: &UserId, password_hash: &str) -> Result<(), UserError> {
        let result =
            sqlx::query("UPDATE users SET password_hash = $1, updated_at = NOW() WHERE user_id = $2")
                .bind(password_hash)
                .bind(id.as_str())
                .execute(&self.pool)
                .await
                .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }

    async fn delete(&self, id: &UserId) -> Result<(), UserError> {
        let result = sqlx::query("DELETE FROM users WHERE user_id = $1")
            .bind(id.as_str())
            .execute(&self.pool)
            .await
            .map_err(database_error)?;

        if result.rows_affected() == 0 {
            return Err(UserError::NotFound(id.to_string()));
        }

        Ok(())
    }
}
