use std::sync::Arc;

use async_trait::async_trait;
use auth::AuthenticationError;
use auth::Authenticator;
use auth::IdGenerator;
use auth::IssuedToken;
use auth::PasswordError;
use auth::ResourceKind;
use auth::TokenError;
use chrono::Utc;

use crate::domain::pagination::Pagination;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::domain::user::models::Username;
use crate::user::errors::UserError;
use crate::user::ports::UserRepository;
use crate::user::ports::UserServicePort;

/// Domain service implementation for user operations.
///
/// Password hashing and verification run on the blocking thread pool.
pub struct UserService<UR>
where
    UR: UserRepository,
{
    repository: Arc<UR>,
    authenticator: Arc<Authenticator>,
    id_generator: Arc<IdGenerator>,
}

impl<UR> UserService<UR>
where
    UR: UserRepository,
{
    /// Create a new user service with injected dependencies.
    ///
    /// # Arguments
    /// * `repository` - User persistence implementation
    /// * `authenticator` - Password hashing and token issuing
    /// * `id_generator` - Public identifier derivation
    pub fn new(
        repository: Arc<UR>,
        authenticator: Arc<Authenticator>,
        id_generator: Arc<IdGenerator>,
    ) -> Self {
        Self {
            repository,
            authenticator,
            id_generator,
        }
    }

    async fn hash_password(&self, password: String) -> Result<String, UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.hash_password(&password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password hashing task failed: {}", e)))?
            .map_err(|e| UserError::Hashing(e.to_string()))
    }

    async fn verify_password(&self, digest: String, password: String) -> Result<(), UserError> {
        let authenticator = Arc::clone(&self.authenticator);

        tokio::task::spawn_blocking(move || authenticator.verify_password(&digest, &password))
            .await
            .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?
            .map_err(|e| match e {
                PasswordError::Mismatch => UserError::InvalidCredentials,
                other => UserError::Hashing(other.to_string()),
            })
    }

    async fn find_existing(&self, id: &UserId) -> Result<User, UserError> {
        self.repository
            .find_by_user_id(id)
            .await?
            .ok_or(UserError::NotFound(id.to_string()))
    }
}

fn ensure_owner(actor: &UserId, target: &UserId) -> Result<(), UserError> {
    if actor == target {
        Ok(())
    } else {
        tracing::warn!(actor = %actor, target = %target, "Rejected operation on another user");
        Err(UserError::Forbidden(target.to_string()))
    }
}

#[async_trait]
impl<UR> UserServicePort for UserService<UR>
where
    UR: UserRepository,
{
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError> {
        let password_hash = self.hash_password(command.password.into_inner()).await?;

        let new_user = NewUser {
            username: command.username,
            password_hash,
            nickname: command.nickname,
            email: command.email,
            phone: command.phone,
            created_at: Utc::now(),
        };

        let key = self.repository.allocate(new_user.clone()).await?;
        let counter = u64::try_from(key)
            .map_err(|_| UserError::DatabaseError(format!("Negative record key {}", key)))?;
        let user_id = UserId::generated(self.id_generator.generate(ResourceKind::User, counter));

        if let Err(e) = self.repository.attach_public_id(key, &user_id).await {
            tracing::error!(key, error = %e, "Failed to attach user ID, discarding record");
            if let Err(rollback) = self.repository.discard(key).await {
                tracing::error!(key, error = %rollback, "Failed to discard user record");
            }
            return Err(e);
        }

        tracing::info!(user_id = %user_id, "User created");
        Ok(User::from_new(key, user_id, new_user))
    }

    async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, UserError> {
        let user = match Username::new(username.to_string()) {
            Ok(username) => self.repository.find_by_username(&username).await?,
            Err(_) => None,
        };

        let stored = user.map(|u| (u.password_hash, u.user_id.to_string()));
        let authenticator = Arc::clone(&self.authenticator);
        let password = password.to_string();

        let result = tokio::task::spawn_blocking(move || match &stored {
            Some((hash, subject)) => {
                authenticator.authenticate(&password, Some(hash.as_str()), subject)
            }
            None => authenticator.authenticate(&password, None, ""),
        })
        .await
        .map_err(|e| UserError::Unknown(format!("Password verification task failed: {}", e)))?;

        result.map_err(|e| match e {
            AuthenticationError::InvalidCredentials => {
                tracing::warn!(username, "Login rejected");
                UserError::InvalidCredentials
            }
            AuthenticationError::PasswordError(err) => UserError::Hashing(err.to_string()),
            AuthenticationError::TokenError(err) => UserError::Token(err.to_string()),
        })
    }

    async fn refresh_token(&self, token: &str) -> Result<IssuedToken, UserError> {
        self.authenticator.refresh(token).map_err(|e| match e {
            TokenError::EncodingFailed(_) | TokenError::LifetimeOutOfRange(_) => {
                UserError::Token(e.to_string())
            }
            TokenError::Malformed(_) | TokenError::InvalidSignature | TokenError::Expired => {
                tracing::warn!(error = %e, "Token refresh rejected");
                UserError::InvalidCredentials
            }
        })
    }

    async fn change_password(
        &self,
        actor: &UserId,
        target: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError> {
        ensure_owner(actor, target)?;
        let user = self.find_existing(target).await?;

        self.verify_password(user.password_hash, command.old_password)
            .await?;
        let password_hash = self.hash_password(command.new_password.into_inner()).await?;

        self.repository
            .update_password(target, &password_hash)
            .await?;

        tracing::info!(user_id = %target, "Password changed");
        Ok(())
    }

    async fn get_user(&self, id: &UserId) -> Result<User, UserError> {
        self.find_existing(id).await
    }

    async fn list_users(&self, page: Pagination) -> Result<UserPage, UserError> {
        let total_count = self.repository.count().await?;
        let users = self.repository.list(&page).await?;

        Ok(UserPage { total_count, users })
    }

    async fn update_user(
        &self,
        actor: &UserId,
        target: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError> {
        ensure_owner(actor, target)?;
        let mut user = self.find_existing(target).await?;

        if let Some(username) = command.username {
            user.username = username;
        }

        if let Some(nickname) = command.nickname {
            user.nickname = Some(nickname);
        }

        if let Some(email) = command.email {
            user.email = email;
        }

        if let Some(phone) = command.phone {
            user.phone = phone;
        }

        user.updated_at = Utc::now();
        self.repository.update(user).await
    }

    async fn delete_user(&self, actor: &UserId, target: &UserId) -> Result<(), UserError> {
        ensure_owner(actor, target)?;
        self.repository.delete(target).await?;

        tracing::info!(user_id = %target, "User deleted");
        Ok(())
    }
}
