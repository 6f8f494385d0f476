use async_trait::async_trait;
use auth::IssuedToken;

use crate::domain::pagination::Pagination;
use crate::domain::user::models::ChangePasswordCommand;
use crate::domain::user::models::CreateUserCommand;
use crate::domain::user::models::NewUser;
use crate::domain::user::models::UpdateUserCommand;
use crate::domain::user::models::User;
use crate::domain::user::models::UserId;
use crate::domain::user::models::UserPage;
use crate::user::errors::UserError;
use crate::user::models::Username;

/// Port for user domain service operations.
#[async_trait]
pub trait UserServicePort: Send + Sync + 'static {
    /// Register a new user.
    ///
    /// Hashes the password, allocates the record, then derives and attaches
    /// the public identifier.
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `Hashing` - Password hashing failed
    /// * `DatabaseError` - Database operation failed
    async fn create_user(&self, command: CreateUserCommand) -> Result<User, UserError>;

    /// Check credentials and issue a session token.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown username or wrong password
    /// * `DatabaseError` - Database operation failed
    async fn login(&self, username: &str, password: &str) -> Result<IssuedToken, UserError>;

    /// Exchange a currently valid token for one with a fresh lifetime.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Token is malformed, forged, or expired
    /// * `Token` - Token generation failed
    async fn refresh_token(&self, token: &str) -> Result<IssuedToken, UserError>;

    /// Replace the password of `target`, acting as `actor`.
    ///
    /// # Errors
    /// * `Forbidden` - `actor` is not `target`
    /// * `NotFound` - User does not exist
    /// * `InvalidCredentials` - Old password does not match
    /// * `DatabaseError` - Database operation failed
    async fn change_password(
        &self,
        actor: &UserId,
        target: &UserId,
        command: ChangePasswordCommand,
    ) -> Result<(), UserError>;

    /// Retrieve user by public identifier.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn get_user(&self, id: &UserId) -> Result<User, UserError>;

    /// Retrieve a page of users and the total user count.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list_users(&self, page: Pagination) -> Result<UserPage, UserError>;

    /// Update profile fields of `target`, acting as `actor`.
    ///
    /// # Errors
    /// * `Forbidden` - `actor` is not `target`
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update_user(
        &self,
        actor: &UserId,
        target: &UserId,
        command: UpdateUserCommand,
    ) -> Result<User, UserError>;

    /// Delete `target`, acting as `actor`.
    ///
    /// # Errors
    /// * `Forbidden` - `actor` is not `target`
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete_user(&self, actor: &UserId, target: &UserId) -> Result<(), UserError>;
}

/// Persistence operations for user aggregate.
///
/// Creating a user is two writes: `allocate` stores the record and returns
/// its key, `attach_public_id` stores the identifier derived from that key.
/// Until the second write succeeds the record is invisible to every finder;
/// callers undo a failed pair with `discard`.
#[async_trait]
pub trait UserRepository: Send + Sync + 'static {
    /// Store a new user record without a public identifier.
    ///
    /// # Returns
    /// The storage-assigned numeric key
    ///
    /// # Errors
    /// * `UsernameAlreadyExists` - Username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn allocate(&self, user: NewUser) -> Result<i64, UserError>;

    /// Attach the public identifier to an allocated record.
    ///
    /// # Errors
    /// * `NotFound` - No record with this key
    /// * `DatabaseError` - Database operation failed
    async fn attach_public_id(&self, key: i64, user_id: &UserId) -> Result<(), UserError>;

    /// Remove an allocated record whose identifier could not be attached.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn discard(&self, key: i64) -> Result<(), UserError>;

    /// Retrieve user by public identifier.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_user_id(&self, id: &UserId) -> Result<Option<User>, UserError>;

    /// Retrieve user by username.
    ///
    /// # Returns
    /// Optional user entity (None if not found)
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn find_by_username(&self, username: &Username) -> Result<Option<User>, UserError>;

    /// Retrieve users ordered by creation, newest first.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn list(&self, page: &Pagination) -> Result<Vec<User>, UserError>;

    /// Count users.
    ///
    /// # Errors
    /// * `DatabaseError` - Database operation failed
    async fn count(&self) -> Result<i64, UserError>;

    /// Update profile fields of an existing user.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `UsernameAlreadyExists` - New username is already taken
    /// * `DatabaseError` - Database operation failed
    async fn update(&self, user: User) -> Result<User, UserError>;

    /// Replace the stored password digest.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn update_password(&self, id: &UserId, password_hash: &str) -> Result<(), UserError>;

    /// Remove user from storage.
    ///
    /// # Errors
    /// * `NotFound` - User does not exist
    /// * `DatabaseError` - Database operation failed
    async fn delete(&self, id: &UserId) -> Result<(), UserError>;
}
