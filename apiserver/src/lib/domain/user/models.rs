use std::fmt;
use std::str::FromStr;

use auth::ResourceKind;
use chrono::DateTime;
use chrono::Utc;

use crate::user::errors::EmailError;
use crate::user::errors::NicknameError;
use crate::user::errors::PasswordPolicyError;
use crate::user::errors::PhoneError;
use crate::user::errors::UserIdError;
use crate::user::errors::UsernameError;

/// User aggregate entity.
///
/// `key` is the internal storage key and never leaves the service; `user_id`
/// is the public identifier derived from it.
#[derive(Debug, Clone)]
pub struct User {
    pub key: i64,
    pub user_id: UserId,
    pub username: Username,
    pub password_hash: String,
    pub nickname: Option<Nickname>,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl User {
    /// Assemble the entity once the record has its key and public identifier.
    pub fn from_new(key: i64, user_id: UserId, new_user: NewUser) -> Self {
        Self {
            key,
            user_id,
            username: new_user.username,
            password_hash: new_user.password_hash,
            nickname: new_user.nickname,
            email: new_user.email,
            phone: new_user.phone,
            created_at: new_user.created_at,
            updated_at: new_user.created_at,
        }
    }
}

/// User record before storage has allocated its key.
#[derive(Debug, Clone)]
pub struct NewUser {
    pub username: Username,
    pub password_hash: String,
    pub nickname: Option<Nickname>,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
    pub created_at: DateTime<Utc>,
}

/// Public user identifier, `user-` followed by a six character code.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct UserId(String);

impl UserId {
    /// Parse a user ID received from a client or a token.
    ///
    /// # Errors
    /// * `InvalidFormat` - Not of the form `user-XXXXXX`
    pub fn from_string(s: &str) -> Result<Self, UserIdError> {
        let code = s
            .strip_prefix(ResourceKind::User.prefix())
            .and_then(|rest| rest.strip_prefix('-'))
            .ok_or_else(|| UserIdError::InvalidFormat(s.to_string()))?;

        if code.len() == auth::rid::CODE_LENGTH && code.chars().all(|c| c.is_ascii_alphanumeric())
        {
            Ok(Self(s.to_string()))
        } else {
            Err(UserIdError::InvalidFormat(s.to_string()))
        }
    }

    /// Wrap an identifier produced by the ID generator.
    pub fn generated(id: String) -> Self {
        Self(id)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Username value type
///
/// Ensures username is 4-32 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Username(String);

impl Username {
    const MIN_LENGTH: usize = 4;
    const MAX_LENGTH: usize = 32;

    /// Create a new valid username.
    ///
    /// # Errors
    /// * `TooShort` - Username shorter than 4 characters
    /// * `TooLong` - Username longer than 32 characters
    pub fn new(username: String) -> Result<Self, UsernameError> {
        let username = Self::with_valid_length(username)?;
        Ok(Self(username))
    }

    fn with_valid_length(username: String) -> Result<String, UsernameError> {
        let length = username.chars().count();
        if length < Self::MIN_LENGTH {
            Err(UsernameError::TooShort {
                min: Self::MIN_LENGTH,
                actual: length,
            })
        } else if length > Self::MAX_LENGTH {
            Err(UsernameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(username)
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Username {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Plaintext password accepted for a new credential.
///
/// Only lives long enough to be hashed. Debug output is redacted.
#[derive(Clone, PartialEq, Eq)]
pub struct Password(String);

impl Password {
    const MIN_LENGTH: usize = 8;
    const MAX_LENGTH: usize = 64;

    /// # Errors
    /// * `TooShort` - Fewer than 8 characters
    /// * `TooLong` - More than 64 characters
    pub fn new(password: String) -> Result<Self, PasswordPolicyError> {
        let length = password.chars().count();
        if length < Self::MIN_LENGTH {
            Err(PasswordPolicyError::TooShort {
                min: Self::MIN_LENGTH,
            })
        } else if length > Self::MAX_LENGTH {
            Err(PasswordPolicyError::TooLong {
                max: Self::MAX_LENGTH,
            })
        } else {
            Ok(Self(password))
        }
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Debug for Password {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Password(<redacted>)")
    }
}

/// Optional display name, at most 32 characters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Nickname(String);

impl Nickname {
    const MAX_LENGTH: usize = 32;

    pub fn new(nickname: String) -> Result<Self, NicknameError> {
        let length = nickname.chars().count();
        if length > Self::MAX_LENGTH {
            Err(NicknameError::TooLong {
                max: Self::MAX_LENGTH,
                actual: length,
            })
        } else {
            Ok(Self(nickname))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Email address type
///
/// Validates email format using RFC 5322 compliant parser.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmailAddress(String);

impl EmailAddress {
    /// # Errors
    /// * `InvalidFormat` - Email does not conform to RFC 5322
    pub fn new(email: String) -> Result<Self, EmailError> {
        email_address::EmailAddress::from_str(&email)
            .map(|_| EmailAddress(email))
            .map_err(|e| EmailError::InvalidFormat(e.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Contact phone number. Only presence and length are checked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PhoneNumber(String);

impl PhoneNumber {
    const MAX_LENGTH: usize = 32;

    pub fn new(phone: String) -> Result<Self, PhoneError> {
        let phone = phone.trim().to_string();
        if phone.is_empty() {
            Err(PhoneError::Empty)
        } else if phone.chars().count() > Self::MAX_LENGTH {
            Err(PhoneError::TooLong {
                max: Self::MAX_LENGTH,
            })
        } else {
            Ok(Self(phone))
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Command to create a new user with domain types
#[derive(Debug)]
pub struct CreateUserCommand {
    pub username: Username,
    pub password: Password,
    pub nickname: Option<Nickname>,
    pub email: EmailAddress,
    pub phone: PhoneNumber,
}

/// Command to update an existing user with optional validated fields.
///
/// Only provided fields will be updated. Passwords change through
/// [`ChangePasswordCommand`].
#[derive(Debug, Default)]
pub struct UpdateUserCommand {
    pub username: Option<Username>,
    pub nickname: Option<Nickname>,
    pub email: Option<EmailAddress>,
    pub phone: Option<PhoneNumber>,
}

/// Command to replace a user's password.
#[derive(Debug)]
pub struct ChangePasswordCommand {
    pub old_password: String,
    pub new_password: Password,
}

/// One page of users plus the total number of users.
#[derive(Debug, Clone)]
pub struct UserPage {
    pub total_count: i64,
    pub users: Vec<User>,
}
