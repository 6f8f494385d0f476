//! Identity and access core
//!
//! Provides the security-sensitive building blocks of the API server:
//! - Password hashing (Argon2id, fixed work factor)
//! - Session token issuing, parsing and refresh (HS256 JWT)
//! - Token configuration, validated once and owned by the authenticator
//! - Opaque public identifiers derived from numeric record keys
//!
//! # Examples
//!
//! ## Password Hashing
//! ```
//! use auth::PasswordHasher;
//!
//! let hasher = PasswordHasher::new();
//! let hash = hasher.hash("my_password").unwrap();
//! assert!(hasher.verify(&hash, "my_password").is_ok());
//! ```
//!
//! ## Session Tokens
//! ```
//! use auth::{Authenticator, TokenConfig};
//! use chrono::Duration;
//!
//! let config = TokenConfig::new(
//!     "secret_key_at_least_32_bytes_long!",
//!     "x-user-id",
//!     Duration::hours(2),
//! )
//! .unwrap();
//! let auth = Authenticator::new(config);
//!
//! let issued = auth.issue("user-w6hbvo").unwrap();
//! let session = auth.parse(&issued.token).unwrap();
//! assert_eq!(session.subject, "user-w6hbvo");
//! ```
//!
//! ## Public Identifiers
//! ```
//! use auth::{IdGenerator, ResourceKind};
//!
//! let ids = IdGenerator::new("process-wide-salt").unwrap();
//! let id = ids.generate(ResourceKind::User, 42);
//! assert!(id.starts_with("user-"));
//! assert_eq!(id.len(), "user-".len() + 6);
//! ```

pub mod authenticator;
pub mod config;
pub mod jwt;
pub mod password;
pub mod rid;

// Re-export commonly used items
pub use authenticator::AuthenticationError;
pub use authenticator::Authenticator;
pub use authenticator::IssuedToken;
pub use authenticator::SessionClaims;
pub use config::ConfigurationError;
pub use config::TokenConfig;
pub use jwt::Claims;
pub use jwt::JwtHandler;
pub use jwt::TokenError;
pub use password::PasswordError;
pub use password::PasswordHasher;
pub use rid::IdGenerator;
pub use rid::ResourceKind;
