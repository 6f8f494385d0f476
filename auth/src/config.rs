use chrono::Duration;
use thiserror::Error;

/// Claim name carrying the user identity when none is configured.
pub const DEFAULT_IDENTITY_KEY: &str = "x-user-id";

/// Errors raised while assembling start-up configuration.
///
/// All of these are fatal: a process that cannot build its token or
/// identifier configuration must not start serving requests.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Token signing key is missing")]
    MissingSigningKey,

    #[error("Identity claim name is missing")]
    MissingIdentityKey,

    #[error("Token lifetime must be positive, got {0} seconds")]
    InvalidLifetime(i64),

    #[error("Resource identifier salt is missing")]
    MissingSalt,
}

/// Immutable settings for issuing and verifying session tokens.
///
/// Built once at start-up and handed by value to the component that signs
/// and parses tokens. There are no setters.
#[derive(Clone)]
pub struct TokenConfig {
    signing_key: Vec<u8>,
    identity_key: String,
    default_lifetime: Duration,
}

impl TokenConfig {
    /// Validate and build a token configuration.
    ///
    /// # Arguments
    /// * `signing_key` - HS256 secret
    /// * `identity_key` - Claim name under which the subject is stored
    /// * `default_lifetime` - Lifetime applied when no override is given
    ///
    /// # Errors
    /// * `MissingSigningKey` - Empty signing key
    /// * `MissingIdentityKey` - Empty or blank claim name
    /// * `InvalidLifetime` - Zero or negative lifetime
    pub fn new(
        signing_key: impl Into<Vec<u8>>,
        identity_key: impl Into<String>,
        default_lifetime: Duration,
    ) -> Result<Self, ConfigurationError> {
        let signing_key = signing_key.into();
        if signing_key.is_empty() {
            return Err(ConfigurationError::MissingSigningKey);
        }

        let identity_key = identity_key.into();
        if identity_key.trim().is_empty() {
            return Err(ConfigurationError::MissingIdentityKey);
        }

        if default_lifetime <= Duration::zero() {
            return Err(ConfigurationError::InvalidLifetime(
                default_lifetime.num_seconds(),
            ));
        }

        Ok(Self {
            signing_key,
            identity_key,
            default_lifetime,
        })
    }

    pub fn signing_key(&self) -> &[u8] {
        &self.signing_key
    }

    pub fn identity_key(&self) -> &str {
        &self.identity_key
    }

    pub fn default_lifetime(&self) -> Duration {
        self.default_lifetime
    }
}

// Keeps the signing key out of logs.
impl std::fmt::Debug for TokenConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TokenConfig")
            .field("signing_key", &"<redacted>")
            .field("identity_key", &self.identity_key)
            .field("default_lifetime", &self.default_lifetime)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_config() {
        let config = TokenConfig::new(
            "secret_key_at_least_32_bytes_long!",
            DEFAULT_IDENTITY_KEY,
            Duration::hours(2),
        )
        .expect("valid configuration");

        assert_eq!(config.signing_key(), b"secret_key_at_least_32_bytes_long!");
        assert_eq!(config.identity_key(), "x-user-id");
        assert_eq!(config.default_lifetime(), Duration::hours(2));
    }

    #[test]
    fn test_missing_signing_key() {
        let result = TokenConfig::new("", DEFAULT_IDENTITY_KEY, Duration::hours(2));
        assert_eq!(result.unwrap_err(), ConfigurationError::MissingSigningKey);
    }

    #[test]
    fn test_missing_identity_key() {
        let result = TokenConfig::new("secret", "  ", Duration::hours(2));
        assert_eq!(result.unwrap_err(), ConfigurationError::MissingIdentityKey);
    }

    #[test]
    fn test_non_positive_lifetime() {
        let result = TokenConfig::new("secret", DEFAULT_IDENTITY_KEY, Duration::zero());
        assert_eq!(result.unwrap_err(), ConfigurationError::InvalidLifetime(0));

        let result = TokenConfig::new("secret", DEFAULT_IDENTITY_KEY, Duration::seconds(-5));
        assert_eq!(result.unwrap_err(), ConfigurationError::InvalidLifetime(-5));
    }

    #[test]
    fn test_debug_redacts_key() {
        let config = TokenConfig::new("super-secret", "sub", Duration::hours(1)).unwrap();
        let printed = format!("{:?}", config);
        assert!(!printed.contains("super-secret"));
        assert!(printed.contains("<redacted>"));
    }
}
