use chrono::DateTime;
use chrono::Duration;
use chrono::SubsecRound;
use chrono::Utc;

use crate::config::TokenConfig;
use crate::jwt::Claims;
use crate::jwt::JwtHandler;
use crate::jwt::TokenError;
use crate::password::PasswordError;
use crate::password::PasswordHasher;

/// Authentication coordinator combining password verification and session
/// token handling.
///
/// Owns its [`TokenConfig`]; share it behind an `Arc` once built.
pub struct Authenticator {
    password_hasher: PasswordHasher,
    jwt_handler: JwtHandler,
    config: TokenConfig,
}

/// A freshly signed session token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IssuedToken {
    pub token: String,
    pub expire_at: DateTime<Utc>,
}

/// Claims of a token that passed every check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionClaims {
    pub subject: String,
    pub issued_at: Option<DateTime<Utc>>,
    pub expire_at: DateTime<Utc>,
}

/// Authentication operation errors.
#[derive(Debug, Clone, thiserror::Error)]
pub enum AuthenticationError {
    #[error("Invalid credentials")]
    InvalidCredentials,

    #[error("Password error: {0}")]
    PasswordError(#[from] PasswordError),

    #[error("Token error: {0}")]
    TokenError(#[from] TokenError),
}

impl Authenticator {
    /// Create a new authenticator with the default password work factor.
    pub fn new(config: TokenConfig) -> Self {
        Self::with_password_hasher(config, PasswordHasher::new())
    }

    /// Create an authenticator with a specific password hasher.
    pub fn with_password_hasher(config: TokenConfig, password_hasher: PasswordHasher) -> Self {
        Self {
            password_hasher,
            jwt_handler: JwtHandler::new(config.signing_key()),
            config,
        }
    }

    /// Claim name the subject is stored under.
    pub fn identity_key(&self) -> &str {
        self.config.identity_key()
    }

    pub fn default_lifetime(&self) -> Duration {
        self.config.default_lifetime()
    }

    /// Hash a password for storage.
    ///
    /// # Errors
    /// * `HashingFailed` - Hashing operation failed
    pub fn hash_password(&self, password: &str) -> Result<String, PasswordError> {
        self.password_hasher.hash(password)
    }

    /// Verify a password against a stored digest.
    ///
    /// # Errors
    /// * `Mismatch` - Password does not match
    /// * `InvalidDigest` - Stored digest is unreadable
    pub fn verify_password(&self, digest: &str, password: &str) -> Result<(), PasswordError> {
        self.password_hasher.verify(digest, password)
    }

    /// Verify credentials and issue a session token.
    ///
    /// `stored_hash` is `None` when the account does not exist; the password
    /// is then checked against a placeholder digest so both failures cost the
    /// same and surface as the same error.
    ///
    /// # Errors
    /// * `InvalidCredentials` - Unknown account or wrong password
    /// * `PasswordError` - Stored digest is unreadable
    /// * `TokenError` - Token generation failed
    pub fn authenticate(
        &self,
        password: &str,
        stored_hash: Option<&str>,
        subject: &str,
    ) -> Result<IssuedToken, AuthenticationError> {
        let verified = match stored_hash {
            Some(hash) => self.password_hasher.verify(hash, password),
            None => Err(self.password_hasher.verify_absent(password)),
        };

        match verified {
            Ok(()) => Ok(self.issue(subject)?),
            Err(PasswordError::Mismatch) => Err(AuthenticationError::InvalidCredentials),
            Err(e) => Err(AuthenticationError::PasswordError(e)),
        }
    }

    /// Issue a token for `subject` with the default lifetime.
    pub fn issue(&self, subject: &str) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, Utc::now(), self.default_lifetime())
    }

    /// Issue a token for `subject` with an explicit lifetime.
    pub fn issue_with_lifetime(
        &self,
        subject: &str,
        lifetime: Duration,
    ) -> Result<IssuedToken, TokenError> {
        self.issue_at(subject, Utc::now(), lifetime)
    }

    /// Issue a token as of `now`.
    ///
    /// # Errors
    /// * `LifetimeOutOfRange` - Expiry is not a representable instant
    /// * `EncodingFailed` - Claims could not be signed
    pub fn issue_at(
        &self,
        subject: &str,
        now: DateTime<Utc>,
        lifetime: Duration,
    ) -> Result<IssuedToken, TokenError> {
        // Token timestamps have whole-second resolution
        let now = now.trunc_subsecs(0);
        let expire_at = now
            .checked_add_signed(lifetime)
            .ok_or(TokenError::LifetimeOutOfRange(lifetime.num_seconds()))?;

        let claims = Claims::for_subject(self.identity_key(), subject, now, expire_at);
        let token = self.jwt_handler.encode(&claims)?;

        Ok(IssuedToken { token, expire_at })
    }

    /// Validate a token against the current time.
    pub fn parse(&self, token: &str) -> Result<SessionClaims, TokenError> {
        self.parse_at(token, Utc::now())
    }

    /// Validate a token as of `now`.
    ///
    /// Structure is checked first, then the signature, then expiry. A token
    /// is valid strictly before its `exp`.
    ///
    /// # Errors
    /// * `Malformed` - Undecodable, or missing the identity or `exp` claim
    /// * `InvalidSignature` - Not signed with the configured key
    /// * `Expired` - `now` is at or past `exp`
    pub fn parse_at(&self, token: &str, now: DateTime<Utc>) -> Result<SessionClaims, TokenError> {
        let claims: Claims = self.jwt_handler.inspect(token)?;

        let subject = claims
            .subject(self.identity_key())
            .ok_or_else(|| {
                TokenError::Malformed(format!("missing '{}' claim", self.identity_key()))
            })?
            .to_string();

        let expire_at = claims
            .expires_at()
            .ok_or_else(|| TokenError::Malformed("missing 'exp' claim".to_string()))?;

        self.jwt_handler.verify(token)?;

        if claims.is_expired(now.timestamp()) {
            return Err(TokenError::Expired);
        }

        Ok(SessionClaims {
            subject,
            issued_at: claims.iat.and_then(|iat| DateTime::from_timestamp(iat, 0)),
            expire_at,
        })
    }

    /// Exchange a currently valid token for a new one with a fresh lifetime.
    pub fn refresh(&self, token: &str) -> Result<IssuedToken, TokenError> {
        self.refresh_at(token, Utc::now())
    }

    /// Refresh as of `now`. Expired tokens are not refreshable.
    ///
    /// # Errors
    /// * Any error of [`parse_at`](Self::parse_at)
    pub fn refresh_at(&self, token: &str, now: DateTime<Utc>) -> Result<IssuedToken, TokenError> {
        let session = self.parse_at(token, now)?;
        self.issue_at(&session.subject, now, self.default_lifetime())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEFAULT_IDENTITY_KEY;

    const SECRET: &str = "test_secret_key_at_least_32_bytes!";

    fn authenticator() -> Authenticator {
        let config = TokenConfig::new(SECRET, DEFAULT_IDENTITY_KEY, Duration::hours(2))
            .expect("valid configuration");
        Authenticator::new(config)
    }

    fn epoch() -> DateTime<Utc> {
        DateTime::from_timestamp(1_700_000_000, 0).unwrap()
    }

    fn tamper_signature(token: &str) -> String {
        let signature_start = token.rfind('.').unwrap() + 1;
        let mut bytes = token.as_bytes().to_vec();
        bytes[signature_start] = if bytes[signature_start] == b'A' {
            b'B'
        } else {
            b'A'
        };
        String::from_utf8(bytes).unwrap()
    }

    #[test]
    fn test_authenticate_success() {
        let authenticator = authenticator();

        let password = "my_password";
        let hash = authenticator
            .hash_password(password)
            .expect("Failed to hash password");

        let before = Utc::now();
        let issued = authenticator
            .authenticate(password, Some(&hash), "user-abc123")
            .expect("Authentication failed");

        assert!(!issued.token.is_empty());
        let lifetime = issued.expire_at - before;
        assert!(lifetime > Duration::hours(2) - Duration::minutes(1));
        assert!(lifetime <= Duration::hours(2));

        let session = authenticator
            .parse(&issued.token)
            .expect("Token validation failed");
        assert_eq!(session.subject, "user-abc123");
    }

    #[test]
    fn test_authenticate_invalid_password() {
        let authenticator = authenticator();

        let hash = authenticator
            .hash_password("my_password")
            .expect("Failed to hash password");

        let result = authenticator.authenticate("wrong_password", Some(&hash), "user-abc123");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_unknown_account() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("any_password", None, "");
        assert!(matches!(
            result,
            Err(AuthenticationError::InvalidCredentials)
        ));
    }

    #[test]
    fn test_authenticate_unreadable_digest() {
        let authenticator = authenticator();

        let result = authenticator.authenticate("any_password", Some("plaintext?"), "user-abc123");
        assert!(matches!(
            result,
            Err(AuthenticationError::PasswordError(PasswordError::InvalidDigest(_)))
        ));
    }

    #[test]
    fn test_issue_and_parse() {
        let authenticator = authenticator();

        let issued = authenticator
            .issue_at("user-abc123", epoch(), Duration::hours(2))
            .unwrap();
        assert_eq!(issued.expire_at, epoch() + Duration::hours(2));

        let session = authenticator.parse_at(&issued.token, epoch()).unwrap();
        assert_eq!(session.subject, "user-abc123");
        assert_eq!(session.issued_at, Some(epoch()));
        assert_eq!(session.expire_at, epoch() + Duration::hours(2));
    }

    #[test]
    fn test_expiry_boundary() {
        let authenticator = authenticator();
        let issued = authenticator
            .issue_at("user-abc123", epoch(), authenticator.default_lifetime())
            .unwrap();

        let just_before = epoch() + Duration::hours(2) - Duration::seconds(1);
        assert!(authenticator.parse_at(&issued.token, just_before).is_ok());

        let exactly = epoch() + Duration::hours(2);
        assert_eq!(
            authenticator.parse_at(&issued.token, exactly).unwrap_err(),
            TokenError::Expired
        );

        let just_after = epoch() + Duration::hours(2) + Duration::seconds(1);
        assert_eq!(
            authenticator.parse_at(&issued.token, just_after).unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_lifetime_override() {
        let authenticator = authenticator();
        let issued = authenticator
            .issue_at("user-abc123", epoch(), Duration::minutes(5))
            .unwrap();

        assert!(authenticator
            .parse_at(&issued.token, epoch() + Duration::minutes(4))
            .is_ok());
        assert_eq!(
            authenticator
                .parse_at(&issued.token, epoch() + Duration::minutes(5))
                .unwrap_err(),
            TokenError::Expired
        );
    }

    #[test]
    fn test_huge_lifetime_is_rejected() {
        let authenticator = authenticator();

        let result = authenticator.issue_with_lifetime("user-abc123", Duration::MAX);
        assert!(matches!(result, Err(TokenError::LifetimeOutOfRange(_))));
    }

    #[test]
    fn test_tampered_signature() {
        let authenticator = authenticator();
        let issued = authenticator.issue("user-abc123").unwrap();

        let tampered = tamper_signature(&issued.token);
        assert_ne!(tampered, issued.token);
        assert_eq!(
            authenticator.parse(&tampered).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_signature_checked_before_expiry() {
        let authenticator = authenticator();
        let issued = authenticator
            .issue_at("user-abc123", epoch(), Duration::hours(2))
            .unwrap();

        let tampered = tamper_signature(&issued.token);
        let long_after = epoch() + Duration::days(30);
        assert_eq!(
            authenticator.parse_at(&tampered, long_after).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_other_key_is_invalid_signature() {
        let other = Authenticator::new(
            TokenConfig::new("another_secret_key_32_bytes_long!!", DEFAULT_IDENTITY_KEY, Duration::hours(2))
                .unwrap(),
        );
        let issued = other.issue("user-abc123").unwrap();

        assert_eq!(
            authenticator().parse(&issued.token).unwrap_err(),
            TokenError::InvalidSignature
        );
    }

    #[test]
    fn test_malformed_token() {
        let authenticator = authenticator();

        for token in ["", "invalid.token.here", "abc", "a.b"] {
            assert!(
                matches!(authenticator.parse(token), Err(TokenError::Malformed(_))),
                "token {:?} should be malformed",
                token
            );
        }
    }

    #[test]
    fn test_missing_identity_claim_is_malformed() {
        let authenticator = authenticator();
        let handler = JwtHandler::new(SECRET.as_bytes());

        let token = handler
            .encode(&Claims::new().with_expiration(epoch().timestamp() + 60).with_extra("sub", "user-abc123"))
            .unwrap();
        assert!(matches!(
            authenticator.parse_at(&token, epoch()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_missing_exp_is_malformed() {
        let authenticator = authenticator();
        let handler = JwtHandler::new(SECRET.as_bytes());

        let token = handler
            .encode(&Claims::new().with_extra(DEFAULT_IDENTITY_KEY, "user-abc123"))
            .unwrap();
        assert!(matches!(
            authenticator.parse_at(&token, epoch()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_structure_checked_before_signature() {
        let authenticator = authenticator();
        let header = "eyJhbGciOiJIUzI1NiIsInR5cCI6IkpXVCJ9";

        let cases = [
            format!("{}.!!!not-json!!!.AAAAAAAAAAAAAAAAAAAA", header),
            // {"foo":1}
            format!("{}.eyJmb28iOjF9.AAAAAAAAAAAAAAAAAAAA", header),
        ];
        for token in cases {
            assert!(
                matches!(authenticator.parse(&token), Err(TokenError::Malformed(_))),
                "token {:?} should be malformed",
                token
            );
        }

        // Identity claim present but no exp, signed with a foreign key
        let foreign = JwtHandler::new(b"another_secret_key_32_bytes_long!!");
        let token = foreign
            .encode(&Claims::new().with_extra(DEFAULT_IDENTITY_KEY, "user-abc123"))
            .unwrap();
        assert!(matches!(
            authenticator.parse_at(&token, epoch()),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_custom_identity_key() {
        let config = TokenConfig::new(SECRET, "uid", Duration::hours(1)).unwrap();
        let custom = Authenticator::new(config);
        let issued = custom.issue("user-abc123").unwrap();

        assert_eq!(custom.parse(&issued.token).unwrap().subject, "user-abc123");
        // Same key, different claim name: the identity is not where expected
        assert!(matches!(
            authenticator().parse(&issued.token),
            Err(TokenError::Malformed(_))
        ));
    }

    #[test]
    fn test_refresh() {
        let authenticator = authenticator();
        let issued = authenticator
            .issue_at("user-abc123", epoch(), Duration::hours(2))
            .unwrap();

        let later = epoch() + Duration::hours(1);
        let refreshed = authenticator.refresh_at(&issued.token, later).unwrap();

        assert_eq!(refreshed.expire_at, later + Duration::hours(2));
        let session = authenticator.parse_at(&refreshed.token, later).unwrap();
        assert_eq!(session.subject, "user-abc123");
    }

    #[test]
    fn test_refresh_rejects_expired_token() {
        let authenticator = authenticator();
        let issued = authenticator
            .issue_at("user-abc123", epoch(), Duration::hours(2))
            .unwrap();

        let result = authenticator.refresh_at(&issued.token, epoch() + Duration::hours(3));
        assert_eq!(result.unwrap_err(), TokenError::Expired);
    }

    #[test]
    fn test_refresh_rejects_tampered_token() {
        let authenticator = authenticator();
        let issued = authenticator.issue("user-abc123").unwrap();

        let result = authenticator.refresh(&tamper_signature(&issued.token));
        assert_eq!(result.unwrap_err(), TokenError::InvalidSignature);
    }
}
