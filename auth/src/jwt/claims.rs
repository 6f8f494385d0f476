use std::collections::HashMap;

use chrono::DateTime;
use chrono::Utc;
use serde::Deserialize;
use serde::Serialize;

/// Session token claims.
///
/// Carries the registered time claims plus the subject under a configurable
/// claim name, kept in the flattened `extra` map.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct Claims {
    /// Expiration time (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub exp: Option<i64>,

    /// Issued at (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub iat: Option<i64>,

    /// Not before (Unix timestamp)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub nbf: Option<i64>,

    /// Identity claim and any other custom fields (flattened into token)
    #[serde(flatten)]
    pub extra: HashMap<String, serde_json::Value>,
}

impl Claims {
    /// Create new empty claims.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create session claims for a subject.
    ///
    /// # Arguments
    /// * `identity_key` - Claim name the subject is stored under
    /// * `subject` - User identifier
    /// * `issued_at` - Issue instant, also used as `nbf`
    /// * `expire_at` - Instant from which the token is no longer valid
    pub fn for_subject(
        identity_key: &str,
        subject: impl ToString,
        issued_at: DateTime<Utc>,
        expire_at: DateTime<Utc>,
    ) -> Self {
        Self::new()
            .with_issued_at(issued_at.timestamp())
            .with_not_before(issued_at.timestamp())
            .with_expiration(expire_at.timestamp())
            .with_extra(identity_key, subject.to_string())
    }

    /// Set expiration (Unix timestamp).
    pub fn with_expiration(mut self, exp: i64) -> Self {
        self.exp = Some(exp);
        self
    }

    /// Set issued at (Unix timestamp).
    pub fn with_issued_at(mut self, iat: i64) -> Self {
        self.iat = Some(iat);
        self
    }

    /// Set not before (Unix timestamp).
    pub fn with_not_before(mut self, nbf: i64) -> Self {
        self.nbf = Some(nbf);
        self
    }

    /// Add a custom field.
    pub fn with_extra(mut self, key: impl ToString, value: impl Serialize) -> Self {
        if let Ok(json_value) = serde_json::to_value(value) {
            self.extra.insert(key.to_string(), json_value);
        }
        self
    }

    /// Subject stored under `identity_key`, if present and a non-empty string.
    pub fn subject(&self, identity_key: &str) -> Option<&str> {
        self.extra
            .get(identity_key)
            .and_then(|v| v.as_str())
            .filter(|s| !s.is_empty())
    }

    /// Expiration as a timestamp.
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        self.exp.and_then(|exp| DateTime::from_timestamp(exp, 0))
    }

    /// Check if token is expired.
    ///
    /// A token is valid strictly before its expiration; at `exp` it is expired.
    pub fn is_expired(&self, current_timestamp: i64) -> bool {
        self.exp.map_or(false, |exp| current_timestamp >= exp)
    }
}
