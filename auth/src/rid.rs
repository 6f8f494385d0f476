//! Public resource identifiers.
//!
//! Records are stored under sequential numeric keys. Those keys never leave
//! the service; instead each record gets a `<prefix>-<code>` identifier where
//! the code is a salted permutation of the key. Without the salt, a holder of
//! one identifier learns nothing about the key behind it or about the
//! identifiers of neighbouring records.

use std::fmt;

use hmac::Hmac;
use hmac::Mac;
use sha2::Sha256;

use crate::config::ConfigurationError;

type HmacSha256 = Hmac<Sha256>;

const ALPHABET: &[u8; 62] = b"abcedfghijklmnopqrstuvwxyzABCDEFGHIJKLMNOPQRSTUVWXYZ0123456789";

/// Length of the code following the prefix.
pub const CODE_LENGTH: usize = 6;

const RADIX: u64 = 62;
/// 62^3: each Feistel half covers half of the code digits.
const HALF_SPACE: u64 = RADIX * RADIX * RADIX;
/// 62^6: number of distinct codes.
pub const CODE_SPACE: u64 = HALF_SPACE * HALF_SPACE;
const ROUNDS: u8 = 6;

/// Kinds of records that carry a public identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    User,
    Post,
}

impl ResourceKind {
    pub fn prefix(&self) -> &'static str {
        match self {
            ResourceKind::User => "user",
            ResourceKind::Post => "post",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

/// Derives public identifiers from numeric record keys.
#[derive(Clone)]
pub struct IdGenerator {
    mac: HmacSha256,
}

impl IdGenerator {
    /// Create a generator keyed by `salt`.
    ///
    /// # Errors
    /// * `MissingSalt` - Salt is empty
    pub fn new(salt: impl AsRef<[u8]>) -> Result<Self, ConfigurationError> {
        let salt = salt.as_ref();
        if salt.is_empty() {
            return Err(ConfigurationError::MissingSalt);
        }

        let mac = HmacSha256::new_from_slice(salt).map_err(|_| ConfigurationError::MissingSalt)?;
        Ok(Self { mac })
    }

    /// Build the public identifier for record `counter` of `kind`.
    ///
    /// Distinct counters below [`CODE_SPACE`] always map to distinct codes.
    /// Larger counters wrap around the code space.
    pub fn generate(&self, kind: ResourceKind, counter: u64) -> String {
        let code = self.encode(self.permute(counter % CODE_SPACE));
        format!("{}-{}", kind.prefix(), code)
    }

    /// Balanced Feistel network over `[0, 62^3) x [0, 62^3)`.
    fn permute(&self, value: u64) -> u64 {
        let mut left = value / HALF_SPACE;
        let mut right = value % HALF_SPACE;

        for round in 0..ROUNDS {
            let mixed = (left + self.round_function(round, right)) % HALF_SPACE;
            left = right;
            right = mixed;
        }

        left * HALF_SPACE + right
    }

    fn round_function(&self, round: u8, half: u64) -> u64 {
        let mut mac = self.mac.clone();
        mac.update(&[round]);
        mac.update(&half.to_be_bytes());
        let digest = mac.finalize().into_bytes();

        let mut word = [0u8; 8];
        word.copy_from_slice(&digest[..8]);
        u64::from_be_bytes(word) % HALF_SPACE
    }

    fn encode(&self, mut value: u64) -> String {
        let mut code = [0u8; CODE_LENGTH];
        for slot in code.iter_mut().rev() {
            *slot = ALPHABET[(value % RADIX) as usize];
            value /= RADIX;
        }
        code.iter().map(|&b| b as char).collect()
    }
}

impl fmt::Debug for IdGenerator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdGenerator").finish_non_exhaustive()
    }
}
