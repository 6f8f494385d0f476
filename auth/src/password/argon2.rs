use std::sync::OnceLock;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::Error as HashError;
use argon2::password_hash::PasswordHash;
use argon2::password_hash::PasswordHasher as Argon2PasswordHasher;
use argon2::password_hash::PasswordVerifier;
use argon2::password_hash::SaltString;
use argon2::Algorithm;
use argon2::Argon2;
use argon2::Params;
use argon2::Version;

use super::errors::PasswordError;

/// Plaintext hashed once to produce the digest compared against when no
/// stored digest exists for a login attempt.
const ABSENT_CREDENTIAL: &str = "absent-credential-placeholder";

/// Password hashing implementation.
///
/// Argon2id with a fixed work factor. Every digest carries its own random
/// salt and the parameters it was produced with (PHC string format).
pub struct PasswordHasher {
    argon2: Argon2<'static>,
    absent_digest: OnceLock<String>,
}

impl PasswordHasher {
    /// Create a hasher with the default work factor (19 MiB, 2 passes, 1 lane).
    pub fn new() -> Self {
        Self::from_params(Params::DEFAULT)
    }

    /// Create a hasher with an explicit work factor.
    ///
    /// # Arguments
    /// * `memory_kib` - Memory cost in KiB
    /// * `iterations` - Number of passes
    /// * `parallelism` - Number of lanes
    ///
    /// # Errors
    /// * `HashingFailed` - Parameters are outside the ranges Argon2 accepts
    pub fn with_work_factor(
        memory_kib: u32,
        iterations: u32,
        parallelism: u32,
    ) -> Result<Self, PasswordError> {
        let params = Params::new(memory_kib, iterations, parallelism, None)
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))?;
        Ok(Self::from_params(params))
    }

    fn from_params(params: Params) -> Self {
        Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
            absent_digest: OnceLock::new(),
        }
    }

    /// Hash a plaintext password.
    ///
    /// # Returns
    /// PHC string format hash (includes algorithm, parameters, salt, and hash)
    ///
    /// # Errors
    /// * `HashingFailed` - The salt source or the hash computation failed
    pub fn hash(&self, password: &str) -> Result<String, PasswordError> {
        let salt = SaltString::generate(&mut OsRng);

        self.argon2
            .hash_password(password.as_bytes(), &salt)
            .map(|hash| hash.to_string())
            .map_err(|e| PasswordError::HashingFailed(e.to_string()))
    }

    /// Verify a candidate password against a stored digest.
    ///
    /// The candidate is hashed with the salt and parameters embedded in the
    /// digest and compared in constant time.
    ///
    /// # Errors
    /// * `Mismatch` - Candidate does not match the digest
    /// * `InvalidDigest` - Digest is not a valid PHC string
    pub fn verify(&self, digest: &str, candidate: &str) -> Result<(), PasswordError> {
        let parsed = PasswordHash::new(digest)
            .map_err(|e| PasswordError::InvalidDigest(e.to_string()))?;

        self.argon2
            .verify_password(candidate.as_bytes(), &parsed)
            .map_err(|e| match e {
                HashError::Password => PasswordError::Mismatch,
                other => PasswordError::InvalidDigest(other.to_string()),
            })
    }

    /// Spend the same effort as [`verify`](Self::verify) when there is no
    /// stored digest to check against.
    ///
    /// Fails with `Mismatch`, or with `HashingFailed` if the placeholder
    /// digest could not be produced.
    pub fn verify_absent(&self, candidate: &str) -> PasswordError {
        match self.absent_digest() {
            Ok(digest) => {
                let _ = self.verify(digest, candidate);
                PasswordError::Mismatch
            }
            Err(e) => e,
        }
    }

    /// Placeholder digest, computed on first use. A failed attempt is not
    /// remembered; the next call hashes again.
    fn absent_digest(&self) -> Result<&str, PasswordError> {
        if let Some(digest) = self.absent_digest.get() {
            return Ok(digest);
        }

        let digest = self.hash(ABSENT_CREDENTIAL)?;
        Ok(self.absent_digest.get_or_init(|| digest))
    }
}

impl Default for PasswordHasher {
    fn default() -> Self {
        Self::new()
    }
}
