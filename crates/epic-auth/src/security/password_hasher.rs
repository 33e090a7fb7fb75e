//! Secret hashing and verification using Argon2id.
//!
//! Cost parameters and the salt are encoded into the PHC hash string, so
//! verification never needs externally stored parameters.

use argon2::password_hash::SaltString;
use argon2::{Algorithm, Argon2, Params, PasswordHash, PasswordHasher as _, PasswordVerifier, Version};
use rand::distr::{Alphanumeric, SampleString};

use crate::{Error, Result, TRACING_TARGET_PASSWORD_HASHER as TRACING_TARGET};

/// Memory cost in KiB (64 MiB).
const MEMORY_COST_KIB: u32 = 64 * 1024;

/// Number of passes over memory.
const ITERATIONS: u32 = 3;

/// Degree of parallelism.
const PARALLELISM: u32 = 1;

/// Length of the derived hash in bytes.
const OUTPUT_LEN: usize = 32;

/// Length of the random salt in bytes.
const SALT_LEN: usize = 16;

/// Secret hashing and verification service using Argon2id.
#[derive(Debug, Clone)]
pub struct PasswordHasher {
    argon2: Argon2<'static>,
}

impl PasswordHasher {
    /// Creates a hasher with the production cost parameters.
    pub fn new() -> Result<Self> {
        Self::with_params(MEMORY_COST_KIB, ITERATIONS, PARALLELISM)
    }

    /// Creates a hasher with custom cost parameters.
    ///
    /// Hashes produced with any parameters remain verifiable by every
    /// hasher, since the parameters travel inside the hash string.
    pub fn with_params(memory_kib: u32, iterations: u32, parallelism: u32) -> Result<Self> {
        let params = Params::new(memory_kib, iterations, parallelism, Some(OUTPUT_LEN))
            .map_err(|e| Error::hashing("invalid argon2 parameters").with_source(e))?;

        Ok(Self {
            argon2: Argon2::new(Algorithm::Argon2id, Version::V0x13, params),
        })
    }

    /// Hashes a secret with a fresh random salt.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Hashing`] if the salt cannot be encoded or the
    /// key derivation fails. This is a system failure, never a user error.
    ///
    /// [`ErrorKind::Hashing`]: crate::ErrorKind::Hashing
    pub fn hash(&self, secret: &str) -> Result<String> {
        let salt_bytes: [u8; SALT_LEN] = rand::random();
        let salt = SaltString::encode_b64(&salt_bytes).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                error = %e,
                "failed to encode random salt",
            );
            Error::hashing("secret processing failed").with_source(e)
        })?;

        let hash = self
            .argon2
            .hash_password(secret.as_bytes(), &salt)
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "secret hashing operation failed",
                );
                Error::hashing("secret processing failed").with_source(e)
            })?;

        Ok(hash.to_string())
    }

    /// Verifies a secret against a stored hash.
    ///
    /// Returns `false` on mismatch and on malformed or foreign hash formats.
    pub fn verify(&self, stored_hash: &str, secret: &str) -> bool {
        let parsed = match PasswordHash::new(stored_hash) {
            Ok(parsed) => parsed,
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    error = %e,
                    "stored hash has an invalid format",
                );
                return false;
            }
        };

        let verified = self
            .argon2
            .verify_password(secret.as_bytes(), &parsed)
            .is_ok();

        tracing::debug!(target: TRACING_TARGET, verified, "secret verification finished");
        verified
    }

    /// Performs a throwaway hash so that unknown identifiers cost the same
    /// time as a real verification. Always returns `false`.
    pub fn verify_dummy(&self, secret: &str) -> bool {
        let mut rng = rand::rng();
        let dummy = Alphanumeric.sample_string(&mut rng, secret.len().clamp(16, 64));
        let _ = self.hash(&dummy);
        false
    }
}
