//! Signing secret management for session tokens.
//!
//! The HMAC secret is resolved once at startup: an explicitly configured
//! secret wins, otherwise the secret file is read. Nothing is generated on
//! this path; provisioning is the separate
//! [`SessionKeys::generate_secret_file`] step.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use serde::{Deserialize, Serialize};

use crate::utility::{WriteMode, write_private};
use crate::{AuthConfig, Error, Result, TRACING_TARGET_SESSION_KEYS as TRACING_TARGET};

/// Shortest accepted signing secret, in bytes.
pub const MIN_SECRET_LEN: usize = 32;

/// Random bytes drawn for a generated secret.
const GENERATED_SECRET_BYTES: usize = 32;

/// Where the signing secret was loaded from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeySource {
    /// Passed explicitly through configuration or the environment.
    Explicit,
    /// Read from a secret file.
    File(PathBuf),
}

/// HMAC keys used to sign and verify session tokens.
///
/// Cloning is cheap; the key material is shared.
#[derive(Clone)]
pub struct SessionKeys {
    inner: Arc<SessionKeysInner>,
}

struct SessionKeysInner {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    source: KeySource,
}

impl SessionKeys {
    /// Resolves the signing secret from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ErrorKind::Config`] if neither an explicit secret nor the
    /// secret file is available, or if the secret is too short.
    ///
    /// [`ErrorKind::Config`]: crate::ErrorKind::Config
    pub fn from_config(config: &AuthConfig) -> Result<Self> {
        if let Some(secret) = config.jwt_secret.as_deref().filter(|s| !s.is_empty()) {
            tracing::debug!(target: TRACING_TARGET, "using explicitly configured signing secret");
            return Self::build(secret.as_bytes(), KeySource::Explicit);
        }

        let path = &config.jwt_secret_file;
        let secret = match fs::read_to_string(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::error!(
                    target: TRACING_TARGET,
                    path = %path.display(),
                    "no signing secret configured",
                );
                return Err(Error::config(format!(
                    "no signing secret configured: set EPIC_EVENTS_JWT_SECRET or provision {}",
                    path.display()
                )));
            }
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    path = %path.display(),
                    error = %e,
                    "failed to read signing secret file",
                );
                return Err(Error::file_system("failed to read signing secret file").with_source(e));
            }
        };

        tracing::debug!(
            target: TRACING_TARGET,
            path = %path.display(),
            "signing secret loaded from file",
        );

        Self::build(secret.trim().as_bytes(), KeySource::File(path.clone()))
    }

    /// Creates keys from raw secret bytes.
    pub fn from_secret(secret: impl AsRef<[u8]>) -> Result<Self> {
        Self::build(secret.as_ref(), KeySource::Explicit)
    }

    fn build(secret: &[u8], source: KeySource) -> Result<Self> {
        if secret.len() < MIN_SECRET_LEN {
            return Err(Error::config(format!(
                "signing secret must be at least {MIN_SECRET_LEN} bytes"
            )));
        }

        let inner = SessionKeysInner {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            source,
        };

        Ok(Self {
            inner: Arc::new(inner),
        })
    }

    /// Writes a new random secret to `path` with owner-only permissions.
    ///
    /// Refuses to overwrite an existing file, since replacing the secret
    /// invalidates every issued token.
    pub fn generate_secret_file(path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let bytes: [u8; GENERATED_SECRET_BYTES] = rand::random();
        let secret = URL_SAFE_NO_PAD.encode(bytes);

        write_private(path, secret.as_bytes(), WriteMode::CreateNew).map_err(|e| {
            if e.kind() == io::ErrorKind::AlreadyExists {
                return Error::config(format!(
                    "signing secret file {} already exists",
                    path.display()
                ));
            }

            tracing::error!(
                target: TRACING_TARGET,
                path = %path.display(),
                error = %e,
                "failed to write signing secret file",
            );
            Error::file_system("failed to write signing secret file").with_source(e)
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            path = %path.display(),
            "signing secret provisioned",
        );

        Ok(())
    }

    /// Returns a reference to the encoding key.
    #[inline]
    pub fn encoding_key(&self) -> &EncodingKey {
        &self.inner.encoding_key
    }

    /// Returns a reference to the decoding key.
    #[inline]
    pub fn decoding_key(&self) -> &DecodingKey {
        &self.inner.decoding_key
    }

    /// Returns where the secret was loaded from.
    #[inline]
    pub fn source(&self) -> &KeySource {
        &self.inner.source
    }

    /// Performs a sign and verify round-trip with the loaded keys.
    pub fn validate_keys(&self) -> Result<()> {
        #[derive(Serialize, Deserialize)]
        struct ProbeClaims {
            sub: String,
            exp: i64,
        }

        let claims = ProbeClaims {
            sub: "key-validation".to_owned(),
            exp: (Timestamp::now() + SignedDuration::from_mins(5)).as_second(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, self.encoding_key())
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "key validation failed during encoding",
                );
                Error::config("signing key validation failed").with_source(e)
            })?;

        decode::<ProbeClaims>(&token, self.decoding_key(), &Validation::new(Algorithm::HS256))
            .map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET,
                    error = %e,
                    "key validation failed during decoding",
                );
                Error::config("signing key validation failed").with_source(e)
            })?;

        tracing::debug!(target: TRACING_TARGET, "key validation successful");
        Ok(())
    }
}

impl fmt::Debug for SessionKeys {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionKeys")
            .field("source", &self.inner.source)
            .finish_non_exhaustive()
    }
}
