//! Persisted session file.
//!
//! A single JSON object `{ "access_token", "refresh_token", "created_at" }`
//! written with owner-only permissions. Concurrent writers from different
//! processes are not coordinated; the last whole-file write wins.

use std::fmt;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::utility::{WriteMode, remove_if_exists, write_private};
use crate::{Error, Result, TRACING_TARGET_SESSION as TRACING_TARGET};

/// Token pair stored between process runs.
#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersistedSession {
    /// Signed access token.
    pub access_token: String,
    /// Signed refresh token.
    pub refresh_token: String,
    /// When the session was established.
    pub created_at: Timestamp,
}

impl PersistedSession {
    /// Creates a session established at `created_at`.
    pub fn new(access_token: String, refresh_token: String, created_at: Timestamp) -> Self {
        Self {
            access_token,
            refresh_token,
            created_at,
        }
    }
}

impl fmt::Debug for PersistedSession {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PersistedSession")
            .field("created_at", &self.created_at)
            .finish_non_exhaustive()
    }
}

/// Location of the persisted session.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionFile {
    path: PathBuf,
}

impl SessionFile {
    /// Creates a handle for the session file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Returns the file path.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the session.
    ///
    /// A missing file is no session. An unreadable JSON document is also
    /// treated as no session, since it can only be fixed by logging in again.
    pub fn load(&self) -> Result<Option<PersistedSession>> {
        let bytes = match fs::read(&self.path) {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET,
                    path = %self.path.display(),
                    error = %e,
                    "failed to read session file",
                );
                return Err(Error::file_system("cannot read session file").with_source(e));
            }
        };

        match serde_json::from_slice(&bytes) {
            Ok(session) => Ok(Some(session)),
            Err(e) => {
                tracing::warn!(
                    target: TRACING_TARGET,
                    path = %self.path.display(),
                    error = %e,
                    "ignoring malformed session file",
                );
                Ok(None)
            }
        }
    }

    /// Writes the session, replacing any previous one.
    pub fn save(&self, session: &PersistedSession) -> Result<()> {
        let json = serde_json::to_vec_pretty(session)
            .map_err(|e| Error::file_system("cannot serialize session").with_source(e))?;

        write_private(&self.path, &json, WriteMode::Overwrite).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                path = %self.path.display(),
                error = %e,
                "failed to write session file",
            );
            Error::file_system("cannot write session file").with_source(e)
        })?;

        tracing::debug!(
            target: TRACING_TARGET,
            path = %self.path.display(),
            "session saved",
        );

        Ok(())
    }

    /// Deletes the session file. Returns whether a file existed.
    pub fn clear(&self) -> Result<bool> {
        remove_if_exists(&self.path).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                path = %self.path.display(),
                error = %e,
                "failed to delete session file",
            );
            Error::file_system("cannot delete session file").with_source(e)
        })
    }
}
