//! Runtime configuration of the authentication core.

use std::fmt;
use std::path::PathBuf;

#[cfg(any(test, feature = "config"))]
use clap::Args;
use serde::{Deserialize, Serialize};

use crate::{Error, Result};

/// Name of the session file created under the user's home directory.
const SESSION_FILE_NAME: &str = ".epic_events_tokens";

/// Signing secret and session file locations.
#[derive(Clone, Serialize, Deserialize)]
#[cfg_attr(any(test, feature = "config"), derive(Args))]
pub struct AuthConfig {
    /// Token signing secret, takes precedence over the secret file.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "EPIC_EVENTS_JWT_SECRET", hide_env_values = true)
    )]
    #[serde(default)]
    pub jwt_secret: Option<String>,

    /// File holding the token signing secret.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(
            long,
            env = "EPIC_EVENTS_JWT_SECRET_FILE",
            default_value = "./.epic_events_secret"
        )
    )]
    #[serde(default = "AuthConfig::default_jwt_secret_file")]
    pub jwt_secret_file: PathBuf,

    /// Session file path, defaults to `~/.epic_events_tokens`.
    #[cfg_attr(
        any(test, feature = "config"),
        arg(long, env = "EPIC_EVENTS_SESSION_FILE")
    )]
    #[serde(default)]
    pub session_file: Option<PathBuf>,
}

impl AuthConfig {
    fn default_jwt_secret_file() -> PathBuf {
        "./.epic_events_secret".into()
    }

    /// Returns the session file path, falling back to the home directory.
    pub fn session_file_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.session_file {
            return Ok(path.clone());
        }

        dirs::home_dir()
            .map(|home| home.join(SESSION_FILE_NAME))
            .ok_or_else(|| Error::config("cannot determine the home directory for the session file"))
    }
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: None,
            jwt_secret_file: Self::default_jwt_secret_file(),
            session_file: None,
        }
    }
}

impl fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthConfig")
            .field("jwt_secret", &self.jwt_secret.as_ref().map(|_| "<redacted>"))
            .field("jwt_secret_file", &self.jwt_secret_file)
            .field("session_file", &self.session_file)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[derive(Debug, Parser)]
    struct Cli {
        #[clap(flatten)]
        auth: AuthConfig,
    }

    #[test]
    fn parses_explicit_arguments() -> anyhow::Result<()> {
        let cli = Cli::try_parse_from([
            "epic",
            "--jwt-secret-file",
            "/tmp/secret",
            "--session-file",
            "/tmp/session.json",
        ])?;

        assert_eq!(cli.auth.jwt_secret_file, PathBuf::from("/tmp/secret"));
        assert_eq!(
            cli.auth.session_file_path()?,
            PathBuf::from("/tmp/session.json")
        );
        Ok(())
    }

    #[test]
    fn debug_redacts_secret() {
        let config = AuthConfig {
            jwt_secret: Some("super-secret-signing-value".to_owned()),
            ..AuthConfig::default()
        };

        let debug = format!("{config:?}");
        assert!(!debug.contains("super-secret-signing-value"));
        assert!(debug.contains("redacted"));
    }

    #[test]
    fn deserializes_with_defaults() -> anyhow::Result<()> {
        let config: AuthConfig = serde_json::from_str("{}")?;
        assert!(config.jwt_secret.is_none());
        assert_eq!(config.jwt_secret_file, PathBuf::from("./.epic_events_secret"));
        Ok(())
    }
}
