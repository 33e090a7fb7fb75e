//! CLI configuration management.
//!
//! ```text
//! Cli
//! ├── auth: AuthConfig      # Signing secret, session file
//! ├── accounts_file: PathBuf
//! └── command: Command
//! ```
//!
//! Every option can also be provided through its environment variable.

mod command;

use std::path::PathBuf;
use std::process;

use clap::Parser;
pub use command::Command;
use epic_auth::AuthConfig;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::{TRACING_TARGET_CONFIG, TRACING_TARGET_STARTUP};

/// Complete CLI configuration.
#[derive(Debug, Clone, Parser)]
#[command(name = "epic")]
#[command(about = "Epic Events authentication command line")]
#[command(version)]
pub struct Cli {
    /// Signing secret and session file locations.
    #[clap(flatten)]
    pub auth: AuthConfig,

    /// JSON file holding employee accounts.
    #[arg(
        long,
        global = true,
        env = "EPIC_EVENTS_ACCOUNTS_FILE",
        default_value = "./accounts.json"
    )]
    pub accounts_file: PathBuf,

    #[command(subcommand)]
    pub command: Command,
}

impl Cli {
    /// Loads the `.env` file (if enabled) and parses CLI arguments.
    pub fn init() -> Self {
        Self::load_dotenv();
        Self::parse()
    }

    #[cfg(feature = "dotenv")]
    fn load_dotenv() {
        if let Err(err) = dotenvy::dotenv()
            && !err.not_found()
        {
            eprintln!("Warning: failed to load .env file: {err}");
        }
    }

    #[cfg(not(feature = "dotenv"))]
    fn load_dotenv() {}

    /// Initializes tracing on stderr, filtered by `RUST_LOG`.
    ///
    /// Defaults to `warn` so command output stays readable.
    pub fn init_tracing() {
        let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    /// Logs build information and configuration (no secrets).
    pub fn log(&self) {
        tracing::debug!(
            target: TRACING_TARGET_STARTUP,
            version = env!("CARGO_PKG_VERSION"),
            pid = process::id(),
            features = ?Self::enabled_features(),
            "build information",
        );

        tracing::debug!(
            target: TRACING_TARGET_CONFIG,
            jwt_secret_configured = self.auth.jwt_secret.is_some(),
            jwt_secret_file = %self.auth.jwt_secret_file.display(),
            session_file = ?self.auth.session_file,
            accounts_file = %self.accounts_file.display(),
            command = self.command.name(),
            "configuration",
        );
    }

    fn enabled_features() -> Vec<&'static str> {
        [cfg!(feature = "dotenv").then_some("dotenv")]
            .into_iter()
            .flatten()
            .collect()
    }
}
