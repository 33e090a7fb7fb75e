#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

mod config;
mod handler;

use std::process;

use anyhow::Context;
use epic_auth::{SessionKeys, SessionManager};

use crate::config::{Cli, Command};

// Tracing target constants
pub const TRACING_TARGET_STARTUP: &str = "epic_cli::startup";
pub const TRACING_TARGET_CONFIG: &str = "epic_cli::config";
pub const TRACING_TARGET_COMMAND: &str = "epic_cli::command";

fn main() {
    let error = match run() {
        Ok(true) => process::exit(0),
        Ok(false) => process::exit(1),
        Err(error) => error,
    };

    if tracing::enabled!(tracing::Level::ERROR) {
        tracing::error!(
            target: TRACING_TARGET_COMMAND,
            error = %error,
            "command failed",
        );
    }
    eprintln!("Error: {error:#}");

    process::exit(1);
}

/// Parses arguments, wires the services and runs one command.
fn run() -> anyhow::Result<bool> {
    let cli = Cli::init();
    Cli::init_tracing();
    cli.log();

    let sessions = || create_session_manager(&cli);

    match &cli.command {
        Command::InitSecret => handler::init_secret(&cli.auth.jwt_secret_file),
        Command::Permissions { role } => handler::permissions(*role),
        Command::Provision {
            identifier,
            name,
            email,
            role,
            password,
        } => {
            let store = handler::open_store(&cli.accounts_file)?;
            handler::provision(store, identifier.clone(), name, email, *role, password.clone())
        }
        Command::Login {
            identifier,
            password,
        } => handler::login(&mut sessions()?, identifier, password.clone()),
        Command::Logout => handler::logout(&mut sessions()?),
        Command::Whoami => handler::whoami(&mut sessions()?),
        Command::Session => handler::session(&mut sessions()?),
        Command::Check { permission } => handler::check(&mut sessions()?, *permission),
    }
}

/// Builds the one session manager of this process.
fn create_session_manager(cli: &Cli) -> anyhow::Result<SessionManager> {
    let keys = SessionKeys::from_config(&cli.auth).context("failed to load signing keys")?;
    keys.validate_keys().context("invalid signing keys")?;

    let store = handler::open_store(&cli.accounts_file)?;
    let sessions = SessionManager::from_config(store, keys, &cli.auth)
        .context("failed to create session manager")?;

    Ok(sessions)
}
