//! Subcommand handlers.
//!
//! Each handler prints its result and returns whether the command
//! succeeded. Expected denials (bad credentials, missing permission) are
//! reported as `Ok(false)`; only system failures are errors.

use std::io::{self, BufRead};
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use epic_auth::{
    AccountStore, CredentialVerifier, JsonAccountStore, PasswordHasher, Permission, Role,
    SessionKeys, SessionManager, describe_permissions,
};

use crate::TRACING_TARGET_COMMAND;

/// Opens the account store at `path`.
pub fn open_store(path: &Path) -> anyhow::Result<Arc<dyn AccountStore>> {
    let store = JsonAccountStore::open(path)
        .with_context(|| format!("failed to open accounts file {}", path.display()))?;
    Ok(Arc::new(store))
}

pub fn init_secret(path: &Path) -> anyhow::Result<bool> {
    SessionKeys::generate_secret_file(path)?;
    println!("Signing secret written to {}", path.display());
    Ok(true)
}

pub fn provision(
    store: Arc<dyn AccountStore>,
    identifier: Option<String>,
    name: &str,
    email: &str,
    role: Role,
    password: Option<String>,
) -> anyhow::Result<bool> {
    let verifier = CredentialVerifier::new(store, PasswordHasher::new()?);
    let identifier = match identifier {
        Some(identifier) => identifier,
        None => verifier.next_identifier()?,
    };
    let password = read_password(password)?;

    match verifier.provision_account(&identifier, name, email, role, &password) {
        Ok(identity) => {
            println!(
                "Created {} ({}) with role {}",
                identity.identifier, identity.display_name, identity.role
            );
            Ok(true)
        }
        Err(e) if e.is_expected() => {
            println!("{}", e.user_message());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn login(
    sessions: &mut SessionManager,
    identifier: &str,
    password: Option<String>,
) -> anyhow::Result<bool> {
    let password = read_password(password)?;
    let response = sessions.login(identifier, &password)?;
    println!("{}", response.message);
    Ok(response.success)
}

pub fn logout(sessions: &mut SessionManager) -> anyhow::Result<bool> {
    let response = sessions.logout()?;
    println!("{}", response.message);
    Ok(response.success)
}

pub fn whoami(sessions: &mut SessionManager) -> anyhow::Result<bool> {
    let Some(identity) = sessions.get_current_user()? else {
        println!("Not logged in.");
        return Ok(false);
    };

    println!("{}", serde_json::to_string_pretty(&identity)?);
    Ok(true)
}

pub fn session(sessions: &mut SessionManager) -> anyhow::Result<bool> {
    let Some(info) = sessions.session_info()? else {
        println!("No active session.");
        return Ok(false);
    };

    println!("{}", serde_json::to_string_pretty(&info)?);
    Ok(true)
}

pub fn check(sessions: &mut SessionManager, permission: Permission) -> anyhow::Result<bool> {
    match sessions.authorize(permission) {
        Ok(identity) => {
            println!("{} is granted {permission}", identity.identifier);
            Ok(true)
        }
        Err(e) if e.is_expected() => {
            println!("{}", e.user_message());
            Ok(false)
        }
        Err(e) => Err(e.into()),
    }
}

pub fn permissions(role: Role) -> anyhow::Result<bool> {
    print!("{}", describe_permissions(role));
    Ok(true)
}

/// Returns the given password or reads one line from stdin.
fn read_password(password: Option<String>) -> anyhow::Result<String> {
    if let Some(password) = password {
        return Ok(password);
    }

    tracing::debug!(target: TRACING_TARGET_COMMAND, "reading password from stdin");
    eprint!("Password: ");

    let mut line = String::new();
    io::stdin()
        .lock()
        .read_line(&mut line)
        .context("failed to read password from stdin")?;

    Ok(line.trim_end_matches(['\r', '\n']).to_owned())
}
