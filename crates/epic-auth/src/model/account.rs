//! Employee account model.
//!
//! ## Models
//!
//! - [`Account`] - Stored account with credentials and lockout state
//! - [`NewAccount`] - Data structure for creating new accounts
//! - [`AccountId`] - Stable account identifier embedded in tokens

use std::fmt;

use derive_more::{Display, From, Into};
use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::{Identity, Role};
use crate::{Error, Result};

/// Prefix of generated employee numbers.
const IDENTIFIER_PREFIX: &str = "EMP";

/// Unique identifier of an account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(Display, From, Into, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AccountId(Uuid);

impl AccountId {
    /// Generates a new time-ordered account identifier.
    pub fn new() -> Self {
        Self(Uuid::now_v7())
    }
}

impl Default for AccountId {
    fn default() -> Self {
        Self::new()
    }
}

/// Employee account as held by the account store.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique account identifier.
    pub id: AccountId,
    /// Business key used to log in (employee number, e.g. `EMP001`).
    pub identifier: String,
    /// Human-readable name.
    pub display_name: String,
    /// Contact email address.
    pub email: String,
    /// Role granting permissions.
    pub role: Role,
    /// Argon2 PHC string of the account secret.
    pub secret_hash: String,
    /// Number of consecutive failed login attempts.
    pub failed_login_attempts: u32,
    /// Timestamp until which the account is locked due to failed attempts.
    pub locked_until: Option<Timestamp>,
    /// Timestamp of the last successful login.
    pub last_login_at: Option<Timestamp>,
    /// Timestamp when the account was created.
    pub created_at: Timestamp,
}

impl Account {
    /// Returns whether the account is locked at the given instant.
    pub fn is_locked_at(&self, now: Timestamp) -> bool {
        self.locked_until.is_some_and(|until| until > now)
    }

    /// Returns the time remaining until the lockout expires, if still locked.
    pub fn time_until_unlock(&self, now: Timestamp) -> Option<SignedDuration> {
        self.locked_until
            .filter(|until| *until > now)
            .map(|until| until.duration_since(now))
    }

    /// Returns the identity snapshot of this account.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.id,
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            role: self.role,
            role_id: self.role.id(),
        }
    }
}

impl fmt::Debug for Account {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Account")
            .field("id", &self.id)
            .field("identifier", &self.identifier)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .field("failed_login_attempts", &self.failed_login_attempts)
            .field("locked_until", &self.locked_until)
            .field("last_login_at", &self.last_login_at)
            .finish_non_exhaustive()
    }
}

/// Data for creating a new account.
#[derive(Clone)]
pub struct NewAccount {
    /// Business key used to log in.
    pub identifier: String,
    /// Human-readable name.
    pub display_name: String,
    /// Contact email address.
    pub email: String,
    /// Role granting permissions.
    pub role: Role,
    /// Argon2 PHC string of the account secret.
    pub secret_hash: String,
}

impl NewAccount {
    /// Builds the stored account with a fresh id and a clean lockout state.
    pub fn into_account(self, now: Timestamp) -> Account {
        Account {
            id: AccountId::new(),
            identifier: self.identifier,
            display_name: self.display_name,
            email: self.email,
            role: self.role,
            secret_hash: self.secret_hash,
            failed_login_attempts: 0,
            locked_until: None,
            last_login_at: None,
            created_at: now,
        }
    }
}

impl fmt::Debug for NewAccount {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewAccount")
            .field("identifier", &self.identifier)
            .field("display_name", &self.display_name)
            .field("email", &self.email)
            .field("role", &self.role)
            .finish_non_exhaustive()
    }
}

/// Returns the employee number following the highest existing one.
///
/// Identifiers that do not follow the `EMP` + digits format are ignored.
///
/// # Errors
///
/// Returns a store error when the highest number has no successor.
pub fn next_identifier<'a>(existing: impl IntoIterator<Item = &'a str>) -> Result<String> {
    let last = existing
        .into_iter()
        .filter_map(|identifier| identifier.strip_prefix(IDENTIFIER_PREFIX))
        .filter_map(|digits| digits.parse::<u32>().ok())
        .max()
        .unwrap_or(0);

    let next = last
        .checked_add(1)
        .ok_or_else(|| Error::store("employee numbers are exhausted"))?;

    Ok(format!("{IDENTIFIER_PREFIX}{next:03}"))
}
