//! Account store persisted to a JSON file.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};

use jiff::Timestamp;

use super::AccountStore;
use super::table::AccountTable;
use crate::auth::LockoutPolicy;
use crate::model::{Account, AccountId, NewAccount, Role};
use crate::utility::{WriteMode, write_private};
use crate::{Error, Result, TRACING_TARGET_STORE};

/// Account store backed by a single JSON file.
///
/// The file is loaded once on open and rewritten in full after every
/// mutation while the in-process mutex is held. Writers in other processes
/// are not coordinated.
#[derive(Debug)]
pub struct JsonAccountStore {
    path: PathBuf,
    table: Mutex<AccountTable>,
}

impl JsonAccountStore {
    /// Opens the store at `path`, starting empty if the file does not exist.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let table = match fs::read(&path) {
            Ok(bytes) => serde_json::from_slice(&bytes).map_err(|e| {
                tracing::error!(
                    target: TRACING_TARGET_STORE,
                    path = %path.display(),
                    error = %e,
                    "failed to parse accounts file",
                );
                Error::store("accounts file is corrupted").with_source(e)
            })?,
            Err(e) if e.kind() == io::ErrorKind::NotFound => AccountTable::default(),
            Err(e) => {
                tracing::error!(
                    target: TRACING_TARGET_STORE,
                    path = %path.display(),
                    error = %e,
                    "failed to read accounts file",
                );
                return Err(Error::store("cannot read accounts file").with_source(e));
            }
        };

        tracing::debug!(
            target: TRACING_TARGET_STORE,
            path = %path.display(),
            "accounts file opened",
        );

        Ok(Self {
            path,
            table: Mutex::new(table),
        })
    }

    /// Returns the path of the backing file.
    #[inline]
    pub fn path(&self) -> &Path {
        &self.path
    }

    fn lock(&self) -> Result<MutexGuard<'_, AccountTable>> {
        self.table.lock().map_err(|_| {
            tracing::error!(target: TRACING_TARGET_STORE, "account table mutex poisoned");
            Error::store("account store is unavailable")
        })
    }

    /// Applies `change` to a copy of the table and persists it.
    ///
    /// The in-memory table is only replaced once the file write succeeded.
    fn mutate<T>(&self, change: impl FnOnce(&mut AccountTable) -> Result<T>) -> Result<T> {
        let mut guard = self.lock()?;
        let mut updated = guard.clone();
        let value = change(&mut updated)?;

        self.persist(&updated)?;
        *guard = updated;
        Ok(value)
    }

    fn persist(&self, table: &AccountTable) -> Result<()> {
        let json = serde_json::to_vec_pretty(table)
            .map_err(|e| Error::store("cannot serialize accounts").with_source(e))?;

        write_private(&self.path, &json, WriteMode::Overwrite).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET_STORE,
                path = %self.path.display(),
                error = %e,
                "failed to write accounts file",
            );
            Error::store("cannot write accounts file").with_source(e)
        })
    }
}

impl AccountStore for JsonAccountStore {
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>> {
        Ok(self.lock()?.find_by_identifier(identifier).cloned())
    }

    fn find_by_id(&self, id: AccountId) -> Result<Option<Account>> {
        Ok(self.lock()?.find_by_id(id).cloned())
    }

    fn record_failed_login(
        &self,
        id: AccountId,
        now: Timestamp,
        policy: &LockoutPolicy,
    ) -> Result<Account> {
        self.mutate(|table| table.record_failed_login(id, now, policy))
    }

    fn record_successful_login(&self, id: AccountId, now: Timestamp) -> Result<Account> {
        self.mutate(|table| table.record_successful_login(id, now))
    }

    fn create_account(&self, account: NewAccount) -> Result<Account> {
        let account = self.mutate(|table| table.create_account(account, Timestamp::now()))?;

        tracing::info!(
            target: TRACING_TARGET_STORE,
            account_id = %account.id,
            identifier = %account.identifier,
            role = %account.role,
            "account created",
        );

        Ok(account)
    }

    fn update_role(&self, id: AccountId, role: Role) -> Result<Account> {
        self.mutate(|table| table.update_role(id, role))
    }

    fn list_identifiers(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.identifiers())
    }
}
