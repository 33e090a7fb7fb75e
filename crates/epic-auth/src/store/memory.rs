//! Process-local account store.

use std::sync::{Mutex, MutexGuard};

use jiff::Timestamp;

use super::AccountStore;
use super::table::AccountTable;
use crate::auth::LockoutPolicy;
use crate::model::{Account, AccountId, NewAccount, Role};
use crate::{Error, Result, TRACING_TARGET_STORE};

/// Account store kept entirely in memory.
///
/// Every read-modify-write runs under a single mutex, which makes the
/// lockout counter updates atomic across threads.
#[derive(Debug, Default)]
pub struct MemoryAccountStore {
    table: Mutex<AccountTable>,
}

impl MemoryAccountStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, AccountTable>> {
        self.table.lock().map_err(|_| {
            tracing::error!(target: TRACING_TARGET_STORE, "account table mutex poisoned");
            Error::store("account store is unavailable")
        })
    }
}

impl AccountStore for MemoryAccountStore {
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
        self.lock()?.record_failed_login(id, now, policy)
    }

    fn record_successful_login(&self, id: AccountId, now: Timestamp) -> Result<Account> {
        self.lock()?.record_successful_login(id, now)
    }

    fn create_account(&self, account: NewAccount) -> Result<Account> {
        let account = self.lock()?.create_account(account, Timestamp::now())?;

        tracing::debug!(
            target: TRACING_TARGET_STORE,
            account_id = %account.id,
            identifier = %account.identifier,
            "account created",
        );

        Ok(account)
    }

    fn update_role(&self, id: AccountId, role: Role) -> Result<Account> {
        self.lock()?.update_role(id, role)
    }

    fn list_identifiers(&self) -> Result<Vec<String>> {
        Ok(self.lock()?.identifiers())
    }
}
