//! In-memory account table shared by the store implementations.

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::auth::LockoutPolicy;
use crate::model::{Account, AccountId, NewAccount, Role};
use crate::{Error, Result};

/// Accounts held by a store, serialized as `{ "accounts": [...] }`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub(super) struct AccountTable {
    #[serde(default)]
    accounts: Vec<Account>,
}

impl AccountTable {
    pub fn find_by_identifier(&self, identifier: &str) -> Option<&Account> {
        self.accounts.iter().find(|a| a.identifier == identifier)
    }

    pub fn find_by_id(&self, id: AccountId) -> Option<&Account> {
        self.accounts.iter().find(|a| a.id == id)
    }

    pub fn record_failed_login(
        &mut self,
        id: AccountId,
        now: Timestamp,
        policy: &LockoutPolicy,
    ) -> Result<Account> {
        let account = self.get_mut(id)?;
        policy.register_failure(account, now);
        Ok(account.clone())
    }

    pub fn record_successful_login(&mut self, id: AccountId, now: Timestamp) -> Result<Account> {
        let account = self.get_mut(id)?;
        LockoutPolicy::register_success(account, now);
        Ok(account.clone())
    }

    pub fn create_account(&mut self, new_account: NewAccount, now: Timestamp) -> Result<Account> {
        if self.find_by_identifier(&new_account.identifier).is_some() {
            return Err(Error::store(format!(
                "an account with identifier {} already exists",
                new_account.identifier
            )));
        }
        if self
            .accounts
            .iter()
            .any(|a| a.email.eq_ignore_ascii_case(&new_account.email))
        {
            return Err(Error::store(format!(
                "an account with email {} already exists",
                new_account.email
            )));
        }

        let account = new_account.into_account(now);
        self.accounts.push(account.clone());
        Ok(account)
    }

    pub fn update_role(&mut self, id: AccountId, role: Role) -> Result<Account> {
        let account = self.get_mut(id)?;
        account.role = role;
        Ok(account.clone())
    }

    pub fn identifiers(&self) -> Vec<String> {
        self.accounts.iter().map(|a| a.identifier.clone()).collect()
    }

    fn get_mut(&mut self, id: AccountId) -> Result<&mut Account> {
        self.accounts
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or_else(|| Error::store(format!("account {id} does not exist")))
    }
}
