//! Account store abstraction and implementations.
//!
//! The store owns [`Account`] records. Credential state (failure counter,
//! lock expiry, last login) is only changed through
//! [`AccountStore::record_failed_login`] and
//! [`AccountStore::record_successful_login`], which implementations must
//! perform as a single atomic read-modify-write.

mod json_file;
mod memory;
mod table;

use jiff::Timestamp;

pub use self::json_file::JsonAccountStore;
pub use self::memory::MemoryAccountStore;
use crate::Result;
use crate::auth::LockoutPolicy;
use crate::model::{Account, AccountId, NewAccount, Role};

/// Storage of employee accounts used by the authentication core.
pub trait AccountStore: Send + Sync {
    /// Finds an account by its business identifier.
    fn find_by_identifier(&self, identifier: &str) -> Result<Option<Account>>;

    /// Finds an account by id.
    fn find_by_id(&self, id: AccountId) -> Result<Option<Account>>;

    /// Atomically records a failed login attempt and returns the updated account.
    fn record_failed_login(
        &self,
        id: AccountId,
        now: Timestamp,
        policy: &LockoutPolicy,
    ) -> Result<Account>;

    /// Atomically resets the failure state, stamps the last login and returns
    /// the updated account.
    fn record_successful_login(&self, id: AccountId, now: Timestamp) -> Result<Account>;

    /// Creates a new account, rejecting duplicate identifiers and emails.
    fn create_account(&self, account: NewAccount) -> Result<Account>;

    /// Changes the role of an account and returns the updated account.
    fn update_role(&self, id: AccountId, role: Role) -> Result<Account>;

    /// Returns the identifiers of every stored account.
    fn list_identifiers(&self) -> Result<Vec<String>>;
}
