//! Account and identity data model.

mod account;
mod identity;
mod role;

pub use account::{Account, AccountId, NewAccount, next_identifier};
pub use identity::Identity;
pub use role::Role;
