//! Authorization policy: the static role permission table and ownership
//! predicates.

mod ownership;
mod permission;

pub use ownership::{OwnedEntity, Ownership, can_update, can_update_own};
pub use permission::{Entity, Permission, describe_permissions, ensure_permission, has_permission};
