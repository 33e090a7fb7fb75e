//! Identity snapshot returned to callers and embedded in access tokens.

use serde::{Deserialize, Serialize};

use super::{AccountId, Role};

/// Minimal, non-secret projection of an account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Identity {
    /// Account identifier.
    pub id: AccountId,
    /// Business key (employee number).
    pub identifier: String,
    /// Human-readable name.
    pub display_name: String,
    /// Contact email address.
    pub email: String,
    /// Role at the time the snapshot was taken.
    pub role: Role,
    /// Numeric identifier of the role.
    pub role_id: i32,
}
