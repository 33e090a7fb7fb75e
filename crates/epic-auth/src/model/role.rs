//! Employee role enumeration.

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString};

/// Role held by an employee account.
///
/// The set of roles is closed: every permission and ownership decision is an
/// exhaustive match over these variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, EnumIter)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owns customers and contracts they are the sales contact for.
    Sales,
    /// Owns events they are the support contact for.
    Support,
    /// Full access across every entity.
    Management,
    /// Employee administration and read access.
    Admin,
}

impl Role {
    /// Returns the stable numeric identifier of this role.
    #[inline]
    pub const fn id(self) -> i32 {
        match self {
            Self::Sales => 1,
            Self::Support => 2,
            Self::Management => 3,
            Self::Admin => 4,
        }
    }

    /// Returns the role with the given numeric identifier.
    pub const fn from_id(id: i32) -> Option<Self> {
        match id {
            1 => Some(Self::Sales),
            2 => Some(Self::Support),
            3 => Some(Self::Management),
            4 => Some(Self::Admin),
            _ => None,
        }
    }

    /// Returns whether this role bypasses ownership checks.
    #[inline]
    pub const fn is_management(self) -> bool {
        matches!(self, Self::Management)
    }
}
