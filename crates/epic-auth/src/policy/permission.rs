//! Role to permission table.
//!
//! The table is a set of exhaustive `const` matches, so adding a role or a
//! permission fails to compile until every decision has been made.

use std::fmt::Write as _;

use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumIter, EnumString, IntoEnumIterator};

use crate::model::{Identity, Role};
use crate::{Error, Result, TRACING_TARGET_AUTHORIZATION as TRACING_TARGET};

/// Entity types covered by the permission table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumIter)]
pub enum Entity {
    Customer,
    Employee,
    Contract,
    Event,
}

/// Fine-grained actions granted to roles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, EnumString, EnumIter)]
#[derive(Serialize, Deserialize)]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
#[serde(rename_all = "snake_case")]
pub enum Permission {
    // Customer permissions
    CreateCustomer,
    ReadCustomer,
    UpdateCustomer,
    DeleteCustomer,

    // Employee permissions
    CreateEmployee,
    ReadEmployee,
    UpdateEmployee,
    DeleteEmployee,

    // Contract permissions
    CreateContract,
    ReadContract,
    UpdateContract,
    DeleteContract,
    /// Mark a contract as signed.
    SignContract,

    // Event permissions
    CreateEvent,
    ReadEvent,
    UpdateEvent,
    DeleteEvent,
    /// Assign a support contact to an event.
    AssignSupport,
}

impl Permission {
    /// Checks if the given role is granted this permission.
    pub const fn is_permitted_by_role(self, role: Role) -> bool {
        use Role::{Admin, Management, Sales, Support};

        match self {
            Self::CreateCustomer | Self::UpdateCustomer => matches!(role, Sales | Management),
            Self::ReadCustomer => matches!(role, Sales | Support | Management | Admin),
            Self::DeleteCustomer => matches!(role, Management),

            Self::CreateEmployee | Self::UpdateEmployee | Self::DeleteEmployee => {
                matches!(role, Management | Admin)
            }
            Self::ReadEmployee => matches!(role, Sales | Support | Management | Admin),

            Self::CreateContract | Self::UpdateContract | Self::SignContract => {
                matches!(role, Sales | Management)
            }
            Self::ReadContract => matches!(role, Sales | Support | Management | Admin),
            Self::DeleteContract => matches!(role, Management),

            Self::CreateEvent => matches!(role, Sales | Management),
            Self::ReadEvent => matches!(role, Sales | Support | Management | Admin),
            Self::UpdateEvent => matches!(role, Support | Management),
            Self::DeleteEvent | Self::AssignSupport => matches!(role, Management),
        }
    }

    /// Returns the entity type this permission applies to.
    #[must_use]
    pub const fn entity(self) -> Entity {
        match self {
            Self::CreateCustomer
            | Self::ReadCustomer
            | Self::UpdateCustomer
            | Self::DeleteCustomer => Entity::Customer,

            Self::CreateEmployee
            | Self::ReadEmployee
            | Self::UpdateEmployee
            | Self::DeleteEmployee => Entity::Employee,

            Self::CreateContract
            | Self::ReadContract
            | Self::UpdateContract
            | Self::DeleteContract
            | Self::SignContract => Entity::Contract,

            Self::CreateEvent
            | Self::ReadEvent
            | Self::UpdateEvent
            | Self::DeleteEvent
            | Self::AssignSupport => Entity::Event,
        }
    }

    /// Returns the blanket update permission for an entity type.
    #[must_use]
    pub const fn update_for(entity: Entity) -> Self {
        match entity {
            Entity::Customer => Self::UpdateCustomer,
            Entity::Employee => Self::UpdateEmployee,
            Entity::Contract => Self::UpdateContract,
            Entity::Event => Self::UpdateEvent,
        }
    }

    /// Returns all permissions granted to the given role.
    pub fn permissions_for_role(role: Role) -> Vec<Self> {
        // Compile-time assertions to keep the table consistent.
        const _: () = {
            // Management holds every grant the other roles hold.
            assert!(Permission::DeleteCustomer.is_permitted_by_role(Role::Management));
            assert!(Permission::DeleteEmployee.is_permitted_by_role(Role::Management));
            assert!(Permission::AssignSupport.is_permitted_by_role(Role::Management));
            assert!(Permission::SignContract.is_permitted_by_role(Role::Management));

            // Support never creates or deletes.
            assert!(!Permission::CreateCustomer.is_permitted_by_role(Role::Support));
            assert!(!Permission::DeleteCustomer.is_permitted_by_role(Role::Support));
            assert!(!Permission::CreateEvent.is_permitted_by_role(Role::Support));

            // Sales cannot delete or touch events after creation.
            assert!(!Permission::DeleteContract.is_permitted_by_role(Role::Sales));
            assert!(!Permission::UpdateEvent.is_permitted_by_role(Role::Sales));
        };

        Self::iter()
            .filter(|perm| perm.is_permitted_by_role(role))
            .collect()
    }

    /// Returns a human-readable description of the permission.
    #[must_use]
    pub const fn description(self) -> &'static str {
        match self {
            Self::CreateCustomer => "Create new customers",
            Self::ReadCustomer => "View customers",
            Self::UpdateCustomer => "Edit customers",
            Self::DeleteCustomer => "Delete customers",
            Self::CreateEmployee => "Create employee accounts",
            Self::ReadEmployee => "View employees",
            Self::UpdateEmployee => "Edit employee accounts",
            Self::DeleteEmployee => "Delete employee accounts",
            Self::CreateContract => "Create new contracts",
            Self::ReadContract => "View contracts",
            Self::UpdateContract => "Edit contracts",
            Self::DeleteContract => "Delete contracts",
            Self::SignContract => "Mark contracts as signed",
            Self::CreateEvent => "Create events for signed contracts",
            Self::ReadEvent => "View events",
            Self::UpdateEvent => "Edit events",
            Self::DeleteEvent => "Delete events",
            Self::AssignSupport => "Assign a support contact to an event",
        }
    }
}

/// Returns whether the identity is granted the permission.
///
/// An absent identity is never granted anything.
pub fn has_permission(identity: Option<&Identity>, permission: Permission) -> bool {
    identity.is_some_and(|identity| permission.is_permitted_by_role(identity.role))
}

/// Like [`has_permission`], but fails with a permission denied error naming
/// the missing permission.
pub fn ensure_permission(identity: Option<&Identity>, permission: Permission) -> Result<()> {
    let Some(identity) = identity else {
        return Err(Error::permission_denied(permission));
    };

    if permission.is_permitted_by_role(identity.role) {
        return Ok(());
    }

    tracing::info!(
        target: TRACING_TARGET,
        account_id = %identity.id,
        role = %identity.role,
        permission = %permission,
        "permission denied",
    );

    Err(Error::permission_denied(permission))
}

/// Produces a summary of a role's permissions grouped by entity.
pub fn describe_permissions(role: Role) -> String {
    let permissions = Permission::permissions_for_role(role);
    let mut description = format!("Permissions for role '{}':\n", role.as_ref().to_uppercase());

    for entity in Entity::iter() {
        let granted: Vec<_> = permissions
            .iter()
            .filter(|perm| perm.entity() == entity)
            .collect();
        if granted.is_empty() {
            continue;
        }

        let _ = writeln!(description, "\n  {entity}:");
        for perm in granted {
            let _ = writeln!(description, "    - {}", perm.description());
        }
    }

    description
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use crate::model::AccountId;

    use super::*;

    fn identity(role: Role) -> Identity {
        Identity {
            id: AccountId::new(),
            identifier: "EMP001".to_owned(),
            display_name: "Test Employee".to_owned(),
            email: "test@epicevents.local".to_owned(),
            role,
            role_id: role.id(),
        }
    }

    #[test]
    fn absent_identity_has_no_permission() {
        for permission in Permission::iter() {
            assert!(!has_permission(None, permission));
        }
    }

    #[test]
    fn support_cannot_delete_customers() {
        let support = identity(Role::Support);
        let management = identity(Role::Management);

        assert!(!has_permission(Some(&support), Permission::DeleteCustomer));
        assert!(has_permission(Some(&management), Permission::DeleteCustomer));
    }

    #[test]
    fn management_is_superset_of_every_role() {
        let management = Permission::permissions_for_role(Role::Management);
        assert_eq!(management.len(), Permission::iter().count());

        for role in Role::iter() {
            for permission in Permission::permissions_for_role(role) {
                assert!(management.contains(&permission), "{role} grants {permission}");
            }
        }
    }

    #[test]
    fn role_tables_match_expected_grants() {
        use Permission::*;

        assert_eq!(
            Permission::permissions_for_role(Role::Sales),
            vec![
                CreateCustomer,
                ReadCustomer,
                UpdateCustomer,
                ReadEmployee,
                CreateContract,
                ReadContract,
                UpdateContract,
                SignContract,
                CreateEvent,
                ReadEvent,
            ]
        );
        assert_eq!(
            Permission::permissions_for_role(Role::Support),
            vec![ReadCustomer, ReadEmployee, ReadContract, ReadEvent, UpdateEvent]
        );
    }

    #[test]
    fn ensure_permission_names_missing_grant() {
        let sales = identity(Role::Sales);

        assert!(ensure_permission(Some(&sales), Permission::CreateCustomer).is_ok());

        let error = ensure_permission(Some(&sales), Permission::DeleteContract).err();
        let message = error.as_ref().map(|e| e.message().to_owned());
        assert_eq!(error.map(|e| e.kind()), Some(crate::ErrorKind::PermissionDenied));
        assert!(message.is_some_and(|m| m.contains("delete_contract")));
    }

    #[test]
    fn permission_names_are_snake_case() {
        assert_eq!(Permission::SignContract.to_string(), "sign_contract");
        assert_eq!(
            Permission::from_str("assign_support").ok(),
            Some(Permission::AssignSupport)
        );
    }

    #[test]
    fn describe_groups_by_entity() {
        let description = describe_permissions(Role::Support);

        assert!(description.starts_with("Permissions for role 'SUPPORT':"));
        assert!(description.contains("Event:"));
        assert!(description.contains("Edit events"));
        assert!(!description.contains("Delete"));
    }
}
