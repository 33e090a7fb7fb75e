//! Ownership predicates.
//!
//! Sales employees own the customers and contracts they are the sales
//! contact for, support employees own the events they are assigned to.
//! Management may act on everything.

use super::permission::{Entity, Permission, has_permission};
use crate::TRACING_TARGET_AUTHORIZATION as TRACING_TARGET;
use crate::model::{AccountId, Identity, Role};

/// Owner relationship recorded on a mutable entity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Ownership {
    /// `customer.sales_contact_id`
    CustomerSalesContact,
    /// `contract.sales_contact_id`
    ContractSalesContact,
    /// `event.support_contact_id`
    EventSupportContact,
}

impl Ownership {
    /// Returns the role that can own entities through this relation.
    pub const fn owner_role(self) -> Role {
        match self {
            Self::CustomerSalesContact | Self::ContractSalesContact => Role::Sales,
            Self::EventSupportContact => Role::Support,
        }
    }

    /// Returns the entity type carrying this relation.
    pub const fn entity(self) -> Entity {
        match self {
            Self::CustomerSalesContact => Entity::Customer,
            Self::ContractSalesContact => Entity::Contract,
            Self::EventSupportContact => Entity::Event,
        }
    }
}

/// Entity with a recorded owner, implemented by the command layer's models.
pub trait OwnedEntity {
    /// Returns the relation through which this entity is owned.
    fn ownership(&self) -> Ownership;

    /// Returns the account recorded as owner, if any.
    fn owner_id(&self) -> Option<AccountId>;
}

/// Returns whether the identity may update the entity as its owner.
///
/// Management always may. The owning role may iff it is the recorded owner.
/// Every other role may not.
pub fn can_update_own<E>(identity: Option<&Identity>, entity: &E) -> bool
where
    E: OwnedEntity + ?Sized,
{
    let Some(identity) = identity else {
        return false;
    };

    let ownership = entity.ownership();
    let allowed = identity.role.is_management()
        || (identity.role == ownership.owner_role() && entity.owner_id() == Some(identity.id));

    tracing::debug!(
        target: TRACING_TARGET,
        account_id = %identity.id,
        role = %identity.role,
        ownership = ?ownership,
        allowed,
        "ownership check",
    );

    allowed
}

/// Returns whether the identity may update the entity.
///
/// Ownership is an alternative grant path to the blanket update permission.
/// For the owning role the blanket permission is scoped to owned entities,
/// so a sales employee can never update another salesperson's customer.
pub fn can_update<E>(identity: Option<&Identity>, entity: &E) -> bool
where
    E: OwnedEntity + ?Sized,
{
    if can_update_own(identity, entity) {
        return true;
    }

    let ownership = entity.ownership();
    identity.is_some_and(|identity| identity.role != ownership.owner_role())
        && has_permission(identity, Permission::update_for(ownership.entity()))
}
