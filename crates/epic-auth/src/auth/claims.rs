//! Session token claims.
//!
//! Access tokens carry the full identity snapshot. Refresh tokens carry only
//! the subject and identifier, so that every refresh re-reads the account
//! instead of trusting stale role or name claims.

use jiff::{SignedDuration, Timestamp};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display};

use crate::model::{AccountId, Identity, Role};

/// Kind of a session token, carried in the `type` claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[derive(AsRefStr, Display, Serialize, Deserialize)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum TokenType {
    /// Short-lived token authorizing commands.
    Access,
    /// Long-lived token used only to mint new access tokens.
    Refresh,
}

/// Claims of an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessClaims {
    /// Subject (account id).
    #[serde(rename = "sub")]
    pub account_id: AccountId,
    /// Employee number.
    #[serde(rename = "employee_number")]
    pub identifier: String,
    /// Display name.
    #[serde(rename = "name")]
    pub display_name: String,
    /// Contact email address.
    pub email: String,
    /// Role at issuance.
    pub role: Role,
    /// Numeric role identifier at issuance.
    pub role_id: i32,
    /// Issued at (seconds since the Unix epoch).
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiration time (seconds since the Unix epoch).
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
    /// Token kind, always [`TokenType::Access`] for valid tokens.
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl AccessClaims {
    /// Builds access claims for the identity.
    pub fn new(identity: &Identity, issued_at: Timestamp, ttl: SignedDuration) -> Self {
        Self {
            account_id: identity.id,
            identifier: identity.identifier.clone(),
            display_name: identity.display_name.clone(),
            email: identity.email.clone(),
            role: identity.role,
            role_id: identity.role_id,
            issued_at,
            expires_at: issued_at + ttl,
            token_type: TokenType::Access,
        }
    }

    /// Reconstructs the identity snapshot carried by the token.
    pub fn identity(&self) -> Identity {
        Identity {
            id: self.account_id,
            identifier: self.identifier.clone(),
            display_name: self.display_name.clone(),
            email: self.email.clone(),
            role: self.role,
            role_id: self.role_id,
        }
    }

    /// Returns the remaining lifetime, or zero if already expired.
    #[must_use]
    pub fn remaining_lifetime(&self, now: Timestamp) -> SignedDuration {
        let remaining = self.expires_at.duration_since(now);
        if remaining.is_positive() {
            remaining
        } else {
            SignedDuration::ZERO
        }
    }
}

/// Claims of a refresh token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RefreshClaims {
    /// Subject (account id).
    #[serde(rename = "sub")]
    pub account_id: AccountId,
    /// Employee number used to re-fetch the account.
    #[serde(rename = "employee_number")]
    pub identifier: String,
    /// Issued at (seconds since the Unix epoch).
    #[serde(rename = "iat", with = "jiff::fmt::serde::timestamp::second::required")]
    pub issued_at: Timestamp,
    /// Expiration time (seconds since the Unix epoch).
    #[serde(rename = "exp", with = "jiff::fmt::serde::timestamp::second::required")]
    pub expires_at: Timestamp,
    /// Token kind, always [`TokenType::Refresh`] for valid tokens.
    #[serde(rename = "type")]
    pub token_type: TokenType,
}

impl RefreshClaims {
    /// Builds refresh claims for the identity.
    pub fn new(identity: &Identity, issued_at: Timestamp, ttl: SignedDuration) -> Self {
        Self {
            account_id: identity.id,
            identifier: identity.identifier.clone(),
            issued_at,
            expires_at: issued_at + ttl,
            token_type: TokenType::Refresh,
        }
    }
}

/// Verified claims of either token kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenClaims {
    /// Claims of a verified access token.
    Access(AccessClaims),
    /// Claims of a verified refresh token.
    Refresh(RefreshClaims),
}

impl TokenClaims {
    /// Returns the token kind.
    pub const fn token_type(&self) -> TokenType {
        match self {
            Self::Access(_) => TokenType::Access,
            Self::Refresh(_) => TokenType::Refresh,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn identity() -> Identity {
        Identity {
            id: AccountId::new(),
            identifier: "EMP001".to_owned(),
            display_name: "Alice Martin".to_owned(),
            email: "alice@epicevents.local".to_owned(),
            role: Role::Sales,
            role_id: 1,
        }
    }

    #[test]
    fn access_claims_use_wire_names() -> anyhow::Result<()> {
        let now = Timestamp::from_second(1_700_000_000)?;
        let claims = AccessClaims::new(&identity(), now, SignedDuration::from_mins(30));

        let json = serde_json::to_value(&claims)?;
        assert_eq!(json["employee_number"], "EMP001");
        assert_eq!(json["name"], "Alice Martin");
        assert_eq!(json["role"], "sales");
        assert_eq!(json["type"], "access");
        assert_eq!(json["iat"], 1_700_000_000);
        assert_eq!(json["exp"], 1_700_001_800);
        Ok(())
    }

    #[test]
    fn refresh_claims_exclude_role_and_name() -> anyhow::Result<()> {
        let now = Timestamp::from_second(1_700_000_000)?;
        let claims = RefreshClaims::new(&identity(), now, SignedDuration::from_hours(24 * 7));

        let json = serde_json::to_value(&claims)?;
        assert_eq!(json["type"], "refresh");
        assert!(json.get("role").is_none());
        assert!(json.get("name").is_none());
        assert!(json.get("email").is_none());
        Ok(())
    }

    #[test]
    fn identity_round_trips_through_claims() -> anyhow::Result<()> {
        let identity = identity();
        let claims = AccessClaims::new(&identity, Timestamp::now(), SignedDuration::from_mins(30));
        assert_eq!(claims.identity(), identity);
        Ok(())
    }

    #[test]
    fn remaining_lifetime_saturates_at_zero() -> anyhow::Result<()> {
        let now = Timestamp::from_second(1_700_000_000)?;
        let claims = AccessClaims::new(&identity(), now, SignedDuration::from_mins(30));

        assert_eq!(claims.remaining_lifetime(now), SignedDuration::from_mins(30));
        let later = now + SignedDuration::from_hours(1);
        assert_eq!(claims.remaining_lifetime(later), SignedDuration::ZERO);
        Ok(())
    }
}
