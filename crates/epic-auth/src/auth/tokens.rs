//! Token issuance, verification and refresh.

use jiff::{SignedDuration, Timestamp};
use jsonwebtoken::{Algorithm, Header, Validation, decode, encode};
use serde::Serialize;
use serde::de::DeserializeOwned;

use super::claims::{AccessClaims, RefreshClaims, TokenClaims, TokenType};
use crate::model::Identity;
use crate::security::SessionKeys;
use crate::store::AccountStore;
use crate::{Error, Result, TRACING_TARGET_TOKENS as TRACING_TARGET};

/// Lifetime of access tokens.
pub const ACCESS_TOKEN_TTL: SignedDuration = SignedDuration::from_mins(30);

/// Lifetime of refresh tokens.
pub const REFRESH_TOKEN_TTL: SignedDuration = SignedDuration::from_hours(24 * 7);

/// Signing algorithm of every session token.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// Mints, verifies and refreshes signed session tokens.
#[derive(Debug, Clone)]
pub struct TokenService {
    keys: SessionKeys,
    access_ttl: SignedDuration,
    refresh_ttl: SignedDuration,
}

impl TokenService {
    /// Creates a service with the default token lifetimes.
    pub fn new(keys: SessionKeys) -> Self {
        Self {
            keys,
            access_ttl: ACCESS_TOKEN_TTL,
            refresh_ttl: REFRESH_TOKEN_TTL,
        }
    }

    /// Creates a service with custom token lifetimes.
    ///
    /// # Errors
    ///
    /// Returns a configuration error unless both lifetimes are positive and
    /// the access lifetime is strictly shorter than the refresh lifetime.
    pub fn with_ttls(
        keys: SessionKeys,
        access_ttl: SignedDuration,
        refresh_ttl: SignedDuration,
    ) -> Result<Self> {
        if !access_ttl.is_positive() || !refresh_ttl.is_positive() {
            return Err(Error::config("token lifetimes must be positive"));
        }
        if access_ttl >= refresh_ttl {
            return Err(Error::config(
                "access token lifetime must be shorter than refresh token lifetime",
            ));
        }

        Ok(Self {
            keys,
            access_ttl,
            refresh_ttl,
        })
    }

    /// Returns the access token lifetime.
    #[inline]
    pub const fn access_ttl(&self) -> SignedDuration {
        self.access_ttl
    }

    /// Returns the refresh token lifetime.
    #[inline]
    pub const fn refresh_ttl(&self) -> SignedDuration {
        self.refresh_ttl
    }

    /// Mints an access token for the identity.
    pub fn create_access_token(&self, identity: &Identity) -> Result<String> {
        self.create_access_token_at(identity, Timestamp::now())
    }

    /// Mints an access token as if issued at `issued_at`.
    pub fn create_access_token_at(&self, identity: &Identity, issued_at: Timestamp) -> Result<String> {
        let claims = AccessClaims::new(identity, issued_at, self.access_ttl);
        self.sign(&claims, identity)
    }

    /// Mints a refresh token for the identity.
    pub fn create_refresh_token(&self, identity: &Identity) -> Result<String> {
        self.create_refresh_token_at(identity, Timestamp::now())
    }

    /// Mints a refresh token as if issued at `issued_at`.
    pub fn create_refresh_token_at(&self, identity: &Identity, issued_at: Timestamp) -> Result<String> {
        let claims = RefreshClaims::new(identity, issued_at, self.refresh_ttl);
        self.sign(&claims, identity)
    }

    /// Verifies a token and checks that its `type` claim matches.
    ///
    /// Bad signatures, expired tokens, malformed claims and type mismatches
    /// all yield `None`, without telling them apart.
    pub fn verify_token(&self, token: &str, expected: TokenType) -> Option<TokenClaims> {
        match expected {
            TokenType::Access => self.verify_access_token(token).map(TokenClaims::Access),
            TokenType::Refresh => self.verify_refresh_token(token).map(TokenClaims::Refresh),
        }
    }

    /// Verifies an access token.
    pub fn verify_access_token(&self, token: &str) -> Option<AccessClaims> {
        self.decode::<AccessClaims>(token)
            .filter(|claims| self.type_matches(claims.token_type, TokenType::Access))
    }

    /// Verifies a refresh token.
    pub fn verify_refresh_token(&self, token: &str) -> Option<RefreshClaims> {
        self.decode::<RefreshClaims>(token)
            .filter(|claims| self.type_matches(claims.token_type, TokenType::Refresh))
    }

    /// Mints a new access token from a refresh token.
    ///
    /// The account is re-read from the store, so the new token reflects the
    /// current role, name and email rather than anything in the refresh
    /// token. Returns `Ok(None)` if the refresh token is invalid or the
    /// account no longer exists.
    pub fn refresh_access_token(
        &self,
        refresh_token: &str,
        store: &dyn AccountStore,
    ) -> Result<Option<String>> {
        let Some(claims) = self.verify_refresh_token(refresh_token) else {
            return Ok(None);
        };

        let account = store
            .find_by_identifier(&claims.identifier)?
            .filter(|account| account.id == claims.account_id);

        let Some(account) = account else {
            tracing::info!(
                target: TRACING_TARGET,
                account_id = %claims.account_id,
                identifier = %claims.identifier,
                "refresh rejected, account no longer exists",
            );
            return Ok(None);
        };

        let token = self.create_access_token(&account.identity())?;

        tracing::debug!(
            target: TRACING_TARGET,
            account_id = %account.id,
            role = %account.role,
            "access token refreshed",
        );

        Ok(Some(token))
    }

    fn sign<C: Serialize>(&self, claims: &C, identity: &Identity) -> Result<String> {
        encode(&Header::new(ALGORITHM), claims, self.keys.encoding_key()).map_err(|e| {
            tracing::error!(
                target: TRACING_TARGET,
                account_id = %identity.id,
                error = %e,
                "failed to sign token",
            );
            Error::config("session token generation failed").with_source(e)
        })
    }

    fn decode<C: DeserializeOwned>(&self, token: &str) -> Option<C> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        validation.validate_exp = true;

        match decode::<C>(token, self.keys.decoding_key(), &validation) {
            Ok(data) => Some(data.claims),
            Err(e) => {
                tracing::debug!(
                    target: TRACING_TARGET,
                    reason = ?e.kind(),
                    "token rejected",
                );
                None
            }
        }
    }

    fn type_matches(&self, actual: TokenType, expected: TokenType) -> bool {
        if actual != expected {
            tracing::debug!(
                target: TRACING_TARGET,
                %actual,
                %expected,
                "token rejected, wrong type",
            );
        }

        actual == expected
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{AccountId, NewAccount, Role};
    use crate::store::MemoryAccountStore;

    const TEST_SECRET: &str = "test-signing-secret-that-is-long-enough";

    fn service() -> anyhow::Result<TokenService> {
        Ok(TokenService::new(SessionKeys::from_secret(TEST_SECRET)?))
    }

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
    fn access_token_round_trip() -> anyhow::Result<()> {
        let service = service()?;
        let identity = identity();
        let token = service.create_access_token(&identity)?;

        assert_eq!(token.split('.').count(), 3);
        let claims = service
            .verify_access_token(&token)
            .ok_or_else(|| anyhow::anyhow!("token should verify"))?;
        assert_eq!(claims.identity(), identity);
        assert_eq!(claims.expires_at.duration_since(claims.issued_at), ACCESS_TOKEN_TTL);
        Ok(())
    }

    #[test]
    fn token_types_are_isolated() -> anyhow::Result<()> {
        let service = service()?;
        let identity = identity();
        let access = service.create_access_token(&identity)?;
        let refresh = service.create_refresh_token(&identity)?;

        assert!(service.verify_token(&access, TokenType::Refresh).is_none());
        assert!(service.verify_token(&refresh, TokenType::Access).is_none());
        assert_eq!(
            service.verify_token(&access, TokenType::Access).map(|c| c.token_type()),
            Some(TokenType::Access)
        );
        assert_eq!(
            service.verify_token(&refresh, TokenType::Refresh).map(|c| c.token_type()),
            Some(TokenType::Refresh)
        );
        Ok(())
    }

    #[test]
    fn expired_token_is_rejected() -> anyhow::Result<()> {
        let service = service()?;
        let issued_at = Timestamp::now() - SignedDuration::from_hours(1);
        let token = service.create_access_token_at(&identity(), issued_at)?;

        assert!(service.verify_token(&token, TokenType::Access).is_none());
        Ok(())
    }

    #[test]
    fn tampered_and_foreign_tokens_are_rejected() -> anyhow::Result<()> {
        let service = service()?;
        let token = service.create_access_token(&identity())?;
        let elevated = Identity {
            role: Role::Management,
            role_id: Role::Management.id(),
            ..identity()
        };
        let forged = service.create_access_token(&elevated)?;

        // Payload of one token with the signature of another.
        let (signed_part, _) = token
            .rsplit_once('.')
            .ok_or_else(|| anyhow::anyhow!("token has no signature"))?;
        let (_, forged_signature) = forged
            .rsplit_once('.')
            .ok_or_else(|| anyhow::anyhow!("token has no signature"))?;
        let tampered = format!("{signed_part}.{forged_signature}");
        assert!(service.verify_access_token(&tampered).is_none());

        let other = TokenService::new(SessionKeys::from_secret(
            "another-signing-secret-of-enough-length",
        )?);
        assert!(other.verify_access_token(&token).is_none());
        assert!(service.verify_access_token("not.a.token").is_none());
        Ok(())
    }

    #[test]
    fn ttl_ordering_is_enforced() -> anyhow::Result<()> {
        let keys = SessionKeys::from_secret(TEST_SECRET)?;
        let minute = SignedDuration::from_mins(1);

        assert!(TokenService::with_ttls(keys.clone(), minute, minute).is_err());
        assert!(TokenService::with_ttls(keys.clone(), minute * 2, minute).is_err());
        assert!(TokenService::with_ttls(keys.clone(), -minute, minute).is_err());
        assert!(TokenService::with_ttls(keys, minute, minute * 2).is_ok());
        Ok(())
    }

    #[test]
    fn refresh_uses_current_role() -> anyhow::Result<()> {
        let service = service()?;
        let store = MemoryAccountStore::new();
        let account = store.create_account(NewAccount {
            identifier: "EMP001".to_owned(),
            display_name: "Alice Martin".to_owned(),
            email: "alice@epicevents.local".to_owned(),
            role: Role::Management,
            secret_hash: String::new(),
        })?;

        let refresh = service.create_refresh_token(&account.identity())?;
        store.update_role(account.id, Role::Support)?;

        let access = service
            .refresh_access_token(&refresh, &store)?
            .ok_or_else(|| anyhow::anyhow!("refresh should succeed"))?;
        let claims = service
            .verify_access_token(&access)
            .ok_or_else(|| anyhow::anyhow!("refreshed token should verify"))?;

        assert_eq!(claims.role, Role::Support);
        assert_eq!(claims.role_id, Role::Support.id());
        Ok(())
    }

    #[test]
    fn refresh_fails_for_missing_account() -> anyhow::Result<()> {
        let service = service()?;
        let store = MemoryAccountStore::new();
        let refresh = service.create_refresh_token(&identity())?;

        assert!(service.refresh_access_token(&refresh, &store)?.is_none());
        Ok(())
    }

    #[test]
    fn refresh_rejects_access_token() -> anyhow::Result<()> {
        let service = service()?;
        let store = MemoryAccountStore::new();
        let access = service.create_access_token(&identity())?;

        assert!(service.refresh_access_token(&access, &store)?.is_none());
        Ok(())
    }
}
