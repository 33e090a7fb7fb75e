//! Credential verification with account lockout.

use std::fmt;
use std::sync::Arc;

use jiff::Timestamp;

use super::lockout::{LockoutPolicy, minutes_remaining};
use crate::model::{Identity, NewAccount, Role, next_identifier};
use crate::security::PasswordHasher;
use crate::store::AccountStore;
use crate::{Error, Result, TRACING_TARGET_CREDENTIALS as TRACING_TARGET};

/// Authenticates identifier and secret pairs against the account store.
///
/// This is the only component that changes an account's failure counter
/// and lock expiry.
#[derive(Clone)]
pub struct CredentialVerifier {
    store: Arc<dyn AccountStore>,
    hasher: PasswordHasher,
    policy: LockoutPolicy,
}

impl CredentialVerifier {
    /// Creates a verifier with the default lockout policy.
    pub fn new(store: Arc<dyn AccountStore>, hasher: PasswordHasher) -> Self {
        Self {
            store,
            hasher,
            policy: LockoutPolicy::default(),
        }
    }

    /// Replaces the lockout policy.
    pub fn with_policy(mut self, policy: LockoutPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Returns the account store.
    #[inline]
    pub fn store(&self) -> &Arc<dyn AccountStore> {
        &self.store
    }

    /// Returns the lockout policy.
    #[inline]
    pub const fn policy(&self) -> &LockoutPolicy {
        &self.policy
    }

    /// Authenticates at the current time.
    pub fn authenticate(&self, identifier: &str, secret: &str) -> Result<Identity> {
        self.authenticate_at(identifier, secret, Timestamp::now())
    }

    /// Authenticates as if the attempt happened at `now`.
    ///
    /// # Errors
    ///
    /// - [`ErrorKind::Credential`] for an unknown identifier or wrong secret.
    /// - [`ErrorKind::Lockout`] while the account is locked, including the
    ///   attempt that locks it.
    /// - [`ErrorKind::Store`] if the account store fails.
    ///
    /// [`ErrorKind::Credential`]: crate::ErrorKind::Credential
    /// [`ErrorKind::Lockout`]: crate::ErrorKind::Lockout
    /// [`ErrorKind::Store`]: crate::ErrorKind::Store
    pub fn authenticate_at(&self, identifier: &str, secret: &str, now: Timestamp) -> Result<Identity> {
        let Some(account) = self.store.find_by_identifier(identifier)? else {
            self.hasher.verify_dummy(secret);
            tracing::info!(
                target: TRACING_TARGET,
                identifier,
                "login rejected, unknown identifier",
            );
            return Err(Error::credential("Invalid employee number"));
        };

        if let Some(remaining) = account.time_until_unlock(now) {
            tracing::warn!(
                target: TRACING_TARGET,
                account_id = %account.id,
                "login rejected, account locked",
            );
            return Err(Error::lockout(
                format!(
                    "Account locked. Try again in {} minutes",
                    minutes_remaining(remaining)
                ),
                remaining,
            ));
        }

        if !self.hasher.verify(&account.secret_hash, secret) {
            let account = self.store.record_failed_login(account.id, now, &self.policy)?;

            if let Some(remaining) = account.time_until_unlock(now) {
                tracing::warn!(
                    target: TRACING_TARGET,
                    account_id = %account.id,
                    attempts = account.failed_login_attempts,
                    "account locked after repeated failures",
                );
                return Err(Error::lockout(
                    format!(
                        "Account locked due to too many failed attempts. Try again in {} minutes",
                        minutes_remaining(remaining)
                    ),
                    remaining,
                ));
            }

            let remaining_attempts = self.policy.remaining_attempts(&account);
            tracing::info!(
                target: TRACING_TARGET,
                account_id = %account.id,
                attempts = account.failed_login_attempts,
                "login rejected, wrong secret",
            );
            return Err(Error::credential(format!(
                "Invalid password. {remaining_attempts} attempts remaining"
            )));
        }

        let account = self.store.record_successful_login(account.id, now)?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            role = %account.role,
            "login succeeded",
        );

        Ok(account.identity())
    }

    /// Hashes the secret and creates a new account.
    pub fn provision_account(
        &self,
        identifier: &str,
        display_name: &str,
        email: &str,
        role: Role,
        secret: &str,
    ) -> Result<Identity> {
        if identifier.trim().is_empty() {
            return Err(Error::credential("Employee number must not be empty"));
        }
        if secret.is_empty() {
            return Err(Error::credential("Password must not be empty"));
        }

        let account = self.store.create_account(NewAccount {
            identifier: identifier.trim().to_owned(),
            display_name: display_name.trim().to_owned(),
            email: email.trim().to_owned(),
            role,
            secret_hash: self.hasher.hash(secret)?,
        })?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = %account.id,
            identifier = %account.identifier,
            role = %account.role,
            "account provisioned",
        );

        Ok(account.identity())
    }

    /// Returns the next free employee number.
    pub fn next_identifier(&self) -> Result<String> {
        let identifiers = self.store.list_identifiers()?;
        next_identifier(identifiers.iter().map(String::as_str))
    }
}

impl fmt::Debug for CredentialVerifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialVerifier")
            .field("hasher", &self.hasher)
            .field("policy", &self.policy)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use jiff::SignedDuration;

    use super::*;
    use crate::ErrorKind;
    use crate::store::MemoryAccountStore;

    const SECRET: &str = "Str0ngP@ssw0rd1";

    fn verifier() -> anyhow::Result<CredentialVerifier> {
        let store = Arc::new(MemoryAccountStore::new());
        let verifier = CredentialVerifier::new(store, PasswordHasher::with_params(1024, 1, 1)?);
        verifier.provision_account("EMP001", "Alice Martin", "alice@epicevents.local", Role::Sales, SECRET)?;
        Ok(verifier)
    }

    #[test]
    fn unknown_identifier_is_reported() -> anyhow::Result<()> {
        let error = verifier()?
            .authenticate("EMP404", SECRET)
            .err()
            .ok_or_else(|| anyhow::anyhow!("login should fail"))?;

        assert_eq!(error.kind(), ErrorKind::Credential);
        assert_eq!(error.message(), "Invalid employee number");
        Ok(())
    }

    #[test]
    fn wrong_secret_counts_down() -> anyhow::Result<()> {
        let verifier = verifier()?;
        let now = Timestamp::now();

        let error = verifier
            .authenticate_at("EMP001", "wrong", now)
            .err()
            .ok_or_else(|| anyhow::anyhow!("login should fail"))?;

        assert_eq!(error.kind(), ErrorKind::Credential);
        assert_eq!(error.message(), "Invalid password. 4 attempts remaining");
        Ok(())
    }

    #[test]
    fn fifth_failure_locks_account() -> anyhow::Result<()> {
        let verifier = verifier()?;
        let now = Timestamp::now();

        for _ in 0..4 {
            assert!(verifier.authenticate_at("EMP001", "wrong", now).is_err());
        }
        let error = verifier
            .authenticate_at("EMP001", "wrong", now)
            .err()
            .ok_or_else(|| anyhow::anyhow!("login should fail"))?;

        assert_eq!(error.kind(), ErrorKind::Lockout);
        assert!(error.message().contains("Try again in 15 minutes"));
        assert_eq!(error.retry_after(), Some(SignedDuration::from_mins(15)));

        let locked = verifier
            .authenticate_at("EMP001", SECRET, now + SignedDuration::from_mins(5))
            .err()
            .ok_or_else(|| anyhow::anyhow!("locked login should fail"))?;
        assert_eq!(locked.kind(), ErrorKind::Lockout);
        assert_eq!(locked.message(), "Account locked. Try again in 10 minutes");
        Ok(())
    }

    #[test]
    fn failure_after_expired_lock_locks_again() -> anyhow::Result<()> {
        let verifier = verifier()?;
        let now = Timestamp::now();
        for _ in 0..5 {
            let _ = verifier.authenticate_at("EMP001", "wrong", now);
        }

        let later = now + verifier.policy().duration();
        let error = verifier
            .authenticate_at("EMP001", "wrong", later)
            .err()
            .ok_or_else(|| anyhow::anyhow!("login should fail"))?;

        assert_eq!(error.kind(), ErrorKind::Lockout);
        assert_eq!(
            error.message(),
            "Account locked due to too many failed attempts. Try again in 15 minutes"
        );

        let account = verifier
            .store()
            .find_by_identifier("EMP001")?
            .ok_or_else(|| anyhow::anyhow!("account missing"))?;
        assert_eq!(account.failed_login_attempts, 6);
        Ok(())
    }

    #[test]
    fn correct_secret_after_expired_lock_resets_counter() -> anyhow::Result<()> {
        let verifier = verifier()?;
        let now = Timestamp::now();
        for _ in 0..5 {
            let _ = verifier.authenticate_at("EMP001", "wrong", now);
        }

        let later = now + verifier.policy().duration();
        verifier.authenticate_at("EMP001", SECRET, later)?;

        let error = verifier
            .authenticate_at("EMP001", "wrong", later)
            .err()
            .ok_or_else(|| anyhow::anyhow!("login should fail"))?;
        assert_eq!(error.message(), "Invalid password. 4 attempts remaining");
        Ok(())
    }

    #[test]
    fn locked_attempts_do_not_touch_counter() -> anyhow::Result<()> {
        let verifier = verifier()?;
        let now = Timestamp::now();
        for _ in 0..5 {
            let _ = verifier.authenticate_at("EMP001", "wrong", now);
        }
        let _ = verifier.authenticate_at("EMP001", "wrong", now);

        let account = verifier
            .store()
            .find_by_identifier("EMP001")?
            .ok_or_else(|| anyhow::anyhow!("account missing"))?;
        assert_eq!(account.failed_login_attempts, 5);
        Ok(())
    }

    #[test]
    fn success_resets_counter_and_stamps_login() -> anyhow::Result<()> {
        let verifier = verifier()?;
        let now = Timestamp::now();
        let _ = verifier.authenticate_at("EMP001", "wrong", now);

        let identity = verifier.authenticate_at("EMP001", SECRET, now)?;
        assert_eq!(identity.identifier, "EMP001");

        let account = verifier
            .store()
            .find_by_id(identity.id)?
            .ok_or_else(|| anyhow::anyhow!("account missing"))?;
        assert_eq!(account.failed_login_attempts, 0);
        assert_eq!(account.last_login_at, Some(now));
        Ok(())
    }

    #[test]
    fn provisioning_assigns_next_identifier() -> anyhow::Result<()> {
        let verifier = verifier()?;
        assert_eq!(verifier.next_identifier()?, "EMP002");

        assert!(
            verifier
                .provision_account("EMP002", "Bob", "bob@epicevents.local", Role::Support, "")
                .is_err()
        );
        Ok(())
    }

    #[test]
    fn next_identifier_fails_when_numbers_run_out() -> anyhow::Result<()> {
        let verifier = verifier()?;
        verifier.provision_account(
            "EMP4294967295",
            "Zed",
            "zed@epicevents.local",
            Role::Support,
            SECRET,
        )?;

        let error = verifier
            .next_identifier()
            .err()
            .ok_or_else(|| anyhow::anyhow!("numbering should be exhausted"))?;
        assert_eq!(error.kind(), ErrorKind::Store);
        Ok(())
    }
}
