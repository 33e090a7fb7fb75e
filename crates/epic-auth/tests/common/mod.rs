//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use epic_auth::{
    AccountStore, CredentialVerifier, Identity, MemoryAccountStore, PasswordHasher, Role,
    SessionFile, SessionKeys, SessionManager, TokenService,
};
use tempfile::TempDir;

pub const SECRET: &str = "Str0ngP@ssw0rd1";
pub const SIGNING_SECRET: &str = "integration-test-signing-secret-0123456789";

/// Temporary home for session files plus an in-memory account store.
pub struct Fixture {
    pub dir: TempDir,
    pub store: Arc<MemoryAccountStore>,
}

impl Fixture {
    pub fn new() -> anyhow::Result<Self> {
        Ok(Self {
            dir: TempDir::new()?,
            store: Arc::new(MemoryAccountStore::new()),
        })
    }

    pub fn session_path(&self) -> PathBuf {
        self.dir.path().join(".epic_events_tokens")
    }

    pub fn verifier(&self) -> anyhow::Result<CredentialVerifier> {
        let store: Arc<dyn AccountStore> = self.store.clone();
        Ok(CredentialVerifier::new(store, PasswordHasher::with_params(1024, 1, 1)?))
    }

    pub fn tokens(&self) -> anyhow::Result<TokenService> {
        Ok(TokenService::new(SessionKeys::from_secret(SIGNING_SECRET)?))
    }

    /// Builds a manager as a fresh process would, with an empty cache.
    pub fn manager(&self) -> anyhow::Result<SessionManager> {
        Ok(SessionManager::new(
            self.verifier()?,
            self.tokens()?,
            SessionFile::new(self.session_path()),
        ))
    }

    pub fn provision(&self, identifier: &str, role: Role) -> anyhow::Result<Identity> {
        let email = format!("{}@epicevents.local", identifier.to_lowercase());
        Ok(self
            .verifier()?
            .provision_account(identifier, "Test Employee", &email, role, SECRET)?)
    }
}
