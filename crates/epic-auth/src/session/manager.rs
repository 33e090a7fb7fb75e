//! Session orchestration for the command layer.

use std::sync::Arc;

use jiff::{SignedDuration, Timestamp};
use serde::Serialize;

use super::persisted::{PersistedSession, SessionFile};
use crate::auth::{CredentialVerifier, TokenService};
use crate::model::Identity;
use crate::policy::{Permission, has_permission};
use crate::security::{PasswordHasher, SessionKeys};
use crate::store::AccountStore;
use crate::{AuthConfig, Error, Result, TRACING_TARGET_SESSION as TRACING_TARGET};

/// Outcome of a login attempt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginResponse {
    /// Whether the credentials were accepted.
    pub success: bool,
    /// Authenticated identity, on success.
    pub identity: Option<Identity>,
    /// Message for the user.
    pub message: String,
    /// Remaining lock time, when the account is locked.
    #[serde(skip)]
    pub retry_after: Option<SignedDuration>,
}

/// Outcome of a logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LogoutResponse {
    /// Always true, logging out is idempotent.
    pub success: bool,
    /// Message for the user.
    pub message: String,
}

/// Details about the active session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SessionInfo {
    /// Identity carried by the access token.
    pub identity: Identity,
    /// Expiration time of the access token.
    pub expires_at: Timestamp,
    /// Whole minutes until the access token expires.
    pub minutes_until_expiry: i64,
    /// When the session was established.
    pub created_at: Timestamp,
}

/// Single entry point of the command layer into authentication.
///
/// One instance is built at process start and passed to the command
/// handlers. It caches the current identity for the lifetime of the
/// process; the session file carries it across runs.
#[derive(Debug)]
pub struct SessionManager {
    verifier: CredentialVerifier,
    tokens: TokenService,
    session_file: SessionFile,
    current: Option<Identity>,
}

impl SessionManager {
    /// Creates a manager from its collaborators.
    pub fn new(verifier: CredentialVerifier, tokens: TokenService, session_file: SessionFile) -> Self {
        Self {
            verifier,
            tokens,
            session_file,
            current: None,
        }
    }

    /// Creates a manager with production hashing parameters and token
    /// lifetimes, using the session file named by the configuration.
    pub fn from_config(
        store: Arc<dyn AccountStore>,
        keys: SessionKeys,
        config: &AuthConfig,
    ) -> Result<Self> {
        let verifier = CredentialVerifier::new(store, PasswordHasher::new()?);
        let tokens = TokenService::new(keys);
        let session_file = SessionFile::new(config.session_file_path()?);

        tracing::debug!(
            target: TRACING_TARGET,
            session_file = %session_file.path().display(),
            "session manager initialized",
        );

        Ok(Self::new(verifier, tokens, session_file))
    }

    /// Returns the credential verifier.
    #[inline]
    pub fn verifier(&self) -> &CredentialVerifier {
        &self.verifier
    }

    /// Returns the token service.
    #[inline]
    pub fn tokens(&self) -> &TokenService {
        &self.tokens
    }

    /// Returns the session file.
    #[inline]
    pub fn session_file(&self) -> &SessionFile {
        &self.session_file
    }

    fn store(&self) -> &dyn AccountStore {
        self.verifier.store().as_ref()
    }

    /// Authenticates and establishes a session.
    ///
    /// Rejected credentials and locked accounts are reported through the
    /// response, with nothing persisted or cached. Only system failures are
    /// returned as errors.
    pub fn login(&mut self, identifier: &str, secret: &str) -> Result<LoginResponse> {
        let identity = match self.verifier.authenticate(identifier, secret) {
            Ok(identity) => identity,
            Err(e) if e.is_expected() => {
                return Ok(LoginResponse {
                    success: false,
                    identity: None,
                    message: e.message().to_owned(),
                    retry_after: e.retry_after(),
                });
            }
            Err(e) => return Err(e),
        };

        let now = Timestamp::now();
        let session = PersistedSession::new(
            self.tokens.create_access_token_at(&identity, now)?,
            self.tokens.create_refresh_token_at(&identity, now)?,
            now,
        );
        self.session_file.save(&session)?;

        tracing::info!(
            target: TRACING_TARGET,
            account_id = %identity.id,
            "session established",
        );

        let message = format!("Welcome {}! You are now logged in.", identity.display_name);
        self.current = Some(identity.clone());

        Ok(LoginResponse {
            success: true,
            identity: Some(identity),
            message,
            retry_after: None,
        })
    }

    /// Ends the session. Succeeds even if there was no session.
    pub fn logout(&mut self) -> Result<LogoutResponse> {
        let name = self.current.as_ref().map(|i| i.display_name.clone()).or_else(|| {
            self.session_file
                .load()
                .ok()
                .flatten()
                .and_then(|session| self.tokens.verify_access_token(&session.access_token))
                .map(|claims| claims.display_name)
        });

        self.clear_session()?;

        let message = match name {
            Some(name) => format!("Goodbye {name}! You have been logged out."),
            None => "No active session.".to_owned(),
        };

        Ok(LogoutResponse {
            success: true,
            message,
        })
    }

    /// Returns the current identity, restoring or refreshing the session
    /// as needed.
    ///
    /// Resolution order: the in-memory cache, then the persisted access
    /// token, then a refresh through the persisted refresh token. When all
    /// of them fail the session is cleared and `None` is returned.
    pub fn get_current_user(&mut self) -> Result<Option<Identity>> {
        if let Some(identity) = &self.current {
            return Ok(Some(identity.clone()));
        }

        let Some(session) = self.session_file.load()? else {
            return Ok(None);
        };

        if let Some(claims) = self.tokens.verify_access_token(&session.access_token) {
            let identity = claims.identity();
            tracing::debug!(
                target: TRACING_TARGET,
                account_id = %identity.id,
                "session restored from access token",
            );
            self.current = Some(identity.clone());
            return Ok(Some(identity));
        }

        let refreshed = self
            .tokens
            .refresh_access_token(&session.refresh_token, self.store())?;
        let claims = refreshed
            .as_deref()
            .and_then(|token| self.tokens.verify_access_token(token));

        let (Some(access_token), Some(claims)) = (refreshed, claims) else {
            tracing::info!(target: TRACING_TARGET, "session expired, logging out");
            self.clear_session()?;
            return Ok(None);
        };

        self.session_file.save(&PersistedSession::new(
            access_token,
            session.refresh_token,
            session.created_at,
        ))?;

        let identity = claims.identity();
        tracing::info!(
            target: TRACING_TARGET,
            account_id = %identity.id,
            "session restored through refresh",
        );
        self.current = Some(identity.clone());
        Ok(Some(identity))
    }

    /// Returns whether an authenticated identity is available.
    pub fn require_authentication(&mut self) -> Result<bool> {
        Ok(self.get_current_user()?.is_some())
    }

    /// Returns whether the current user holds the permission.
    ///
    /// The account is re-read from the store on every call, so role changes
    /// made elsewhere apply immediately. If the account no longer exists
    /// the session is ended.
    pub fn require_permission(&mut self, permission: Permission) -> Result<bool> {
        Ok(self.live_identity()?.is_some_and(|identity| {
            let allowed = has_permission(Some(&identity), permission);
            if !allowed {
                tracing::info!(
                    target: TRACING_TARGET,
                    account_id = %identity.id,
                    role = %identity.role,
                    permission = %permission,
                    "permission denied",
                );
            }
            allowed
        }))
    }

    /// Like [`require_permission`], but returns the live identity and
    /// reports a missing session or grant as an error.
    ///
    /// [`require_permission`]: Self::require_permission
    pub fn authorize(&mut self, permission: Permission) -> Result<Identity> {
        let Some(identity) = self.live_identity()? else {
            return Err(Error::token());
        };

        crate::policy::ensure_permission(Some(&identity), permission)?;
        Ok(identity)
    }

    /// Returns details about the active session, if any.
    ///
    /// Resolution skips the in-memory cache and goes through the session
    /// file, so an expired access token is refreshed before it is reported.
    pub fn session_info(&mut self) -> Result<Option<SessionInfo>> {
        self.current = None;
        if self.get_current_user()?.is_none() {
            return Ok(None);
        }

        let claims = self
            .session_file
            .load()?
            .and_then(|session| {
                self.tokens
                    .verify_access_token(&session.access_token)
                    .map(|claims| (claims, session.created_at))
            });

        let Some((claims, created_at)) = claims else {
            return Ok(None);
        };

        let remaining = claims.remaining_lifetime(Timestamp::now());
        Ok(Some(SessionInfo {
            identity: claims.identity(),
            expires_at: claims.expires_at,
            minutes_until_expiry: remaining.as_mins(),
            created_at,
        }))
    }

    /// Resolves the current user and re-reads the account from the store.
    fn live_identity(&mut self) -> Result<Option<Identity>> {
        let Some(identity) = self.get_current_user()? else {
            return Ok(None);
        };

        let Some(account) = self.store().find_by_id(identity.id)? else {
            tracing::warn!(
                target: TRACING_TARGET,
                account_id = %identity.id,
                "account of the active session no longer exists, logging out",
            );
            self.clear_session()?;
            return Ok(None);
        };

        let live = account.identity();
        self.current = Some(live.clone());
        Ok(Some(live))
    }

    fn clear_session(&mut self) -> Result<()> {
        self.current = None;
        if self.session_file.clear()? {
            tracing::info!(target: TRACING_TARGET, "session cleared");
        }
        Ok(())
    }
}
