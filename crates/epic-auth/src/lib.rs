#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]
#![doc = include_str!("../README.md")]

// Tracing target constants for consistent logging.

/// Tracing target for password hashing and verification.
pub const TRACING_TARGET_PASSWORD_HASHER: &str = "epic_auth::password_hasher";

/// Tracing target for credential verification and account lockout.
pub const TRACING_TARGET_CREDENTIALS: &str = "epic_auth::credentials";

/// Tracing target for token issuance, verification and refresh.
pub const TRACING_TARGET_TOKENS: &str = "epic_auth::tokens";

/// Tracing target for session restoration, persistence and logout.
pub const TRACING_TARGET_SESSION: &str = "epic_auth::session";

/// Tracing target for signing key loading and provisioning.
pub const TRACING_TARGET_SESSION_KEYS: &str = "epic_auth::session_keys";

/// Tracing target for permission and ownership checks.
pub const TRACING_TARGET_AUTHORIZATION: &str = "epic_auth::authorization";

/// Tracing target for account store operations.
pub const TRACING_TARGET_STORE: &str = "epic_auth::store";

mod config;
mod error;
mod utility;

pub mod auth;
pub mod model;
pub mod policy;
pub mod security;
pub mod session;
pub mod store;

pub use crate::auth::{
    ACCESS_TOKEN_TTL, AccessClaims, CredentialVerifier, LOCKOUT_DURATION, LockoutPolicy,
    MAX_FAILED_LOGIN_ATTEMPTS, REFRESH_TOKEN_TTL, RefreshClaims, TokenClaims, TokenService,
    TokenType,
};
pub use crate::config::AuthConfig;
pub use crate::error::{BoxedError, Error, ErrorKind, Result};
pub use crate::model::{Account, AccountId, Identity, NewAccount, Role};
pub use crate::policy::{
    Entity, OwnedEntity, Ownership, Permission, can_update, can_update_own, describe_permissions,
    ensure_permission, has_permission,
};
pub use crate::security::{KeySource, PasswordHasher, SessionKeys};
pub use crate::session::{
    LoginResponse, LogoutResponse, PersistedSession, SessionFile, SessionInfo, SessionManager,
};
pub use crate::store::{AccountStore, JsonAccountStore, MemoryAccountStore};
