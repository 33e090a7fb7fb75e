//! Authentication: credential verification, lockout and session tokens.

mod claims;
mod credentials;
mod lockout;
mod tokens;

pub use claims::{AccessClaims, RefreshClaims, TokenClaims, TokenType};
pub use credentials::CredentialVerifier;
pub use lockout::{LOCKOUT_DURATION, LockoutPolicy, MAX_FAILED_LOGIN_ATTEMPTS};
pub use tokens::{ACCESS_TOKEN_TTL, REFRESH_TOKEN_TTL, TokenService};
