//! Error types for the authentication core.
//!
//! A single [`Error`] type is used throughout the crate. Its [`ErrorKind`]
//! separates expected authentication outcomes (wrong credentials, lockout,
//! invalid tokens, missing permissions) from system failures (hashing,
//! account store, configuration, file system). Expected outcomes are
//! ordinary control flow; system failures are surfaced to callers with a
//! generic message while the full detail is only logged.

use std::borrow::Cow;
use std::error::Error as StdError;
use std::fmt;

use jiff::SignedDuration;

/// Type alias for boxed errors that are Send + Sync.
pub type BoxedError = Box<dyn StdError + Send + Sync>;

/// Result type alias for authentication operations.
pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Message returned for every token failure, whatever the cause.
const TOKEN_ERROR_MESSAGE: &str = "Session expired or invalid, please log in again";

/// Message shown to users in place of unexpected failures.
const GENERIC_ERROR_MESSAGE: &str = "An unexpected error occurred, please try again later";

/// Error kind enumeration for categorizing authentication errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Unknown identifier or wrong secret.
    Credential,
    /// Account temporarily locked after repeated failures.
    Lockout,
    /// Expired, tampered or wrong-type token.
    Token,
    /// Authenticated but missing the required permission.
    PermissionDenied,
    /// Password hashing failed.
    Hashing,
    /// Account store is unavailable or rejected the operation.
    Store,
    /// Missing or invalid configuration (signing keys, TTLs).
    Config,
    /// Session or secret file could not be read or written.
    FileSystem,
}

impl ErrorKind {
    /// Returns the error kind as a string for categorization.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Credential => "credential",
            Self::Lockout => "lockout",
            Self::Token => "token",
            Self::PermissionDenied => "permission_denied",
            Self::Hashing => "hashing",
            Self::Store => "store",
            Self::Config => "config",
            Self::FileSystem => "file_system",
        }
    }

    /// Returns whether this kind is an expected, user-facing outcome.
    #[must_use]
    pub const fn is_expected(self) -> bool {
        matches!(
            self,
            Self::Credential | Self::Lockout | Self::Token | Self::PermissionDenied
        )
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Authentication error with structured information.
#[derive(Debug, thiserror::Error)]
#[error("{kind} error: {message}")]
pub struct Error {
    kind: ErrorKind,
    message: Cow<'static, str>,
    retry_after: Option<SignedDuration>,
    #[source]
    source: Option<BoxedError>,
}

impl Error {
    #[inline]
    fn new(kind: ErrorKind, message: impl Into<Cow<'static, str>>) -> Self {
        Self {
            kind,
            message: message.into(),
            retry_after: None,
            source: None,
        }
    }

    /// Attaches a source error to this error, enabling error chain tracking.
    #[inline]
    pub fn with_source(mut self, source: impl StdError + Send + Sync + 'static) -> Self {
        self.source = Some(Box::new(source));
        self
    }

    /// Returns the error kind.
    #[must_use]
    #[inline]
    pub const fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Returns the error message.
    #[must_use]
    #[inline]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the remaining lockout time, for [`ErrorKind::Lockout`] errors.
    #[must_use]
    #[inline]
    pub const fn retry_after(&self) -> Option<SignedDuration> {
        self.retry_after
    }

    /// Returns whether this error is an expected authentication outcome.
    #[must_use]
    #[inline]
    pub const fn is_expected(&self) -> bool {
        self.kind.is_expected()
    }

    /// Returns the message safe to show to the user.
    ///
    /// Expected outcomes keep their message verbatim, everything else is
    /// replaced with a generic text.
    #[must_use]
    pub fn user_message(&self) -> &str {
        if self.is_expected() {
            &self.message
        } else {
            GENERIC_ERROR_MESSAGE
        }
    }

    /// Creates a new credential error.
    #[inline]
    pub fn credential(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Credential, message)
    }

    /// Creates a new lockout error carrying the remaining lock time.
    #[inline]
    pub fn lockout(message: impl Into<Cow<'static, str>>, retry_after: SignedDuration) -> Self {
        let mut error = Self::new(ErrorKind::Lockout, message);
        error.retry_after = Some(retry_after);
        error
    }

    /// Creates a new token error.
    ///
    /// The message is the same for every cause.
    #[inline]
    pub fn token() -> Self {
        Self::new(ErrorKind::Token, TOKEN_ERROR_MESSAGE)
    }

    /// Creates a new permission denied error naming the missing permission.
    #[inline]
    pub fn permission_denied(permission: impl fmt::Display) -> Self {
        Self::new(
            ErrorKind::PermissionDenied,
            format!("Access denied, missing permission: {permission}"),
        )
    }

    /// Creates a new hashing error.
    #[inline]
    pub fn hashing(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Hashing, message)
    }

    /// Creates a new account store error.
    #[inline]
    pub fn store(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Store, message)
    }

    /// Creates a new configuration error.
    #[inline]
    pub fn config(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::Config, message)
    }

    /// Creates a new file system error.
    #[inline]
    pub fn file_system(message: impl Into<Cow<'static, str>>) -> Self {
        Self::new(ErrorKind::FileSystem, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let error = Error::credential("Invalid employee number");
        assert_eq!(error.kind(), ErrorKind::Credential);
        assert_eq!(error.message(), "Invalid employee number");
        assert!(error.is_expected());
    }

    #[test]
    fn test_error_with_source() {
        let source = std::io::Error::new(std::io::ErrorKind::NotFound, "file not found");
        let error = Error::file_system("cannot read session file").with_source(source);

        assert!(StdError::source(&error).is_some());
        assert_eq!(error.kind(), ErrorKind::FileSystem);
    }

    #[test]
    fn test_unexpected_errors_hide_details() {
        let error = Error::store("connection refused on 10.0.0.4:5432");
        assert!(!error.is_expected());
        assert_eq!(error.user_message(), GENERIC_ERROR_MESSAGE);
        assert!(error.to_string().contains("10.0.0.4"));
    }

    #[test]
    fn test_token_errors_are_uniform() {
        assert_eq!(Error::token().message(), Error::token().message());
        assert_eq!(Error::token().user_message(), TOKEN_ERROR_MESSAGE);
    }

    #[test]
    fn test_lockout_carries_retry_after() {
        let error = Error::lockout("Account locked", SignedDuration::from_mins(3));
        assert_eq!(error.retry_after(), Some(SignedDuration::from_mins(3)));
        assert!(Error::credential("x").retry_after().is_none());
    }

    #[test]
    fn test_permission_denied_names_permission() {
        let error = Error::permission_denied("delete_customer");
        assert_eq!(error.kind(), ErrorKind::PermissionDenied);
        assert!(error.message().contains("delete_customer"));
    }

    #[test]
    fn test_error_kind_as_str() {
        assert_eq!(ErrorKind::Credential.as_str(), "credential");
        assert_eq!(ErrorKind::Lockout.as_str(), "lockout");
        assert_eq!(ErrorKind::Token.as_str(), "token");
        assert_eq!(ErrorKind::PermissionDenied.as_str(), "permission_denied");
        assert_eq!(ErrorKind::Hashing.as_str(), "hashing");
        assert_eq!(ErrorKind::Store.as_str(), "store");
        assert_eq!(ErrorKind::Config.as_str(), "config");
        assert_eq!(ErrorKind::FileSystem.as_str(), "file_system");
    }
}
