//! Account lockout policy.

use jiff::{SignedDuration, Timestamp};

use crate::model::Account;
use crate::{Error, Result};

/// Consecutive failures that lock an account.
pub const MAX_FAILED_LOGIN_ATTEMPTS: u32 = 5;

/// How long a locked account stays locked.
pub const LOCKOUT_DURATION: SignedDuration = SignedDuration::from_mins(15);

/// Threshold and duration of the temporary account lock.
///
/// Unlocking is lazy: an expired lock is only cleared by the next attempt,
/// there is no background timer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LockoutPolicy {
    max_attempts: u32,
    duration: SignedDuration,
}

impl LockoutPolicy {
    /// Creates a policy with a custom threshold and duration.
    pub fn new(max_attempts: u32, duration: SignedDuration) -> Result<Self> {
        if max_attempts == 0 {
            return Err(Error::config("lockout threshold must be at least one attempt"));
        }
        if !duration.is_positive() {
            return Err(Error::config("lockout duration must be positive"));
        }

        Ok(Self {
            max_attempts,
            duration,
        })
    }

    /// Returns the number of consecutive failures that lock an account.
    #[inline]
    pub const fn max_attempts(&self) -> u32 {
        self.max_attempts
    }

    /// Returns the lock duration.
    #[inline]
    pub const fn duration(&self) -> SignedDuration {
        self.duration
    }

    /// Applies one failed attempt to the account.
    ///
    /// A locked account is left untouched. Otherwise the counter grows and
    /// reaching the threshold sets the lock expiry to `now + duration`. Only
    /// a successful attempt resets the counter, so after an expired lock a
    /// single further failure locks the account again.
    pub fn register_failure(&self, account: &mut Account, now: Timestamp) {
        if account.is_locked_at(now) {
            return;
        }

        account.failed_login_attempts = account.failed_login_attempts.saturating_add(1);
        if account.failed_login_attempts >= self.max_attempts {
            account.locked_until = Some(now + self.duration);
        }
    }

    /// Applies a successful attempt to the account.
    pub fn register_success(account: &mut Account, now: Timestamp) {
        account.failed_login_attempts = 0;
        account.locked_until = None;
        account.last_login_at = Some(now);
    }

    /// Returns the attempts left before the account locks.
    pub fn remaining_attempts(&self, account: &Account) -> u32 {
        self.max_attempts.saturating_sub(account.failed_login_attempts)
    }
}

impl Default for LockoutPolicy {
    fn default() -> Self {
        Self {
            max_attempts: MAX_FAILED_LOGIN_ATTEMPTS,
            duration: LOCKOUT_DURATION,
        }
    }
}

/// Rounds a remaining lock time up to whole minutes, at least one.
pub(crate) fn minutes_remaining(remaining: SignedDuration) -> i64 {
    let secs = remaining.as_secs().max(0);
    ((secs + 59) / 60).max(1)
}

#[cfg(test)]
mod tests {
    use crate::model::{NewAccount, Role};

    use super::*;

    fn account(now: Timestamp) -> Account {
        NewAccount {
            identifier: "EMP001".to_owned(),
            display_name: "Alice Martin".to_owned(),
            email: "alice@epicevents.local".to_owned(),
            role: Role::Sales,
            secret_hash: String::new(),
        }
        .into_account(now)
    }

    #[test]
    fn locks_exactly_at_threshold() {
        let policy = LockoutPolicy::default();
        let now = Timestamp::now();
        let mut account = account(now);

        for attempt in 1..MAX_FAILED_LOGIN_ATTEMPTS {
            policy.register_failure(&mut account, now);
            assert_eq!(account.failed_login_attempts, attempt);
            assert!(!account.is_locked_at(now));
        }

        policy.register_failure(&mut account, now);
        assert!(account.is_locked_at(now));
        assert_eq!(account.locked_until, Some(now + LOCKOUT_DURATION));
        assert_eq!(policy.remaining_attempts(&account), 0);
    }

    #[test]
    fn expired_lock_relocks_on_next_failure() {
        let policy = LockoutPolicy::default();
        let now = Timestamp::now();
        let mut account = account(now);
        for _ in 0..MAX_FAILED_LOGIN_ATTEMPTS {
            policy.register_failure(&mut account, now);
        }

        let later = now + LOCKOUT_DURATION;
        assert!(!account.is_locked_at(later));
        policy.register_failure(&mut account, later);

        assert_eq!(account.failed_login_attempts, MAX_FAILED_LOGIN_ATTEMPTS + 1);
        assert!(account.is_locked_at(later));
        assert_eq!(account.locked_until, Some(later + LOCKOUT_DURATION));
    }

    #[test]
    fn failures_while_locked_are_ignored() {
        let policy = LockoutPolicy::default();
        let now = Timestamp::now();
        let mut account = account(now);
        for _ in 0..MAX_FAILED_LOGIN_ATTEMPTS {
            policy.register_failure(&mut account, now);
        }

        let during = now + SignedDuration::from_mins(5);
        policy.register_failure(&mut account, during);

        assert_eq!(account.failed_login_attempts, MAX_FAILED_LOGIN_ATTEMPTS);
        assert_eq!(account.locked_until, Some(now + LOCKOUT_DURATION));
    }

    #[test]
    fn success_resets_state() {
        let policy = LockoutPolicy::default();
        let now = Timestamp::now();
        let mut account = account(now);
        policy.register_failure(&mut account, now);

        LockoutPolicy::register_success(&mut account, now);

        assert_eq!(account.failed_login_attempts, 0);
        assert!(account.locked_until.is_none());
        assert_eq!(account.last_login_at, Some(now));
    }

    #[test]
    fn rejects_degenerate_policies() {
        assert!(LockoutPolicy::new(0, LOCKOUT_DURATION).is_err());
        assert!(LockoutPolicy::new(3, SignedDuration::ZERO).is_err());
        assert!(LockoutPolicy::new(3, SignedDuration::from_secs(30)).is_ok());
    }

    #[test]
    fn minutes_round_up() {
        assert_eq!(minutes_remaining(SignedDuration::from_mins(15)), 15);
        assert_eq!(minutes_remaining(SignedDuration::from_secs(61)), 2);
        assert_eq!(minutes_remaining(SignedDuration::from_secs(1)), 1);
        assert_eq!(minutes_remaining(SignedDuration::ZERO), 1);
    }
}
