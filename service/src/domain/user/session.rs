//! [`Session`] definitions and validation of presented access tokens.

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, FromStr};
use serde::{Deserialize, Serialize};

#[cfg(doc)]
use crate::domain::User;
use crate::domain::user;

/// User session, as carried by a decoded access token.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct Session {
    /// ID of the [`User`] this [`Session`] belongs to.
    pub user_id: user::Id,

    /// [`DateTime`] when this [`Session`] was issued.
    #[serde(rename = "iat", with = "common::datetime::serde::unix_timestamp")]
    pub issued_at: IssueDateTime,

    /// [`DateTime`] when this [`Session`] expires.
    ///
    /// Expiry is enforced by the token format itself on decoding, not by
    /// [`Session::validate()`].
    #[serde(rename = "exp", with = "common::datetime::serde::unix_timestamp")]
    pub expires_at: ExpirationDateTime,

    /// [`DateTime`] of the [`User`]'s last password change, as recorded at
    /// the moment this [`Session`] was issued.
    ///
    /// Absent on tokens issued before this claim was introduced.
    #[serde(
        default,
        rename = "pch",
        skip_serializing_if = "Option::is_none",
        with = "common::datetime::serde::opt_unix_timestamp"
    )]
    pub password_changed_at: Option<user::PasswordChangeDateTime>,
}

impl Session {
    /// Grace window absorbing clock/write-ordering skew between a [`User`]
    /// creation and its password-change timestamping, in seconds.
    ///
    /// Applies only to legacy tokens lacking the `pch` claim.
    pub const PASSWORD_CHANGE_GRACE_SECS: i64 = 5;

    /// Validates this [`Session`] against the current state of the [`User`]
    /// it belongs to.
    ///
    /// Pure decision function: resolving the [`User`] by [`Session::user_id`]
    /// and recording last-activity on acceptance are the caller's concerns.
    ///
    /// Checks run in a fixed order, and the first failing one wins:
    /// 1. account deactivated;
    /// 2. account locked out;
    /// 3. password changed after this [`Session`] was issued.
    #[must_use]
    pub fn validate(
        &self,
        user: &user::User,
        now: common::DateTime,
    ) -> Validation {
        use Rejection as R;

        if !user.is_active() {
            return Validation::Rejected(R::AccountDeactivated);
        }

        if user.is_locked(now) {
            return Validation::Rejected(R::AccountLocked);
        }

        if let Some(changed_at) = user.last_password_change {
            if let Some(claimed) = self.password_changed_at {
                // Precise strategy: the claim must match the recorded change
                // exactly. Any drift, in either direction, rejects.
                if claimed.unix_timestamp() != changed_at.unix_timestamp() {
                    return Validation::Rejected(R::PasswordChanged);
                }
            } else {
                // Legacy tokens carry no `pch` claim, so fall back to
                // comparing against the issue time with a grace window.
                let drift = changed_at.unix_timestamp()
                    - self.issued_at.unix_timestamp();
                if drift > Self::PASSWORD_CHANGE_GRACE_SECS {
                    return Validation::Rejected(R::PasswordChanged);
                }
            }
        }

        Validation::Accepted
    }
}

/// Outcome of a [`Session`] validation.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Validation {
    /// [`Session`] is accepted.
    Accepted,

    /// [`Session`] is rejected for the contained reason.
    Rejected(Rejection),
}

/// Reason of a [`Session`] rejection.
#[derive(Clone, Copy, Debug, Display, Eq, PartialEq)]
pub enum Rejection {
    /// [`User`] account is deactivated.
    #[display("account is deactivated")]
    AccountDeactivated,

    /// [`User`] account is locked out after too many failed login attempts.
    #[display("account is temporarily locked")]
    AccountLocked,

    /// [`User`] password was changed after the [`Session`] was issued.
    #[display("password has been changed")]
    PasswordChanged,
}

/// Access token of a [`Session`].
#[derive(AsRef, Clone, Debug, Display, FromStr)]
pub struct Token(String);

impl Token {
    /// Creates a new [`Token`] without checking its contents.
    ///
    /// # Safety
    ///
    /// The provided `token` must be a valid [`Token`] representation.
    #[expect(unsafe_code, reason = "bypass")]
    #[must_use]
    pub const unsafe fn new_unchecked(token: String) -> Self {
        Self(token)
    }
}

/// Marker type describing a [`Session`] issue.
#[derive(Clone, Copy, Debug)]
pub struct Issue;

/// [`DateTime`] of a [`Session`] issue.
pub type IssueDateTime = DateTimeOf<(Session, Issue)>;

/// [`DateTime`] of a [`Session`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Session, unit::Expiration)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::domain::user::{
        Email, Id, Name, Password, PasswordHash, Role, User,
    };

    use super::{Rejection, Session, Validation};

    fn user(now: DateTime) -> User {
        User {
            id: Id::new(),
            name: Name::new("Bob Doe").unwrap(),
            email: Email::new("bob@corp.example").unwrap(),
            password_hash: PasswordHash::new(
                &Password::new("irrelevant-here").unwrap(),
            )
            .unwrap(),
            role: Role::Employee,
            phone: None,
            department: None,
            employee_id: None,
            login_attempts: 0,
            lock_until: None,
            last_login: None,
            last_password_change: None,
            deactivated_at: None,
            created_at: now.coerce(),
        }
    }

    fn session(user: &User, issued_at: DateTime) -> Session {
        Session {
            user_id: user.id,
            issued_at: issued_at.coerce(),
            expires_at: (issued_at + Duration::from_secs(24 * 60 * 60))
                .coerce(),
            password_changed_at: None,
        }
    }

    #[test]
    fn accepts_matching_password_change_claim() {
        let now = DateTime::now();
        let t0 = now - Duration::from_secs(1000);

        let mut user = user(now);
        user.last_password_change = Some(t0.coerce());

        let mut session = session(&user, now);
        session.password_changed_at = Some(t0.coerce());

        assert_eq!(session.validate(&user, now), Validation::Accepted);
    }

    #[test]
    fn rejects_mismatching_password_change_claim() {
        let now = DateTime::now();
        let t0 = now - Duration::from_secs(1000);
        let t1 = now - Duration::from_secs(500);

        let mut user = user(now);
        user.last_password_change = Some(t1.coerce());

        let mut session = session(&user, now);
        session.password_changed_at = Some(t0.coerce());

        assert_eq!(
            session.validate(&user, now),
            Validation::Rejected(Rejection::PasswordChanged),
        );
    }

    #[test]
    fn rejects_drift_to_an_earlier_recorded_change() {
        // Equality, not ordering: a change recorded as *earlier* than the
        // claim still rejects.
        let now = DateTime::now();
        let claimed = now - Duration::from_secs(100);
        let recorded = now - Duration::from_secs(200);

        let mut user = user(now);
        user.last_password_change = Some(recorded.coerce());

        let mut session = session(&user, now);
        session.password_changed_at = Some(claimed.coerce());

        assert_eq!(
            session.validate(&user, now),
            Validation::Rejected(Rejection::PasswordChanged),
        );
    }

    #[test]
    fn legacy_token_within_grace_window_is_accepted() {
        let now = DateTime::now();
        let issued_at = now - Duration::from_secs(60);

        let mut user = user(now);
        user.last_password_change =
            Some((issued_at + Duration::from_secs(3)).coerce());

        let session = session(&user, issued_at);

        assert_eq!(session.validate(&user, now), Validation::Accepted);
    }

    #[test]
    fn legacy_token_past_grace_window_is_rejected() {
        let now = DateTime::now();
        let issued_at = now - Duration::from_secs(60);

        let mut user = user(now);
        user.last_password_change =
            Some((issued_at + Duration::from_secs(6)).coerce());

        let session = session(&user, issued_at);

        assert_eq!(
            session.validate(&user, now),
            Validation::Rejected(Rejection::PasswordChanged),
        );
    }

    #[test]
    fn legacy_token_without_recorded_change_is_accepted() {
        let now = DateTime::now();
        let user = user(now);
        let session = session(&user, now - Duration::from_secs(60));

        assert_eq!(session.validate(&user, now), Validation::Accepted);
    }

    #[test]
    fn lockout_takes_precedence_over_password_change() {
        let now = DateTime::now();

        let mut user = user(now);
        user.lock_until = Some((now + Duration::from_secs(3600)).coerce());
        user.last_password_change = Some(now.coerce());

        // Stale claim would reject too, but the lock check runs first.
        let mut session = session(&user, now - Duration::from_secs(1000));
        session.password_changed_at =
            Some((now - Duration::from_secs(2000)).coerce());

        assert_eq!(
            session.validate(&user, now),
            Validation::Rejected(Rejection::AccountLocked),
        );
    }

    #[test]
    fn deactivation_takes_precedence_over_everything() {
        let now = DateTime::now();

        let mut user = user(now);
        user.deactivated_at = Some(now.coerce());
        user.lock_until = Some((now + Duration::from_secs(3600)).coerce());

        let session = session(&user, now);

        assert_eq!(
            session.validate(&user, now),
            Validation::Rejected(Rejection::AccountDeactivated),
        );
    }

    #[test]
    fn expired_lockout_no_longer_rejects() {
        let now = DateTime::now();

        let mut user = user(now);
        user.lock_until = Some((now - Duration::from_secs(1)).coerce());

        let session = session(&user, now);

        assert_eq!(session.validate(&user, now), Validation::Accepted);
    }
}
