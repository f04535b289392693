//! [`User`] definitions.

pub mod session;

use std::{sync::LazyLock, time::Duration};

#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use regex::Regex;
use secrecy::{zeroize::Zeroize, CloneableSecret};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub use self::session::Session;

/// Platform user (an employee of the corporate account).
#[derive(Clone, Debug, From)]
pub struct User {
    /// ID of this [`User`]
    pub id: Id,

    /// [`Name`] of this [`User`].
    pub name: Name,

    /// [`Email`] of this [`User`], used as the login.
    pub email: Email,

    /// [`PasswordHash`] of this [`User`].
    pub password_hash: PasswordHash,

    /// [`Role`] of this [`User`].
    pub role: Role,

    /// [`Phone`] of this [`User`].
    pub phone: Option<Phone>,

    /// [`Department`] this [`User`] belongs to.
    pub department: Option<Department>,

    /// [`EmployeeId`] of this [`User`].
    pub employee_id: Option<EmployeeId>,

    /// Number of consecutive failed login attempts.
    pub login_attempts: u8,

    /// [`DateTime`] until which this [`User`] account is locked out.
    pub lock_until: Option<LockUntilDateTime>,

    /// [`DateTime`] of the last recorded activity of this [`User`].
    pub last_login: Option<LastLoginDateTime>,

    /// [`DateTime`] when this [`User`] last changed their password.
    ///
    /// Absent if the password was never changed since creation.
    pub last_password_change: Option<PasswordChangeDateTime>,

    /// [`DateTime`] when this [`User`] was deactivated.
    ///
    /// Deactivation is irreversible.
    pub deactivated_at: Option<DeactivationDateTime>,

    /// [`DateTime`] when this [`User`] was created.
    pub created_at: CreationDateTime,
}

impl User {
    /// Number of consecutive failed login attempts locking a [`User`] out.
    pub const MAX_LOGIN_ATTEMPTS: u8 = 5;

    /// Period a [`User`] account stays locked out.
    pub const LOCKOUT_DURATION: Duration = Duration::from_secs(2 * 60 * 60);

    /// Indicates whether this [`User`] account is active.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.deactivated_at.is_none()
    }

    /// Indicates whether this [`User`] account is locked out at the provided
    /// moment.
    ///
    /// An expired lockout is simply ignored, so the `Locked -> Active`
    /// transition happens lazily at check time.
    #[must_use]
    pub fn is_locked(&self, now: common::DateTime) -> bool {
        self.lock_until.is_some_and(|until| until > now.coerce())
    }

    /// Records a failed login attempt, locking this [`User`] account out once
    /// [`MAX_LOGIN_ATTEMPTS`] is reached.
    ///
    /// [`MAX_LOGIN_ATTEMPTS`]: Self::MAX_LOGIN_ATTEMPTS
    pub fn register_failed_login(&mut self, now: common::DateTime) {
        if self.lock_until.is_some_and(|until| until <= now.coerce()) {
            // Expired lockout: start counting from scratch.
            self.lock_until = None;
            self.login_attempts = 0;
        }

        self.login_attempts = self.login_attempts.saturating_add(1);
        if self.login_attempts >= Self::MAX_LOGIN_ATTEMPTS
            && self.lock_until.is_none()
        {
            self.lock_until = Some((now + Self::LOCKOUT_DURATION).coerce());
        }
    }

    /// Records a successful login, clearing any lockout state.
    pub fn register_successful_login(&mut self, now: common::DateTime) {
        self.login_attempts = 0;
        self.lock_until = None;
        self.last_login = Some(now.coerce());
    }
}

/// ID of a [`User`].
#[derive(
    Clone,
    Copy,
    Debug,
    Default,
    Deserialize,
    Display,
    Eq,
    From,
    FromStr,
    Hash,
    Into,
    PartialEq,
    Serialize,
)]
pub struct Id(Uuid);

impl Id {
    /// Creates a new random [`Id`].
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

/// Name of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
pub struct Name(String);

impl Name {
    /// Creates a new [`Name`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Name`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 256
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Email address of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
pub struct Email(String);

impl Email {
    /// Creates a new [`Email`] if the given `address` is valid.
    #[must_use]
    pub fn new(address: impl Into<String>) -> Option<Self> {
        let address = address.into();
        Self::check(&address).then_some(Self(address))
    }

    /// Checks whether the given `address` is a valid [`Email`].
    fn check(address: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Email`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]{2,}$").expect("valid regex")
        });

        let address = address.as_ref();
        address.len() <= 320 && REGEX.is_match(address)
    }
}

impl FromStr for Email {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Email`")
    }
}

/// Role of a [`User`] on the platform.
pub use self::role::Role;

mod role {
    //! [`Role`] definitions.

    use common::define_kind;

    define_kind! {
        #[doc = "Role of a `User` on the platform."]
        enum Role {
            #[doc = "A regular employee requesting rides."]
            Employee = 1,

            #[doc = "A manager overseeing employees."]
            Manager = 2,

            #[doc = "A platform administrator."]
            Admin = 3,
        }
    }
}

/// Password of a [`User`].
#[derive(AsRef, Clone, Debug, Eq, From, PartialEq)]
#[as_ref(str)]
#[from(&str, String)]
pub struct Password(String);

impl Password {
    /// Creates a new [`Password`] if the given `password` is valid.
    #[must_use]
    pub fn new(password: impl Into<String>) -> Option<Self> {
        let password = password.into();
        Self::check(&password).then_some(Self(password))
    }

    /// Checks whether the given `password` is a valid [`Password`].
    fn check(password: impl AsRef<str>) -> bool {
        let password = password.as_ref();
        password.len() >= 8 && password.len() <= 128
    }
}

impl FromStr for Password {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Password`")
    }
}

impl CloneableSecret for Password {}
impl Zeroize for Password {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

/// Password hash of a [`User`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct PasswordHash(String);

impl PasswordHash {
    /// Creates a new [`PasswordHash`] from the given [`Password`].
    ///
    /// # Errors
    ///
    /// Returns an error if hashing fails.
    pub fn new(password: &Password) -> Result<Self, bcrypt::BcryptError> {
        bcrypt::hash(password.as_ref(), bcrypt::DEFAULT_COST).map(Self)
    }

    /// Checks whether the given [`Password`] matches this [`PasswordHash`].
    #[must_use]
    pub fn verify(&self, password: &Password) -> bool {
        bcrypt::verify(password.as_ref(), &self.0).unwrap_or(false)
    }
}

/// Phone number of a [`User`].
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
pub struct Phone(String);

impl Phone {
    /// Creates a new [`Phone`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`Phone`].
    fn check(number: impl AsRef<str>) -> bool {
        /// Regular expression checking [`Phone`] format.
        static REGEX: LazyLock<Regex> = LazyLock::new(|| {
            Regex::new(r"^([+]?\d{1,2}[-\s]?|)\d{3}[-\s]?\d{3}[-\s]?\d{4}$")
                .expect("valid regex")
        });

        REGEX.is_match(number.as_ref())
    }
}

impl FromStr for Phone {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Phone`")
    }
}

/// Department a [`User`] belongs to.
#[derive(AsRef, Clone, Debug, Display, Eq, PartialEq, Serialize)]
#[as_ref(str, String)]
pub struct Department(String);

impl Department {
    /// Creates a new [`Department`] if the given `name` is valid.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Option<Self> {
        let name = name.into();
        Self::check(&name).then_some(Self(name))
    }

    /// Checks whether the given `name` is a valid [`Department`].
    fn check(name: impl AsRef<str>) -> bool {
        let name = name.as_ref();
        name.trim() == name && !name.is_empty() && name.len() <= 128
    }
}

impl FromStr for Department {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Department`")
    }
}

/// Employee ID of a [`User`] in the corporate directory.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
pub struct EmployeeId(String);

impl EmployeeId {
    /// Creates a new [`EmployeeId`] if the given `id` is valid.
    #[must_use]
    pub fn new(id: impl Into<String>) -> Option<Self> {
        let id = id.into();
        Self::check(&id).then_some(Self(id))
    }

    /// Checks whether the given `id` is a valid [`EmployeeId`].
    fn check(id: impl AsRef<str>) -> bool {
        let id = id.as_ref();
        !id.is_empty()
            && id.len() <= 32
            && id.chars().all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl FromStr for EmployeeId {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `EmployeeId`")
    }
}

/// Marker type describing a [`User`] account lockout.
#[derive(Clone, Copy, Debug)]
pub struct Lockout;

/// Marker type describing a [`User`] activity.
#[derive(Clone, Copy, Debug)]
pub struct Activity;

/// Marker type describing a [`User`] password change.
#[derive(Clone, Copy, Debug)]
pub struct PasswordChange;

/// [`DateTime`] when a [`User`] was created.
pub type CreationDateTime = DateTimeOf<(User, unit::Creation)>;

/// [`DateTime`] when a [`User`] was deactivated.
pub type DeactivationDateTime = DateTimeOf<(User, unit::Deactivation)>;

/// [`DateTime`] until which a [`User`] account is locked out.
pub type LockUntilDateTime = DateTimeOf<(User, Lockout)>;

/// [`DateTime`] of the last recorded [`User`] activity.
pub type LastLoginDateTime = DateTimeOf<(User, Activity)>;

/// [`DateTime`] when a [`User`] last changed their password.
pub type PasswordChangeDateTime = DateTimeOf<(User, PasswordChange)>;

#[cfg(test)]
mod spec {
    use common::DateTime;

    use super::{Email, Password, PasswordHash, Role, User};

    fn user(now: DateTime) -> User {
        User {
            id: super::Id::new(),
            name: super::Name::new("Alice Doe").unwrap(),
            email: Email::new("alice@corp.example").unwrap(),
            password_hash: PasswordHash::new(
                &Password::new("correct horse").unwrap(),
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

    #[test]
    fn locks_after_max_failed_attempts() {
        let now = DateTime::now();
        let mut user = user(now);

        for _ in 0..(User::MAX_LOGIN_ATTEMPTS - 1) {
            user.register_failed_login(now);
            assert!(!user.is_locked(now));
        }

        user.register_failed_login(now);
        assert!(user.is_locked(now));
        assert!(user.is_locked(now + User::LOCKOUT_DURATION / 2));
        assert!(!user.is_locked(now + User::LOCKOUT_DURATION * 2));
    }

    #[test]
    fn expired_lockout_restarts_attempt_count() {
        let now = DateTime::now();
        let mut user = user(now);
        for _ in 0..User::MAX_LOGIN_ATTEMPTS {
            user.register_failed_login(now);
        }
        assert!(user.is_locked(now));

        let later = now + User::LOCKOUT_DURATION * 2;
        user.register_failed_login(later);
        assert!(!user.is_locked(later));
        assert_eq!(user.login_attempts, 1);
    }

    #[test]
    fn successful_login_clears_lockout_state() {
        let now = DateTime::now();
        let mut user = user(now);
        for _ in 0..User::MAX_LOGIN_ATTEMPTS {
            user.register_failed_login(now);
        }

        user.register_successful_login(now);
        assert!(!user.is_locked(now));
        assert_eq!(user.login_attempts, 0);
        assert!(user.last_login.is_some());
    }

    #[test]
    fn password_hash_verifies_only_matching_password() {
        let password = Password::new("correct horse").unwrap();
        let hash = PasswordHash::new(&password).unwrap();
        assert!(hash.verify(&password));
        assert!(!hash.verify(&Password::new("wrong battery").unwrap()));
    }

    #[test]
    fn validates_email_format() {
        assert!(Email::new("alice@corp.example").is_some());
        assert!(Email::new("a.b+c@dept.corp.example").is_some());
        assert!(Email::new("not-an-email").is_none());
        assert!(Email::new("two@@corp.example").is_none());
        assert!(Email::new("spaced name@corp.example").is_none());
    }
}
