//! [`Notification`] definitions.

use std::time::Duration;

#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf};
use derive_more::{Display, From, FromStr, Into};
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::{Ride, User};
use crate::domain::{ride, user};

/// Notification addressed to a [`User`].
#[derive(Clone, Debug)]
pub struct Notification {
    /// ID of this [`Notification`].
    pub id: Id,

    /// ID of the [`User`] this [`Notification`] is addressed to.
    pub user_id: user::Id,

    /// ID of the [`Ride`] this [`Notification`] is about, if any.
    pub ride_id: Option<ride::Id>,

    /// [`Kind`] of this [`Notification`].
    pub kind: Kind,

    /// Short title of this [`Notification`].
    pub title: String,

    /// Message body of this [`Notification`].
    pub message: String,

    /// [`Channels`] this [`Notification`] is delivered over.
    pub channels: Channels,

    /// Current delivery [`Status`] of this [`Notification`].
    pub status: Status,

    /// Number of failed delivery attempts so far.
    pub retry_count: u32,

    /// [`DateTime`] of the next delivery attempt, once a failure occurred.
    pub next_retry_at: Option<RetryDateTime>,

    /// [`DateTime`] this [`Notification`] expires at and stops being
    /// delivered.
    pub expires_at: ExpirationDateTime,

    /// [`DateTime`] when the [`User`] read this [`Notification`], if they
    /// did.
    pub read_at: Option<ReadDateTime>,

    /// [`DateTime`] when this [`Notification`] was created.
    pub created_at: CreationDateTime,
}

impl Notification {
    /// Maximum number of delivery attempts before giving up.
    pub const MAX_RETRIES: u32 = 3;

    /// Creates a new pending [`Notification`] addressed to the provided
    /// [`User`], expiring after [`Notification::DEFAULT_EXPIRY`].
    #[must_use]
    pub fn new(
        user_id: user::Id,
        kind: Kind,
        title: impl Into<String>,
        message: impl Into<String>,
        now: common::DateTime,
    ) -> Self {
        Self {
            id: Id::new(),
            user_id,
            ride_id: None,
            kind,
            title: title.into(),
            message: message.into(),
            channels: Channels::default(),
            status: Status::Pending,
            retry_count: 0,
            next_retry_at: None,
            expires_at: (now + Self::DEFAULT_EXPIRY).coerce(),
            read_at: None,
            created_at: now.coerce(),
        }
    }

    /// Time a [`Notification`] stays deliverable after its creation.
    pub const DEFAULT_EXPIRY: Duration =
        Duration::from_secs(7 * 24 * 60 * 60);

    /// Returns the delay before the delivery attempt following the provided
    /// number of failures.
    ///
    /// Doubles with every failure, starting from 1 minute.
    #[must_use]
    pub fn retry_delay(retry_count: u32) -> Duration {
        Duration::from_secs(60) * 2_u32.saturating_pow(retry_count)
    }

    /// Indicates whether this [`Notification`] has expired at the provided
    /// moment.
    #[must_use]
    pub fn is_expired(&self, now: common::DateTime) -> bool {
        self.expires_at <= now.coerce()
    }

    /// Indicates whether delivery of this [`Notification`] may be attempted
    /// again.
    #[must_use]
    pub fn can_retry(&self) -> bool {
        self.retry_count < Self::MAX_RETRIES
    }

    /// Indicates whether this [`Notification`] is due for a delivery attempt
    /// at the provided moment.
    #[must_use]
    pub fn is_due(&self, now: common::DateTime) -> bool {
        matches!(self.status, Status::Pending)
            && !self.is_expired(now)
            && self
                .next_retry_at
                .is_none_or(|at| at <= now.coerce())
    }

    /// Records a failed delivery attempt of this [`Notification`].
    ///
    /// Schedules the next attempt with an exponentially growing delay, or
    /// moves this [`Notification`] into the [`Status::Failed`] state once
    /// [`Notification::MAX_RETRIES`] is exhausted.
    pub fn record_failure(&mut self, now: common::DateTime) {
        self.retry_count = self.retry_count.saturating_add(1);
        if self.can_retry() {
            self.next_retry_at =
                Some((now + Self::retry_delay(self.retry_count)).coerce());
        } else {
            self.status = Status::Failed;
            self.next_retry_at = None;
        }
    }

    /// Records a successful delivery of this [`Notification`].
    pub fn record_sent(&mut self) {
        self.status = Status::Sent;
        self.next_retry_at = None;
    }

    /// Marks this [`Notification`] as read at the provided moment.
    ///
    /// No-op if it was read already.
    pub fn mark_read(&mut self, now: common::DateTime) {
        if self.read_at.is_none() {
            self.read_at = Some(now.coerce());
        }
    }
}

/// ID of a [`Notification`].
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

define_kind! {
    #[doc = "Kind of a [`Notification`]."]
    enum Kind {
        #[doc = "A ride was requested."]
        RideRequested = 1,

        #[doc = "A ride was approved."]
        RideApproved = 2,

        #[doc = "A ride was rejected."]
        RideRejected = 3,

        #[doc = "A ride was cancelled."]
        RideCancelled = 4,

        #[doc = "A ride was completed."]
        RideCompleted = 5,

        #[doc = "A ride is about to start."]
        RideReminder = 6,

        #[doc = "A system-wide announcement."]
        System = 7,
    }
}

define_kind! {
    #[doc = "Delivery status of a [`Notification`]."]
    enum Status {
        #[doc = "Awaiting delivery."]
        Pending = 1,

        #[doc = "Delivered successfully."]
        Sent = 2,

        #[doc = "Given up on after exhausting all delivery attempts."]
        Failed = 3,
    }
}

/// Channels a [`Notification`] is delivered over.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct Channels {
    /// In-application feed.
    #[default = true]
    pub in_app: bool,

    /// Email message.
    pub email: bool,

    /// SMS message.
    pub sms: bool,
}

/// Marker type describing a [`Notification`] delivery retry.
#[derive(Clone, Copy, Debug)]
pub struct Retry;

/// Marker type describing a [`Notification`] read.
#[derive(Clone, Copy, Debug)]
pub struct Read;

/// [`DateTime`] of a [`Notification`] delivery retry.
pub type RetryDateTime = DateTimeOf<(Notification, Retry)>;

/// [`DateTime`] of a [`Notification`] read.
pub type ReadDateTime = DateTimeOf<(Notification, Read)>;

/// [`DateTime`] of a [`Notification`] expiration.
pub type ExpirationDateTime = DateTimeOf<(Notification, unit::Expiration)>;

/// [`DateTime`] of a [`Notification`] creation.
pub type CreationDateTime = DateTimeOf<(Notification, unit::Creation)>;

#[cfg(test)]
mod spec {
    use std::time::Duration;

    use common::DateTime;

    use crate::domain::user;

    use super::{Channels, Id, Kind, Notification, Status};

    fn notification(now: DateTime) -> Notification {
        Notification {
            id: Id::new(),
            user_id: user::Id::new(),
            ride_id: None,
            kind: Kind::System,
            title: "maintenance".into(),
            message: "scheduled downtime tonight".into(),
            channels: Channels::default(),
            status: Status::Pending,
            retry_count: 0,
            next_retry_at: None,
            expires_at: (now + Notification::DEFAULT_EXPIRY).coerce(),
            read_at: None,
            created_at: now.coerce(),
        }
    }

    #[test]
    fn retry_delay_doubles_with_every_failure() {
        assert_eq!(
            Notification::retry_delay(0),
            Duration::from_secs(60),
        );
        assert_eq!(
            Notification::retry_delay(1),
            Duration::from_secs(2 * 60),
        );
        assert_eq!(
            Notification::retry_delay(3),
            Duration::from_secs(8 * 60),
        );
    }

    #[test]
    fn fails_permanently_after_exhausting_retries() {
        let now = DateTime::now();
        let mut notification = notification(now);

        for _ in 0..(Notification::MAX_RETRIES - 1) {
            notification.record_failure(now);
            assert_eq!(notification.status, Status::Pending);
            assert!(notification.next_retry_at.is_some());
        }

        notification.record_failure(now);
        assert_eq!(notification.status, Status::Failed);
        assert_eq!(notification.next_retry_at, None);
    }

    #[test]
    fn is_due_respects_backoff_and_expiry() {
        let now = DateTime::now();
        let mut notification = notification(now);

        assert!(notification.is_due(now));

        notification.record_failure(now);
        assert!(!notification.is_due(now));
        assert!(notification.is_due(now + Duration::from_secs(3 * 60)));

        notification.record_sent();
        assert!(!notification.is_due(now + Duration::from_secs(3 * 60)));

        let mut expired = self::notification(now);
        expired.expires_at = now.coerce();
        assert!(!expired.is_due(now));
    }

    #[test]
    fn marking_read_is_idempotent() {
        let now = DateTime::now();
        let mut notification = notification(now);

        notification.mark_read(now);
        let first = notification.read_at;
        assert!(first.is_some());

        notification.mark_read(now + Duration::from_secs(10));
        assert_eq!(notification.read_at, first);
    }
}
