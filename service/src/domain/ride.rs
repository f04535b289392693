//! [`Ride`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{define_kind, unit, DateTimeOf, Money};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::User;
use crate::domain::{driver, user, vehicle};

/// Ride requested by an employee.
#[derive(Clone, Debug)]
pub struct Ride {
    /// ID of this [`Ride`].
    pub id: Id,

    /// ID of the [`User`] who requested this [`Ride`].
    pub requested_by: user::Id,

    /// ID of the [`Driver`] assigned to this [`Ride`], once approved.
    ///
    /// [`Driver`]: driver::Driver
    pub driver_id: Option<driver::Id>,

    /// [`Kind`] of this [`Ride`].
    pub kind: Kind,

    /// Vehicle [`Category`] this [`Ride`] is booked for.
    ///
    /// [`Category`]: vehicle::Category
    pub vehicle: vehicle::Category,

    /// Pickup [`Location`] of this [`Ride`].
    pub pickup: Location,

    /// Drop-off [`Location`] of this [`Ride`].
    pub dropoff: Location,

    /// [`DateTime`] this [`Ride`] is scheduled to start at.
    pub scheduled_at: PickupDateTime,

    /// Estimated trip distance, in kilometers.
    pub distance_km: Decimal,

    /// Estimated trip duration, in minutes.
    pub duration_minutes: Decimal,

    /// Number of passengers.
    pub passengers: u8,

    /// Stated purpose of this [`Ride`].
    pub purpose: Option<String>,

    /// Indicator whether this [`Ride`] is billed corporately.
    pub is_corporate: bool,

    /// Current [`Status`] of this [`Ride`].
    pub status: Status,

    /// Fare estimated for this [`Ride`], once quoted.
    pub fare: Option<Money>,

    /// [`Cancellation`] of this [`Ride`], if it was cancelled.
    pub cancellation: Option<Cancellation>,

    /// [`Rating`] left for this [`Ride`], once completed.
    pub rating: Option<Rating>,

    /// [`DateTime`] when this [`Ride`] was requested.
    pub created_at: CreationDateTime,
}

/// ID of a [`Ride`].
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

/// Human-readable location of a [`Ride`] endpoint.
#[derive(
    AsRef, Clone, Debug, Deserialize, Display, Eq, PartialEq, Serialize,
)]
#[as_ref(str, String)]
#[serde(try_from = "String")]
pub struct Location(String);

impl Location {
    /// Creates a new [`Location`] if the given `location` is valid.
    #[must_use]
    pub fn new(location: impl Into<String>) -> Option<Self> {
        let location = location.into();
        Self::check(&location).then_some(Self(location))
    }

    /// Checks whether the given `location` is a valid [`Location`].
    fn check(location: impl AsRef<str>) -> bool {
        let location = location.as_ref();
        !location.trim().is_empty() && location.len() <= 256
    }
}

impl FromStr for Location {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

impl TryFrom<String> for Location {
    type Error = &'static str;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        Self::new(s).ok_or("invalid `Location`")
    }
}

define_kind! {
    #[doc = "Kind of a [`Ride`]."]
    enum Kind {
        #[doc = "Single trip from pickup to drop-off."]
        OneWay = 1,

        #[doc = "Trip with a return leg."]
        RoundTrip = 2,

        #[doc = "Regularly repeating trip."]
        Recurring = 3,

        #[doc = "Urgent, out-of-schedule trip."]
        Emergency = 4,

        #[doc = "Trip to or from an airport."]
        AirportTransfer = 5,
    }
}

define_kind! {
    #[doc = "Status of a [`Ride`]."]
    enum Status {
        #[doc = "Requested and awaiting an administrator's decision."]
        Pending = 1,

        #[doc = "Approved by an administrator."]
        Approved = 2,

        #[doc = "Rejected by an administrator."]
        Rejected = 3,

        #[doc = "Cancelled before completion."]
        Cancelled = 4,

        #[doc = "Currently underway."]
        InProgress = 5,

        #[doc = "Finished successfully."]
        Completed = 6,

        #[doc = "Passenger did not show up."]
        NoShow = 7,
    }
}

impl Status {
    /// Indicates whether a [`Ride`] may move from this [`Status`] into the
    /// provided one.
    #[must_use]
    pub fn can_transition_to(self, next: Self) -> bool {
        match self {
            Self::Pending => {
                matches!(
                    next,
                    Self::Approved | Self::Rejected | Self::Cancelled,
                )
            }
            Self::Approved => {
                matches!(
                    next,
                    Self::InProgress | Self::Cancelled | Self::NoShow,
                )
            }
            Self::InProgress => matches!(next, Self::Completed),
            Self::Rejected
            | Self::Cancelled
            | Self::Completed
            | Self::NoShow => false,
        }
    }

    /// Indicates whether this [`Status`] is a terminal one.
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            Self::Rejected | Self::Cancelled | Self::Completed | Self::NoShow,
        )
    }
}

/// Cancellation record of a [`Ride`].
#[derive(Clone, Debug)]
pub struct Cancellation {
    /// Who cancelled the [`Ride`].
    pub by: CancelledBy,

    /// Stated reason of the cancellation.
    pub reason: Option<String>,

    /// Fee charged for the cancellation.
    pub fee: Money,

    /// [`DateTime`] when the [`Ride`] was cancelled.
    pub at: CancellationDateTime,
}

define_kind! {
    #[doc = "Party who cancelled a [`Ride`]."]
    enum CancelledBy {
        #[doc = "Employee who requested the ride."]
        Requester = 1,

        #[doc = "Administrator."]
        Admin = 2,
    }
}

/// Rating left for a completed [`Ride`].
#[derive(Clone, Debug)]
pub struct Rating {
    /// [`Score`] of this [`Rating`].
    pub score: Score,

    /// Free-form feedback accompanying this [`Rating`].
    pub feedback: Option<String>,

    /// [`DateTime`] when this [`Rating`] was left.
    pub at: RatingDateTime,
}

/// Score of a [`Rating`], from 1 to 5 stars.
#[derive(
    Clone, Copy, Debug, Display, Eq, Into, Ord, PartialEq, PartialOrd,
    Serialize,
)]
pub struct Score(u8);

impl Score {
    /// Creates a new [`Score`] if the given `score` is within the 1 to 5
    /// range.
    #[must_use]
    pub fn new(score: u8) -> Option<Self> {
        (1..=5).contains(&score).then_some(Self(score))
    }
}

impl<'de> Deserialize<'de> for Score {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        use serde::de::Error as _;

        let score = u8::deserialize(deserializer)?;
        Self::new(score).ok_or_else(|| {
            D::Error::custom(format!("`{score}` is out of the 1..=5 range"))
        })
    }
}

/// Marker type describing a [`Ride`] pickup.
#[derive(Clone, Copy, Debug)]
pub struct Pickup;

/// Marker type describing a [`Ride`] cancellation.
#[derive(Clone, Copy, Debug)]
pub struct Cancelling;

/// Marker type describing a [`Ride`] rating.
#[derive(Clone, Copy, Debug)]
pub struct Rate;

/// [`DateTime`] of a [`Ride`] pickup.
pub type PickupDateTime = DateTimeOf<(Ride, Pickup)>;

/// [`DateTime`] of a [`Ride`] cancellation.
pub type CancellationDateTime = DateTimeOf<(Ride, Cancelling)>;

/// [`DateTime`] of a [`Ride`] rating.
pub type RatingDateTime = DateTimeOf<(Ride, Rate)>;

/// [`DateTime`] of a [`Ride`] creation.
pub type CreationDateTime = DateTimeOf<(Ride, unit::Creation)>;

#[cfg(test)]
mod spec {
    use super::{Location, Score, Status};

    #[test]
    fn status_transitions_follow_the_lifecycle() {
        use Status as S;

        assert!(S::Pending.can_transition_to(S::Approved));
        assert!(S::Pending.can_transition_to(S::Rejected));
        assert!(S::Pending.can_transition_to(S::Cancelled));
        assert!(!S::Pending.can_transition_to(S::InProgress));
        assert!(!S::Pending.can_transition_to(S::Completed));

        assert!(S::Approved.can_transition_to(S::InProgress));
        assert!(S::Approved.can_transition_to(S::Cancelled));
        assert!(S::Approved.can_transition_to(S::NoShow));
        assert!(!S::Approved.can_transition_to(S::Completed));

        assert!(S::InProgress.can_transition_to(S::Completed));
        assert!(!S::InProgress.can_transition_to(S::Cancelled));

        for terminal in [S::Rejected, S::Cancelled, S::Completed, S::NoShow] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_transition_to(S::Pending));
            assert!(!terminal.can_transition_to(S::Approved));
        }
    }

    #[test]
    fn score_is_bounded() {
        assert!(Score::new(0).is_none());
        assert!(Score::new(1).is_some());
        assert!(Score::new(5).is_some());
        assert!(Score::new(6).is_none());
    }

    #[test]
    fn location_rejects_blank_and_oversized() {
        assert!(Location::new("HQ, 1 Main St").is_some());
        assert!(Location::new("").is_none());
        assert!(Location::new("   ").is_none());
        assert!(Location::new("x".repeat(257)).is_none());
    }
}
