//! [`Driver`] definitions.


#[cfg(doc)]
use common::DateTime;
use common::{unit, DateTimeOf};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[cfg(doc)]
use crate::domain::ride::{Rating, Ride};
use crate::domain::{ride, user, vehicle};

/// Driver serving [`Ride`]s.
#[derive(Clone, Debug)]
pub struct Driver {
    /// ID of this [`Driver`].
    pub id: Id,

    /// Full name of this [`Driver`].
    pub name: user::Name,

    /// Phone number of this [`Driver`].
    pub phone: user::Phone,

    /// License number of this [`Driver`].
    pub license_number: LicenseNumber,

    /// Vehicle [`Category`] this [`Driver`] serves.
    ///
    /// [`Category`]: vehicle::Category
    pub vehicle: vehicle::Category,

    /// Indicator whether this [`Driver`] is available for new [`Ride`]s.
    pub is_available: bool,

    /// Sum of all [`Rating`] scores this [`Driver`] has received.
    pub rating_total: u32,

    /// Number of [`Rating`]s this [`Driver`] has received.
    pub rating_count: u32,

    /// [`DateTime`] when this [`Driver`] was registered.
    pub created_at: CreationDateTime,
}

impl Driver {
    /// Returns the average [`Rating`] score of this [`Driver`].
    ///
    /// Derived on read from the running totals, so it's never stale.
    /// [`None`] until the first rating.
    #[must_use]
    pub fn average_rating(&self) -> Option<Decimal> {
        (self.rating_count > 0).then(|| {
            Decimal::from(self.rating_total) / Decimal::from(self.rating_count)
        })
    }

    /// Records the provided [`Rating`] score into the running totals.
    pub fn record_rating(&mut self, score: ride::Score) {
        self.rating_total += u32::from(u8::from(score));
        self.rating_count += 1;
    }
}

/// ID of a [`Driver`].
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

/// License number of a [`Driver`].
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
pub struct LicenseNumber(String);

impl LicenseNumber {
    /// Creates a new [`LicenseNumber`] if the given `number` is valid.
    #[must_use]
    pub fn new(number: impl Into<String>) -> Option<Self> {
        let number = number.into();
        Self::check(&number).then_some(Self(number))
    }

    /// Checks whether the given `number` is a valid [`LicenseNumber`].
    fn check(number: impl AsRef<str>) -> bool {
        let number = number.as_ref();
        !number.is_empty()
            && number.len() <= 32
            && number
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
    }
}

impl FromStr for LicenseNumber {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `LicenseNumber`")
    }
}

/// [`DateTime`] of a [`Driver`] creation.
pub type CreationDateTime = DateTimeOf<(Driver, unit::Creation)>;

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{ride::Score, user, vehicle};

    use super::{Driver, Id, LicenseNumber};

    fn driver() -> Driver {
        Driver {
            id: Id::new(),
            name: user::Name::new("Alice Doe").unwrap(),
            phone: user::Phone::new("+12025550123").unwrap(),
            license_number: LicenseNumber::new("DL-12345").unwrap(),
            vehicle: vehicle::Category::Sedan,
            is_available: true,
            rating_total: 0,
            rating_count: 0,
            created_at: DateTime::now().coerce(),
        }
    }

    #[test]
    fn average_rating_is_derived_from_running_totals() {
        let mut driver = driver();
        assert_eq!(driver.average_rating(), None);

        driver.record_rating(Score::new(4).unwrap());
        driver.record_rating(Score::new(5).unwrap());

        assert_eq!(
            driver.average_rating(),
            Some(Decimal::new(45, 1)),
        );
    }
}
