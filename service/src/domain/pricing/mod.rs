//! [`Pricing`] definitions.

pub mod fare;

use std::{collections::HashMap, time::Duration};

#[cfg(doc)]
use common::DateTime;
use common::{money::Currency, unit, DateTimeOf, Percent};
use derive_more::{AsRef, Display, From, FromStr, Into};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use smart_default::SmartDefault;
use uuid::Uuid;

use crate::domain::vehicle;

pub use self::fare::Breakdown as FareBreakdown;

/// Named, versioned fare rule-set.
///
/// Treated as a read-only snapshot during a fare computation: selection of
/// the single currently active [`Pricing`] is the storage layer's concern.
#[derive(Clone, Debug)]
pub struct Pricing {
    /// ID of this [`Pricing`].
    pub id: Id,

    /// Unique [`Name`] of this [`Pricing`].
    pub name: Name,

    /// Human-readable description of this [`Pricing`].
    pub description: Option<String>,

    /// Indicator whether this [`Pricing`] may be selected as active.
    pub is_enabled: bool,

    /// Flat fare charged on every ride.
    pub base_fare: Decimal,

    /// Rate charged per kilometer, unless [`Pricing::distance_tiers`] apply.
    pub per_km_rate: Decimal,

    /// Rate charged per minute of the ride.
    pub per_minute_rate: Decimal,

    /// Lower bound of any total fare.
    pub minimum_fare: Decimal,

    /// Upper bound of any total fare, if any.
    pub maximum_fare: Option<Decimal>,

    /// Fare multiplier per vehicle [`Category`].
    ///
    /// Unknown categories fall back to a multiplier of `1`.
    ///
    /// [`Category`]: vehicle::Category
    pub vehicle_multipliers: HashMap<vehicle::Category, Decimal>,

    /// Time-based fare multipliers.
    pub time_windows: TimeWindows,

    /// Ordered distance tiers overriding [`Pricing::per_km_rate`].
    ///
    /// The first tier containing the ride distance wins. Tiers are assumed
    /// non-overlapping, but not validated.
    pub distance_tiers: Vec<DistanceTier>,

    /// Surge pricing parameters.
    ///
    /// Informational weights only: not wired into the fare computation.
    pub surge: Surge,

    /// Discount applied to corporate-billed rides.
    pub corporate_discount: CorporateDiscount,

    /// Special-case fare adjustments.
    pub special: SpecialPricing,

    /// Cancellation fee schedule, keyed by time left before pickup.
    pub cancellation_fees: CancellationFees,

    /// Waiting charge parameters.
    pub waiting_charges: WaitingCharges,

    /// [`Currency`] all amounts of this [`Pricing`] are in.
    pub currency: Currency,

    /// [`Region`] this [`Pricing`] applies to.
    pub region: Region,

    /// [`DateTime`] this [`Pricing`] is valid from.
    pub valid_from: ValidityDateTime,

    /// [`DateTime`] this [`Pricing`] is valid until, if bounded.
    pub valid_until: Option<ValidityDateTime>,

    /// [`DateTime`] when this [`Pricing`] was created.
    pub created_at: CreationDateTime,
}

impl Pricing {
    /// Indicates whether this [`Pricing`] is valid at the provided moment.
    #[must_use]
    pub fn is_valid_at(&self, now: common::DateTime) -> bool {
        self.is_enabled
            && self.valid_from <= now.coerce()
            && self.valid_until.is_none_or(|until| until >= now.coerce())
    }

    /// Returns the cancellation fee charged when a ride is cancelled with the
    /// provided time left before its scheduled pickup.
    #[must_use]
    pub fn cancellation_fee(&self, before_pickup: Duration) -> Decimal {
        /// One hour, in seconds.
        const HOUR: u64 = 60 * 60;

        let fees = &self.cancellation_fees;
        match before_pickup.as_secs() {
            s if s <= HOUR => fees.within_1_hour,
            s if s <= 2 * HOUR => fees.within_2_hours,
            s if s <= 4 * HOUR => fees.within_4_hours,
            s if s <= 24 * HOUR => fees.within_24_hours,
            _ => fees.after_24_hours,
        }
    }

    /// Returns the charge for the provided number of minutes a driver has
    /// been kept waiting.
    ///
    /// The first [`WaitingCharges::free_minutes`] are free, and waiting is
    /// capped at [`WaitingCharges::max_minutes`].
    #[must_use]
    pub fn waiting_charge(&self, waited_minutes: u32) -> Decimal {
        let charges = &self.waiting_charges;
        let billable = waited_minutes
            .min(charges.max_minutes)
            .saturating_sub(charges.free_minutes);
        Decimal::from(billable) * charges.per_minute_charge
    }

    /// Returns the default [`Pricing::vehicle_multipliers`] mapping.
    #[must_use]
    pub fn default_vehicle_multipliers() -> HashMap<vehicle::Category, Decimal>
    {
        use vehicle::Category as C;

        [
            (C::Sedan, Decimal::ONE),
            (C::Suv, Decimal::new(12, 1)),
            (C::Luxury, Decimal::new(15, 1)),
            (C::Van, Decimal::new(13, 1)),
            (C::Bus, Decimal::TWO),
        ]
        .into_iter()
        .collect()
    }
}

/// ID of a [`Pricing`].
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

/// Name of a [`Pricing`], unique across all rule-sets.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
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
        name.trim() == name && !name.is_empty() && name.len() <= 128
    }
}

impl FromStr for Name {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Name`")
    }
}

/// Region a [`Pricing`] applies to.
#[derive(AsRef, Clone, Debug, Display, Eq, Hash, PartialEq, Serialize)]
#[as_ref(str, String)]
pub struct Region(String);

impl Region {
    /// Creates a new [`Region`] if the given `region` is valid.
    #[must_use]
    pub fn new(region: impl Into<String>) -> Option<Self> {
        let region = region.into();
        Self::check(&region).then_some(Self(region))
    }

    /// Checks whether the given `region` is a valid [`Region`].
    fn check(region: impl AsRef<str>) -> bool {
        let region = region.as_ref();
        !region.is_empty()
            && region.len() <= 8
            && region.chars().all(|c| c.is_ascii_alphabetic())
    }
}

impl FromStr for Region {
    type Err = &'static str;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s).ok_or("invalid `Region`")
    }
}

/// Time-based fare multipliers of a [`Pricing`].
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct TimeWindows {
    /// Peak-hours window.
    pub peak: PeakWindow,

    /// Night-hours window.
    pub night: NightWindow,

    /// Weekend window.
    pub weekend: WeekendWindow,
}

/// Weekday index, `0` for Sunday through `6` for Saturday.
pub type DayIndex = u8;

/// Peak-hours fare multiplier window.
///
/// Applies when the pickup hour falls inside `[start_hour, end_hour]`
/// (inclusive) on one of the configured [`DayIndex`]es.
#[derive(Clone, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct PeakWindow {
    /// Indicator whether this window is applied.
    pub enabled: bool,

    /// Fare multiplier of this window.
    #[default(_code = "Decimal::new(12, 1)")]
    pub multiplier: Decimal,

    /// Hour of day this window starts at.
    #[default = 7]
    pub start_hour: u8,

    /// Hour of day this window ends at, inclusive.
    #[default = 9]
    pub end_hour: u8,

    /// [`DayIndex`]es this window applies on.
    pub days: Vec<DayIndex>,
}

/// Night-hours fare multiplier window.
///
/// Applies when the pickup hour is `>= start_hour` OR `<= end_hour`, which
/// handles the wraparound across midnight. No weekday restriction.
#[derive(Clone, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct NightWindow {
    /// Indicator whether this window is applied.
    pub enabled: bool,

    /// Fare multiplier of this window.
    #[default(_code = "Decimal::new(11, 1)")]
    pub multiplier: Decimal,

    /// Hour of day this window starts at.
    #[default = 22]
    pub start_hour: u8,

    /// Hour of day this window ends at, inclusive.
    #[default = 6]
    pub end_hour: u8,
}

/// Weekend fare multiplier window.
///
/// Applies on the configured [`DayIndex`]es, with no hour restriction.
#[derive(Clone, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct WeekendWindow {
    /// Indicator whether this window is applied.
    pub enabled: bool,

    /// Fare multiplier of this window.
    #[default(_code = "Decimal::new(11, 1)")]
    pub multiplier: Decimal,

    /// [`DayIndex`]es this window applies on.
    pub days: Vec<DayIndex>,
}

/// Distance tier of a [`Pricing`], overriding its per-kilometer rate.
#[derive(Clone, Copy, Debug, Deserialize, Serialize)]
pub struct DistanceTier {
    /// Minimum distance (in kilometers) this tier applies from.
    pub min_distance: Decimal,

    /// Maximum distance (in kilometers) this tier applies to, or unlimited.
    pub max_distance: Option<Decimal>,

    /// Rate charged per kilometer within this tier.
    pub per_km_rate: Decimal,
}

/// Surge pricing parameters of a [`Pricing`].
///
/// Carried as data only: the fare computation never applies these.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct Surge {
    /// Indicator whether surge pricing is enabled.
    pub enabled: bool,

    /// Base surge multiplier.
    #[default(_code = "Decimal::ONE")]
    pub base_multiplier: Decimal,

    /// Maximum surge multiplier.
    #[default(_code = "Decimal::new(3, 0)")]
    pub max_multiplier: Decimal,

    /// Weight of the demand factor.
    #[default(_code = "Decimal::new(3, 1)")]
    pub demand_weight: Decimal,

    /// Weight of the weather factor.
    #[default(_code = "Decimal::new(2, 1)")]
    pub weather_weight: Decimal,

    /// Weight of the events factor.
    #[default(_code = "Decimal::new(2, 1)")]
    pub events_weight: Decimal,

    /// Weight of the time factor.
    #[default(_code = "Decimal::new(3, 1)")]
    pub time_weight: Decimal,
}

/// Discount applied to corporate-billed rides.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct CorporateDiscount {
    /// Indicator whether the discount is applied.
    #[default = true]
    pub enabled: bool,

    /// [`Percent`] of the total fare to discount.
    #[default(_code = "Percent::new(Decimal::TEN).expect(\"10 <= 100\")")]
    pub percentage: Percent,

    /// Minimum number of rides qualifying for the discount.
    pub minimum_rides: u32,

    /// Cap on the discounted amount.
    #[default(_code = "Decimal::new(50, 0)")]
    pub maximum_amount: Decimal,
}

/// Special-case fare adjustments of a [`Pricing`].
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct SpecialPricing {
    /// Airport transfer add-on.
    pub airport_transfer: AirportTransfer,

    /// Emergency ride multiplier.
    pub emergency: EmergencyRide,

    /// Recurring ride discount.
    pub recurring: RecurringRide,
}

/// Flat add-on for airport transfer rides.
#[derive(Clone, Copy, Debug, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct AirportTransfer {
    /// Indicator whether the add-on is applied.
    pub enabled: bool,

    /// Flat amount added to the total fare.
    pub additional_fare: Decimal,
}

/// Multiplier for emergency rides.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct EmergencyRide {
    /// Indicator whether the multiplier is applied.
    pub enabled: bool,

    /// Fare multiplier of an emergency ride.
    #[default(_code = "Decimal::new(15, 1)")]
    pub multiplier: Decimal,
}

/// Discount for recurring rides.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct RecurringRide {
    /// Indicator whether the discount is applied.
    pub enabled: bool,

    /// [`Percent`] of the total fare to discount.
    #[default(_code = "Percent::new(Decimal::new(5, 0)).expect(\"5 <= 100\")")]
    pub discount: Percent,

    /// Minimum rides per month qualifying for the discount.
    #[default = 5]
    pub minimum_frequency: u32,
}

/// Cancellation fee schedule of a [`Pricing`], keyed by time left before the
/// scheduled pickup.
#[derive(Clone, Copy, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct CancellationFees {
    /// Fee when cancelled within 1 hour of pickup.
    pub within_1_hour: Decimal,

    /// Fee when cancelled within 2 hours of pickup.
    #[default(_code = "Decimal::new(5, 0)")]
    pub within_2_hours: Decimal,

    /// Fee when cancelled within 4 hours of pickup.
    #[default(_code = "Decimal::TEN")]
    pub within_4_hours: Decimal,

    /// Fee when cancelled within 24 hours of pickup.
    #[default(_code = "Decimal::new(20, 0)")]
    pub within_24_hours: Decimal,

    /// Fee when cancelled more than 24 hours before pickup.
    #[default(_code = "Decimal::new(50, 0)")]
    pub after_24_hours: Decimal,
}

/// Waiting charge parameters of a [`Pricing`].
#[derive(Clone, Copy, Debug, Deserialize, Serialize, SmartDefault)]
#[serde(default)]
pub struct WaitingCharges {
    /// Minutes of waiting free of charge.
    #[default = 5]
    pub free_minutes: u32,

    /// Charge per minute of waiting past the free window.
    #[default(_code = "Decimal::ONE")]
    pub per_minute_charge: Decimal,

    /// Maximum billable waiting time, in minutes.
    #[default = 30]
    pub max_minutes: u32,
}

/// Marker type describing a [`Pricing`] validity.
#[derive(Clone, Copy, Debug)]
pub struct Validity;

/// [`DateTime`] bounding a [`Pricing`] validity window.
pub type ValidityDateTime = DateTimeOf<(Pricing, Validity)>;

/// [`DateTime`] when a [`Pricing`] was created.
pub type CreationDateTime = DateTimeOf<(Pricing, unit::Creation)>;

#[cfg(test)]
pub(crate) mod spec {
    use std::time::Duration;

    use common::{money::Currency, DateTime};
    use rust_decimal::Decimal;

    use super::{
        CancellationFees, CorporateDiscount, Id, Name, Pricing, Region,
        SpecialPricing, Surge, TimeWindows, WaitingCharges,
    };

    pub(crate) fn pricing(now: DateTime) -> Pricing {
        Pricing {
            id: Id::new(),
            name: Name::new("standard").unwrap(),
            description: None,
            is_enabled: true,
            base_fare: Decimal::new(5, 0),
            per_km_rate: Decimal::TWO,
            per_minute_rate: Decimal::new(5, 1),
            minimum_fare: Decimal::TEN,
            maximum_fare: None,
            vehicle_multipliers: Pricing::default_vehicle_multipliers(),
            time_windows: TimeWindows::default(),
            distance_tiers: Vec::new(),
            surge: Surge::default(),
            corporate_discount: CorporateDiscount {
                enabled: false,
                ..CorporateDiscount::default()
            },
            special: SpecialPricing::default(),
            cancellation_fees: CancellationFees::default(),
            waiting_charges: WaitingCharges::default(),
            currency: Currency::Usd,
            region: Region::new("US").unwrap(),
            valid_from: (now - Duration::from_secs(60)).coerce(),
            valid_until: None,
            created_at: now.coerce(),
        }
    }

    #[test]
    fn validity_window_is_inclusive() {
        let now = DateTime::now();
        let mut pricing = pricing(now);

        assert!(pricing.is_valid_at(now));

        pricing.valid_until = Some(now.coerce());
        assert!(pricing.is_valid_at(now));

        pricing.valid_until = Some((now - Duration::from_secs(1)).coerce());
        assert!(!pricing.is_valid_at(now));

        pricing.valid_until = None;
        pricing.is_enabled = false;
        assert!(!pricing.is_valid_at(now));
    }

    #[test]
    fn cancellation_fee_follows_the_schedule() {
        let now = DateTime::now();
        let pricing = pricing(now);

        let hour = 60 * 60;
        assert_eq!(
            pricing.cancellation_fee(Duration::from_secs(hour / 2)),
            Decimal::ZERO,
        );
        assert_eq!(
            pricing.cancellation_fee(Duration::from_secs(hour + 1)),
            Decimal::new(5, 0),
        );
        assert_eq!(
            pricing.cancellation_fee(Duration::from_secs(3 * hour)),
            Decimal::TEN,
        );
        assert_eq!(
            pricing.cancellation_fee(Duration::from_secs(12 * hour)),
            Decimal::new(20, 0),
        );
        assert_eq!(
            pricing.cancellation_fee(Duration::from_secs(48 * hour)),
            Decimal::new(50, 0),
        );
    }

    #[test]
    fn waiting_charge_skips_free_window_and_caps() {
        let now = DateTime::now();
        let pricing = pricing(now);

        assert_eq!(pricing.waiting_charge(3), Decimal::ZERO);
        assert_eq!(pricing.waiting_charge(5), Decimal::ZERO);
        assert_eq!(pricing.waiting_charge(15), Decimal::TEN);
        // Waiting is capped at 30 minutes, 25 of which are billable.
        assert_eq!(pricing.waiting_charge(90), Decimal::new(25, 0));
    }
}
