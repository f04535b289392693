//! Fare computation over a [`Pricing`] rule-set.

use common::Money;
use derive_more::{Display, Error};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::{ride, vehicle};

use super::Pricing;

/// Trip facts a fare is computed from.
///
/// Ephemeral value object with no identity, constructed per computation.
#[derive(Clone, Copy, Debug, Deserialize)]
pub struct Input {
    /// Trip distance, in kilometers.
    pub distance_km: Decimal,

    /// Trip duration, in minutes.
    pub duration_minutes: Decimal,

    /// Vehicle [`Category`] the trip is booked for.
    ///
    /// [`Category`]: vehicle::Category
    pub vehicle: vehicle::Category,

    /// [`Kind`] of the ride.
    ///
    /// [`Kind`]: ride::Kind
    pub kind: ride::Kind,

    /// Indicator whether the ride is an emergency one.
    #[serde(default)]
    pub is_emergency: bool,

    /// Indicator whether the ride is a recurring one.
    #[serde(default)]
    pub is_recurring: bool,

    /// Indicator whether the ride is an airport transfer.
    #[serde(default)]
    pub is_airport_transfer: bool,

    /// Indicator whether the ride is billed corporately.
    #[serde(default)]
    pub is_corporate: bool,

    /// Scheduled pickup moment, driving time-window multipliers.
    ///
    /// Without it no time window applies.
    #[serde(
        default,
        with = "common::datetime::serde::opt_unix_timestamp"
    )]
    pub pickup_at: Option<ride::PickupDateTime>,
}

/// Composition of a computed fare.
///
/// Reports every intermediate value along with the adjustments fired, so a
/// total is auditable without re-running the computation.
#[derive(Clone, Copy, Debug, Serialize)]
pub struct Breakdown {
    /// Flat fare the computation started from.
    pub base_fare: Decimal,

    /// Distance component of the fare.
    pub distance_fare: Decimal,

    /// Duration component of the fare.
    pub duration_fare: Decimal,

    /// Vehicle multiplier that was applied.
    pub vehicle_multiplier: Decimal,

    /// Final total, clamped and rounded to 2 decimal places.
    pub total: Money,

    /// Adjustments fired during the computation.
    pub adjustments: Adjustments,
}

/// Record of the adjustments fired during a fare computation.
#[derive(Clone, Copy, Debug, Default, Serialize)]
pub struct Adjustments {
    /// Indicator whether the peak-hours multiplier was applied.
    pub peak: bool,

    /// Indicator whether the night-hours multiplier was applied.
    pub night: bool,

    /// Indicator whether the weekend multiplier was applied.
    pub weekend: bool,

    /// Indicator whether the emergency multiplier was applied.
    pub emergency: bool,

    /// Airport transfer add-on, if applied.
    pub airport_transfer: Option<Money>,

    /// Recurring-ride discount, if applied.
    pub recurring_discount: Option<Money>,

    /// Corporate discount, if applied.
    pub corporate_discount: Option<Money>,
}

/// Error of providing a malformed [`Input`] to a fare computation.
///
/// Everything else degrades gracefully instead: an unknown vehicle category
/// falls back to a multiplier of `1`, an unmatched distance tier yields a
/// zero distance fare, and a disabled time window is skipped.
#[derive(Clone, Copy, Debug, Display, Error, Eq, PartialEq)]
pub enum InvalidInputError {
    /// Trip distance is negative.
    #[display("trip distance cannot be negative")]
    NegativeDistance,

    /// Trip duration is negative.
    #[display("trip duration cannot be negative")]
    NegativeDuration,
}

impl Pricing {
    /// Computes a fare [`Breakdown`] for the provided [`Input`] over this
    /// [`Pricing`].
    ///
    /// Pure and deterministic. The steps below run in a fixed order, as
    /// reordering them changes totals:
    /// 1. distance fare (tiers first-match, or flat per-kilometer rate);
    /// 2. duration fare;
    /// 3. vehicle multiplier (`1` for unmapped categories);
    /// 4. base total;
    /// 5. peak, night and weekend multipliers, stacking multiplicatively;
    /// 6. emergency multiplier, airport add-on, recurring discount;
    /// 7. corporate discount, capped by its maximum amount;
    /// 8. clamp to the minimum/maximum fare bounds;
    /// 9. round to 2 decimal places, half-up.
    ///
    /// # Errors
    ///
    /// If the [`Input`] carries a negative distance or duration.
    pub fn quote(&self, input: &Input) -> Result<Breakdown, InvalidInputError> {
        use InvalidInputError as E;

        if input.distance_km < Decimal::ZERO {
            return Err(E::NegativeDistance);
        }
        if input.duration_minutes < Decimal::ZERO {
            return Err(E::NegativeDuration);
        }

        let distance_fare = if self.distance_tiers.is_empty() {
            input.distance_km * self.per_km_rate
        } else {
            // First matching tier wins. A distance outside every tier yields
            // a zero distance fare, which the tests pin as a boundary case.
            self.distance_tiers
                .iter()
                .find(|tier| {
                    tier.min_distance <= input.distance_km
                        && tier
                            .max_distance
                            .is_none_or(|max| input.distance_km <= max)
                })
                .map_or(Decimal::ZERO, |tier| {
                    input.distance_km * tier.per_km_rate
                })
        };

        let duration_fare = input.duration_minutes * self.per_minute_rate;

        let vehicle_multiplier = self
            .vehicle_multipliers
            .get(&input.vehicle)
            .copied()
            .unwrap_or(Decimal::ONE);

        let mut total = (self.base_fare + distance_fare + duration_fare)
            * vehicle_multiplier;

        let mut adjustments = Adjustments::default();

        if let Some(pickup_at) = input.pickup_at {
            let hour = pickup_at.hour();
            let day = pickup_at.weekday().number_days_from_sunday();

            let peak = &self.time_windows.peak;
            if peak.enabled
                && (peak.start_hour..=peak.end_hour).contains(&hour)
                && peak.days.contains(&day)
            {
                total *= peak.multiplier;
                adjustments.peak = true;
            }

            // Night hours wrap around midnight.
            let night = &self.time_windows.night;
            if night.enabled
                && (hour >= night.start_hour || hour <= night.end_hour)
            {
                total *= night.multiplier;
                adjustments.night = true;
            }

            let weekend = &self.time_windows.weekend;
            if weekend.enabled && weekend.days.contains(&day) {
                total *= weekend.multiplier;
                adjustments.weekend = true;
            }
        }

        if input.is_emergency && self.special.emergency.enabled {
            total *= self.special.emergency.multiplier;
            adjustments.emergency = true;
        }

        if input.is_airport_transfer && self.special.airport_transfer.enabled {
            let add_on = self.special.airport_transfer.additional_fare;
            total += add_on;
            adjustments.airport_transfer = Some(self.money(add_on));
        }

        if input.is_recurring && self.special.recurring.enabled {
            let discount = self.special.recurring.discount.of(total);
            total -= discount;
            adjustments.recurring_discount = Some(self.money(discount));
        }

        if input.is_corporate && self.corporate_discount.enabled {
            let discount = self
                .corporate_discount
                .percentage
                .of(total)
                .min(self.corporate_discount.maximum_amount);
            total -= discount;
            adjustments.corporate_discount = Some(self.money(discount));
        }

        total = total.max(self.minimum_fare);
        if let Some(max) = self.maximum_fare {
            total = total.min(max);
        }

        Ok(Breakdown {
            base_fare: self.base_fare,
            distance_fare,
            duration_fare,
            vehicle_multiplier,
            total: self.money(total).rounded(),
            adjustments,
        })
    }

    /// Wraps the provided amount into [`Money`] of this [`Pricing`]'s
    /// currency.
    fn money(&self, amount: Decimal) -> Money {
        Money {
            amount,
            currency: self.currency,
        }
    }
}

#[cfg(test)]
mod spec {
    use common::DateTime;
    use rust_decimal::Decimal;

    use crate::domain::{
        pricing::{spec::pricing, DistanceTier},
        ride, vehicle,
    };

    use super::{Input, InvalidInputError};

    fn input() -> Input {
        Input {
            distance_km: Decimal::TEN,
            duration_minutes: Decimal::from(20),
            vehicle: vehicle::Category::Sedan,
            kind: ride::Kind::OneWay,
            is_emergency: false,
            is_recurring: false,
            is_airport_transfer: false,
            is_corporate: false,
            pickup_at: None,
        }
    }

    fn decimal(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn computes_basic_fare() {
        let pricing = pricing(DateTime::now());

        let breakdown = pricing.quote(&input()).unwrap();

        assert_eq!(breakdown.base_fare, decimal("5"));
        assert_eq!(breakdown.distance_fare, decimal("20"));
        assert_eq!(breakdown.duration_fare, decimal("10"));
        assert_eq!(breakdown.vehicle_multiplier, Decimal::ONE);
        assert_eq!(breakdown.total.amount, decimal("35.00"));
    }

    #[test]
    fn clamps_to_minimum_fare() {
        let pricing = pricing(DateTime::now());
        let input = Input {
            distance_km: Decimal::ZERO,
            duration_minutes: Decimal::ZERO,
            ..input()
        };

        let breakdown = pricing.quote(&input).unwrap();

        assert_eq!(breakdown.total.amount, decimal("10.00"));
    }

    #[test]
    fn clamps_to_maximum_fare() {
        let mut pricing = pricing(DateTime::now());
        pricing.maximum_fare = Some(decimal("30"));

        let breakdown = pricing.quote(&input()).unwrap();

        assert_eq!(breakdown.total.amount, decimal("30.00"));
    }

    #[test]
    fn unknown_vehicle_category_falls_back_to_unit_multiplier() {
        let mut pricing = pricing(DateTime::now());
        drop(pricing.vehicle_multipliers.remove(&vehicle::Category::Sedan));

        let breakdown = pricing.quote(&input()).unwrap();

        assert_eq!(breakdown.vehicle_multiplier, Decimal::ONE);
        assert_eq!(breakdown.total.amount, decimal("35.00"));
    }

    #[test]
    fn first_matching_distance_tier_wins() {
        let mut pricing = pricing(DateTime::now());
        pricing.distance_tiers = vec![
            DistanceTier {
                min_distance: Decimal::ZERO,
                max_distance: Some(decimal("15")),
                per_km_rate: decimal("3"),
            },
            DistanceTier {
                min_distance: Decimal::ZERO,
                max_distance: None,
                per_km_rate: decimal("1"),
            },
        ];

        let breakdown = pricing.quote(&input()).unwrap();

        assert_eq!(breakdown.distance_fare, decimal("30"));
    }

    #[test]
    fn distance_outside_every_tier_yields_zero_distance_fare() {
        // A gap in the tier table silently zeroes the distance component
        // instead of falling back to the flat rate. Kept as-is: this test
        // exists to make any future change of the behavior a conscious one.
        let mut pricing = pricing(DateTime::now());
        pricing.distance_tiers = vec![DistanceTier {
            min_distance: Decimal::ZERO,
            max_distance: Some(decimal("5")),
            per_km_rate: decimal("3"),
        }];

        let breakdown = pricing.quote(&input()).unwrap();

        assert_eq!(breakdown.distance_fare, Decimal::ZERO);
        assert_eq!(breakdown.total.amount, decimal("15.00"));
    }

    #[test]
    fn time_windows_stack_multiplicatively() {
        let mut pricing = pricing(DateTime::now());
        pricing.time_windows.peak.enabled = true;
        pricing.time_windows.peak.start_hour = 22;
        pricing.time_windows.peak.end_hour = 23;
        pricing.time_windows.peak.days = vec![6];
        pricing.time_windows.night.enabled = true;
        pricing.time_windows.weekend.enabled = true;
        pricing.time_windows.weekend.days = vec![0, 6];

        // A Saturday, 23:00 UTC: all three windows apply.
        let pickup_at =
            DateTime::from_rfc3339("2026-01-03T23:00:00Z").unwrap();
        let input = Input {
            pickup_at: Some(pickup_at.coerce()),
            ..input()
        };

        let breakdown = pricing.quote(&input).unwrap();

        assert!(breakdown.adjustments.peak);
        assert!(breakdown.adjustments.night);
        assert!(breakdown.adjustments.weekend);
        // 35 * 1.2 * 1.1 * 1.1
        assert_eq!(breakdown.total.amount, decimal("50.82"));
    }

    #[test]
    fn night_window_wraps_around_midnight() {
        let mut pricing = pricing(DateTime::now());
        pricing.time_windows.night.enabled = true;

        let early = DateTime::from_rfc3339("2026-01-05T02:00:00Z").unwrap();
        let input = Input {
            pickup_at: Some(early.coerce()),
            ..input()
        };

        let breakdown = pricing.quote(&input).unwrap();

        assert!(breakdown.adjustments.night);
        assert_eq!(breakdown.total.amount, decimal("38.50"));
    }

    #[test]
    fn special_adjustments_apply_in_order() {
        let mut pricing = pricing(DateTime::now());
        pricing.special.emergency.enabled = true;
        pricing.special.airport_transfer.enabled = true;
        pricing.special.airport_transfer.additional_fare = Decimal::TEN;
        pricing.special.recurring.enabled = true;

        let input = Input {
            is_emergency: true,
            is_airport_transfer: true,
            is_recurring: true,
            ..input()
        };

        let breakdown = pricing.quote(&input).unwrap();

        assert!(breakdown.adjustments.emergency);
        assert_eq!(
            breakdown.adjustments.airport_transfer.map(|m| m.amount),
            Some(Decimal::TEN),
        );
        // 35 * 1.5 = 52.5, + 10 = 62.5, - 5% = 59.375, rounded half-up.
        assert_eq!(breakdown.total.amount, decimal("59.38"));
    }

    #[test]
    fn corporate_discount_is_capped() {
        let mut pricing = pricing(DateTime::now());
        pricing.corporate_discount.enabled = true;
        pricing.corporate_discount.maximum_amount = Decimal::TWO;

        let input = Input {
            distance_km: Decimal::ONE_HUNDRED,
            is_corporate: true,
            ..input()
        };

        // Raw total 215, 10% of which exceeds the 2 cap.
        let breakdown = pricing.quote(&input).unwrap();

        assert_eq!(
            breakdown.adjustments.corporate_discount.map(|m| m.amount),
            Some(Decimal::TWO),
        );
        assert_eq!(breakdown.total.amount, decimal("213.00"));
    }

    #[test]
    fn fare_is_monotonic_in_distance_and_duration() {
        let pricing = pricing(DateTime::now());

        let mut last = Decimal::ZERO;
        for km in 0..50 {
            let input = Input {
                distance_km: Decimal::from(km),
                ..input()
            };
            let total = pricing.quote(&input).unwrap().total.amount;
            assert!(total >= last, "fare decreased at {km} km");
            last = total;
        }

        let mut last = Decimal::ZERO;
        for minutes in 0..120 {
            let input = Input {
                duration_minutes: Decimal::from(minutes),
                ..input()
            };
            let total = pricing.quote(&input).unwrap().total.amount;
            assert!(total >= last, "fare decreased at {minutes} minutes");
            last = total;
        }
    }

    #[test]
    fn rejects_negative_distance_and_duration() {
        let pricing = pricing(DateTime::now());

        let negative_distance = Input {
            distance_km: Decimal::NEGATIVE_ONE,
            ..input()
        };
        assert_eq!(
            pricing.quote(&negative_distance).unwrap_err(),
            InvalidInputError::NegativeDistance,
        );

        let negative_duration = Input {
            duration_minutes: Decimal::NEGATIVE_ONE,
            ..input()
        };
        assert_eq!(
            pricing.quote(&negative_duration).unwrap_err(),
            InvalidInputError::NegativeDuration,
        );
    }
}
