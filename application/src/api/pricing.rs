//! [`Pricing`]-related API handlers.

use std::collections::HashMap;

use axum::{http::StatusCode, Extension, Json};
use common::{money::Currency, DateTime, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{
        pricing::{self, fare},
        ride, vehicle, Pricing,
    },
    query, read, Query as _,
};

use crate::{api, context::Auth, AsError, Error, Service};

/// Creates a new [`Pricing`] rule-set.
///
/// Requires the [`user::Role::Admin`] role.
///
/// [`user::Role::Admin`]: service::domain::user::Role::Admin
///
/// # Errors
///
/// Errors if the name is occupied, or the provided fields are malformed.
pub async fn create(
    Extension(service): Extension<Service>,
    auth: Auth,
    Json(body): Json<CreateBody>,
) -> Result<(StatusCode, Json<PricingResponse>), Error> {
    use service::domain::user::Role;

    auth.require_role(Role::Admin)?;

    let CreateBody {
        name,
        description,
        is_enabled,
        base_fare,
        per_km_rate,
        per_minute_rate,
        minimum_fare,
        maximum_fare,
        vehicle_multipliers,
        time_windows,
        distance_tiers,
        surge,
        corporate_discount,
        special,
        cancellation_fees,
        waiting_charges,
        currency,
        region,
        valid_from,
        valid_until,
    } = body;

    let now = DateTime::now();
    let valid_from = valid_from
        .map(|s| parse_rfc3339("validFrom", &s))
        .transpose()?
        .unwrap_or(now)
        .coerce();
    let valid_until = valid_until
        .map(|s| parse_rfc3339("validUntil", &s))
        .transpose()?
        .map(DateTime::coerce);

    let pricing = Pricing {
        id: pricing::Id::new(),
        name: api::parse("name", &name)?,
        description,
        is_enabled,
        base_fare,
        per_km_rate,
        per_minute_rate,
        minimum_fare,
        maximum_fare,
        vehicle_multipliers: vehicle_multipliers
            .unwrap_or_else(Pricing::default_vehicle_multipliers),
        time_windows,
        distance_tiers,
        surge,
        corporate_discount,
        special,
        cancellation_fees,
        waiting_charges,
        currency,
        region: api::parse("region", &region)?,
        valid_from,
        valid_until,
        created_at: now.coerce(),
    };

    let pricing = service
        .execute(command::CreatePricing { pricing })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(pricing.into())))
}

/// Returns the [`Pricing`] active at the moment.
///
/// # Errors
///
/// Errors if no [`Pricing`] is active.
pub async fn active(
    Extension(service): Extension<Service>,
    _: Auth,
) -> Result<Json<PricingResponse>, Error> {
    let pricing = service
        .execute(query::pricing::ActiveAt::by(read::pricing::ActiveAt(
            DateTime::now(),
        )))
        .await
        .map_err(AsError::into_error)?
        .ok_or(PricingError::NoActivePricing)?;

    Ok(Json(pricing.into()))
}

/// Lists all the [`Pricing`] rule-sets.
///
/// Requires at least the [`user::Role::Manager`] role.
///
/// [`user::Role::Manager`]: service::domain::user::Role::Manager
///
/// # Errors
///
/// Errors if the authenticated [`User`]'s role is insufficient.
///
/// [`User`]: service::domain::User
pub async fn list(
    Extension(service): Extension<Service>,
    auth: Auth,
) -> Result<Json<Vec<PricingResponse>>, Error> {
    use service::domain::user::Role;

    auth.require_role(Role::Manager)?;

    let pricings = service
        .execute(query::pricing::List::by(()))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(pricings.into_iter().map(Into::into).collect()))
}

/// Quotes a fare for the provided trip facts against the currently active
/// [`Pricing`].
///
/// Pure computation: nothing is persisted.
///
/// # Errors
///
/// Errors if no [`Pricing`] is active, or the trip facts are malformed.
pub async fn quote(
    Extension(service): Extension<Service>,
    _: Auth,
    Json(body): Json<QuoteBody>,
) -> Result<Json<QuoteResponse>, Error> {
    let QuoteBody {
        distance_km,
        duration_minutes,
        vehicle,
        kind,
        is_emergency,
        is_recurring,
        is_airport_transfer,
        is_corporate,
        pickup_at,
    } = body;

    let input = fare::Input {
        distance_km,
        duration_minutes,
        vehicle,
        kind,
        is_emergency,
        is_recurring,
        is_airport_transfer,
        is_corporate,
        pickup_at: pickup_at
            .map(|s| parse_rfc3339("pickupAt", &s))
            .transpose()?
            .map(DateTime::coerce),
    };

    let pricing = service
        .execute(query::pricing::ActiveAt::by(read::pricing::ActiveAt(
            DateTime::now(),
        )))
        .await
        .map_err(AsError::into_error)?
        .ok_or(PricingError::NoActivePricing)?;

    let breakdown = pricing
        .quote(&input)
        .map_err(|e| Error::validation(e.to_string()))?;

    Ok(Json(breakdown.into()))
}

/// Parses the provided [RFC 3339] `value` into a [`DateTime`], reporting a
/// validation [`Error`] naming the `field` on failure.
///
/// [RFC 3339]: https://tools.ietf.org/html/rfc3339
fn parse_rfc3339(field: &'static str, value: &str) -> Result<DateTime, Error> {
    DateTime::from_rfc3339(value)
        .map_err(|e| Error::validation(format!("invalid `{field}`: {e}")))
}

/// Body of the [`quote()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteBody {
    /// Trip distance, in kilometers.
    pub distance_km: Decimal,

    /// Trip duration, in minutes.
    pub duration_minutes: Decimal,

    /// Vehicle [`vehicle::Category`] the trip is booked for.
    pub vehicle: vehicle::Category,

    /// [`ride::Kind`] of the ride.
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

    /// [RFC 3339] scheduled pickup moment, driving time-window multipliers.
    ///
    /// Without it no time window applies.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub pickup_at: Option<String>,
}

/// Body of the [`create()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateBody {
    /// Unique name of the [`Pricing`].
    pub name: String,

    /// Human-readable description of the [`Pricing`].
    pub description: Option<String>,

    /// Indicator whether the [`Pricing`] may be selected as active.
    #[serde(default = "default_enabled")]
    pub is_enabled: bool,

    /// Flat fare charged on every ride.
    pub base_fare: Decimal,

    /// Rate charged per kilometer, unless distance tiers apply.
    pub per_km_rate: Decimal,

    /// Rate charged per minute of the ride.
    pub per_minute_rate: Decimal,

    /// Lower bound of any total fare.
    #[serde(default)]
    pub minimum_fare: Decimal,

    /// Upper bound of any total fare, if any.
    pub maximum_fare: Option<Decimal>,

    /// Fare multiplier per vehicle [`vehicle::Category`], with sensible
    /// defaults if omitted.
    pub vehicle_multipliers: Option<HashMap<vehicle::Category, Decimal>>,

    /// Time-based fare multipliers.
    #[serde(default)]
    pub time_windows: pricing::TimeWindows,

    /// Ordered distance tiers overriding the per-kilometer rate.
    #[serde(default)]
    pub distance_tiers: Vec<pricing::DistanceTier>,

    /// Surge pricing parameters.
    #[serde(default)]
    pub surge: pricing::Surge,

    /// Discount applied to corporate-billed rides.
    #[serde(default)]
    pub corporate_discount: pricing::CorporateDiscount,

    /// Special-case fare adjustments.
    #[serde(default)]
    pub special: pricing::SpecialPricing,

    /// Cancellation fee schedule.
    #[serde(default)]
    pub cancellation_fees: pricing::CancellationFees,

    /// Waiting charge parameters.
    #[serde(default)]
    pub waiting_charges: pricing::WaitingCharges,

    /// [`Currency`] all amounts of the [`Pricing`] are in.
    #[serde(default = "default_currency")]
    pub currency: Currency,

    /// Region the [`Pricing`] applies to.
    #[serde(default = "default_region")]
    pub region: String,

    /// [RFC 3339] moment the [`Pricing`] is valid from, now if omitted.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub valid_from: Option<String>,

    /// [RFC 3339] moment the [`Pricing`] is valid until, if bounded.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub valid_until: Option<String>,
}

/// Default of the [`CreateBody::is_enabled`] field.
const fn default_enabled() -> bool {
    true
}

/// Default of the [`CreateBody::currency`] field.
const fn default_currency() -> Currency {
    Currency::Usd
}

/// Default of the [`CreateBody::region`] field.
fn default_region() -> String {
    "GLOBAL".to_owned()
}

/// [`Pricing`] as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PricingResponse {
    /// ID of the [`Pricing`].
    pub id: pricing::Id,

    /// Unique name of the [`Pricing`].
    pub name: pricing::Name,

    /// Human-readable description of the [`Pricing`].
    pub description: Option<String>,

    /// Indicator whether the [`Pricing`] may be selected as active.
    pub is_enabled: bool,

    /// Flat fare charged on every ride.
    pub base_fare: Decimal,

    /// Rate charged per kilometer, unless distance tiers apply.
    pub per_km_rate: Decimal,

    /// Rate charged per minute of the ride.
    pub per_minute_rate: Decimal,

    /// Lower bound of any total fare.
    pub minimum_fare: Decimal,

    /// Upper bound of any total fare, if any.
    pub maximum_fare: Option<Decimal>,

    /// Fare multiplier per vehicle [`vehicle::Category`].
    pub vehicle_multipliers: HashMap<vehicle::Category, Decimal>,

    /// Time-based fare multipliers.
    pub time_windows: pricing::TimeWindows,

    /// Ordered distance tiers overriding the per-kilometer rate.
    pub distance_tiers: Vec<pricing::DistanceTier>,

    /// Surge pricing parameters.
    pub surge: pricing::Surge,

    /// Discount applied to corporate-billed rides.
    pub corporate_discount: pricing::CorporateDiscount,

    /// Special-case fare adjustments.
    pub special: pricing::SpecialPricing,

    /// Cancellation fee schedule.
    pub cancellation_fees: pricing::CancellationFees,

    /// Waiting charge parameters.
    pub waiting_charges: pricing::WaitingCharges,

    /// [`Currency`] all amounts of the [`Pricing`] are in.
    pub currency: Currency,

    /// Region the [`Pricing`] applies to.
    pub region: pricing::Region,

    /// [RFC 3339] moment the [`Pricing`] is valid from.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub valid_from: String,

    /// [RFC 3339] moment the [`Pricing`] is valid until, if bounded.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub valid_until: Option<String>,

    /// [RFC 3339] moment the [`Pricing`] was created at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<Pricing> for PricingResponse {
    fn from(pricing: Pricing) -> Self {
        Self {
            id: pricing.id,
            name: pricing.name,
            description: pricing.description,
            is_enabled: pricing.is_enabled,
            base_fare: pricing.base_fare,
            per_km_rate: pricing.per_km_rate,
            per_minute_rate: pricing.per_minute_rate,
            minimum_fare: pricing.minimum_fare,
            maximum_fare: pricing.maximum_fare,
            vehicle_multipliers: pricing.vehicle_multipliers,
            time_windows: pricing.time_windows,
            distance_tiers: pricing.distance_tiers,
            surge: pricing.surge,
            corporate_discount: pricing.corporate_discount,
            special: pricing.special,
            cancellation_fees: pricing.cancellation_fees,
            waiting_charges: pricing.waiting_charges,
            currency: pricing.currency,
            region: pricing.region,
            valid_from: pricing.valid_from.to_rfc3339(),
            valid_until: pricing.valid_until.map(|at| at.to_rfc3339()),
            created_at: pricing.created_at.to_rfc3339(),
        }
    }
}

/// Fare quote as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteResponse {
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
    pub adjustments: AdjustmentsResponse,
}

/// Fired fare adjustments as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AdjustmentsResponse {
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

impl From<fare::Breakdown> for QuoteResponse {
    fn from(breakdown: fare::Breakdown) -> Self {
        Self {
            base_fare: breakdown.base_fare,
            distance_fare: breakdown.distance_fare,
            duration_fare: breakdown.duration_fare,
            vehicle_multiplier: breakdown.vehicle_multiplier,
            total: breakdown.total,
            adjustments: AdjustmentsResponse {
                peak: breakdown.adjustments.peak,
                night: breakdown.adjustments.night,
                weekend: breakdown.adjustments.weekend,
                emergency: breakdown.adjustments.emergency,
                airport_transfer: breakdown.adjustments.airport_transfer,
                recurring_discount: breakdown.adjustments.recurring_discount,
                corporate_discount: breakdown.adjustments.corporate_discount,
            },
        }
    }
}

impl AsError for command::create_pricing::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NameOccupied(_) => Some(PricingError::NameOccupied.into()),
        }
    }
}

crate::define_error! {
    enum PricingError {
        #[code = "NO_ACTIVE_PRICING"]
        #[status = NOT_FOUND]
        #[message = "No pricing is active at the moment"]
        NoActivePricing,

        #[code = "NAME_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Pricing name is already in use"]
        NameOccupied,
    }
}
