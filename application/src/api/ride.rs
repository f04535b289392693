//! [`Ride`]-related API handlers.

use axum::{
    extract::{Path, Query},
    http::StatusCode,
    Extension, Json,
};
use common::{DateTime, Money};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{driver, ride, user, vehicle, Ride},
    query, read, Query as _,
};

use crate::{api, context::Auth, AccessError, AsError, Error, Service};

/// Requests a new [`Ride`] on behalf of the authenticated [`User`].
///
/// The fare is quoted immediately against the currently active pricing.
///
/// [`User`]: service::domain::User
///
/// # Errors
///
/// Errors if no pricing is active, or the provided fields are malformed.
pub async fn request(
    Extension(service): Extension<Service>,
    auth: Auth,
    Json(body): Json<RequestBody>,
) -> Result<(StatusCode, Json<RideResponse>), Error> {
    let RequestBody {
        kind,
        vehicle,
        pickup,
        dropoff,
        scheduled_at,
        distance_km,
        duration_minutes,
        passengers,
        purpose,
        is_corporate,
    } = body;

    let scheduled_at = DateTime::from_rfc3339(&scheduled_at)
        .map_err(|e| Error::validation(format!("invalid `scheduledAt`: {e}")))?
        .coerce();

    let ride = service
        .execute(command::RequestRide {
            requested_by: auth.user.id,
            kind,
            vehicle,
            pickup: api::parse("pickup", &pickup)?,
            dropoff: api::parse("dropoff", &dropoff)?,
            scheduled_at,
            distance_km,
            duration_minutes,
            passengers,
            purpose,
            is_corporate,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(ride.into())))
}

/// Lists [`Ride`]s matching the provided [`ListParams`].
///
/// Non-managers only ever see their own [`Ride`]s, regardless of the
/// requested filter.
///
/// # Errors
///
/// Errors if the underlying storage fails.
pub async fn list(
    Extension(service): Extension<Service>,
    auth: Auth,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<RideResponse>>, Error> {
    let ListParams {
        status,
        requested_by,
    } = params;

    let requested_by = if auth.user.role.u8() >= user::Role::Manager.u8() {
        requested_by
    } else {
        Some(auth.user.id)
    };

    let rides = service
        .execute(query::rides::List::by(read::ride::list::Filter {
            requested_by,
            status,
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(rides.into_iter().map(Into::into).collect()))
}

/// Returns a single [`Ride`] by its ID.
///
/// Accessible to the requester of the [`Ride`] and to managers.
///
/// # Errors
///
/// Errors if the [`Ride`] doesn't exist, or the authenticated [`User`] may
/// not see it.
///
/// [`User`]: service::domain::User
pub async fn get(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<ride::Id>,
) -> Result<Json<RideResponse>, Error> {
    let ride = service
        .execute(query::ride::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(RideError::RideNotFound)?;

    if ride.requested_by != auth.user.id {
        auth.require_role(user::Role::Manager)?;
    }

    Ok(Json(ride.into()))
}

/// Approves a pending [`Ride`], optionally assigning a driver.
///
/// Requires at least the [`user::Role::Manager`] role.
///
/// # Errors
///
/// Errors if the [`Ride`] or driver doesn't exist, the driver is
/// unavailable, or the [`Ride`] is not pending.
pub async fn approve(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<ride::Id>,
    Json(body): Json<ApproveBody>,
) -> Result<Json<RideResponse>, Error> {
    auth.require_role(user::Role::Manager)?;

    let ride = service
        .execute(command::ApproveRide {
            ride_id: id,
            driver_id: body.driver_id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(ride.into()))
}

/// Rejects a pending [`Ride`].
///
/// Requires at least the [`user::Role::Manager`] role.
///
/// # Errors
///
/// Errors if the [`Ride`] doesn't exist or is not pending.
pub async fn reject(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<ride::Id>,
    Json(body): Json<RejectBody>,
) -> Result<Json<RideResponse>, Error> {
    auth.require_role(user::Role::Manager)?;

    let ride = service
        .execute(command::RejectRide {
            ride_id: id,
            reason: body.reason,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(ride.into()))
}

/// Cancels a [`Ride`], charging the schedule-based cancellation fee.
///
/// The requester may cancel their own [`Ride`]s, managers may cancel any.
///
/// # Errors
///
/// Errors if the [`Ride`] doesn't exist, may not be cancelled by the
/// authenticated [`User`], or is in a terminal status already.
///
/// [`User`]: service::domain::User
pub async fn cancel(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<ride::Id>,
    Json(body): Json<CancelBody>,
) -> Result<Json<RideResponse>, Error> {
    let ride = service
        .execute(query::ride::ById::by(id))
        .await
        .map_err(AsError::into_error)?
        .ok_or(RideError::RideNotFound)?;

    let by = if auth.user.role.u8() >= user::Role::Manager.u8() {
        ride::CancelledBy::Admin
    } else if ride.requested_by == auth.user.id {
        ride::CancelledBy::Requester
    } else {
        return Err(AccessError::InsufficientPermissions.into());
    };

    let ride = service
        .execute(command::CancelRide {
            ride_id: id,
            by,
            reason: body.reason,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(ride.into()))
}

/// Starts an approved [`Ride`].
///
/// Requires at least the [`user::Role::Manager`] role.
///
/// # Errors
///
/// Errors if the [`Ride`] doesn't exist or is not approved.
pub async fn start(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<ride::Id>,
) -> Result<Json<RideResponse>, Error> {
    auth.require_role(user::Role::Manager)?;

    let ride = service
        .execute(command::StartRide { ride_id: id })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(ride.into()))
}

/// Completes an in-progress [`Ride`], re-quoting the fare from the actual
/// trip facts plus any waiting charge.
///
/// Requires at least the [`user::Role::Manager`] role.
///
/// # Errors
///
/// Errors if the [`Ride`] doesn't exist, is not in progress, or the actual
/// trip facts are malformed.
pub async fn complete(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<ride::Id>,
    Json(body): Json<CompleteBody>,
) -> Result<Json<RideResponse>, Error> {
    auth.require_role(user::Role::Manager)?;

    let CompleteBody {
        actual_distance_km,
        actual_duration_minutes,
        waited_minutes,
    } = body;

    let ride = service
        .execute(command::CompleteRide {
            ride_id: id,
            actual_distance_km,
            actual_duration_minutes,
            waited_minutes,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(ride.into()))
}

/// Rates a completed [`Ride`] on behalf of its requester.
///
/// # Errors
///
/// Errors if the [`Ride`] doesn't exist, is not completed, is rated already,
/// or the authenticated [`User`] is not its requester.
///
/// [`User`]: service::domain::User
pub async fn rate(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<ride::Id>,
    Json(body): Json<RateBody>,
) -> Result<Json<RideResponse>, Error> {
    let RateBody { score, feedback } = body;

    let ride = service
        .execute(command::RateRide {
            ride_id: id,
            rated_by: auth.user.id,
            score,
            feedback,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(ride.into()))
}

/// Body of the [`request()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestBody {
    /// [`ride::Kind`] of the [`Ride`].
    pub kind: ride::Kind,

    /// Vehicle [`vehicle::Category`] the [`Ride`] is requested for.
    pub vehicle: vehicle::Category,

    /// Pickup location of the [`Ride`].
    pub pickup: String,

    /// Drop-off location of the [`Ride`].
    pub dropoff: String,

    /// [RFC 3339] moment the [`Ride`] is scheduled to start at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub scheduled_at: String,

    /// Estimated trip distance, in kilometers.
    pub distance_km: Decimal,

    /// Estimated trip duration, in minutes.
    pub duration_minutes: Decimal,

    /// Number of passengers, `1` if omitted.
    #[serde(default = "default_passengers")]
    pub passengers: u8,

    /// Stated purpose of the [`Ride`].
    pub purpose: Option<String>,

    /// Indicator whether the [`Ride`] is billed corporately.
    #[serde(default)]
    pub is_corporate: bool,
}

/// Default number of [`Ride`] passengers.
const fn default_passengers() -> u8 {
    1
}

/// Parameters of the [`list()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// [`ride::Status`] to select [`Ride`]s in.
    pub status: Option<ride::Status>,

    /// Requester to select [`Ride`]s of, managers only.
    pub requested_by: Option<user::Id>,
}

/// Body of the [`approve()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApproveBody {
    /// ID of the driver to assign, if one is picked already.
    #[serde(default)]
    pub driver_id: Option<driver::Id>,
}

/// Body of the [`reject()`] request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RejectBody {
    /// Stated reason of the rejection.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of the [`cancel()`] request.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CancelBody {
    /// Stated reason of the cancellation.
    #[serde(default)]
    pub reason: Option<String>,
}

/// Body of the [`complete()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompleteBody {
    /// Actual trip distance, in kilometers.
    pub actual_distance_km: Decimal,

    /// Actual trip duration, in minutes.
    pub actual_duration_minutes: Decimal,

    /// Minutes the driver was kept waiting.
    #[serde(default)]
    pub waited_minutes: u32,
}

/// Body of the [`rate()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RateBody {
    /// [`ride::Score`] of the rating, from 1 to 5.
    pub score: ride::Score,

    /// Free-form feedback accompanying the rating.
    pub feedback: Option<String>,
}

/// [`Ride`] as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RideResponse {
    /// ID of the [`Ride`].
    pub id: ride::Id,

    /// ID of the [`User`] who requested the [`Ride`].
    ///
    /// [`User`]: service::domain::User
    pub requested_by: user::Id,

    /// ID of the driver assigned to the [`Ride`], once approved.
    pub driver_id: Option<driver::Id>,

    /// [`ride::Kind`] of the [`Ride`].
    pub kind: ride::Kind,

    /// Vehicle [`vehicle::Category`] the [`Ride`] is booked for.
    pub vehicle: vehicle::Category,

    /// Pickup location of the [`Ride`].
    pub pickup: ride::Location,

    /// Drop-off location of the [`Ride`].
    pub dropoff: ride::Location,

    /// [RFC 3339] moment the [`Ride`] is scheduled to start at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub scheduled_at: String,

    /// Estimated trip distance, in kilometers.
    pub distance_km: Decimal,

    /// Estimated trip duration, in minutes.
    pub duration_minutes: Decimal,

    /// Number of passengers.
    pub passengers: u8,

    /// Stated purpose of the [`Ride`].
    pub purpose: Option<String>,

    /// Indicator whether the [`Ride`] is billed corporately.
    pub is_corporate: bool,

    /// Current [`ride::Status`] of the [`Ride`].
    pub status: ride::Status,

    /// Fare quoted for the [`Ride`], once estimated.
    pub fare: Option<Money>,

    /// Cancellation record of the [`Ride`], if it was cancelled.
    pub cancellation: Option<CancellationResponse>,

    /// Rating left for the [`Ride`], once completed.
    pub rating: Option<RatingResponse>,

    /// [RFC 3339] moment the [`Ride`] was requested at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

/// Cancellation record of a [`Ride`] as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CancellationResponse {
    /// Party who cancelled the [`Ride`].
    pub by: ride::CancelledBy,

    /// Stated reason of the cancellation.
    pub reason: Option<String>,

    /// Fee charged for the cancellation.
    pub fee: Money,

    /// [RFC 3339] moment the [`Ride`] was cancelled at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub at: String,
}

/// Rating of a [`Ride`] as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RatingResponse {
    /// Score of the rating, from 1 to 5.
    pub score: ride::Score,

    /// Free-form feedback accompanying the rating.
    pub feedback: Option<String>,

    /// [RFC 3339] moment the rating was left at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub at: String,
}

impl From<Ride> for RideResponse {
    fn from(ride: Ride) -> Self {
        Self {
            id: ride.id,
            requested_by: ride.requested_by,
            driver_id: ride.driver_id,
            kind: ride.kind,
            vehicle: ride.vehicle,
            pickup: ride.pickup,
            dropoff: ride.dropoff,
            scheduled_at: ride.scheduled_at.to_rfc3339(),
            distance_km: ride.distance_km,
            duration_minutes: ride.duration_minutes,
            passengers: ride.passengers,
            purpose: ride.purpose,
            is_corporate: ride.is_corporate,
            status: ride.status,
            fare: ride.fare,
            cancellation: ride.cancellation.map(|c| CancellationResponse {
                by: c.by,
                reason: c.reason,
                fee: c.fee,
                at: c.at.to_rfc3339(),
            }),
            rating: ride.rating.map(|r| RatingResponse {
                score: r.score,
                feedback: r.feedback,
                at: r.at.to_rfc3339(),
            }),
            created_at: ride.created_at.to_rfc3339(),
        }
    }
}

impl AsError for command::request_ride::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::InvalidInput(e) => Some(Error::validation(e.to_string())),
            Self::NoActivePricing => {
                Some(RideError::NoActivePricing.into())
            }
            Self::UserDeactivated(_) => {
                Some(AccessError::AccountDeactivated.into())
            }
            Self::UserNotExists(_) => Some(AccessError::UserNotFound.into()),
        }
    }
}

impl AsError for command::approve_ride::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::DriverNotExists(_) => Some(RideError::DriverNotFound.into()),
            Self::DriverUnavailable(_) => {
                Some(RideError::DriverUnavailable.into())
            }
            Self::IllegalTransition(_) => {
                Some(RideError::IllegalTransition.into())
            }
            Self::RideNotExists(_) => Some(RideError::RideNotFound.into()),
        }
    }
}

impl AsError for command::reject_ride::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::IllegalTransition(_) => {
                Some(RideError::IllegalTransition.into())
            }
            Self::RideNotExists(_) => Some(RideError::RideNotFound.into()),
        }
    }
}

impl AsError for command::cancel_ride::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::IllegalTransition(_) => {
                Some(RideError::IllegalTransition.into())
            }
            Self::RideNotExists(_) => Some(RideError::RideNotFound.into()),
        }
    }
}

impl AsError for command::start_ride::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::IllegalTransition(_) => {
                Some(RideError::IllegalTransition.into())
            }
            Self::RideNotExists(_) => Some(RideError::RideNotFound.into()),
        }
    }
}

impl AsError for command::complete_ride::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::IllegalTransition(_) => {
                Some(RideError::IllegalTransition.into())
            }
            Self::InvalidInput(e) => Some(Error::validation(e.to_string())),
            Self::NoActivePricing => {
                Some(RideError::NoActivePricing.into())
            }
            Self::RideNotExists(_) => Some(RideError::RideNotFound.into()),
        }
    }
}

impl AsError for command::rate_ride::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::AlreadyRated => Some(RideError::AlreadyRated.into()),
            Self::Db(e) => e.try_as_error(),
            Self::NotCompleted(_) => {
                Some(RideError::IllegalTransition.into())
            }
            Self::NotRequester(_) => {
                Some(AccessError::InsufficientPermissions.into())
            }
            Self::RideNotExists(_) => Some(RideError::RideNotFound.into()),
        }
    }
}

crate::define_error! {
    enum RideError {
        #[code = "RIDE_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Ride does not exist"]
        RideNotFound,

        #[code = "ILLEGAL_TRANSITION"]
        #[status = CONFLICT]
        #[message = "Ride status does not allow this action"]
        IllegalTransition,

        #[code = "DRIVER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Driver does not exist"]
        DriverNotFound,

        #[code = "DRIVER_UNAVAILABLE"]
        #[status = CONFLICT]
        #[message = "Driver is not available"]
        DriverUnavailable,

        #[code = "NO_ACTIVE_PRICING"]
        #[status = CONFLICT]
        #[message = "No pricing is active at the moment"]
        NoActivePricing,

        #[code = "ALREADY_RATED"]
        #[status = CONFLICT]
        #[message = "Ride is rated already"]
        AlreadyRated,
    }
}
