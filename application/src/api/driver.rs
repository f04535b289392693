//! [`Driver`]-related API handlers.

use axum::{extract::Query, http::StatusCode, Extension, Json};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{driver, user, vehicle, Driver},
    query, read, Query as _,
};

use crate::{api, context::Auth, AsError, Error, Service};

/// Registers a new [`Driver`].
///
/// Requires the [`user::Role::Admin`] role.
///
/// # Errors
///
/// Errors if the license number is occupied, or the provided fields are
/// malformed.
pub async fn register(
    Extension(service): Extension<Service>,
    auth: Auth,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<DriverResponse>), Error> {
    auth.require_role(user::Role::Admin)?;

    let RegisterBody {
        name,
        phone,
        license_number,
        vehicle,
    } = body;

    let driver = service
        .execute(command::RegisterDriver {
            name: api::parse("name", &name)?,
            phone: api::parse("phone", &phone)?,
            license_number: api::parse("licenseNumber", &license_number)?,
            vehicle,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(driver.into())))
}

/// Lists [`Driver`]s matching the provided [`ListParams`].
///
/// Requires at least the [`user::Role::Manager`] role.
///
/// # Errors
///
/// Errors if the authenticated [`User`]'s role is insufficient.
///
/// [`User`]: service::domain::User
pub async fn list(
    Extension(service): Extension<Service>,
    auth: Auth,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<DriverResponse>>, Error> {
    auth.require_role(user::Role::Manager)?;

    let ListParams {
        vehicle,
        available_only,
    } = params;

    let drivers = service
        .execute(query::drivers::List::by(read::driver::list::Filter {
            vehicle,
            available_only,
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(drivers.into_iter().map(Into::into).collect()))
}

/// Body of the [`register()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    /// Full name of the new [`Driver`].
    pub name: String,

    /// Phone number of the new [`Driver`].
    pub phone: String,

    /// License number of the new [`Driver`].
    pub license_number: String,

    /// Vehicle [`vehicle::Category`] the new [`Driver`] serves.
    pub vehicle: vehicle::Category,
}

/// Parameters of the [`list()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Vehicle [`vehicle::Category`] to select [`Driver`]s serving.
    pub vehicle: Option<vehicle::Category>,

    /// Select only available [`Driver`]s.
    #[serde(default)]
    pub available_only: bool,
}

/// [`Driver`] as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DriverResponse {
    /// ID of the [`Driver`].
    pub id: driver::Id,

    /// Full name of the [`Driver`].
    pub name: user::Name,

    /// Phone number of the [`Driver`].
    pub phone: user::Phone,

    /// License number of the [`Driver`].
    pub license_number: driver::LicenseNumber,

    /// Vehicle [`vehicle::Category`] the [`Driver`] serves.
    pub vehicle: vehicle::Category,

    /// Indicator whether the [`Driver`] is available for new rides.
    pub is_available: bool,

    /// Average rating score of the [`Driver`], absent until the first
    /// rating.
    pub average_rating: Option<Decimal>,

    /// Number of ratings the [`Driver`] has received.
    pub rating_count: u32,

    /// [RFC 3339] moment the [`Driver`] was registered at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<Driver> for DriverResponse {
    fn from(driver: Driver) -> Self {
        let average_rating = driver.average_rating();
        Self {
            id: driver.id,
            name: driver.name,
            phone: driver.phone,
            license_number: driver.license_number,
            vehicle: driver.vehicle,
            is_available: driver.is_available,
            average_rating,
            rating_count: driver.rating_count,
            created_at: driver.created_at.to_rfc3339(),
        }
    }
}

impl AsError for command::register_driver::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
        }
    }
}
