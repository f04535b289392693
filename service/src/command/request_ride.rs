//! [`Command`] for requesting a new [`Ride`].

use common::{
    operations::{By, Insert, Select},
    DateTime,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::ride::Location;
use crate::{
    domain::{
        notification, pricing::fare, ride, user, vehicle, Notification,
        Pricing, Ride, User,
    },
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for requesting a new [`Ride`].
#[derive(Clone, Debug)]
pub struct RequestRide {
    /// ID of the [`User`] requesting the [`Ride`].
    pub requested_by: user::Id,

    /// [`Kind`] of the requested [`Ride`].
    ///
    /// [`Kind`]: ride::Kind
    pub kind: ride::Kind,

    /// Vehicle [`Category`] the [`Ride`] is requested for.
    ///
    /// [`Category`]: vehicle::Category
    pub vehicle: vehicle::Category,

    /// Pickup [`Location`] of the [`Ride`].
    pub pickup: ride::Location,

    /// Drop-off [`Location`] of the [`Ride`].
    pub dropoff: ride::Location,

    /// Scheduled pickup moment of the [`Ride`].
    pub scheduled_at: ride::PickupDateTime,

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
}

impl<Db> Command<RequestRide> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Pricing>, read::pricing::ActiveAt>>,
            Ok = Option<Pricing>,
            Err = Traced<database::Error>,
        > + Database<Insert<Ride>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Insert<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Ride;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RequestRide) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RequestRide {
            requested_by,
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
        } = cmd;
        let now = DateTime::now();

        let user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(requested_by)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(requested_by))
            .map_err(tracerr::wrap!())?;
        if !user.is_active() {
            return Err(tracerr::new!(E::UserDeactivated(requested_by)));
        }

        let pricing = self
            .database()
            .execute(Select(By::new(read::pricing::ActiveAt(now))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NoActivePricing)
            .map_err(tracerr::wrap!())?;

        let quote = pricing
            .quote(&fare::Input {
                distance_km,
                duration_minutes,
                vehicle,
                kind,
                is_emergency: kind == ride::Kind::Emergency,
                is_recurring: kind == ride::Kind::Recurring,
                is_airport_transfer: kind == ride::Kind::AirportTransfer,
                is_corporate,
                pickup_at: Some(scheduled_at),
            })
            .map_err(tracerr::from_and_wrap!(=> E))?;

        let ride = Ride {
            id: ride::Id::new(),
            requested_by,
            driver_id: None,
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
            status: ride::Status::Pending,
            fare: Some(quote.total),
            cancellation: None,
            rating: None,
            created_at: now.coerce(),
        };
        self.database()
            .execute(Insert(ride.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut notification = Notification::new(
            requested_by,
            notification::Kind::RideRequested,
            "Ride requested",
            format!(
                "Your ride from {} to {} is awaiting approval",
                ride.pickup, ride.dropoff,
            ),
            now,
        );
        notification.ride_id = Some(ride.id);
        self.database()
            .execute(Insert(notification))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(ride)
    }
}

/// Error of [`RequestRide`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Provided trip facts are malformed.
    #[display("Invalid fare input: {_0}")]
    InvalidInput(fare::InvalidInputError),

    /// No [`Pricing`] is active at the moment.
    #[display("No active `Pricing` to quote the fare with")]
    NoActivePricing,

    /// Requesting [`User`] is deactivated.
    #[display("`User(id: {_0})` is deactivated")]
    #[from(ignore)]
    UserDeactivated(#[error(not(source))] user::Id),

    /// Requesting [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
