//! [`Command`] for completing a [`Ride`].

use common::{
    operations::{By, Insert, Select, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{notification, pricing::fare, ride, Notification, Pricing, Ride},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for completing a [`Ride`].
///
/// Re-quotes the fare with the actual trip facts and adds the waiting
/// charge, replacing the estimate made at request time.
#[derive(Clone, Copy, Debug)]
pub struct CompleteRide {
    /// ID of the [`Ride`] to complete.
    pub ride_id: ride::Id,

    /// Actual trip distance, in kilometers.
    pub actual_distance_km: Decimal,

    /// Actual trip duration, in minutes.
    pub actual_duration_minutes: Decimal,

    /// Minutes the driver was kept waiting.
    pub waited_minutes: u32,
}

impl<Db> Command<CompleteRide> for Service<Db>
where
    Db: Database<
            Select<By<Option<Ride>, ride::Id>>,
            Ok = Option<Ride>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Pricing>, read::pricing::ActiveAt>>,
            Ok = Option<Pricing>,
            Err = Traced<database::Error>,
        > + Database<Update<Ride>, Ok = (), Err = Traced<database::Error>>
        + Database<
            Insert<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Ride;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: CompleteRide) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CompleteRide {
            ride_id,
            actual_distance_km,
            actual_duration_minutes,
            waited_minutes,
        } = cmd;
        let now = DateTime::now();

        let mut ride = self
            .database()
            .execute(Select(By::<Option<Ride>, _>::new(ride_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RideNotExists(ride_id))
            .map_err(tracerr::wrap!())?;

        if !ride.status.can_transition_to(ride::Status::Completed) {
            return Err(tracerr::new!(E::IllegalTransition(ride.status)));
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
                distance_km: actual_distance_km,
                duration_minutes: actual_duration_minutes,
                vehicle: ride.vehicle,
                kind: ride.kind,
                is_emergency: ride.kind == ride::Kind::Emergency,
                is_recurring: ride.kind == ride::Kind::Recurring,
                is_airport_transfer: ride.kind == ride::Kind::AirportTransfer,
                is_corporate: ride.is_corporate,
                pickup_at: Some(ride.scheduled_at),
            })
            .map_err(tracerr::from_and_wrap!(=> E))?;
        let total = Money {
            amount: quote.total.amount
                + pricing.waiting_charge(waited_minutes),
            currency: quote.total.currency,
        }
        .rounded();

        ride.status = ride::Status::Completed;
        ride.distance_km = actual_distance_km;
        ride.duration_minutes = actual_duration_minutes;
        ride.fare = Some(total);
        self.database()
            .execute(Update(ride.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut n = Notification::new(
            ride.requested_by,
            notification::Kind::RideCompleted,
            "Ride completed",
            format!(
                "Your ride from {} to {} is completed (total: {total})",
                ride.pickup, ride.dropoff,
            ),
            now,
        );
        n.ride_id = Some(ride.id);
        self.database()
            .execute(Insert(n))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(ride)
    }
}

/// Error of [`CompleteRide`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Ride`] cannot be completed from its current [`ride::Status`].
    #[display("`Ride` in `{_0}` status cannot be completed")]
    #[from(ignore)]
    IllegalTransition(#[error(not(source))] ride::Status),

    /// Provided trip facts are malformed.
    #[display("Invalid fare input: {_0}")]
    InvalidInput(fare::InvalidInputError),

    /// No [`Pricing`] is active at the moment.
    #[display("No active `Pricing` to quote the fare with")]
    NoActivePricing,

    /// [`Ride`] doesn't exist.
    #[display("`Ride(id: {_0})` does not exist")]
    #[from(ignore)]
    RideNotExists(#[error(not(source))] ride::Id),
}
