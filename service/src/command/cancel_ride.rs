//! [`Command`] for cancelling a [`Ride`].

use std::time::Duration;

use common::{
    operations::{By, Insert, Select, Update},
    DateTime, Money,
};
use derive_more::{Display, Error, From};
use rust_decimal::Decimal;
use tracerr::Traced;

use crate::{
    domain::{notification, ride, Notification, Pricing, Ride},
    infra::{database, Database},
    read,
    Service,
};

use super::Command;

/// [`Command`] for cancelling a [`Ride`].
#[derive(Clone, Debug)]
pub struct CancelRide {
    /// ID of the [`Ride`] to cancel.
    pub ride_id: ride::Id,

    /// Party cancelling the [`Ride`].
    pub by: ride::CancelledBy,

    /// Stated reason of the cancellation.
    pub reason: Option<String>,
}

impl<Db> Command<CancelRide> for Service<Db>
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

    async fn execute(&self, cmd: CancelRide) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let CancelRide {
            ride_id,
            by,
            reason,
        } = cmd;
        let now = DateTime::now();

        let mut ride = self
            .database()
            .execute(Select(By::<Option<Ride>, _>::new(ride_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RideNotExists(ride_id))
            .map_err(tracerr::wrap!())?;

        if !ride.status.can_transition_to(ride::Status::Cancelled) {
            return Err(tracerr::new!(E::IllegalTransition(ride.status)));
        }

        // Cancellation past the scheduled pickup falls into the tightest
        // bracket of the fee schedule.
        let before_pickup = if ride.scheduled_at > now.coerce() {
            ride.scheduled_at - now.coerce()
        } else {
            Duration::ZERO
        };
        let fee = self
            .database()
            .execute(Select(By::new(read::pricing::ActiveAt(now))))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .map_or_else(
                || Money {
                    amount: Decimal::ZERO,
                    currency: common::money::Currency::Usd,
                },
                |pricing| Money {
                    amount: pricing.cancellation_fee(before_pickup),
                    currency: pricing.currency,
                },
            );

        ride.status = ride::Status::Cancelled;
        ride.cancellation = Some(ride::Cancellation {
            by,
            reason,
            fee,
            at: now.coerce(),
        });
        self.database()
            .execute(Update(ride.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut n = Notification::new(
            ride.requested_by,
            notification::Kind::RideCancelled,
            "Ride cancelled",
            format!(
                "Your ride from {} to {} has been cancelled (fee: {fee})",
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

/// Error of [`CancelRide`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Ride`] cannot be cancelled from its current [`ride::Status`].
    #[display("`Ride` in `{_0}` status cannot be cancelled")]
    #[from(ignore)]
    IllegalTransition(#[error(not(source))] ride::Status),

    /// [`Ride`] doesn't exist.
    #[display("`Ride(id: {_0})` does not exist")]
    #[from(ignore)]
    RideNotExists(#[error(not(source))] ride::Id),
}
