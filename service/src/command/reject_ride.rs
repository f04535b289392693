//! [`Command`] for rejecting a [`Ride`].

use common::{
    operations::{By, Insert, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{notification, ride, Notification, Ride},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for rejecting a [`Ride`].
#[derive(Clone, Debug)]
pub struct RejectRide {
    /// ID of the [`Ride`] to reject.
    pub ride_id: ride::Id,

    /// Stated reason of the rejection.
    pub reason: Option<String>,
}

impl<Db> Command<RejectRide> for Service<Db>
where
    Db: Database<
            Select<By<Option<Ride>, ride::Id>>,
            Ok = Option<Ride>,
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

    async fn execute(&self, cmd: RejectRide) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RejectRide { ride_id, reason } = cmd;
        let now = DateTime::now();

        let mut ride = self
            .database()
            .execute(Select(By::<Option<Ride>, _>::new(ride_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RideNotExists(ride_id))
            .map_err(tracerr::wrap!())?;

        if !ride.status.can_transition_to(ride::Status::Rejected) {
            return Err(tracerr::new!(E::IllegalTransition(ride.status)));
        }

        ride.status = ride::Status::Rejected;
        self.database()
            .execute(Update(ride.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let message = match reason {
            Some(reason) => format!(
                "Your ride from {} to {} has been rejected: {reason}",
                ride.pickup, ride.dropoff,
            ),
            None => format!(
                "Your ride from {} to {} has been rejected",
                ride.pickup, ride.dropoff,
            ),
        };
        let mut notification = Notification::new(
            ride.requested_by,
            notification::Kind::RideRejected,
            "Ride rejected",
            message,
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

/// Error of [`RejectRide`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Ride`] cannot be rejected from its current [`ride::Status`].
    #[display("`Ride` in `{_0}` status cannot be rejected")]
    #[from(ignore)]
    IllegalTransition(#[error(not(source))] ride::Status),

    /// [`Ride`] doesn't exist.
    #[display("`Ride(id: {_0})` does not exist")]
    #[from(ignore)]
    RideNotExists(#[error(not(source))] ride::Id),
}
