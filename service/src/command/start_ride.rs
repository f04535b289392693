//! [`Command`] for starting an approved [`Ride`].

use common::operations::{By, Select, Update};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{ride, Ride},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for starting an approved [`Ride`].
#[derive(Clone, Copy, Debug, From)]
pub struct StartRide {
    /// ID of the [`Ride`] to start.
    pub ride_id: ride::Id,
}

impl<Db> Command<StartRide> for Service<Db>
where
    Db: Database<
            Select<By<Option<Ride>, ride::Id>>,
            Ok = Option<Ride>,
            Err = Traced<database::Error>,
        > + Database<Update<Ride>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Ride;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: StartRide) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let StartRide { ride_id } = cmd;

        let mut ride = self
            .database()
            .execute(Select(By::<Option<Ride>, _>::new(ride_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RideNotExists(ride_id))
            .map_err(tracerr::wrap!())?;

        if !ride.status.can_transition_to(ride::Status::InProgress) {
            return Err(tracerr::new!(E::IllegalTransition(ride.status)));
        }

        ride.status = ride::Status::InProgress;
        self.database()
            .execute(Update(ride.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(ride)
    }
}

/// Error of [`StartRide`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Ride`] cannot be started from its current [`ride::Status`].
    #[display("`Ride` in `{_0}` status cannot be started")]
    #[from(ignore)]
    IllegalTransition(#[error(not(source))] ride::Status),

    /// [`Ride`] doesn't exist.
    #[display("`Ride(id: {_0})` does not exist")]
    #[from(ignore)]
    RideNotExists(#[error(not(source))] ride::Id),
}
