//! [`Command`] for approving a [`Ride`].

use common::{
    operations::{By, Insert, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{driver, notification, ride, Driver, Notification, Ride},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for approving a [`Ride`].
#[derive(Clone, Copy, Debug)]
pub struct ApproveRide {
    /// ID of the [`Ride`] to approve.
    pub ride_id: ride::Id,

    /// ID of the [`Driver`] to assign, if one is picked already.
    pub driver_id: Option<driver::Id>,
}

impl<Db> Command<ApproveRide> for Service<Db>
where
    Db: Database<
            Select<By<Option<Ride>, ride::Id>>,
            Ok = Option<Ride>,
            Err = Traced<database::Error>,
        > + Database<
            Select<By<Option<Driver>, driver::Id>>,
            Ok = Option<Driver>,
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

    async fn execute(&self, cmd: ApproveRide) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let ApproveRide { ride_id, driver_id } = cmd;
        let now = DateTime::now();

        let mut ride = self
            .database()
            .execute(Select(By::<Option<Ride>, _>::new(ride_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RideNotExists(ride_id))
            .map_err(tracerr::wrap!())?;

        if !ride.status.can_transition_to(ride::Status::Approved) {
            return Err(tracerr::new!(E::IllegalTransition(ride.status)));
        }

        if let Some(driver_id) = driver_id {
            let driver = self
                .database()
                .execute(Select(By::<Option<Driver>, _>::new(driver_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?
                .ok_or(E::DriverNotExists(driver_id))
                .map_err(tracerr::wrap!())?;
            if !driver.is_available {
                return Err(tracerr::new!(E::DriverUnavailable(driver_id)));
            }
            ride.driver_id = Some(driver_id);
        }

        ride.status = ride::Status::Approved;
        self.database()
            .execute(Update(ride.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let mut notification = Notification::new(
            ride.requested_by,
            notification::Kind::RideApproved,
            "Ride approved",
            format!(
                "Your ride from {} to {} has been approved",
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

/// Error of [`ApproveRide`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Driver`] doesn't exist.
    #[display("`Driver(id: {_0})` does not exist")]
    #[from(ignore)]
    DriverNotExists(#[error(not(source))] driver::Id),

    /// [`Driver`] is not available.
    #[display("`Driver(id: {_0})` is not available")]
    #[from(ignore)]
    DriverUnavailable(#[error(not(source))] driver::Id),

    /// [`Ride`] cannot be approved from its current [`ride::Status`].
    #[display("`Ride` in `{_0}` status cannot be approved")]
    #[from(ignore)]
    IllegalTransition(#[error(not(source))] ride::Status),

    /// [`Ride`] doesn't exist.
    #[display("`Ride(id: {_0})` does not exist")]
    #[from(ignore)]
    RideNotExists(#[error(not(source))] ride::Id),
}
