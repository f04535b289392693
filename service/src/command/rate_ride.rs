//! [`Command`] for rating a completed [`Ride`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{driver, ride, user, Driver, Ride},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for rating a completed [`Ride`].
#[derive(Clone, Debug)]
pub struct RateRide {
    /// ID of the [`Ride`] to rate.
    pub ride_id: ride::Id,

    /// ID of the [`User`] leaving the rating.
    ///
    /// [`User`]: crate::domain::User
    pub rated_by: user::Id,

    /// [`Score`] of the rating.
    ///
    /// [`Score`]: ride::Score
    pub score: ride::Score,

    /// Free-form feedback accompanying the rating.
    pub feedback: Option<String>,
}

impl<Db> Command<RateRide> for Service<Db>
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
        + Database<Update<Driver>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Ride;
    type Err = Traced<ExecutionError>;

    async fn execute(&self, cmd: RateRide) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RateRide {
            ride_id,
            rated_by,
            score,
            feedback,
        } = cmd;
        let now = DateTime::now();

        let mut ride = self
            .database()
            .execute(Select(By::<Option<Ride>, _>::new(ride_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::RideNotExists(ride_id))
            .map_err(tracerr::wrap!())?;

        if ride.requested_by != rated_by {
            return Err(tracerr::new!(E::NotRequester(rated_by)));
        }
        if ride.status != ride::Status::Completed {
            return Err(tracerr::new!(E::NotCompleted(ride.status)));
        }
        if ride.rating.is_some() {
            return Err(tracerr::new!(E::AlreadyRated));
        }

        ride.rating = Some(ride::Rating {
            score,
            feedback,
            at: now.coerce(),
        });
        self.database()
            .execute(Update(ride.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        // Feed the driver's running tally, if one served the ride.
        if let Some(driver_id) = ride.driver_id {
            let driver = self
                .database()
                .execute(Select(By::<Option<Driver>, _>::new(driver_id)))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            if let Some(mut driver) = driver {
                driver.record_rating(score);
                self.database()
                    .execute(Update(driver))
                    .await
                    .map_err(tracerr::map_from_and_wrap!(=> E))?;
            }
        }

        Ok(ride)
    }
}

/// Error of [`RateRide`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Ride`] is rated already.
    #[display("`Ride` is rated already")]
    AlreadyRated,

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`Ride`] is not completed yet.
    #[display("`Ride` in `{_0}` status cannot be rated")]
    #[from(ignore)]
    NotCompleted(#[error(not(source))] ride::Status),

    /// Rating [`User`] is not the requester of the [`Ride`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`User(id: {_0})` did not request this `Ride`")]
    #[from(ignore)]
    NotRequester(#[error(not(source))] user::Id),

    /// [`Ride`] doesn't exist.
    #[display("`Ride(id: {_0})` does not exist")]
    #[from(ignore)]
    RideNotExists(#[error(not(source))] ride::Id),
}
