//! [`Command`] for registering a new [`Driver`].

use common::{operations::Insert, DateTime};
use derive_more::{Display, Error, From};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::driver::LicenseNumber;
use crate::{
    domain::{driver, user, vehicle, Driver},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for registering a new [`Driver`].
#[derive(Clone, Debug)]
pub struct RegisterDriver {
    /// Full name of a new [`Driver`].
    pub name: user::Name,

    /// Phone number of a new [`Driver`].
    pub phone: user::Phone,

    /// [`LicenseNumber`] of a new [`Driver`].
    pub license_number: driver::LicenseNumber,

    /// Vehicle [`Category`] a new [`Driver`] serves.
    ///
    /// [`Category`]: vehicle::Category
    pub vehicle: vehicle::Category,
}

impl<Db> Command<RegisterDriver> for Service<Db>
where
    Db: Database<Insert<Driver>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Driver;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: RegisterDriver,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let RegisterDriver {
            name,
            phone,
            license_number,
            vehicle,
        } = cmd;

        let driver = Driver {
            id: driver::Id::new(),
            name,
            phone,
            license_number,
            vehicle,
            is_available: true,
            rating_total: 0,
            rating_count: 0,
            created_at: DateTime::now().coerce(),
        };

        self.database()
            .execute(Insert(driver.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(driver)
    }
}

/// Error of [`RegisterDriver`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),
}
