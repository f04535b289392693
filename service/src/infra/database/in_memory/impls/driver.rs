//! [`Driver`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{driver, Driver},
    infra::{
        database::{self, in_memory, InMemory},
        Database,
    },
    read,
};

impl Database<Select<By<Option<Driver>, driver::Id>>> for InMemory {
    type Ok = Option<Driver>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Driver>, driver::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state()?.drivers.get(&id).cloned())
    }
}

impl Database<Select<By<Vec<Driver>, read::driver::list::Filter>>>
    for InMemory
{
    type Ok = Vec<Driver>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Driver>, read::driver::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut drivers: Vec<_> = self
            .state()?
            .drivers
            .values()
            .filter(|d| {
                filter.vehicle.is_none_or(|vehicle| d.vehicle == vehicle)
                    && (!filter.available_only || d.is_available)
            })
            .cloned()
            .collect();
        drivers.sort_by_key(|d| d.created_at);
        Ok(drivers)
    }
}

impl Database<Insert<Driver>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(driver): Insert<Driver>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state()?;
        if state.drivers.contains_key(&driver.id) {
            return Err(tracerr::new!(database::Error::from(
                in_memory::Error::Conflict("driver.id"),
            )));
        }
        if state
            .drivers
            .values()
            .any(|d| d.license_number == driver.license_number)
        {
            return Err(tracerr::new!(database::Error::from(
                in_memory::Error::Conflict("driver.license_number"),
            )));
        }
        drop(state.drivers.insert(driver.id, driver));
        Ok(())
    }
}

impl Database<Update<Driver>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(driver): Update<Driver>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state()?.drivers.insert(driver.id, driver));
        Ok(())
    }
}
