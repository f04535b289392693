//! [`Ride`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{ride, Ride},
    infra::{
        database::{self, in_memory, InMemory},
        Database,
    },
    read,
};

impl Database<Select<By<Option<Ride>, ride::Id>>> for InMemory {
    type Ok = Option<Ride>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Ride>, ride::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state()?.rides.get(&id).cloned())
    }
}

impl Database<Select<By<Vec<Ride>, read::ride::list::Filter>>> for InMemory {
    type Ok = Vec<Ride>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Ride>, read::ride::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut rides: Vec<_> = self
            .state()?
            .rides
            .values()
            .filter(|r| {
                filter
                    .requested_by
                    .is_none_or(|user_id| r.requested_by == user_id)
                    && filter.status.is_none_or(|status| r.status == status)
            })
            .cloned()
            .collect();
        // Newest requests first.
        rides.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(rides)
    }
}

impl Database<Insert<Ride>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(ride): Insert<Ride>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state()?;
        if state.rides.contains_key(&ride.id) {
            return Err(tracerr::new!(database::Error::from(
                in_memory::Error::Conflict("ride.id"),
            )));
        }
        drop(state.rides.insert(ride.id, ride));
        Ok(())
    }
}

impl Database<Update<Ride>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(ride): Update<Ride>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state()?.rides.insert(ride.id, ride));
        Ok(())
    }
}
