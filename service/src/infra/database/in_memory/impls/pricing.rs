//! [`Pricing`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{pricing, Pricing},
    infra::{
        database::{self, in_memory, InMemory},
        Database,
    },
    read,
};

impl Database<Select<By<Option<Pricing>, pricing::Id>>> for InMemory {
    type Ok = Option<Pricing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Pricing>, pricing::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state()?.pricings.get(&id).cloned())
    }
}

impl Database<Select<By<Option<Pricing>, read::pricing::ActiveAt>>>
    for InMemory
{
    type Ok = Option<Pricing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Pricing>, read::pricing::ActiveAt>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::pricing::ActiveAt(at) = by.into_inner();
        // At most one `Pricing` is expected to be active at any instant, but
        // the latest-starting one wins if that expectation is ever violated.
        Ok(self
            .state()?
            .pricings
            .values()
            .filter(|p| p.is_valid_at(at))
            .max_by_key(|p| p.valid_from)
            .cloned())
    }
}

impl Database<Select<By<Vec<Pricing>, ()>>> for InMemory {
    type Ok = Vec<Pricing>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(_): Select<By<Vec<Pricing>, ()>>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut pricings: Vec<_> =
            self.state()?.pricings.values().cloned().collect();
        pricings.sort_by_key(|p| p.created_at);
        Ok(pricings)
    }
}

impl Database<Insert<Pricing>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(pricing): Insert<Pricing>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state()?;
        if state.pricings.contains_key(&pricing.id) {
            return Err(tracerr::new!(database::Error::from(
                in_memory::Error::Conflict("pricing.id"),
            )));
        }
        if state.pricings.values().any(|p| p.name == pricing.name) {
            return Err(tracerr::new!(database::Error::from(
                in_memory::Error::Conflict("pricing.name"),
            )));
        }
        drop(state.pricings.insert(pricing.id, pricing));
        Ok(())
    }
}

impl Database<Update<Pricing>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(pricing): Update<Pricing>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state()?.pricings.insert(pricing.id, pricing));
        Ok(())
    }
}
