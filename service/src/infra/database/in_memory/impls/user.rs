//! [`User`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{
        database::{self, in_memory, InMemory},
        Database,
    },
    read,
};

impl Database<Select<By<Option<User>, user::Id>>> for InMemory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, user::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state()?.users.get(&id).cloned())
    }
}

impl<'l> Database<Select<By<Option<User>, &'l user::Email>>> for InMemory {
    type Ok = Option<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<User>, &'l user::Email>>,
    ) -> Result<Self::Ok, Self::Err> {
        let email = by.into_inner();
        Ok(self
            .state()?
            .users
            .values()
            .find(|u| &u.email == email)
            .cloned())
    }
}

impl Database<Select<By<Vec<User>, read::user::list::Filter>>> for InMemory {
    type Ok = Vec<User>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<User>, read::user::list::Filter>>,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut users: Vec<_> = self
            .state()?
            .users
            .values()
            .filter(|u| {
                filter.role.is_none_or(|role| u.role == role)
                    && filter
                        .department
                        .as_ref()
                        .is_none_or(|dep| u.department.as_ref() == Some(dep))
                    && (!filter.active_only || u.is_active())
            })
            .cloned()
            .collect();
        users.sort_by_key(|u| u.created_at);
        Ok(users)
    }
}

impl Database<Insert<User>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(user): Insert<User>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state()?;
        if state.users.contains_key(&user.id) {
            return Err(tracerr::new!(database::Error::from(
                in_memory::Error::Conflict("user.id"),
            )));
        }
        if state.users.values().any(|u| u.email == user.email) {
            return Err(tracerr::new!(database::Error::from(
                in_memory::Error::Conflict("user.email"),
            )));
        }
        drop(state.users.insert(user.id, user));
        Ok(())
    }
}

impl Database<Update<User>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(user): Update<User>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(self.state()?.users.insert(user.id, user));
        Ok(())
    }
}
