//! [`Notification`]-related [`Database`] implementations.

use common::operations::{By, Insert, Select, Update};
use tracerr::Traced;

use crate::{
    domain::{notification, Notification},
    infra::{
        database::{self, in_memory, InMemory},
        Database,
    },
    read,
};

impl Database<Select<By<Option<Notification>, notification::Id>>>
    for InMemory
{
    type Ok = Option<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Option<Notification>, notification::Id>>,
    ) -> Result<Self::Ok, Self::Err> {
        let id = by.into_inner();
        Ok(self.state()?.notifications.get(&id).cloned())
    }
}

impl Database<Select<By<Vec<Notification>, read::notification::list::Filter>>>
    for InMemory
{
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<
            By<Vec<Notification>, read::notification::list::Filter>,
        >,
    ) -> Result<Self::Ok, Self::Err> {
        let filter = by.into_inner();
        let mut notifications: Vec<_> = self
            .state()?
            .notifications
            .values()
            .filter(|n| {
                filter.user_id.is_none_or(|user_id| n.user_id == user_id)
                    && (!filter.unread_only || n.read_at.is_none())
            })
            .cloned()
            .collect();
        // Newest first.
        notifications.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        Ok(notifications)
    }
}

impl Database<Select<By<Vec<Notification>, read::notification::Due>>>
    for InMemory
{
    type Ok = Vec<Notification>;
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Select(by): Select<By<Vec<Notification>, read::notification::Due>>,
    ) -> Result<Self::Ok, Self::Err> {
        let read::notification::Due(at) = by.into_inner();
        let mut due: Vec<_> = self
            .state()?
            .notifications
            .values()
            .filter(|n| n.is_due(at))
            .cloned()
            .collect();
        due.sort_by_key(|n| n.created_at);
        Ok(due)
    }
}

impl Database<Insert<Notification>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Insert(notification): Insert<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        let mut state = self.state()?;
        if state.notifications.contains_key(&notification.id) {
            return Err(tracerr::new!(database::Error::from(
                in_memory::Error::Conflict("notification.id"),
            )));
        }
        drop(state.notifications.insert(notification.id, notification));
        Ok(())
    }
}

impl Database<Update<Notification>> for InMemory {
    type Ok = ();
    type Err = Traced<database::Error>;

    async fn execute(
        &self,
        Update(notification): Update<Notification>,
    ) -> Result<Self::Ok, Self::Err> {
        drop(
            self.state()?
                .notifications
                .insert(notification.id, notification),
        );
        Ok(())
    }
}
