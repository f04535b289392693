//! [`Command`] for marking a [`Notification`] as read.

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{notification, user, Notification},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for marking a [`Notification`] as read by its addressee.
#[derive(Clone, Copy, Debug)]
pub struct MarkNotificationRead {
    /// ID of the [`Notification`] to mark as read.
    pub notification_id: notification::Id,

    /// ID of the [`User`] reading the [`Notification`].
    ///
    /// [`User`]: crate::domain::User
    pub user_id: user::Id,
}

impl<Db> Command<MarkNotificationRead> for Service<Db>
where
    Db: Database<
            Select<By<Option<Notification>, notification::Id>>,
            Ok = Option<Notification>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = Notification;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: MarkNotificationRead,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let MarkNotificationRead {
            notification_id,
            user_id,
        } = cmd;

        let mut notification = self
            .database()
            .execute(Select(By::<Option<Notification>, _>::new(
                notification_id,
            )))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::NotificationNotExists(notification_id))
            .map_err(tracerr::wrap!())?;

        if notification.user_id != user_id {
            return Err(tracerr::new!(E::NotAddressee(user_id)));
        }

        notification.mark_read(DateTime::now());
        self.database()
            .execute(Update(notification.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        Ok(notification)
    }
}

/// Error of [`MarkNotificationRead`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] is not the addressee of the [`Notification`].
    ///
    /// [`User`]: crate::domain::User
    #[display("`Notification` is not addressed to `User(id: {_0})`")]
    #[from(ignore)]
    NotAddressee(#[error(not(source))] user::Id),

    /// [`Notification`] doesn't exist.
    #[display("`Notification(id: {_0})` does not exist")]
    #[from(ignore)]
    NotificationNotExists(#[error(not(source))] notification::Id),
}
