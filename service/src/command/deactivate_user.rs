//! [`Command`] for deactivating a [`User`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use tracerr::Traced;

use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for deactivating a [`User`].
///
/// Irreversible: there is no reactivation path.
#[derive(Clone, Copy, Debug, From)]
pub struct DeactivateUser {
    /// ID of the [`User`] to deactivate.
    pub user_id: user::Id,
}

impl<Db> Command<DeactivateUser> for Service<Db>
where
    Db: Database<
            Select<By<Option<User>, user::Id>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = User;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: DeactivateUser,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let DeactivateUser { user_id } = cmd;

        let mut user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if user.is_active() {
            user.deactivated_at = Some(DateTime::now().coerce());
            self.database()
                .execute(Update(user.clone()))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
        }

        self.sessions().delete(&user.id.to_string()).await;

        Ok(user)
    }
}

/// Error of [`DeactivateUser`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),
}
