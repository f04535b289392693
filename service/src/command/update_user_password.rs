//! [`Command`] for updating an [`user::Password`].

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::Password;
use crate::{
    domain::{user, User},
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for updating an [`user::Password`].
///
/// Stamping `last_password_change` is what invalidates every outstanding
/// session token: there is no revocation list, the comparison baseline
/// simply shifts.
#[derive(Debug)]
pub struct UpdateUserPassword {
    /// ID of the [`User`] which [`Password`] should be updated.
    pub user_id: user::Id,

    /// New [`Password`] of the [`User`].
    pub new_password: SecretBox<user::Password>,

    /// Old [`Password`] of the [`User`].
    pub old_password: SecretBox<user::Password>,
}

impl<Db> Command<UpdateUserPassword> for Service<Db>
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
        cmd: UpdateUserPassword,
    ) -> Result<Self::Ok, Self::Err> {
        use ExecutionError as E;

        let UpdateUserPassword {
            user_id,
            new_password,
            old_password,
        } = cmd;

        let mut user = self
            .database()
            .execute(Select(By::<Option<User>, _>::new(user_id)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or(E::UserNotExists(user_id))
            .map_err(tracerr::wrap!())?;

        if !user.password_hash.verify(old_password.expose_secret()) {
            return Err(tracerr::new!(E::WrongPassword));
        }

        user.password_hash =
            user::PasswordHash::new(new_password.expose_secret())
                .map_err(tracerr::from_and_wrap!(=> E))?;
        user.last_password_change = Some(DateTime::now().coerce());

        self.database()
            .execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        self.sessions().delete(&user.id.to_string()).await;

        Ok(user)
    }
}

/// Error of [`UpdateUserPassword`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// Failed to hash the new [`Password`].
    #[display("Failed to hash the password: {_0}")]
    PasswordHashing(bcrypt::BcryptError),

    /// [`User`] doesn't exist.
    #[display("`User(id: {_0})` does not exist")]
    #[from(ignore)]
    UserNotExists(#[error(not(source))] user::Id),

    /// Wrong old [`Password`] provided.
    #[display("Wrong old password")]
    WrongPassword,
}
