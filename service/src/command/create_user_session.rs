//! [`Command`] for creating a [`Session`].

use std::time::Duration;

use common::{
    operations::{By, Select, Update},
    DateTime,
};
use derive_more::{Display, Error, From};
use secrecy::{ExposeSecret, SecretBox};
use tracerr::Traced;

#[cfg(doc)]
use crate::domain::user::{session::Token, Email, Password};
use crate::{
    domain::{
        user::{self, session, Session},
        User,
    },
    infra::{database, Database},
    Service,
};

use super::Command;

/// [`Command`] for creating a [`Session`] by [`User`] credentials.
#[derive(Debug)]
pub struct CreateUserSession {
    /// [`Email`] of a [`User`].
    pub email: user::Email,

    /// [`Password`] of a [`User`].
    pub password: SecretBox<user::Password>,
}

impl CreateUserSession {
    /// [`Duration`] of [`Session`] expiration.
    const EXPIRATION_DURATION: Duration =
        Duration::from_secs(24 * 60 * 60);
}

/// Output of [`CreateUserSession`] [`Command`].
#[derive(Clone, Debug)]
pub struct Output {
    /// [`Token`] of the created [`Session`].
    pub token: session::Token,

    /// [`User`] whose [`Session`] has been created.
    pub user: User,

    /// [`DateTime`] when the [`Session`] expires.
    pub expires_at: session::ExpirationDateTime,
}

impl<Db> Command<CreateUserSession> for Service<Db>
where
    Db: for<'l> Database<
            Select<By<Option<User>, &'l user::Email>>,
            Ok = Option<User>,
            Err = Traced<database::Error>,
        > + Database<Update<User>, Ok = (), Err = Traced<database::Error>>,
{
    type Ok = Output;
    type Err = Traced<ExecutionError>;

    async fn execute(
        &self,
        cmd: CreateUserSession,
    ) -> Result<Self::Ok, Self::Err> {
        use CreateUserSession as Cmd;
        use ExecutionError as E;

        let Cmd { email, password } = cmd;
        let now = DateTime::now();

        let mut user = self
            .database()
            .execute(Select(By::new(&email)))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?
            .ok_or_else(|| E::WrongCredentials)
            .map_err(tracerr::wrap!())?;

        if !user.is_active() {
            return Err(tracerr::new!(E::AccountDeactivated));
        }
        if user.is_locked(now) {
            return Err(tracerr::new!(E::AccountLocked));
        }

        if !user.password_hash.verify(password.expose_secret()) {
            // A failed attempt counts towards the lockout even though the
            // caller only ever learns `WrongCredentials`.
            user.register_failed_login(now);
            self.database()
                .execute(Update(user))
                .await
                .map_err(tracerr::map_from_and_wrap!(=> E))?;
            return Err(tracerr::new!(E::WrongCredentials));
        }

        user.register_successful_login(now);
        self.database()
            .execute(Update(user.clone()))
            .await
            .map_err(tracerr::map_from_and_wrap!(=> E))?;

        let expires_at = (now + Cmd::EXPIRATION_DURATION).coerce();
        let session = Session {
            user_id: user.id,
            issued_at: now.coerce(),
            expires_at,
            password_changed_at: user.last_password_change,
        };
        let token = jsonwebtoken::encode::<Session>(
            &jsonwebtoken::Header::default(),
            &session,
            &self.config().jwt_encoding_key,
        )
        .map_err(tracerr::from_and_wrap!(=> E))?;

        self.sessions()
            .set_with_expiry(
                &user.id.to_string(),
                token.clone(),
                Cmd::EXPIRATION_DURATION,
            )
            .await;

        // SAFETY: `jsonwebtoken::encode` always returns a valid
        //         `session::Token`.
        #[expect(unsafe_code, reason = "invariants are preserved")]
        let token = unsafe { session::Token::new_unchecked(token) };

        Ok(Output {
            token,
            user,
            expires_at,
        })
    }
}

/// Error of [`CreateUserSession`] [`Command`] execution.
#[derive(Debug, Display, Error, From)]
pub enum ExecutionError {
    /// [`User`] account is deactivated.
    #[display("`User` account is deactivated")]
    AccountDeactivated,

    /// [`User`] account is locked out.
    #[display("`User` account is temporarily locked")]
    AccountLocked,

    /// [`Database`] error.
    #[display("`Database` operation failed: {_0}")]
    Db(database::Error),

    /// [`jsonwebtoken`] encoding error.
    #[display("Failed to encode a JSON Web Token: {_0}")]
    JsonWebTokenEncodeError(jsonwebtoken::errors::Error),

    /// [`CreateUserSession`] contains wrong credentials.
    #[display("Wrong `User` credentials")]
    WrongCredentials,
}
