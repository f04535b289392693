//! Authentication context of API handlers.

use axum::{
    async_trait,
    extract::FromRequestParts,
    response::{IntoResponse as _, Response},
    RequestPartsExt as _,
};
use axum_extra::{
    headers::{authorization::Bearer, Authorization},
    TypedHeader,
};
use service::{
    command::{self, Command as _},
    domain::{
        user::{self, session},
        User,
    },
};

use crate::{define_error, AsError, Error, Service};

/// Authenticated [`User`] extracted from the `Authorization` header of an
/// HTTP request.
#[derive(Clone, Debug)]
pub struct Auth {
    /// [`User`] the presented access token belongs to.
    pub user: User,
}

impl Auth {
    /// Checks that the authenticated [`User`] carries at least the provided
    /// [`user::Role`].
    ///
    /// [`user::Role`]s are totally ordered, so a higher one always implies
    /// the permissions of a lower one.
    ///
    /// # Errors
    ///
    /// Errors if the [`user::Role`] is insufficient.
    pub fn require_role(&self, role: user::Role) -> Result<(), Error> {
        if self.user.role.u8() >= role.u8() {
            Ok(())
        } else {
            Err(AccessError::InsufficientPermissions.into())
        }
    }
}

#[async_trait]
impl<S> FromRequestParts<S> for Auth
where
    S: Send + Sync,
{
    type Rejection = Response;

    async fn from_request_parts(
        parts: &mut http::request::Parts,
        _: &S,
    ) -> Result<Self, Self::Rejection> {
        let service =
            parts.extensions.get::<Service>().cloned().ok_or_else(|| {
                Error::internal(&"missing `Service` extension").into_response()
            })?;

        let bearer = match parts
            .extract::<TypedHeader<Authorization<Bearer>>>()
            .await
        {
            Ok(TypedHeader(Authorization(bearer))) => bearer,
            Err(e) => {
                return Err(if e.is_missing() {
                    Error::from(AccessError::AuthorizationRequired)
                        .into_response()
                } else {
                    e.into_error().into_response()
                });
            }
        };

        #[expect(unsafe_code, reason = "specified in correct header")]
        let token = unsafe {
            session::Token::new_unchecked(bearer.token().to_owned())
        };

        service
            .execute(command::AuthorizeUserSession { token })
            .await
            .map(|out| Self { user: out.user })
            .map_err(|e| e.into_error().into_response())
    }
}

impl AsError for command::authorize_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenDecodeError(e) => Some(
                if matches!(
                    e.kind(),
                    &jsonwebtoken::errors::ErrorKind::ExpiredSignature,
                ) {
                    AccessError::TokenExpired.into()
                } else {
                    AccessError::InvalidToken.into()
                },
            ),
            Self::Rejected(rejection) => Some(match rejection {
                session::Rejection::AccountDeactivated => {
                    AccessError::AccountDeactivated.into()
                }
                session::Rejection::AccountLocked => {
                    AccessError::AccountLocked.into()
                }
                session::Rejection::PasswordChanged => {
                    AccessError::PasswordChanged.into()
                }
            }),
            Self::UserNotExists(_) => Some(AccessError::UserNotFound.into()),
        }
    }
}

define_error! {
    enum AccessError {
        #[code = "AUTHORIZATION_REQUIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Authorization required"]
        AuthorizationRequired,

        #[code = "INVALID_TOKEN"]
        #[status = UNAUTHORIZED]
        #[message = "Invalid access token"]
        InvalidToken,

        #[code = "TOKEN_EXPIRED"]
        #[status = UNAUTHORIZED]
        #[message = "Access token has expired"]
        TokenExpired,

        #[code = "ACCOUNT_DEACTIVATED"]
        #[status = FORBIDDEN]
        #[message = "Account is deactivated"]
        AccountDeactivated,

        #[code = "ACCOUNT_LOCKED"]
        #[status = LOCKED]
        #[message = "Account is temporarily locked"]
        AccountLocked,

        #[code = "PASSWORD_CHANGED"]
        #[status = UNAUTHORIZED]
        #[message = "Password has been changed, please log in again"]
        PasswordChanged,

        #[code = "USER_NOT_FOUND"]
        #[status = UNAUTHORIZED]
        #[message = "User no longer exists"]
        UserNotFound,

        #[code = "INSUFFICIENT_PERMISSIONS"]
        #[status = FORBIDDEN]
        #[message = "Insufficient permissions for this action"]
        InsufficientPermissions,
    }
}
