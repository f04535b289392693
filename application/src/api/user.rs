//! [`User`]-related API handlers.

use axum::{extract::Query, http::StatusCode, Extension, Json};
use secrecy::SecretBox;
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{user, User},
    query, read, Query as _,
};

use crate::{api, context::Auth, AccessError, AsError, Error, Service};

/// Registers a new [`User`] account.
///
/// # Errors
///
/// Errors if the email is occupied, or the provided fields are malformed.
pub async fn register(
    Extension(service): Extension<Service>,
    Json(body): Json<RegisterBody>,
) -> Result<(StatusCode, Json<UserResponse>), Error> {
    let RegisterBody {
        name,
        email,
        password,
        role,
        phone,
        department,
        employee_id,
    } = body;

    let user = service
        .execute(command::CreateUser {
            name: api::parse("name", &name)?,
            email: api::parse("email", &email)?,
            password: SecretBox::new(Box::new(api::parse(
                "password", &password,
            )?)),
            role: role.unwrap_or(user::Role::Employee),
            phone: phone.map(|p| api::parse("phone", &p)).transpose()?,
            department: department
                .map(|d| api::parse("department", &d))
                .transpose()?,
            employee_id: employee_id
                .map(|id| api::parse("employeeId", &id))
                .transpose()?,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok((StatusCode::CREATED, Json(user.into())))
}

/// Logs a [`User`] in, issuing a new access token.
///
/// # Errors
///
/// Errors if the credentials are wrong, or the account is deactivated or
/// locked out.
pub async fn login(
    Extension(service): Extension<Service>,
    Json(body): Json<LoginBody>,
) -> Result<Json<LoginResponse>, Error> {
    let LoginBody { email, password } = body;

    let out = service
        .execute(command::CreateUserSession {
            email: api::parse("email", &email)?,
            password: SecretBox::new(Box::new(api::parse(
                "password", &password,
            )?)),
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(LoginResponse {
        token: out.token.to_string(),
        expires_at: out.expires_at.to_rfc3339(),
        user: out.user.into(),
    }))
}

/// Returns the authenticated [`User`]'s own profile.
#[expect(
    clippy::unused_async,
    reason = "`async` is required to match signature"
)]
pub async fn me(auth: Auth) -> Json<UserResponse> {
    Json(auth.user.into())
}

/// Changes the authenticated [`User`]'s password.
///
/// # Errors
///
/// Errors if the current password doesn't match, or the new one is malformed.
pub async fn update_password(
    Extension(service): Extension<Service>,
    auth: Auth,
    Json(body): Json<UpdatePasswordBody>,
) -> Result<StatusCode, Error> {
    let UpdatePasswordBody {
        old_password,
        new_password,
    } = body;

    drop(
        service
            .execute(command::UpdateUserPassword {
                user_id: auth.user.id,
                new_password: SecretBox::new(Box::new(api::parse(
                    "newPassword",
                    &new_password,
                )?)),
                old_password: SecretBox::new(Box::new(api::parse(
                    "oldPassword",
                    &old_password,
                )?)),
            })
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Deactivates the authenticated [`User`]'s own account.
///
/// Deactivation is irreversible.
///
/// # Errors
///
/// Errors if the account doesn't exist anymore.
pub async fn deactivate(
    Extension(service): Extension<Service>,
    auth: Auth,
) -> Result<StatusCode, Error> {
    drop(
        service
            .execute(command::DeactivateUser {
                user_id: auth.user.id,
            })
            .await
            .map_err(AsError::into_error)?,
    );

    Ok(StatusCode::NO_CONTENT)
}

/// Lists [`User`]s matching the provided [`ListParams`].
///
/// Requires at least the [`user::Role::Manager`] role.
///
/// # Errors
///
/// Errors if the authenticated [`User`]'s role is insufficient.
pub async fn list(
    Extension(service): Extension<Service>,
    auth: Auth,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<UserResponse>>, Error> {
    auth.require_role(user::Role::Manager)?;

    let ListParams {
        role,
        department,
        active_only,
    } = params;

    let users = service
        .execute(query::users::List::by(read::user::list::Filter {
            role,
            department: department
                .map(|d| api::parse("department", &d))
                .transpose()?,
            active_only,
        }))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(users.into_iter().map(Into::into).collect()))
}

/// Body of the [`register()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RegisterBody {
    /// Full name of the new [`User`].
    pub name: String,

    /// Email address of the new [`User`], used as the login.
    pub email: String,

    /// Plain-text password of the new [`User`].
    pub password: String,

    /// [`user::Role`] of the new [`User`], [`user::Role::Employee`] if
    /// omitted.
    pub role: Option<user::Role>,

    /// Phone number of the new [`User`].
    pub phone: Option<String>,

    /// Department the new [`User`] belongs to.
    pub department: Option<String>,

    /// Employee ID of the new [`User`] in the corporate directory.
    pub employee_id: Option<String>,
}

/// Body of the [`login()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginBody {
    /// Email address of the [`User`].
    pub email: String,

    /// Plain-text password of the [`User`].
    pub password: String,
}

/// Body of the [`update_password()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdatePasswordBody {
    /// Current password of the [`User`].
    pub old_password: String,

    /// New password to set.
    pub new_password: String,
}

/// Parameters of the [`list()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// [`user::Role`] to select [`User`]s of.
    pub role: Option<user::Role>,

    /// Department to select [`User`]s of.
    pub department: Option<String>,

    /// Select only non-deactivated [`User`]s.
    #[serde(default)]
    pub active_only: bool,
}

/// Response of the [`login()`] request.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginResponse {
    /// Issued access token.
    pub token: String,

    /// [RFC 3339] moment the token expires at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub expires_at: String,

    /// [`User`] the token was issued to.
    pub user: UserResponse,
}

/// [`User`] as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserResponse {
    /// ID of the [`User`].
    pub id: user::Id,

    /// Full name of the [`User`].
    pub name: user::Name,

    /// Email address of the [`User`].
    pub email: user::Email,

    /// [`user::Role`] of the [`User`].
    pub role: user::Role,

    /// Phone number of the [`User`].
    pub phone: Option<user::Phone>,

    /// Department the [`User`] belongs to.
    pub department: Option<user::Department>,

    /// Employee ID of the [`User`] in the corporate directory.
    pub employee_id: Option<user::EmployeeId>,

    /// Indicator whether the [`User`] account is active.
    pub is_active: bool,

    /// [RFC 3339] moment of the last recorded login, if any.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub last_login: Option<String>,

    /// [RFC 3339] moment the [`User`] was created at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<User> for UserResponse {
    fn from(user: User) -> Self {
        let is_active = user.is_active();
        Self {
            id: user.id,
            name: user.name,
            email: user.email,
            role: user.role,
            phone: user.phone,
            department: user.department,
            employee_id: user.employee_id,
            is_active,
            last_login: user.last_login.map(|at| at.to_rfc3339()),
            created_at: user.created_at.to_rfc3339(),
        }
    }
}

impl AsError for command::create_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::EmailOccupied(_) => Some(UserError::EmailOccupied.into()),
            Self::PasswordHashing(_) => None,
        }
    }
}

impl AsError for command::create_user_session::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::AccountDeactivated => {
                Some(AccessError::AccountDeactivated.into())
            }
            Self::AccountLocked => Some(AccessError::AccountLocked.into()),
            Self::Db(e) => e.try_as_error(),
            Self::JsonWebTokenEncodeError(_) => None,
            Self::WrongCredentials => {
                Some(UserError::WrongCredentials.into())
            }
        }
    }
}

impl AsError for command::update_user_password::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::PasswordHashing(_) => None,
            Self::UserNotExists(_) => Some(UserError::UserNotFound.into()),
            Self::WrongPassword => Some(UserError::WrongPassword.into()),
        }
    }
}

impl AsError for command::deactivate_user::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::UserNotExists(_) => Some(UserError::UserNotFound.into()),
        }
    }
}

crate::define_error! {
    enum UserError {
        #[code = "EMAIL_OCCUPIED"]
        #[status = CONFLICT]
        #[message = "Email address is already in use"]
        EmailOccupied,

        #[code = "WRONG_CREDENTIALS"]
        #[status = UNAUTHORIZED]
        #[message = "Wrong email or password"]
        WrongCredentials,

        #[code = "WRONG_PASSWORD"]
        #[status = BAD_REQUEST]
        #[message = "Wrong current password"]
        WrongPassword,

        #[code = "USER_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "User does not exist"]
        UserNotFound,
    }
}
