//! [`Notification`]-related API handlers.

use axum::{
    extract::{Path, Query},
    Extension, Json,
};
use serde::{Deserialize, Serialize};
use service::{
    command::{self, Command as _},
    domain::{notification, ride, Notification},
    query, read, Query as _,
};

use crate::{context::Auth, AccessError, AsError, Error, Service};

/// Lists the authenticated [`User`]'s own [`Notification`]s.
///
/// [`User`]: service::domain::User
///
/// # Errors
///
/// Errors if the underlying storage fails.
pub async fn list(
    Extension(service): Extension<Service>,
    auth: Auth,
    Query(params): Query<ListParams>,
) -> Result<Json<Vec<NotificationResponse>>, Error> {
    let notifications = service
        .execute(query::notifications::List::by(
            read::notification::list::Filter {
                user_id: Some(auth.user.id),
                unread_only: params.unread_only,
            },
        ))
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(notifications.into_iter().map(Into::into).collect()))
}

/// Marks a [`Notification`] of the authenticated [`User`] as read.
///
/// [`User`]: service::domain::User
///
/// # Errors
///
/// Errors if the [`Notification`] doesn't exist, or is addressed to someone
/// else.
pub async fn mark_read(
    Extension(service): Extension<Service>,
    auth: Auth,
    Path(id): Path<notification::Id>,
) -> Result<Json<NotificationResponse>, Error> {
    let notification = service
        .execute(command::MarkNotificationRead {
            notification_id: id,
            user_id: auth.user.id,
        })
        .await
        .map_err(AsError::into_error)?;

    Ok(Json(notification.into()))
}

/// Parameters of the [`list()`] request.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListParams {
    /// Select only unread [`Notification`]s.
    #[serde(default)]
    pub unread_only: bool,
}

/// [`Notification`] as represented in API responses.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationResponse {
    /// ID of the [`Notification`].
    pub id: notification::Id,

    /// ID of the ride the [`Notification`] is about, if any.
    pub ride_id: Option<ride::Id>,

    /// [`notification::Kind`] of the [`Notification`].
    pub kind: notification::Kind,

    /// Short title of the [`Notification`].
    pub title: String,

    /// Message body of the [`Notification`].
    pub message: String,

    /// Channels the [`Notification`] is delivered over.
    pub channels: notification::Channels,

    /// Current delivery [`notification::Status`] of the [`Notification`].
    pub status: notification::Status,

    /// [RFC 3339] moment the [`Notification`] was read at, if it was.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub read_at: Option<String>,

    /// [RFC 3339] moment the [`Notification`] was created at.
    ///
    /// [RFC 3339]: https://tools.ietf.org/html/rfc3339
    pub created_at: String,
}

impl From<Notification> for NotificationResponse {
    fn from(notification: Notification) -> Self {
        Self {
            id: notification.id,
            ride_id: notification.ride_id,
            kind: notification.kind,
            title: notification.title,
            message: notification.message,
            channels: notification.channels,
            status: notification.status,
            read_at: notification.read_at.map(|at| at.to_rfc3339()),
            created_at: notification.created_at.to_rfc3339(),
        }
    }
}

impl AsError for command::mark_notification_read::ExecutionError {
    fn try_as_error(&self) -> Option<Error> {
        match self {
            Self::Db(e) => e.try_as_error(),
            Self::NotAddressee(_) => {
                Some(AccessError::InsufficientPermissions.into())
            }
            Self::NotificationNotExists(_) => {
                Some(NotificationError::NotificationNotFound.into())
            }
        }
    }
}

crate::define_error! {
    enum NotificationError {
        #[code = "NOTIFICATION_NOT_FOUND"]
        #[status = NOT_FOUND]
        #[message = "Notification does not exist"]
        NotificationNotFound,
    }
}
