//! [`Notifier`] capability definitions.

use std::fmt;

use async_trait::async_trait;
use derive_more::{Display, Error};
use tracing as log;

use crate::domain::Notification;

/// Delivery channel of [`Notification`]s.
///
/// Real transports (email, SMS) live behind this seam.
#[async_trait]
pub trait Notifier: fmt::Debug + Send + Sync {
    /// Delivers the provided [`Notification`] to its addressee.
    ///
    /// # Errors
    ///
    /// If the delivery fails. Failed deliveries are retried with a backoff
    /// by the caller.
    async fn deliver(
        &self,
        notification: &Notification,
    ) -> Result<(), DeliveryError>;
}

/// Error of a [`Notification`] delivery.
///
/// [`Notification`]: crate::domain::Notification
#[derive(Debug, Display, Error)]
#[display("failed to deliver notification: {reason}")]
pub struct DeliveryError {
    /// Reason of the failure.
    pub reason: String,
}

/// [`Notifier`] writing deliveries to the log.
#[derive(Clone, Copy, Debug, Default)]
pub struct Log;

#[async_trait]
impl Notifier for Log {
    async fn deliver(
        &self,
        notification: &Notification,
    ) -> Result<(), DeliveryError> {
        log::info!(
            id = %notification.id,
            user_id = %notification.user_id,
            kind = %notification.kind,
            title = notification.title,
            "notification delivered",
        );
        Ok(())
    }
}
