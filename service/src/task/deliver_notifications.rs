//! [`DeliverNotifications`] [`Task`].

use std::{convert::Infallible, error::Error, time};

use common::{
    operations::{By, Perform, Select, Start, Update},
    DateTime,
};
use tokio::time::interval;
use tracerr::Traced;
use tracing as log;

use crate::{
    domain::Notification,
    infra::{database, Database},
    read, Service,
};

use super::Task;

/// Configuration for [`DeliverNotifications`] [`Task`].
#[derive(Clone, Copy, Debug)]
pub struct Config {
    /// Interval between delivery sweeps.
    pub interval: time::Duration,
}

/// [`Task`] delivering due [`Notification`]s over the [`Notifier`].
///
/// Failed deliveries are rescheduled with an exponential backoff until
/// [`Notification::MAX_RETRIES`] is exhausted.
///
/// [`Notifier`]: crate::infra::notifier::Notifier
#[derive(Clone, Debug)]
pub struct DeliverNotifications<S> {
    /// [`Config`] of this [`Task`].
    config: Config,

    /// [`Service`] instance.
    service: S,
}

impl<Db> Task<Start<By<DeliverNotifications<Self>, Config>>> for Service<Db>
where
    DeliverNotifications<Service<Db>>:
        Task<Perform<()>, Ok = (), Err: Error> + Send + Sync + 'static,
    Self: Clone,
{
    type Ok = ();
    type Err = Infallible;

    async fn execute(
        &self,
        Start(by): Start<By<DeliverNotifications<Self>, Config>>,
    ) -> Result<Self::Ok, Self::Err> {
        let config = by.into_inner();
        let task = DeliverNotifications {
            config,
            service: self.clone(),
        };

        let mut interval = interval(task.config.interval);
        loop {
            let _ = interval.tick().await;
            _ = task.execute(Perform(())).await.map_err(|e| {
                log::error!("`task::DeliverNotifications` failed: {e}");
            });
        }
    }
}

impl<Db> Task<Perform<()>> for DeliverNotifications<Service<Db>>
where
    Db: Database<
            Select<By<Vec<Notification>, read::notification::Due>>,
            Ok = Vec<Notification>,
            Err = Traced<database::Error>,
        > + Database<
            Update<Notification>,
            Ok = (),
            Err = Traced<database::Error>,
        >,
{
    type Ok = ();
    type Err = ExecutionError;

    async fn execute(&self, _: Perform<()>) -> Result<Self::Ok, Self::Err> {
        let now = DateTime::now();
        let due = self
            .service
            .database()
            .execute(Select(By::new(read::notification::Due(now))))
            .await
            .map_err(tracerr::map_from_and_wrap!())?;

        for mut notification in due {
            match self.service.notifier().deliver(&notification).await {
                Ok(()) => notification.record_sent(),
                Err(e) => {
                    log::warn!(
                        id = %notification.id,
                        attempt = notification.retry_count + 1,
                        "notification delivery failed: {e}",
                    );
                    notification.record_failure(now);
                }
            }
            self.service
                .database()
                .execute(Update(notification))
                .await
                .map_err(tracerr::map_from_and_wrap!())?;
        }
        Ok(())
    }
}

/// Error of [`DeliverNotifications`] execution.
pub type ExecutionError = Traced<database::Error>;
