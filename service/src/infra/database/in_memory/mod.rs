//! In-memory [`Database`] implementation.

mod impls;

use std::{
    collections::HashMap,
    sync::{Arc, Mutex, MutexGuard},
};

use derive_more::{Display, Error as StdError};
use tracerr::Traced;

use crate::{
    domain::{
        driver, notification, pricing, ride, user, Driver, Notification,
        Pricing, Ride, User,
    },
    infra::database,
};
#[cfg(doc)]
use crate::infra::Database;

/// In-memory [`Database`] client.
///
/// Keeps all the records behind a single [`Mutex`], which is never held
/// across an `await` point. Cheap to [`Clone`]: clones share the storage.
#[derive(Clone, Debug, Default)]
pub struct InMemory(Arc<Mutex<State>>);

/// Records stored by an [`InMemory`] database.
#[derive(Debug, Default)]
struct State {
    /// Stored [`User`] records, keyed by [`user::Id`].
    users: HashMap<user::Id, User>,

    /// Stored [`Ride`] records, keyed by [`ride::Id`].
    rides: HashMap<ride::Id, Ride>,

    /// Stored [`Driver`] records, keyed by [`driver::Id`].
    drivers: HashMap<driver::Id, Driver>,

    /// Stored [`Pricing`] records, keyed by [`pricing::Id`].
    pricings: HashMap<pricing::Id, Pricing>,

    /// Stored [`Notification`] records, keyed by [`notification::Id`].
    notifications: HashMap<notification::Id, Notification>,
}

impl InMemory {
    /// Creates a new empty [`InMemory`] database.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Locks the [`State`] of this [`InMemory`] database.
    fn state(&self) -> Result<MutexGuard<'_, State>, Traced<database::Error>> {
        self.0
            .lock()
            .map_err(|_| tracerr::new!(database::Error::from(Error::Poisoned)))
    }
}

/// In-memory database [`Error`].
#[derive(Clone, Debug, Display, Eq, PartialEq, StdError)]
pub enum Error {
    /// Uniqueness of the named field was violated on insertion.
    #[display("`{_0}` already exists")]
    Conflict(#[error(not(source))] &'static str),

    /// Storage lock was poisoned by a panicked holder.
    #[display("storage lock is poisoned")]
    Poisoned,
}
