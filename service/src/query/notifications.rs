//! [`Query`] collection related to the multiple [`Notification`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Notification, read};

use super::DatabaseQuery;

/// Queries a list of [`Notification`]s matching a [`Filter`].
///
/// [`Filter`]: read::notification::list::Filter
pub type List =
    DatabaseQuery<By<Vec<Notification>, read::notification::list::Filter>>;

/// Queries [`Notification`]s due for a delivery attempt at a moment.
pub type Due =
    DatabaseQuery<By<Vec<Notification>, read::notification::Due>>;
