//! [`Query`] collection related to the multiple [`Ride`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Ride, read};

use super::DatabaseQuery;

/// Queries a list of [`Ride`]s matching a [`Filter`].
///
/// [`Filter`]: read::ride::list::Filter
pub type List = DatabaseQuery<By<Vec<Ride>, read::ride::list::Filter>>;
