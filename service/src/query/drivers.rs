//! [`Query`] collection related to the multiple [`Driver`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::Driver, read};

use super::DatabaseQuery;

/// Queries a list of [`Driver`]s matching a [`Filter`].
///
/// [`Filter`]: read::driver::list::Filter
pub type List = DatabaseQuery<By<Vec<Driver>, read::driver::list::Filter>>;
