//! [`Query`] collection related to the multiple [`User`]s.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{domain::User, read};

use super::DatabaseQuery;

/// Queries a list of [`User`]s matching a [`Filter`].
///
/// [`Filter`]: read::user::list::Filter
pub type List = DatabaseQuery<By<Vec<User>, read::user::list::Filter>>;
