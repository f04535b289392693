//! [`Query`] collection related to [`Pricing`] rule-sets.

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::{
    domain::{pricing, Pricing},
    read,
};

use super::DatabaseQuery;

/// Queries a [`Pricing`] by its [`pricing::Id`].
pub type ById = DatabaseQuery<By<Option<Pricing>, pricing::Id>>;

/// Queries the [`Pricing`] active at a moment.
pub type ActiveAt =
    DatabaseQuery<By<Option<Pricing>, read::pricing::ActiveAt>>;

/// Queries all the [`Pricing`] rule-sets.
pub type List = DatabaseQuery<By<Vec<Pricing>, ()>>;
