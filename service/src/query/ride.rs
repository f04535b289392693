//! [`Query`] collection related to a single [`Ride`].

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::domain::{ride, Ride};

use super::DatabaseQuery;

/// Queries a [`Ride`] by its [`ride::Id`].
pub type ById = DatabaseQuery<By<Option<Ride>, ride::Id>>;
