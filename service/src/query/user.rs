//! [`Query`] collection related to a single [`User`].

use common::operations::By;

#[cfg(doc)]
use crate::Query;
use crate::domain::{user, User};

use super::DatabaseQuery;

/// Queries a [`User`] by its [`user::Id`].
pub type ById = DatabaseQuery<By<Option<User>, user::Id>>;

/// Queries a [`User`] by its [`user::Email`].
pub type ByEmail<'l> = DatabaseQuery<By<Option<User>, &'l user::Email>>;
