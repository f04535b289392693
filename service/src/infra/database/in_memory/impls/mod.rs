//! [`Database`] implementations of the [`InMemory`] client.
//!
//! [`Database`]: crate::infra::Database
//! [`InMemory`]: super::InMemory

mod driver;
mod notification;
mod pricing;
mod ride;
mod user;
