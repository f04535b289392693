//! Infrastructure layer.

pub mod database;
pub mod notifier;
pub mod session;

pub use self::{
    database::{in_memory, Database, InMemory},
    notifier::Notifier,
    session::SessionStore,
};
