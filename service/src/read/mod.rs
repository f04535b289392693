//! Read entities definitions.

pub mod driver;
pub mod notification;
pub mod pricing;
pub mod ride;
pub mod user;
