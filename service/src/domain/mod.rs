//! Domain definitions.

pub mod driver;
pub mod notification;
pub mod pricing;
pub mod ride;
pub mod user;
pub mod vehicle;

pub use self::{
    driver::Driver, notification::Notification, pricing::Pricing, ride::Ride,
    user::User,
};
