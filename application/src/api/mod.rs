//! REST API definitions.

pub mod driver;
pub mod notification;
pub mod pricing;
pub mod ride;
pub mod user;

use std::{fmt, str::FromStr};

use axum::{
    routing::{get, post, put},
    Router,
};

use crate::Error;

/// Assembles the [`Router`] serving the whole API surface.
#[must_use]
pub fn router() -> Router {
    Router::new()
        .route("/api/users", post(user::register).get(user::list))
        .route("/api/users/login", post(user::login))
        .route("/api/users/me", get(user::me).delete(user::deactivate))
        .route("/api/users/me/password", put(user::update_password))
        .route("/api/rides", post(ride::request).get(ride::list))
        .route("/api/rides/:id", get(ride::get))
        .route("/api/rides/:id/approve", post(ride::approve))
        .route("/api/rides/:id/reject", post(ride::reject))
        .route("/api/rides/:id/cancel", post(ride::cancel))
        .route("/api/rides/:id/start", post(ride::start))
        .route("/api/rides/:id/complete", post(ride::complete))
        .route("/api/rides/:id/rate", post(ride::rate))
        .route("/api/pricing", post(pricing::create).get(pricing::list))
        .route("/api/pricing/active", get(pricing::active))
        .route("/api/pricing/quote", post(pricing::quote))
        .route("/api/drivers", post(driver::register).get(driver::list))
        .route("/api/notifications", get(notification::list))
        .route("/api/notifications/:id/read", post(notification::mark_read))
}

/// Parses the provided `value` into a `T`, reporting a validation [`Error`]
/// naming the `field` on failure.
pub(crate) fn parse<T>(field: &'static str, value: &str) -> Result<T, Error>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    value
        .parse()
        .map_err(|e| Error::validation(format!("invalid `{field}`: {e}")))
}
