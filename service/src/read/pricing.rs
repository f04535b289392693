//! [`Pricing`] read model definition.
//!
//! [`Pricing`]: crate::domain::Pricing

use common::DateTime;
use derive_more::{From, Into};

#[cfg(doc)]
use crate::domain::Pricing;

/// Selector of the single [`Pricing`] active at the contained moment.
///
/// Active means enabled and with the moment inside the validity window. At
/// most one [`Pricing`] is expected to be active at any instant.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct ActiveAt(pub DateTime);
