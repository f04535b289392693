//! [`Notification`] read model definition.
//!
//! [`Notification`]: crate::domain::Notification

use common::DateTime;
use derive_more::{From, Into};

#[cfg(doc)]
use crate::domain::Notification;

/// Selector of [`Notification`]s due for a delivery attempt at the contained
/// moment.
#[derive(Clone, Copy, Debug, From, Into)]
pub struct Due(pub DateTime);

pub mod list {
    //! [`Notification`]s list definitions.

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::Notification;

    /// Filter of a [`Notification`]s list.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`user::Id`] of the addressee to select [`Notification`]s of.
        pub user_id: Option<user::Id>,

        /// Select only unread [`Notification`]s.
        pub unread_only: bool,
    }
}
