//! [`Ride`] read model definition.
//!
//! [`Ride`]: crate::domain::Ride

pub mod list {
    //! [`Ride`]s list definitions.

    use crate::domain::{ride, user};
    #[cfg(doc)]
    use crate::domain::Ride;

    /// Filter of a [`Ride`]s list.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// [`user::Id`] of the requester to select [`Ride`]s of.
        pub requested_by: Option<user::Id>,

        /// [`ride::Status`] to select [`Ride`]s in.
        pub status: Option<ride::Status>,
    }
}
