//! [`User`] read model definition.
//!
//! [`User`]: crate::domain::User

pub mod list {
    //! [`User`]s list definitions.

    use crate::domain::user;
    #[cfg(doc)]
    use crate::domain::User;

    /// Filter of a [`User`]s list.
    #[derive(Clone, Debug, Default)]
    pub struct Filter {
        /// [`user::Role`] to select [`User`]s of.
        pub role: Option<user::Role>,

        /// [`user::Department`] to select [`User`]s of.
        pub department: Option<user::Department>,

        /// Select only non-deactivated [`User`]s.
        pub active_only: bool,
    }
}
