//! [`Driver`] read model definition.
//!
//! [`Driver`]: crate::domain::Driver

pub mod list {
    //! [`Driver`]s list definitions.

    use crate::domain::vehicle;
    #[cfg(doc)]
    use crate::domain::Driver;

    /// Filter of a [`Driver`]s list.
    #[derive(Clone, Copy, Debug, Default)]
    pub struct Filter {
        /// Vehicle [`Category`] to select [`Driver`]s serving.
        ///
        /// [`Category`]: vehicle::Category
        pub vehicle: Option<vehicle::Category>,

        /// Select only available [`Driver`]s.
        pub available_only: bool,
    }
}
