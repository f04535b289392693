//! Vehicle definitions.

use common::define_kind;

define_kind! {
    #[doc = "Category of a vehicle serving rides."]
    enum Category {
        #[doc = "A sedan car."]
        Sedan = 1,

        #[doc = "A sport utility vehicle."]
        Suv = 2,

        #[doc = "A luxury car."]
        Luxury = 3,

        #[doc = "A passenger van."]
        Van = 4,

        #[doc = "A bus."]
        Bus = 5,
    }
}
