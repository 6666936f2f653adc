pub mod booking;
pub mod profile;
pub mod turf;

pub use booking::*;
pub use profile::*;
pub use turf::*;
