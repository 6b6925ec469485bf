pub mod confirmation;
pub mod tally;

pub use confirmation::confirm_guests;
pub use tally::GuestTally;
