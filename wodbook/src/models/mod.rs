//! Data models for wodbook entities.

mod booking;
mod outcome;
mod session;
mod slot;

pub use booking::ActiveBooking;
pub use outcome::Outcome;
pub use session::Session;
pub use slot::ClassSlot;
