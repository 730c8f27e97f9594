//! Durable single-user storage: session cache and booking ledger.
//!
//! Both stores are small JSON files. They are deliberately forgiving on
//! read: a missing, empty, or corrupt file degrades to "absent" so startup
//! never fails on damaged local state.

mod ledger;
mod session;

pub use ledger::BookingLedger;
pub use session::SessionStore;
