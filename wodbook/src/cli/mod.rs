//! Command-line interface: a thin presentation layer over the manager.

mod args;
mod commands;

pub use args::{Cli, Commands};
pub use commands::execute;
