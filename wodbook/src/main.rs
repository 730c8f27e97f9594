//! Wodbook - book classes at your box from the terminal.
//!
//! Automates booking a class slot on the box's scheduling site for a
//! single account and remembers the one outstanding booking so it can be
//! cancelled later.
//!
//! Architecture:
//! - CLI is a thin presentation layer that talks to the `BookingManager`
//! - The manager drives the remote HTTP client and owns the durable
//!   single-booking state (session cache + booking ledger on disk)

mod cli;
mod client;
mod error;
mod manager;
mod models;
mod store;

use anyhow::Result;
use clap::Parser;

use cli::{execute, Cli};

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .format_target(false)
        .init();

    let cli = Cli::parse();
    execute(cli).await
}
