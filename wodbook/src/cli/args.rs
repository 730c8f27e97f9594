//! CLI argument definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Wodbook - book and cancel classes at your box from the terminal
#[derive(Parser, Debug)]
#[command(name = "wodbook")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Account e-mail used to log in to the booking site
    #[arg(long, env = "WODBOOK_EMAIL")]
    pub email: String,

    /// Account password
    #[arg(long, env = "WODBOOK_PASSWORD", hide_env_values = true)]
    pub password: String,

    /// Box subdomain on the booking site (e.g. "mybox")
    #[arg(long, env = "WODBOOK_BOX_NAME")]
    pub box_name: String,

    /// Box identifier sent with every bookings query
    #[arg(long, env = "WODBOOK_BOX_ID")]
    pub box_id: String,

    /// Directory for the session cache and booking ledger
    /// (default: platform data dir + "wodbook")
    #[arg(long, env = "WODBOOK_DATA_DIR")]
    pub data_dir: Option<PathBuf>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// List the classes bookable on a day
    List {
        /// Day to list: today, tomorrow, or YYYYMMDD
        #[arg(default_value = "today")]
        day: String,
    },

    /// Book a class by its slot id
    Book {
        /// Slot id, as shown by `list`
        slot_id: u64,

        /// Day the slot belongs to: today, tomorrow, or YYYYMMDD
        #[arg(default_value = "today")]
        day: String,
    },

    /// Cancel the active booking
    Cancel,

    /// Show the active booking
    Status,
}
