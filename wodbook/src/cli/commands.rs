//! Command execution against the booking manager.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use chrono::{Days, Local, NaiveDate};

use super::{Cli, Commands};
use crate::client::{RemoteClient, RemoteConfig};
use crate::manager::{BookingManager, Credentials};
use crate::models::Outcome;
use crate::store::{BookingLedger, SessionStore};

/// Wire up the manager and run one command to completion.
pub async fn execute(cli: Cli) -> Result<()> {
    let Cli {
        email,
        password,
        box_name,
        box_id,
        data_dir,
        command,
    } = cli;

    let data_dir = resolve_data_dir(data_dir)?;
    let sessions = SessionStore::open_at(data_dir.join("sessions.json"));
    let ledger = BookingLedger::open_at(data_dir.join("booking.json"));
    let client = RemoteClient::new(RemoteConfig::for_box(&box_name, box_id), sessions)?;

    let credentials = Credentials { email, password };
    let mut manager = BookingManager::connect(client, credentials, ledger).await?;

    match command {
        Commands::List { day } => list(&mut manager, &day).await,
        Commands::Book { slot_id, day } => book(&mut manager, slot_id, &day).await,
        Commands::Cancel => cancel(&mut manager).await,
        Commands::Status => {
            status(&manager);
            Ok(())
        }
    }
}

async fn list(manager: &mut BookingManager<RemoteClient>, day: &str) -> Result<()> {
    let day = resolve_day(day)?;
    let count = manager.list_classes(&day).await?.len();
    if count == 0 {
        println!("No classes on {day}.");
        return Ok(());
    }

    println!("Classes on {day}:");
    for name in manager.class_names() {
        println!("{name}");
        for slot in manager.slots_for_class(name) {
            println!(
                "  [{}] {} ({:02}/{}), Monitor {}",
                slot.id, slot.time, slot.ocupation, slot.limit, slot.coach_name
            );
        }
    }
    Ok(())
}

async fn book(manager: &mut BookingManager<RemoteClient>, slot_id: u64, day: &str) -> Result<()> {
    let day = resolve_day(day)?;
    // Populate the slot cache first; book only resolves ids against the
    // most recent listing.
    manager.list_classes(&day).await?;

    match manager.book(slot_id).await {
        Outcome::Booked { confirmation_id } => {
            println!("Booked! Confirmation id {confirmation_id}.");
            Ok(())
        }
        Outcome::Cancelled => bail!("Unexpected cancellation reply to a book request"),
        Outcome::Rejected { message, .. } => bail!("Booking refused: {message}"),
        Outcome::TransportFailure { detail } => {
            bail!("Could not reach the booking site: {detail}")
        }
    }
}

async fn cancel(manager: &mut BookingManager<RemoteClient>) -> Result<()> {
    match manager.cancel().await {
        Outcome::Cancelled => {
            println!("Booking cancelled.");
            Ok(())
        }
        Outcome::Booked { .. } => bail!("Unexpected booking reply to a cancel request"),
        Outcome::Rejected { message, .. } => bail!("Cancellation refused: {message}"),
        Outcome::TransportFailure { detail } => {
            bail!("Could not reach the booking site: {detail}")
        }
    }
}

fn status(manager: &BookingManager<RemoteClient>) {
    match manager.current_booking() {
        Some(booking) => {
            println!("Active booking on {}:", booking.slot.day);
            println!("  {}", booking.slot);
            println!("  Confirmation id {}", booking.confirmation_id);
        }
        None => println!("No active booking."),
    }
}

/// Turn a day argument into the `YYYYMMDD` form the service expects.
/// Rejects malformed dates before any remote call is made.
fn resolve_day(day: &str) -> Result<String> {
    let date = match day {
        "today" => Local::now().date_naive(),
        "tomorrow" => Local::now()
            .date_naive()
            .checked_add_days(Days::new(1))
            .context("Tomorrow is out of range")?,
        other => NaiveDate::parse_from_str(other, "%Y%m%d")
            .with_context(|| format!("Invalid day '{other}': expected today, tomorrow, or YYYYMMDD"))?,
    };
    Ok(date.format("%Y%m%d").to_string())
}

fn resolve_data_dir(arg: Option<PathBuf>) -> Result<PathBuf> {
    let dir = match arg {
        Some(dir) => dir,
        None => dirs::data_dir()
            .context("Could not determine a data directory; pass --data-dir")?
            .join("wodbook"),
    };
    std::fs::create_dir_all(&dir)
        .with_context(|| format!("Failed to create directory: {}", dir.display()))?;
    Ok(dir)
}
