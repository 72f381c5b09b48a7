//! `slotctl`: query bookable slots and book them from the command line.
//!
//! The calendar is a JSON file holding open-window events (Google Calendar
//! event shape) and confirmed bookings. Scheduling rules come from defaults,
//! a TOML file and `SLOTCTL_*` environment variables.
//!
//! ## Usage
//!
//! ```sh
//! # Offered slots for a day, labels in the visitor's zone
//! slotctl offers -c calendar.json --date 2024-01-15 --tz America/New_York
//!
//! # Book one of them (the calendar file is replaced under a lock)
//! slotctl book -c calendar.json \
//!     --start 2024-01-15T10:00:00+01:00 --end 2024-01-15T11:00:00+01:00 \
//!     --name "Ada Lovelace" --email ada@example.com --age 6-7
//!
//! # Override rules for one run
//! SLOTCTL_SLOT_MINUTES=30 slotctl offers -c calendar.json --date 2024-01-15
//! ```

mod config;

use std::ffi::OsString;
use std::fs::{self, File};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use fs2::FileExt;
use slot_engine::calendar::CalendarData;
use slot_engine::{AvailabilityQuery, BookingRequest, MemoryCalendar, Scheduler, SchedulingConfig};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(
    name = "slotctl",
    version,
    about = "Bookable slot engine for a single-resource calendar"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Extra TOML config file (overrides the user config file)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging on stderr
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the offered slots for one day
    Offers {
        /// Calendar JSON file
        #[arg(short, long)]
        calendar: PathBuf,
        /// Day to query (YYYY-MM-DD, business zone)
        #[arg(long)]
        date: String,
        /// Time zone for slot labels (defaults to the business zone)
        #[arg(long)]
        tz: Option<String>,
        /// Age group tag (informational)
        #[arg(long)]
        age: Option<String>,
        /// Evaluate as if it were this instant (RFC 3339)
        #[arg(long)]
        now: Option<String>,
    },
    /// Book a slot and write it to the calendar file
    Book {
        /// Calendar JSON file
        #[arg(short, long)]
        calendar: PathBuf,
        /// Slot start (RFC 3339)
        #[arg(long)]
        start: String,
        /// Slot end (RFC 3339)
        #[arg(long)]
        end: String,
        /// Attendee name
        #[arg(long)]
        name: String,
        /// Attendee email
        #[arg(long)]
        email: String,
        /// Attendee phone
        #[arg(long)]
        phone: Option<String>,
        /// Age group tag
        #[arg(long)]
        age: Option<String>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Logs go to stderr so stdout stays machine-readable.
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let settings = config::load(cli.config.as_deref()).context("Failed to load configuration")?;
    tracing::debug!(?settings, "loaded configuration");

    match cli.command {
        Commands::Offers {
            calendar,
            date,
            tz,
            age,
            now,
        } => {
            let now = parse_now(now.as_deref())?;
            let store = Arc::new(open_calendar(&calendar, &settings)?);
            let scheduler = Scheduler::new(settings, store)?;

            let query = AvailabilityQuery {
                date,
                display_timezone: tz,
                age_group: age,
            };
            let response = scheduler.availability(&query, now).await?;
            println!("{}", serde_json::to_string_pretty(&response)?);
        }
        Commands::Book {
            calendar,
            start,
            end,
            name,
            email,
            phone,
            age,
        } => {
            // Held until the new calendar is in place: another `book` run
            // must read it only after this one has written.
            let _lock = lock_calendar(&calendar)?;
            let store = Arc::new(open_calendar(&calendar, &settings)?);
            let scheduler = Scheduler::new(settings, Arc::clone(&store))?;

            let request = BookingRequest {
                start,
                end,
                name,
                email,
                phone,
                age_group: age,
            };
            let confirmation = scheduler.book(store.as_ref(), &request).await?;

            save_calendar(&calendar, &store.snapshot().await)?;
            println!("{}", serde_json::to_string_pretty(&confirmation)?);
        }
    }

    Ok(())
}

fn parse_now(now: Option<&str>) -> Result<DateTime<Utc>> {
    match now {
        Some(text) => Ok(DateTime::parse_from_rfc3339(text)
            .with_context(|| format!("Invalid --now timestamp: {}", text))?
            .with_timezone(&Utc)),
        None => Ok(Utc::now()),
    }
}

fn open_calendar(path: &Path, settings: &SchedulingConfig) -> Result<MemoryCalendar> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read calendar: {}", path.display()))?;
    let data: CalendarData = serde_json::from_str(&text)
        .with_context(|| format!("Invalid calendar JSON: {}", path.display()))?;
    Ok(MemoryCalendar::new(settings.timezone, data))
}

/// `<calendar>.<suffix>`, next to the calendar file.
fn sibling(path: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".");
    name.push(suffix);
    PathBuf::from(name)
}

/// Take the exclusive writer lock for a calendar file.
///
/// The lock lives on a sidecar file because the calendar itself is replaced
/// by rename. It is released when the returned handle is dropped.
fn lock_calendar(path: &Path) -> Result<File> {
    let lock_path = sibling(path, "lock");
    let lock_file = File::create(&lock_path)
        .with_context(|| format!("Failed to create lock file: {}", lock_path.display()))?;
    lock_file
        .lock_exclusive()
        .with_context(|| format!("Failed to lock calendar: {}", path.display()))?;
    tracing::debug!(path = %lock_path.display(), "acquired calendar lock");
    Ok(lock_file)
}

/// Write the calendar to a temp file and rename it over the original, so a
/// crash never leaves a truncated calendar.
fn save_calendar(path: &Path, data: &CalendarData) -> Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    let tmp_path = sibling(path, "tmp");
    fs::write(&tmp_path, json)
        .with_context(|| format!("Failed to write calendar: {}", tmp_path.display()))?;
    if let Err(e) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(e).with_context(|| format!("Failed to replace calendar: {}", path.display()));
    }
    Ok(())
}
