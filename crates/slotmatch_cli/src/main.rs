//! Operator CLI over a SlotMatch database file.
//!
//! # Responsibility
//! - Provide account bootstrap (`add-user`) that the FFI surface does not expose.
//! - Drive login, registration and slot lookup end to end for local checks.

use chrono::{NaiveDate, NaiveTime};
use clap::{Parser, Subcommand};
use slotmatch_core::db::open_db;
use slotmatch_core::{
    default_log_level, init_logging, AvailabilityService, Caller, SessionService,
    SlotService, SqliteAvailabilityRepository, SqliteUserRepository, UpsertOutcome,
};
use std::error::Error;
use std::path::PathBuf;
use std::process::ExitCode;

#[derive(Debug, Parser)]
#[command(name = "slotmatch", version, about = "Interview slot matching over shared availability")]
struct Cli {
    /// SQLite database file.
    #[arg(long, global = true, env = "SLOTMATCH_DB_PATH", default_value = "slotmatch.sqlite3")]
    db: PathBuf,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,

    /// Absolute directory for rolling log files. Logging is off when omitted.
    #[arg(long, global = true)]
    log_dir: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Print core linkage info.
    Ping,
    /// Create an account.
    AddUser {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
        /// Grant cross-user slot queries.
        #[arg(long)]
        admin: bool,
    },
    /// Print a session token for the given credentials.
    Login {
        #[arg(long)]
        username: String,
        #[arg(long)]
        password: String,
    },
    Logout {
        #[arg(long)]
        token: String,
    },
    /// Register or update the token owner's availability for one date.
    Register {
        #[arg(long)]
        token: String,
        #[arg(long, value_parser = parse_date)]
        date: NaiveDate,
        #[arg(long, value_parser = parse_time)]
        start: NaiveTime,
        #[arg(long, value_parser = parse_time)]
        end: NaiveTime,
    },
    /// List common one-hour slots (admin token required).
    Slots {
        #[arg(long)]
        token: String,
        #[arg(long)]
        candidate: i64,
        #[arg(long)]
        interviewer: i64,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Some(log_dir) = cli.log_dir.as_deref() {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        if let Err(err) = init_logging(level, log_dir) {
            eprintln!("logging disabled: {err}");
        }
    }

    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<(), Box<dyn Error>> {
    if let Command::Ping = cli.command {
        println!("slotmatch_core ping={}", slotmatch_core::ping());
        println!("slotmatch_core version={}", slotmatch_core::core_version());
        return Ok(());
    }

    let conn = open_db(&cli.db)?;
    let sessions = SessionService::new(SqliteUserRepository::try_new(&conn)?);

    match &cli.command {
        Command::Ping => {}
        Command::AddUser {
            username,
            password,
            admin,
        } => {
            let account = sessions.create_user(username, password, *admin)?;
            println!("created user id={} admin={}", account.id, account.is_admin);
        }
        Command::Login { username, password } => {
            let session = sessions.login(username, password)?;
            println!("{}", session.token);
        }
        Command::Logout { token } => {
            sessions.logout(token)?;
            println!("logged out");
        }
        Command::Register {
            token,
            date,
            start,
            end,
        } => {
            let caller = sessions.authenticate(token)?;
            let service = AvailabilityService::new(SqliteAvailabilityRepository::try_new(&conn)?);
            let registration = service.register(&caller, *date, *start, *end)?;
            let verb = match registration.outcome {
                UpsertOutcome::Created => "registered",
                UpsertOutcome::Updated => "updated",
            };
            println!(
                "{verb} {} {}-{}",
                registration.window.date, registration.window.start, registration.window.end
            );
        }
        Command::Slots {
            token,
            candidate,
            interviewer,
        } => {
            let caller: Caller = sessions.authenticate(token)?;
            let service = SlotService::new(SqliteAvailabilityRepository::try_new(&conn)?);
            let slots = service.interview_slots(&caller, *candidate, *interviewer)?;
            if slots.is_empty() {
                println!("No common slots available.");
            }
            for slot in slots {
                println!("{} {}-{}", slot.date, slot.start, slot.end);
            }
        }
    }
    Ok(())
}

fn parse_date(value: &str) -> Result<NaiveDate, String> {
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|_| format!("expected YYYY-MM-DD, got `{value}`"))
}

fn parse_time(value: &str) -> Result<NaiveTime, String> {
    NaiveTime::parse_from_str(value, "%H:%M:%S")
        .or_else(|_| NaiveTime::parse_from_str(value, "%H:%M"))
        .map_err(|_| format!("expected HH:MM or HH:MM:SS, got `{value}`"))
}
