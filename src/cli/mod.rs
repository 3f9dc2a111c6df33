pub mod report;

use std::{fmt::Display, io::IsTerminal, path::PathBuf};

use anyhow::Result;
use chrono::{Local, NaiveDate};
use chrono_english::parse_date_string;
use clap::{CommandFactory, Parser, Subcommand, ValueEnum};
use report::render_report;
use tracing::level_filters::LevelFilter;

use crate::{
    host::start_host,
    storage::file_store::JsonFileStore,
    usage::UsageStore,
    utils::{
        clock::DefaultClock,
        dir::application_path,
        logging::{enable_logging, CLI_PREFIX},
    },
};

#[derive(Parser, Debug)]
#[command(name = "Scrolltime", version, long_about = None)]
#[command(about = "Tracks time spent on social media and warns about daily limits", long_about = None)]
struct Args {
    #[command(subcommand)]
    commands: Commands,
    #[arg(long, help = "Enable logging")]
    log: bool,
    #[arg(
        long,
        global = true,
        help = "Application directory. By default tries to save into $XDG_STATE_HOME or $HOME/.local/state"
    )]
    dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DateStyle {
    Uk,
    Us,
}

impl From<DateStyle> for chrono_english::Dialect {
    fn from(value: DateStyle) -> Self {
        match value {
            DateStyle::Uk => Self::Uk,
            DateStyle::Us => Self::Us,
        }
    }
}

impl Display for DateStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            DateStyle::Uk => write!(f, "uk"),
            DateStyle::Us => write!(f, "us"),
        }
    }
}

#[derive(Subcommand, Debug)]
enum Commands {
    #[command(about = "Display usage per site for a day")]
    Today {
        #[arg(
            long = "date",
            short,
            help = "Day to display instead of today. Examples are \"yesterday\", \"15/03/2025\""
        )]
        date: Option<String>,
        #[arg(long, default_value_t = DateStyle::Uk, help = "Style of dates used during parsing. For Uk it's day/month/year. For Us it's month/day/year")]
        date_style: DateStyle,
    },
    #[command(about = "Delete all recorded usage, every day included")]
    Reset {},
    #[command(about = "Show or set the daily limit in minutes")]
    Limit { minutes: Option<u32> },
    #[command(
        about = "Run the native messaging host directly in current console. Used for debugging"
    )]
    Serve {},
}

pub async fn run_cli() -> Result<()> {
    let args = Args::parse();

    let logging_level = if args.log {
        Some(LevelFilter::TRACE)
    } else {
        None
    };
    let dir = application_path(args.dir)?;
    enable_logging(CLI_PREFIX, &dir, logging_level, args.log)?;

    let usage = UsageStore::new(JsonFileStore::new(dir.join("store"))?, Box::new(DefaultClock));

    match args.commands {
        Commands::Today { date, date_style } => {
            let date = match date {
                Some(date) => parse_day(&date, date_style)?,
                None => usage.today(),
            };
            let snapshot = usage.snapshot_for(date).await?;
            print!("{}", render_report(&snapshot, std::io::stdout().is_terminal()));
            Ok(())
        }
        Commands::Reset {} => {
            usage.reset_all().await?;
            println!("All usage data was deleted");
            Ok(())
        }
        Commands::Limit { minutes: None } => {
            let settings = usage.settings().await?;
            println!("{} minutes", settings.daily_limit);
            Ok(())
        }
        Commands::Limit {
            minutes: Some(minutes),
        } => {
            if minutes == 0 {
                return Err(Args::command()
                    .error(
                        clap::error::ErrorKind::ValueValidation,
                        "Daily limit must be at least 1 minute",
                    )
                    .into());
            }
            usage.set_daily_limit(minutes).await?;
            println!("Daily limit set to {minutes} minutes");
            Ok(())
        }
        Commands::Serve {} => start_host(dir).await,
    }
}

/// Ledger keys are UTC days, the parsed local date is used as is.
fn parse_day(value: &str, date_style: DateStyle) -> Result<NaiveDate> {
    match parse_date_string(value, Local::now(), date_style.into()) {
        Ok(v) => Ok(v.date_naive()),
        Err(e) => Err(Args::command()
            .error(
                clap::error::ErrorKind::ValueValidation,
                format!("Failed to validate date {e}"),
            )
            .into()),
    }
}
