//! Command line arguments

use std::path::PathBuf;

use clap::{ArgAction, Parser, Subcommand, ValueEnum};

use crate::cli::commands::bids::BidCommands;
use crate::cli::commands::db::DbCommands;
use crate::cli::commands::dir::DirCommands;
use crate::cli::commands::tenders::TenderCommands;

#[derive(Parser, Debug)]
#[command(name = "tender")]
#[command(author, version, about = "Tender Management Toolkit - versioned tenders and bids with quorum-based decisions")]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOpts,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(clap::Args, Debug, Clone)]
pub struct GlobalOpts {
    /// SQLite database file (overrides config and TENDER_DB)
    #[arg(long, global = true)]
    pub db: Option<PathBuf>,

    /// Extra config file layered over the user config
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Output format
    #[arg(long, short = 'f', global = true, value_enum, default_value_t = OutputFormat::Auto)]
    pub format: OutputFormat,

    /// More logging (-v debug, -vv trace)
    #[arg(long, short = 'v', global = true, action = ArgAction::Count)]
    pub verbose: u8,
}

impl GlobalOpts {
    /// Log level forced by `-v`, if any
    pub fn verbosity_level(&self) -> Option<&'static str> {
        match self.verbose {
            0 => None,
            1 => Some("debug"),
            _ => Some("trace"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// YAML for single records, a table for listings
    Auto,
    Json,
    Yaml,
    Table,
    /// Only ids, one per line
    Id,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Database setup and diagnostics
    #[command(subcommand)]
    Db(DbCommands),

    /// Employees, organizations and responsibilities
    #[command(subcommand)]
    Dir(DirCommands),

    /// Tender management
    #[command(subcommand)]
    Tenders(TenderCommands),

    /// Bid management and decisions
    #[command(subcommand)]
    Bids(BidCommands),
}

/// Pagination flags shared by listings
#[derive(clap::Args, Debug, Clone)]
pub struct PageArgs {
    /// Page size (defaults to the configured default_limit)
    #[arg(long, short = 'n', allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Records to skip
    #[arg(long, default_value_t = 0, allow_negative_numbers = true)]
    pub offset: i64,
}
