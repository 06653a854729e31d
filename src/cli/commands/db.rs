//! `tender db` command - Database setup and diagnostics

use clap::Subcommand;
use console::style;
use miette::Result;

use crate::cli::output::print_record;
use crate::cli::{Context, OutputFormat};

#[derive(Subcommand, Debug)]
pub enum DbCommands {
    /// Create the database file and tables
    Init,

    /// Check the database and show row counts
    Ping,
}

pub fn run(cmd: DbCommands, ctx: &Context) -> Result<()> {
    match cmd {
        DbCommands::Init => run_init(ctx),
        DbCommands::Ping => run_ping(ctx),
    }
}

fn run_init(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let stats = store.ping()?;

    if ctx.global.format == OutputFormat::Auto {
        println!(
            "{} Initialized database {}",
            style("✓").green(),
            style(ctx.config.database.display()).cyan()
        );
        println!("   {}", style(format!("schema version {}", stats.schema_version)).dim());
        return Ok(());
    }
    print_record(&stats, &ctx.global)
}

fn run_ping(ctx: &Context) -> Result<()> {
    let store = ctx.open_store()?;
    let stats = store.ping()?;
    print_record(&stats, &ctx.global)
}
