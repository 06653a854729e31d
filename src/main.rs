use std::process::ExitCode;

use clap::Parser;
use miette::Result;
use tender::cli::{Cli, Commands, Context};
use tender::core::{logging, TenderError};

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(report) => {
            eprintln!("{:?}", report);
            report
                .downcast_ref::<TenderError>()
                .map_or(ExitCode::FAILURE, |e| ExitCode::from(e.kind().exit_code()))
        }
    }
}

fn run() -> Result<()> {
    // Install miette's fancy error handler for beautiful diagnostics
    miette::set_hook(Box::new(|_| {
        Box::new(
            miette::MietteHandlerOpts::new()
                .terminal_links(true)
                .unicode(true)
                .context_lines(2)
                .tab_width(4)
                .build(),
        )
    }))?;

    let cli = Cli::parse();
    let ctx = Context::new(cli.global)?;
    logging::init(ctx.log_level());

    match cli.command {
        Commands::Db(cmd) => tender::cli::commands::db::run(cmd, &ctx),
        Commands::Dir(cmd) => tender::cli::commands::dir::run(cmd, &ctx),
        Commands::Tenders(cmd) => tender::cli::commands::tenders::run(cmd, &ctx),
        Commands::Bids(cmd) => tender::cli::commands::bids::run(cmd, &ctx),
    }
}
