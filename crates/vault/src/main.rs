//! Command-line interface for vault.
//!
//! vault searches a local mirror of the FTC open vault catalog: CAD models, code
//! samples and engineering portfolios. Records are read from the mirror on every run
//! and ranked by textual similarity to the query.

mod cli;

use std::process::ExitCode;

use clap::Parser;
use cli::{
    args::{Cli, Commands},
    commands,
    context::CommandContext,
    logging,
};

fn main() -> ExitCode {
    let cli = Cli::parse();
    logging::init(cli.verbose);

    let ctx = match cli.command {
        Commands::Init(_) => CommandContext::load_cwd_only(),
        _ => CommandContext::load(),
    };
    match ctx {
        Ok(ctx) => commands::run(cli.command, &ctx),
        Err(code) => code,
    }
}
