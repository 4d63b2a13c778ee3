//! Command implementations and dispatch.

pub mod index;
pub mod init;
pub mod search;
pub mod status;

use std::process::ExitCode;

use super::{args::Commands, context::CommandContext};

/// Dispatches to the selected subcommand.
pub fn run(command: Commands, ctx: &CommandContext) -> ExitCode {
    match command {
        Commands::Search(cmd) => search::run(ctx, &cmd),
        Commands::Index(cmd) => index::run(ctx, &cmd),
        Commands::Status(cmd) => status::run(ctx, &cmd),
        Commands::Init(cmd) => init::run(ctx, &cmd),
    }
}
