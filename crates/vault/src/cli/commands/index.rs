//! Implementation of `vault index`.

use std::process::ExitCode;

use vault_config::format_path_for_display;
use vault_index::{IndexingConfig, Snapshot};

use crate::cli::{
    args::IndexCommand,
    context::CommandContext,
    output::{dim, subheader, success, warning},
};

/// Builds the index for the selected categories and writes the snapshot file.
pub fn run(ctx: &CommandContext, cmd: &IndexCommand) -> ExitCode {
    let settings = ctx.search_settings(cmd.strategy);
    let corpus = match ctx.load_corpus(&cmd.categories.categories) {
        Ok(corpus) => corpus,
        Err(code) => return code,
    };

    let config = IndexingConfig::from_settings(&settings);
    let snapshot = match Snapshot::build(&corpus, &config) {
        Ok(snapshot) => snapshot,
        Err(e) => {
            eprintln!("error: indexing failed: {e}");
            return ExitCode::FAILURE;
        }
    };

    println!("{}", subheader("Index:"));
    println!("   Strategy:    {}", snapshot.strategy());
    println!("   Documents:   {}", snapshot.len());
    println!("   Vocabulary:  {}", snapshot.vocabulary_len());
    println!("   Dimension:   {}", snapshot.dimension());
    println!("   Fingerprint: {}", snapshot.fingerprint());
    println!();

    let Some(path) = ctx.snapshot_path() else {
        println!("{}", dim("No snapshot path configured, nothing written."));
        return ExitCode::SUCCESS;
    };
    let display_path = format_path_for_display(path, Some(ctx.cwd.as_path()));
    match snapshot.save(path) {
        Ok(true) => {
            println!("{} {display_path}", success("Saved snapshot to"));
            ExitCode::SUCCESS
        }
        Ok(false) => {
            println!(
                "{}",
                warning(&format!(
                    "The {} strategy cannot be persisted; {display_path} left unchanged.",
                    snapshot.strategy()
                ))
            );
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: failed to write {display_path}: {e}");
            ExitCode::FAILURE
        }
    }
}
