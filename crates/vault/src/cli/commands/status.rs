//! Implementation of `vault status`.

use std::process::ExitCode;

use vault_config::{ConfigWarning, discover_config_files, format_path_for_display};
use vault_index::{IndexingConfig, SnapshotStatus, compute_fingerprint, detect_snapshot_status};

use crate::cli::{
    args::StatusCommand,
    context::CommandContext,
    output::{dim, subheader, success, warning},
};

/// Shows configuration files, effective settings, the catalog and the snapshot status.
pub fn run(ctx: &CommandContext, cmd: &StatusCommand) -> ExitCode {
    let cwd = ctx.cwd.as_path();

    let config_files = discover_config_files(cwd);
    if config_files.is_empty() {
        println!("{}", dim("No configuration files found."));
        println!();
        println!(
            "Run {} to create a configuration file.",
            subheader("vault init")
        );
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader("Config files:"));
    for path in &config_files {
        println!("   {}", format_path_for_display(path, Some(cwd)));
    }
    println!();

    let config = &ctx.config;
    match config.settings_to_toml() {
        Ok(toml) => {
            println!("{}", subheader("Effective settings:"));
            for line in toml.lines() {
                println!("   {line}");
            }
            println!();
        }
        Err(e) => {
            eprintln!("error: {e}");
            return ExitCode::FAILURE;
        }
    }

    let warnings = config.validate();
    if config.catalog.root.as_deref().is_some_and(|root| root.is_dir()) {
        let corpus = match ctx.load_corpus(&cmd.categories.categories) {
            Ok(corpus) => corpus,
            Err(code) => return code,
        };
        let fingerprint =
            compute_fingerprint(&corpus, &IndexingConfig::from_settings(&config.search));

        println!("{}", subheader("Catalog:"));
        println!("   Records:     {}", corpus.len());
        println!("   Fields:      {}", corpus.field_names().join(", "));
        println!("   Fingerprint: {fingerprint}");
        println!();

        print!("{}\n   ", subheader("Snapshot:"));
        match ctx.snapshot_path() {
            Some(path) => {
                let status = detect_snapshot_status(path, fingerprint);
                let label = match status {
                    SnapshotStatus::Current => success(status.description()),
                    SnapshotStatus::Stale | SnapshotStatus::Missing | SnapshotStatus::Unreadable => {
                        warning(status.description())
                    }
                };
                println!(
                    "{label} {}",
                    dim(&format!("({})", format_path_for_display(path, Some(cwd))))
                );
            }
            None => println!("{}", dim("not configured")),
        }
        println!();
    }

    if warnings.is_empty() {
        println!("No issues found.");
        return ExitCode::SUCCESS;
    }

    println!("{}", subheader(&format!("Warnings ({}):", warnings.len())));
    for w in &warnings {
        println!("   {}", warning(&w.to_string()));
    }
    println!();
    print_hints(&warnings);

    ExitCode::SUCCESS
}

/// Prints hints for resolving common warnings.
fn print_hints(warnings: &[ConfigWarning]) {
    for w in warnings {
        match w {
            ConfigWarning::NoCatalogRoot => {
                println!("{}", dim("Hint: set root in the [catalog] section of .vault.toml"));
            }
            ConfigWarning::CatalogRootMissing { .. } => {
                println!("{}", dim("Hint: clone the content repository or fix [catalog] root"));
            }
            _ => {}
        }
    }
}
