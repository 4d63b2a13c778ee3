//! Implementation of `vault init`.

use std::{
    fs,
    io::{self, Write},
    path::{Path, PathBuf},
    process::ExitCode,
};

use vault_config::{CONFIG_FILENAME, global_config_path, global_template, local_template};

use crate::cli::{args::InitCommand, context::CommandContext, output::subheader};

/// Directory holding the persisted snapshot in the local template.
const STATE_DIR: &str = ".vault/";

/// Where `init` writes, and whether that is the global file.
struct Target {
    /// File to create.
    path: PathBuf,
    /// True for `~/.vault.toml`.
    global: bool,
}

/// Picks the file to write. Running in the home directory always means the global file.
fn target(cwd: &Path, global: bool) -> Result<Target, ExitCode> {
    let global_path = global_config_path();
    let in_home = global_path
        .as_deref()
        .and_then(Path::parent)
        .is_some_and(|home| home == cwd);

    if !(global || in_home) {
        return Ok(Target {
            path: cwd.join(CONFIG_FILENAME),
            global: false,
        });
    }
    match global_path {
        Some(path) => Ok(Target { path, global: true }),
        None => {
            eprintln!("error: could not determine home directory");
            Err(ExitCode::FAILURE)
        }
    }
}

/// Writes a commented `.vault.toml` template.
pub fn run(ctx: &CommandContext, cmd: &InitCommand) -> ExitCode {
    let target = match target(&ctx.cwd, cmd.global) {
        Ok(target) => target,
        Err(code) => return code,
    };

    if target.path.exists() && !cmd.force {
        eprintln!(
            "error: configuration file already exists: {}",
            target.path.display()
        );
        eprintln!("use --force to overwrite");
        return ExitCode::FAILURE;
    }

    let template = if target.global {
        global_template()
    } else {
        local_template()
    };
    if let Err(e) = fs::write(&target.path, &template) {
        eprintln!("error: failed to write {}: {e}", target.path.display());
        return ExitCode::FAILURE;
    }

    println!("Created {}", target.path.display());
    println!();
    println!("{}", subheader("Configuration written:"));
    for line in template.lines() {
        println!("   {line}");
    }

    if !target.global
        && let Some(dir) = target.path.parent()
        && let Err(e) = ignore_state_dir(dir)
    {
        eprintln!("warning: could not update .gitignore: {e}");
    }

    ExitCode::SUCCESS
}

/// Appends the snapshot directory to an existing `.gitignore` in `dir`.
fn ignore_state_dir(dir: &Path) -> io::Result<()> {
    let gitignore = dir.join(".gitignore");
    if !gitignore.exists() {
        return Ok(());
    }

    let contents = fs::read_to_string(&gitignore)?;
    let bare = STATE_DIR.trim_end_matches('/');
    if contents
        .lines()
        .map(str::trim)
        .any(|line| line == STATE_DIR || line == bare)
    {
        return Ok(());
    }

    let mut file = fs::OpenOptions::new().append(true).open(&gitignore)?;
    if !contents.is_empty() && !contents.ends_with('\n') {
        writeln!(file)?;
    }
    writeln!(file, "{STATE_DIR}")?;
    println!("Added {STATE_DIR} to .gitignore");
    Ok(())
}
