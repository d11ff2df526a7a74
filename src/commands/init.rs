//! Implementation of the `agentform init` command.
//!
//! Writes a scaffold project: an example configuration document and the
//! prompt file it references. The command is idempotent; files that already
//! exist are reported and left untouched.

use crate::cli::InitArgs;
use crate::context::{DEFAULT_CONFIG_FILE, ProjectContext};
use crate::error::Result;
use crate::fs::atomic_write_file;
use std::path::{Path, PathBuf};
use tracing::debug;

const CONFIG_TEMPLATE: &str = include_str!("../../assets/agentform.toml");
const PROMPT_TEMPLATE: &str = include_str!("../../assets/prompts/assistant.prompt");

/// Prompt file path, relative to the configuration document.
const PROMPT_FILE: &str = "prompts/assistant.prompt";

/// What happened to one scaffold file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(super) enum Scaffolded {
    Created(PathBuf),
    Kept(PathBuf),
}

/// Execute the `agentform init` command.
pub fn cmd_init(ctx: &ProjectContext, args: InitArgs) -> Result<()> {
    let config_path = match &args.directory {
        Some(dir) if dir.is_absolute() => dir.join(DEFAULT_CONFIG_FILE),
        Some(dir) => ctx.project_dir.join(dir).join(DEFAULT_CONFIG_FILE),
        None => ctx.config_path.clone(),
    };

    for outcome in scaffold(&config_path)? {
        match outcome {
            Scaffolded::Created(path) => println!("Created {}", path.display()),
            Scaffolded::Kept(path) => println!("Already exists, left unchanged: {}", path.display()),
        }
    }
    println!();
    println!("Next: edit the configuration, then run `agentform verify` and `agentform apply`.");
    Ok(())
}

/// Write the configuration document at `config_path` and its prompt file.
pub(super) fn scaffold(config_path: &Path) -> Result<Vec<Scaffolded>> {
    let base = config_path.parent().unwrap_or(Path::new("."));
    let prompt_path = base.join(PROMPT_FILE);

    Ok(vec![
        write_if_missing(config_path, CONFIG_TEMPLATE)?,
        write_if_missing(&prompt_path, PROMPT_TEMPLATE)?,
    ])
}

fn write_if_missing(path: &Path, content: &str) -> Result<Scaffolded> {
    if path.exists() {
        debug!(path = %path.display(), "scaffold file exists");
        return Ok(Scaffolded::Kept(path.to_path_buf()));
    }
    atomic_write_file(path, content)?;
    Ok(Scaffolded::Created(path.to_path_buf()))
}
