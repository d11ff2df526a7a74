//! Project path resolution for agentform.
//!
//! Every command works on one project: a directory holding the configuration
//! document and the state file. This module turns the global CLI options into
//! absolute paths once, so commands never consult the working directory
//! themselves.

use crate::error::{AgentformError, Result};
use std::env;
use std::path::{Path, PathBuf};

/// Default configuration document name within the project directory.
pub const DEFAULT_CONFIG_FILE: &str = "agentform.toml";

/// Default state file name within the project directory.
pub const DEFAULT_STATE_FILE: &str = ".agentform.state.toml";

/// Resolved paths for one project. All paths are absolute.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProjectContext {
    pub project_dir: PathBuf,
    pub config_path: PathBuf,
    pub state_path: PathBuf,
}

impl ProjectContext {
    /// Resolve from optional overrides.
    ///
    /// A relative `dir` is taken from the working directory; relative
    /// `config` and `state` paths are taken from the project directory.
    pub fn resolve(dir: Option<&Path>, config: Option<&Path>, state: Option<&Path>) -> Result<Self> {
        let project_dir = match dir {
            Some(dir) if dir.is_absolute() => dir.to_path_buf(),
            Some(dir) => current_dir()?.join(dir),
            None => current_dir()?,
        };

        let config_path = absolute(
            &project_dir,
            config.unwrap_or(Path::new(DEFAULT_CONFIG_FILE)),
        );
        let state_path = absolute(
            &project_dir,
            state.unwrap_or(Path::new(DEFAULT_STATE_FILE)),
        );

        Ok(Self {
            project_dir,
            config_path,
            state_path,
        })
    }

    /// Directory that relative `@file:` tokens resolve against.
    pub fn base_dir(&self) -> &Path {
        self.config_path.parent().unwrap_or(&self.project_dir)
    }

    /// Fail with a hint when the configuration document does not exist.
    pub fn require_config(&self) -> Result<()> {
        if self.config_path.is_file() {
            return Ok(());
        }
        Err(AgentformError::UserError(format!(
            "configuration document not found: {}\n\nRun `agentform init` to create one.",
            self.config_path.display()
        )))
    }
}

fn current_dir() -> Result<PathBuf> {
    env::current_dir().map_err(|e| {
        AgentformError::UserError(format!("failed to get current working directory: {}", e))
    })
}

fn absolute(base: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}
