//! Persistence of the last-applied resource graph.
//!
//! The state file uses the same document format as the configuration, minus
//! the `[vars]` section, under a comment header recording when it was written.
//! A missing file means nothing has been applied yet. Writes are atomic and
//! last-writer-wins.

use crate::document::{parse_document, render_document};
use crate::error::{AgentformError, Result};
use crate::fs::atomic_write_file;
use crate::resource::ResourceGraph;
use chrono::{DateTime, SecondsFormat, Utc};
use std::path::{Path, PathBuf};
use tracing::{debug, info};

#[derive(Debug, Clone)]
pub struct StateStore {
    path: PathBuf,
}

impl StateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    /// Load the last-applied graph; empty when no state has been saved.
    pub fn load(&self) -> Result<ResourceGraph> {
        if !self.exists() {
            debug!(path = %self.path.display(), "no state file, starting from empty state");
            return Ok(ResourceGraph::default());
        }

        let text = std::fs::read_to_string(&self.path).map_err(|e| {
            AgentformError::Io(format!(
                "failed to read state file '{}': {}",
                self.path.display(),
                e
            ))
        })?;
        parse_document(&text)
    }

    /// Persist `graph` as the new last-applied state.
    pub fn save(&self, graph: &ResourceGraph) -> Result<()> {
        self.save_at(graph, Utc::now())
    }

    fn save_at(&self, graph: &ResourceGraph, applied_at: DateTime<Utc>) -> Result<()> {
        let body = render_document(graph)?;
        let content = format!(
            "# agentform state, applied {}\n# Generated file; edit the configuration document instead.\n\n{}",
            applied_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            body
        );
        atomic_write_file(&self.path, &content)?;
        info!(path = %self.path.display(), "state saved");
        Ok(())
    }

    /// Remove the state file. Succeeds when there is nothing to remove.
    pub fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => {
                info!(path = %self.path.display(), "state cleared");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(AgentformError::Io(format!(
                "failed to remove state file '{}': {}",
                self.path.display(),
                e
            ))),
        }
    }
}
