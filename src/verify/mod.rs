//! Reference validation for a parsed resource graph.
//!
//! Every resource kind has a rule set checking that its outbound references
//! resolve and that its enum-like fields hold a supported value. All rules run
//! for every resource and every violation is collected; nothing here aborts
//! early. Callers decide whether a failed report blocks further work.

mod rules;


use crate::resource::{ResourceGraph, ResourceKind};
use std::fmt;
use std::path::PathBuf;
use tracing::warn;

/// A single problem found on one resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// A reference names a resource that does not exist.
    DanglingReference {
        field: String,
        target_kind: ResourceKind,
        target: String,
    },
    /// A `type`/`runtime` value with no registered implementation.
    UnsupportedKind {
        field: String,
        value: String,
        supported: Vec<String>,
    },
    /// An `@file:` prompt pointing at a file that does not exist.
    MissingPromptFile { path: PathBuf },
    EmptyFlow,
    InvalidPort(i64),
    /// An `expose` entry without the `task.` prefix.
    MalformedExpose(String),
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::DanglingReference {
                field,
                target_kind,
                target,
            } => write!(f, "{} references unknown {} '{}'", field, target_kind, target),
            Violation::UnsupportedKind {
                field,
                value,
                supported,
            } => write!(
                f,
                "unsupported {} '{}' (supported: {})",
                field,
                value,
                supported.join(", ")
            ),
            Violation::MissingPromptFile { path } => {
                write!(f, "prompt file '{}' does not exist", path.display())
            }
            Violation::EmptyFlow => write!(f, "flow must name at least one agent"),
            Violation::InvalidPort(port) => {
                write!(f, "port {} is not a valid TCP port (1-65535)", port)
            }
            Violation::MalformedExpose(entry) => {
                write!(f, "expose entry '{}' must have the form 'task.<name>'", entry)
            }
        }
    }
}

/// A violation attributed to the resource that carries it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: ResourceKind,
    pub name: String,
    pub violation: Violation,
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}: {}", self.kind, self.name, self.violation)
    }
}

/// Outcome of verifying a graph.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VerifyReport {
    pub diagnostics: Vec<Diagnostic>,
}

impl VerifyReport {
    /// True when no rule reported a violation.
    pub fn is_valid(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Diagnostics reported against one resource.
    pub fn for_resource(&self, kind: ResourceKind, name: &str) -> Vec<&Diagnostic> {
        self.diagnostics
            .iter()
            .filter(|d| d.kind == kind && d.name == name)
            .collect()
    }
}

impl fmt::Display for VerifyReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for diagnostic in &self.diagnostics {
            writeln!(f, "{}", diagnostic)?;
        }
        Ok(())
    }
}

/// Inputs a rule needs beyond the graph itself.
#[derive(Debug, Clone)]
pub struct VerifyOptions {
    /// Directory that relative `@file:` prompts are resolved against.
    pub base_dir: PathBuf,
    /// Registered provider `type` values.
    pub provider_kinds: Vec<String>,
    /// Registered deployment `runtime` values.
    pub runtime_kinds: Vec<String>,
}

/// Run every rule set against the graph and collect all violations.
///
/// Diagnostics are ordered by kind, then resource name, then rule order.
pub fn verify(graph: &ResourceGraph, options: &VerifyOptions) -> VerifyReport {
    let mut report = VerifyReport::default();
    let mut checker = rules::Checker::new(graph, options, &mut report.diagnostics);

    checker.providers();
    checker.llms();
    checker.embeddings();
    checker.memories();
    checker.tools();
    checker.agents();
    checker.tasks();
    checker.deployments();

    for diagnostic in &report.diagnostics {
        warn!(
            kind = %diagnostic.kind,
            name = %diagnostic.name,
            "{}",
            diagnostic.violation
        );
    }

    report
}
