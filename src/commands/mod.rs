//! Command implementations for agentform.
//!
//! This module provides the dispatcher that routes CLI commands to their
//! implementations, plus the loading and verification steps most commands
//! share.

mod apply;
mod destroy;
mod init;
mod plan;
mod run;
mod serve;
mod show;
mod verify;

#[cfg(test)]
mod tests;

use crate::cli::{Cli, Command};
use crate::context::ProjectContext;
use crate::deploy::RuntimeRegistry;
use crate::document;
use crate::error::{AgentformError, Result};
use crate::provider::ProviderRegistry;
use crate::resource::ResourceGraph;
use crate::verify::{VerifyOptions, VerifyReport, verify};

/// Dispatch a command to its implementation.
///
/// Paths are resolved once from the global options; every handler works on
/// the resulting [`ProjectContext`].
pub fn dispatch(cli: Cli) -> Result<()> {
    let ctx = ProjectContext::resolve(
        cli.global.dir.as_deref(),
        cli.global.config.as_deref(),
        cli.global.state.as_deref(),
    )?;

    match cli.command {
        Command::Init(args) => init::cmd_init(&ctx, args),
        Command::Verify => verify::cmd_verify(&ctx),
        Command::Plan => plan::cmd_plan(&ctx),
        Command::Apply => apply::cmd_apply(&ctx),
        Command::Show => show::cmd_show(&ctx),
        Command::Run(args) => run::cmd_run(&ctx, args),
        Command::Serve(args) => serve::cmd_serve(&ctx, args),
        Command::Destroy => destroy::cmd_destroy(&ctx),
    }
}

/// Parse the project's configuration document.
fn load_config(ctx: &ProjectContext) -> Result<ResourceGraph> {
    ctx.require_config()?;
    document::parse_file(&ctx.config_path)
}

fn verify_options(ctx: &ProjectContext, providers: &ProviderRegistry) -> VerifyOptions {
    VerifyOptions {
        base_dir: ctx.base_dir().to_path_buf(),
        provider_kinds: providers.kinds(),
        runtime_kinds: RuntimeRegistry::default().kinds(),
    }
}

fn verify_graph(
    ctx: &ProjectContext,
    graph: &ResourceGraph,
    providers: &ProviderRegistry,
) -> VerifyReport {
    verify(graph, &verify_options(ctx, providers))
}

/// Stop with a validation failure unless the graph verifies cleanly.
///
/// Diagnostics go to stderr so that command output stays clean.
fn require_valid(
    ctx: &ProjectContext,
    graph: &ResourceGraph,
    providers: &ProviderRegistry,
) -> Result<()> {
    let report = verify_graph(ctx, graph, providers);
    if report.is_valid() {
        return Ok(());
    }
    eprint!("{}", report);
    Err(AgentformError::ValidationFailed(report.diagnostics.len()))
}
