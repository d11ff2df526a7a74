//! Implementation of the `agentform verify` command.

use super::{load_config, verify_graph};
use crate::context::ProjectContext;
use crate::error::{AgentformError, Result};
use crate::provider::ProviderRegistry;

/// Execute the `agentform verify` command.
///
/// Prints every diagnostic and fails with the validation exit code when
/// there is at least one.
pub fn cmd_verify(ctx: &ProjectContext) -> Result<()> {
    let graph = load_config(ctx)?;
    let report = verify_graph(ctx, &graph, &ProviderRegistry::default());

    if report.is_valid() {
        println!(
            "Configuration is valid ({} resources).",
            graph.entries().len()
        );
        return Ok(());
    }

    print!("{}", report);
    Err(AgentformError::ValidationFailed(report.diagnostics.len()))
}
