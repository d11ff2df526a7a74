//! Implementation of the `agentform plan` command.

use super::{load_config, require_valid};
use crate::context::ProjectContext;
use crate::error::Result;
use crate::plan::{Plan, compute_plan, flatten};
use crate::provider::ProviderRegistry;
use crate::resource::ResourceGraph;
use crate::state::StateStore;

/// Execute the `agentform plan` command.
pub fn cmd_plan(ctx: &ProjectContext) -> Result<()> {
    let (_, plan) = pending_plan(ctx, &ProviderRegistry::default())?;
    print!("{}", plan);
    Ok(())
}

/// Load and verify the configuration, then diff it against applied state.
pub(super) fn pending_plan(
    ctx: &ProjectContext,
    providers: &ProviderRegistry,
) -> Result<(ResourceGraph, Plan)> {
    let graph = load_config(ctx)?;
    require_valid(ctx, &graph, providers)?;

    let previous = StateStore::new(&ctx.state_path).load()?;
    let plan = compute_plan(&flatten(&graph), &flatten(&previous));
    Ok((graph, plan))
}
