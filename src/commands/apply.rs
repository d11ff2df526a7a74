//! Implementation of the `agentform apply` command.
//!
//! Apply verifies the document, prints the plan, instantiates every resource
//! to prove that indirections and kinds resolve, and only then records the
//! document as the applied state. Nothing is recorded when the plan is empty.

use super::plan::pending_plan;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::plan::Plan;
use crate::provider::ProviderRegistry;
use crate::runtime::Runtime;
use crate::state::StateStore;
use tracing::info;

/// Execute the `agentform apply` command.
pub fn cmd_apply(ctx: &ProjectContext) -> Result<()> {
    let plan = apply_with(ctx, &ProviderRegistry::default())?;
    if !plan.is_empty() {
        println!("Apply complete: {}.", plan.summary());
    }
    Ok(())
}

pub(super) fn apply_with(ctx: &ProjectContext, providers: &ProviderRegistry) -> Result<Plan> {
    let (graph, plan) = pending_plan(ctx, providers)?;
    print!("{}", plan);
    if plan.is_empty() {
        return Ok(plan);
    }

    Runtime::build(&graph, ctx.base_dir(), providers)?;

    StateStore::new(&ctx.state_path).save(&graph)?;
    info!(
        state = %ctx.state_path.display(),
        summary = %plan.summary(),
        "applied"
    );
    Ok(plan)
}
