//! Implementation of the `agentform destroy` command.

use crate::context::ProjectContext;
use crate::error::Result;
use crate::plan::{Plan, Snapshot, compute_plan, flatten};
use crate::state::StateStore;
use tracing::info;

/// Execute the `agentform destroy` command.
///
/// Prints the plan that deletes every applied resource, then removes the
/// state file. The configuration document is left alone.
pub fn cmd_destroy(ctx: &ProjectContext) -> Result<()> {
    let plan = destroy_state(ctx)?;
    print!("{}", plan);
    if !plan.is_empty() {
        println!("Destroy complete: {} resource(s) removed from state.", plan.to_delete.len());
    }
    Ok(())
}

pub(super) fn destroy_state(ctx: &ProjectContext) -> Result<Plan> {
    let store = StateStore::new(&ctx.state_path);
    let applied = store.load()?;
    let plan = compute_plan(&Snapshot::new(), &flatten(&applied));

    store.clear()?;
    info!(state = %ctx.state_path.display(), "state cleared");
    Ok(plan)
}
