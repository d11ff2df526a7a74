//! Implementation of the `agentform serve` command.

use super::{load_config, require_valid};
use crate::cli::ServeArgs;
use crate::context::ProjectContext;
use crate::deploy::RuntimeRegistry;
use crate::error::{AgentformError, Result};
use crate::provider::ProviderRegistry;
use crate::resource::{ResourceGraph, ResourceKind};
use crate::runtime::Runtime;

const DEFAULT_DEPLOYMENT: &str = "default";

/// Execute the `agentform serve` command. Blocks until interrupted.
pub fn cmd_serve(ctx: &ProjectContext, args: ServeArgs) -> Result<()> {
    let providers = ProviderRegistry::default();
    let graph = load_config(ctx)?;
    require_valid(ctx, &graph, &providers)?;

    let name = select_deployment(&graph, args.deployment.as_deref())?;
    let runtime = Runtime::build(&graph, ctx.base_dir(), &providers)?;
    let deployment = runtime.deployment(&name)?;

    let tasks: Vec<&str> = deployment.tasks.iter().map(|t| t.name()).collect();
    println!(
        "Serving deployment '{}' on port {} (tasks: {})",
        deployment.name,
        deployment.port,
        tasks.join(", ")
    );
    deployment.start(&RuntimeRegistry::default())
}

/// The requested deployment, else the only one, else `default`.
pub(super) fn select_deployment(graph: &ResourceGraph, requested: Option<&str>) -> Result<String> {
    if let Some(name) = requested {
        return Ok(name.to_string());
    }

    let names = graph.names(ResourceKind::Deployment);
    match names.as_slice() {
        [] => Err(AgentformError::UserError(
            "no deployments are declared".to_string(),
        )),
        [only] => Ok((*only).to_string()),
        _ if names.contains(&DEFAULT_DEPLOYMENT) => Ok(DEFAULT_DEPLOYMENT.to_string()),
        _ => Err(AgentformError::UserError(format!(
            "several deployments are declared ({}); name the one to serve",
            names.join(", ")
        ))),
    }
}
