//! Implementation of the `agentform run` command.

use super::{load_config, require_valid};
use crate::cli::RunArgs;
use crate::context::ProjectContext;
use crate::error::{AgentformError, Result};
use crate::provider::ProviderRegistry;
use crate::runtime::Runtime;
use tracing::{debug, info};

/// Execute the `agentform run` command: run one task and print its output.
pub fn cmd_run(ctx: &ProjectContext, args: RunArgs) -> Result<()> {
    let input = read_input(&args)?;
    let output = run_task(ctx, &args.task, &input, &ProviderRegistry::default())?;
    println!("{}", output);
    Ok(())
}

pub(super) fn run_task(
    ctx: &ProjectContext,
    task: &str,
    input: &str,
    providers: &ProviderRegistry,
) -> Result<String> {
    let graph = load_config(ctx)?;
    require_valid(ctx, &graph, providers)?;

    let runtime = Runtime::build(&graph, ctx.base_dir(), providers)?;
    let task = runtime.task(task)?;
    info!(
        task = %task.name(),
        description = %task.description(),
        agents = task.flow().len(),
        "running task"
    );
    if !task.input_schema().is_empty() {
        let fields: Vec<&str> = task.input_schema().keys().map(String::as_str).collect();
        debug!(task = %task.name(), ?fields, "task declares an input schema");
    }
    task.run(input)
}

fn read_input(args: &RunArgs) -> Result<String> {
    if let Some(input) = &args.input {
        return Ok(input.clone());
    }
    if let Some(path) = &args.input_file {
        return std::fs::read_to_string(path).map_err(|e| {
            AgentformError::Io(format!(
                "failed to read input file '{}': {}",
                path.display(),
                e
            ))
        });
    }
    Err(AgentformError::UserError(
        "no task input given; pass --input <TEXT> or --input-file <FILE>".to_string(),
    ))
}
