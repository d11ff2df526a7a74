//! Implementation of the `agentform show` command.

use super::load_config;
use crate::context::ProjectContext;
use crate::error::Result;
use crate::resource::{ResourceGraph, ResourceKind};
use std::collections::BTreeMap;
use std::fmt::Write;

const PROMPT_PREVIEW: usize = 40;

/// Execute the `agentform show` command.
pub fn cmd_show(ctx: &ProjectContext) -> Result<()> {
    let graph = load_config(ctx)?;
    print!("{}", render_tree(&graph));
    Ok(())
}

/// One section per declared kind, one line per resource.
///
/// `vars` lists keys only.
pub(super) fn render_tree(graph: &ResourceGraph) -> String {
    let mut out = String::new();

    section(&mut out, ResourceKind::Provider, &graph.providers, |p| {
        format!("(type={})", p.provider_type)
    });
    section(&mut out, ResourceKind::Llm, &graph.llms, |l| {
        format!("(provider={}, model={})", l.provider, l.model)
    });
    section(&mut out, ResourceKind::Embedding, &graph.embeddings, |e| {
        format!("(provider={}, model={})", e.provider, e.model)
    });
    section(&mut out, ResourceKind::Memory, &graph.memories, |m| {
        format!("(type={})", m.memory_type)
    });
    section(&mut out, ResourceKind::Tool, &graph.tools, |t| {
        format!("(type={})", t.tool_type)
    });
    section(&mut out, ResourceKind::Agent, &graph.agents, |a| {
        format!(
            "(llm={}, prompt={}, tools=[{}])",
            a.llm,
            preview(&a.prompt),
            a.tools.join(", ")
        )
    });
    section(&mut out, ResourceKind::Task, &graph.tasks, |t| {
        format!("({})", t.description)
    });
    section(&mut out, ResourceKind::Deployment, &graph.deployments, |d| {
        format!(
            "(port={}, tasks=[{}], runtime={})",
            d.port,
            d.expose.join(", "),
            d.runtime
        )
    });

    if let Some(vars) = &graph.vars {
        let keys: BTreeMap<&String, ()> = vars.values.keys().map(|k| (k, ())).collect();
        section(&mut out, ResourceKind::Vars, &keys, |_| String::new());
    }

    out
}

fn section<K: AsRef<str>, R>(
    out: &mut String,
    kind: ResourceKind,
    resources: &BTreeMap<K, R>,
    summarize: impl Fn(&R) -> String,
) {
    if resources.is_empty() {
        return;
    }

    let _ = writeln!(out, "{}", kind.as_str().to_uppercase());
    let last = resources.len() - 1;
    for (index, (name, resource)) in resources.iter().enumerate() {
        let branch = if index == last { "└─" } else { "├─" };
        let summary = summarize(resource);
        if summary.is_empty() {
            let _ = writeln!(out, "{} {}", branch, name.as_ref());
        } else {
            let _ = writeln!(out, "{} {} {}", branch, name.as_ref(), summary);
        }
    }
    let _ = writeln!(out);
}

/// First line of a prompt, shortened for display.
fn preview(prompt: &str) -> String {
    let line = prompt.lines().next().unwrap_or_default();
    if line.chars().count() > PROMPT_PREVIEW {
        let cut: String = line.chars().take(PROMPT_PREVIEW).collect();
        format!("{}...", cut)
    } else {
        line.to_string()
    }
}
