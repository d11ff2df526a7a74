//! Instantiation of a parsed graph into runtime objects.
//!
//! Objects are built leaves first (providers, llms, embeddings, memories,
//! tools, agents, tasks, deployments) and shared through `Arc`. Indirection
//! tokens in provider `api_key` and agent `prompt` are resolved here. Building
//! does not re-run verification; a dangling reference found while wiring is
//! reported as an error.

use crate::deploy::Deployment;
use crate::error::{AgentformError, Result};
use crate::indirection::Indirection;
use crate::memory::{Memory, build_memory};
use crate::pipeline::{Agent, Task, ToolBinding};
use crate::provider::{
    EmbeddingModel, LanguageModel, LlmSettings, ProviderClient, ProviderRegistry, ProviderSettings,
};
use crate::resource::{ResourceGraph, ResourceKind, ToolKind};
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;
use tracing::debug;

fn lookup<'m, T>(
    map: &'m BTreeMap<String, T>,
    owner: (ResourceKind, &str),
    field: &str,
    target_kind: ResourceKind,
    target: &str,
) -> Result<&'m T> {
    map.get(target).ok_or_else(|| {
        AgentformError::Unresolved(format!(
            "{}.{}: {} references unknown {} '{}'",
            owner.0, owner.1, field, target_kind, target
        ))
    })
}

/// Every runtime object built from one graph.
#[derive(Default)]
pub struct Runtime {
    pub providers: BTreeMap<String, Arc<dyn ProviderClient>>,
    pub llms: BTreeMap<String, Arc<dyn LanguageModel>>,
    pub embeddings: BTreeMap<String, Arc<dyn EmbeddingModel>>,
    pub memories: BTreeMap<String, Arc<dyn Memory>>,
    pub tools: BTreeMap<String, ToolBinding>,
    pub agents: BTreeMap<String, Arc<Agent>>,
    pub tasks: BTreeMap<String, Arc<Task>>,
    pub deployments: BTreeMap<String, Deployment>,
}

impl Runtime {
    /// Build every resource of `graph`. Relative `@file:` paths resolve
    /// against `base_dir`.
    pub fn build(
        graph: &ResourceGraph,
        base_dir: &Path,
        providers: &ProviderRegistry,
    ) -> Result<Self> {
        let vars = graph.vars.as_ref();
        let mut rt = Runtime::default();

        for (name, provider) in &graph.providers {
            let api_key = provider
                .api_key
                .as_deref()
                .map(|key| Indirection::parse(key).resolve(vars, base_dir))
                .transpose()?;
            let client = providers.connect(
                &provider.provider_type,
                ProviderSettings {
                    name: name.clone(),
                    api_key,
                    params: provider.params.clone(),
                },
            )?;
            rt.providers.insert(name.clone(), client);
        }

        for (name, llm) in &graph.llms {
            let owner = (ResourceKind::Llm, name.as_str());
            let client = lookup(
                &rt.providers,
                owner,
                "provider",
                ResourceKind::Provider,
                &llm.provider,
            )?;
            let model = client.language_model(LlmSettings {
                model: llm.model.clone(),
                temperature: llm.temperature,
                max_tokens: llm.max_tokens,
                params: llm.params.clone(),
            })?;
            rt.llms.insert(name.clone(), model);
        }

        for (name, embedding) in &graph.embeddings {
            let owner = (ResourceKind::Embedding, name.as_str());
            let client = lookup(
                &rt.providers,
                owner,
                "provider",
                ResourceKind::Provider,
                &embedding.provider,
            )?;
            let model = client.embedding_model(&embedding.model, &embedding.params)?;
            rt.embeddings.insert(name.clone(), model);
        }

        for (name, memory) in &graph.memories {
            let owner = (ResourceKind::Memory, name.as_str());
            let embedder = memory
                .embedding
                .as_deref()
                .map(|target| {
                    lookup(
                        &rt.embeddings,
                        owner,
                        "embedding",
                        ResourceKind::Embedding,
                        target,
                    )
                    .cloned()
                })
                .transpose()?;
            rt.memories
                .insert(name.clone(), build_memory(memory, embedder)?);
        }

        for (name, tool) in &graph.tools {
            let owner = (ResourceKind::Tool, name.as_str());
            let kind = ToolKind::from_str(&tool.tool_type).ok_or_else(|| {
                AgentformError::UnsupportedKind {
                    kind: ResourceKind::Tool.to_string(),
                    name: name.clone(),
                    field: "type".to_string(),
                    value: tool.tool_type.clone(),
                }
            })?;
            let memory = tool
                .memory()
                .map(|target| {
                    lookup(
                        &rt.memories,
                        owner,
                        "params.memory",
                        ResourceKind::Memory,
                        target,
                    )
                    .cloned()
                })
                .transpose()?;
            rt.tools.insert(
                name.clone(),
                ToolBinding {
                    name: name.clone(),
                    kind,
                    params: tool.params.clone(),
                    memory,
                },
            );
        }

        for (name, agent) in &graph.agents {
            let owner = (ResourceKind::Agent, name.as_str());
            let llm = lookup(&rt.llms, owner, "llm", ResourceKind::Llm, &agent.llm)?;
            let tools = agent
                .tools
                .iter()
                .map(|target| {
                    lookup(&rt.tools, owner, "tools", ResourceKind::Tool, target).cloned()
                })
                .collect::<Result<Vec<_>>>()?;
            let memory = agent
                .memory
                .as_deref()
                .map(|target| {
                    lookup(&rt.memories, owner, "memory", ResourceKind::Memory, target).cloned()
                })
                .transpose()?;
            let prompt = Indirection::parse(&agent.prompt).resolve(vars, base_dir)?;

            rt.agents.insert(
                name.clone(),
                Arc::new(
                    Agent::new(name.clone(), Arc::clone(llm))
                        .with_prompt(prompt)
                        .with_tools(tools)
                        .with_memory(memory),
                ),
            );
        }

        for (name, task) in &graph.tasks {
            let owner = (ResourceKind::Task, name.as_str());
            let flow = task
                .flow
                .iter()
                .map(|target| {
                    lookup(&rt.agents, owner, "flow", ResourceKind::Agent, target).cloned()
                })
                .collect::<Result<Vec<_>>>()?;

            let built = Task::new(name.clone(), task.description.clone(), flow)?
                .with_schemas(task.input_schema.clone(), task.output_schema.clone())
                .with_trace(task.emits_trace());
            rt.tasks.insert(name.clone(), Arc::new(built));
        }

        for (name, deployment) in &graph.deployments {
            let owner = (ResourceKind::Deployment, name.as_str());
            let tasks = deployment
                .exposed_tasks()
                .map(|target| {
                    lookup(&rt.tasks, owner, "expose", ResourceKind::Task, target).cloned()
                })
                .collect::<Result<Vec<_>>>()?;
            let port = u16::try_from(deployment.port)
                .ok()
                .filter(|port| *port != 0)
                .ok_or_else(|| {
                    AgentformError::UserError(format!(
                        "deployment.{}: port {} is not a valid TCP port",
                        name, deployment.port
                    ))
                })?;

            rt.deployments.insert(
                name.clone(),
                Deployment {
                    name: name.clone(),
                    runtime: deployment.runtime.clone(),
                    tasks,
                    port,
                },
            );
        }

        debug!(
            agents = rt.agents.len(),
            tasks = rt.tasks.len(),
            deployments = rt.deployments.len(),
            "runtime built"
        );
        Ok(rt)
    }

    pub fn task(&self, name: &str) -> Result<&Arc<Task>> {
        self.tasks.get(name).ok_or_else(|| {
            AgentformError::UserError(format!(
                "no task named '{}' (declared: {})",
                name,
                self.tasks.keys().cloned().collect::<Vec<_>>().join(", ")
            ))
        })
    }

    pub fn deployment(&self, name: &str) -> Result<&Deployment> {
        self.deployments.get(name).ok_or_else(|| {
            AgentformError::UserError(format!("no deployment named '{}'", name))
        })
    }
}
