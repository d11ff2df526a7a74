//! Per-kind rule sets.

use super::{Diagnostic, VerifyOptions, Violation};
use crate::indirection::Indirection;
use crate::resource::{ResourceGraph, ResourceKind, TASK_REFERENCE_PREFIX, ToolKind};

const MAX_PORT: i64 = 65535;

pub(super) struct Checker<'a> {
    graph: &'a ResourceGraph,
    options: &'a VerifyOptions,
    out: &'a mut Vec<Diagnostic>,
}

impl<'a> Checker<'a> {
    pub(super) fn new(
        graph: &'a ResourceGraph,
        options: &'a VerifyOptions,
        out: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            graph,
            options,
            out,
        }
    }

    fn report(&mut self, kind: ResourceKind, name: &str, violation: Violation) {
        self.out.push(Diagnostic {
            kind,
            name: name.to_string(),
            violation,
        });
    }

    fn reference(
        &mut self,
        kind: ResourceKind,
        name: &str,
        field: &str,
        target_kind: ResourceKind,
        target: &str,
    ) {
        if !self.graph.contains(target_kind, target) {
            self.report(
                kind,
                name,
                Violation::DanglingReference {
                    field: field.to_string(),
                    target_kind,
                    target: target.to_string(),
                },
            );
        }
    }

    fn supported(
        &mut self,
        kind: ResourceKind,
        name: &str,
        field: &str,
        value: &str,
        supported: &[String],
    ) {
        if !supported.iter().any(|s| s == value) {
            self.report(
                kind,
                name,
                Violation::UnsupportedKind {
                    field: field.to_string(),
                    value: value.to_string(),
                    supported: supported.to_vec(),
                },
            );
        }
    }

    pub(super) fn providers(&mut self) {
        let graph = self.graph;
        for (name, provider) in &graph.providers {
            self.supported(
                ResourceKind::Provider,
                name,
                "type",
                &provider.provider_type,
                &self.options.provider_kinds,
            );
        }
    }

    pub(super) fn llms(&mut self) {
        let graph = self.graph;
        for (name, llm) in &graph.llms {
            self.reference(
                ResourceKind::Llm,
                name,
                "provider",
                ResourceKind::Provider,
                &llm.provider,
            );
        }
    }

    pub(super) fn embeddings(&mut self) {
        let graph = self.graph;
        for (name, embedding) in &graph.embeddings {
            self.reference(
                ResourceKind::Embedding,
                name,
                "provider",
                ResourceKind::Provider,
                &embedding.provider,
            );
        }
    }

    pub(super) fn memories(&mut self) {
        let graph = self.graph;
        for (name, memory) in &graph.memories {
            if let Some(embedding) = &memory.embedding {
                self.reference(
                    ResourceKind::Memory,
                    name,
                    "embedding",
                    ResourceKind::Embedding,
                    embedding,
                );
            }
        }
    }

    pub(super) fn tools(&mut self) {
        let graph = self.graph;
        let tool_kinds: Vec<String> = ToolKind::ALL
            .iter()
            .map(|kind| kind.as_str().to_string())
            .collect();

        for (name, tool) in &graph.tools {
            self.supported(ResourceKind::Tool, name, "type", &tool.tool_type, &tool_kinds);
            if let Some(memory) = tool.memory() {
                self.reference(
                    ResourceKind::Tool,
                    name,
                    "params.memory",
                    ResourceKind::Memory,
                    memory,
                );
            }
        }
    }

    pub(super) fn agents(&mut self) {
        let graph = self.graph;
        for (name, agent) in &graph.agents {
            self.reference(ResourceKind::Agent, name, "llm", ResourceKind::Llm, &agent.llm);

            for (index, tool) in agent.tools.iter().enumerate() {
                self.reference(
                    ResourceKind::Agent,
                    name,
                    &format!("tools[{}]", index),
                    ResourceKind::Tool,
                    tool,
                );
            }

            if let Some(memory) = &agent.memory {
                self.reference(
                    ResourceKind::Agent,
                    name,
                    "memory",
                    ResourceKind::Memory,
                    memory,
                );
            }

            if let Some(path) = Indirection::parse(&agent.prompt).file_path(&self.options.base_dir)
                && !path.is_file()
            {
                self.report(
                    ResourceKind::Agent,
                    name,
                    Violation::MissingPromptFile { path },
                );
            }
        }
    }

    pub(super) fn tasks(&mut self) {
        let graph = self.graph;
        for (name, task) in &graph.tasks {
            if task.flow.is_empty() {
                self.report(ResourceKind::Task, name, Violation::EmptyFlow);
            }
            for (index, agent) in task.flow.iter().enumerate() {
                self.reference(
                    ResourceKind::Task,
                    name,
                    &format!("flow[{}]", index),
                    ResourceKind::Agent,
                    agent,
                );
            }
        }
    }

    pub(super) fn deployments(&mut self) {
        let graph = self.graph;
        for (name, deployment) in &graph.deployments {
            self.supported(
                ResourceKind::Deployment,
                name,
                "runtime",
                &deployment.runtime,
                &self.options.runtime_kinds,
            );

            if !(1..=MAX_PORT).contains(&deployment.port) {
                self.report(
                    ResourceKind::Deployment,
                    name,
                    Violation::InvalidPort(deployment.port),
                );
            }

            for (index, entry) in deployment.expose.iter().enumerate() {
                match entry.strip_prefix(TASK_REFERENCE_PREFIX) {
                    Some(task) => self.reference(
                        ResourceKind::Deployment,
                        name,
                        &format!("expose[{}]", index),
                        ResourceKind::Task,
                        task,
                    ),
                    None => self.report(
                        ResourceKind::Deployment,
                        name,
                        Violation::MalformedExpose(entry.clone()),
                    ),
                }
            }
        }
    }
}
