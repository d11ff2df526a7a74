//! One record per resource kind.

use super::{Params, Resource, ResourceKind};
use std::collections::BTreeMap;
use toml::Value;

/// Sampling temperature used when an `llm` block does not set one.
pub const DEFAULT_TEMPERATURE: f64 = 0.7;

/// Prefix of deployment `expose` entries (`task.<name>`).
pub const TASK_REFERENCE_PREFIX: &str = "task.";

fn string_list(items: &[String]) -> Value {
    Value::Array(items.iter().cloned().map(Value::String).collect())
}

fn insert_optional(table: &mut toml::Table, key: &str, value: Option<Value>) {
    if let Some(value) = value {
        table.insert(key.to_string(), value);
    }
}

fn insert_params(table: &mut toml::Table, params: &Params) {
    if !params.is_empty() {
        table.insert("params".to_string(), Value::Table(params.clone()));
    }
}

/// A model vendor account.
#[derive(Debug, Clone, PartialEq)]
pub struct Provider {
    pub name: String,
    pub provider_type: String,
    /// May be an indirection token (`@var:`, `@env:`), resolved at instantiation.
    pub api_key: Option<String>,
    pub params: Params,
}

impl Resource for Provider {
    const KIND: ResourceKind = ResourceKind::Provider;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("type".to_string(), Value::String(self.provider_type.clone()));
        insert_optional(&mut table, "api_key", self.api_key.clone().map(Value::String));
        insert_params(&mut table, &self.params);
        table
    }
}

/// A language model served by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Llm {
    pub name: String,
    pub provider: String,
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<i64>,
    pub params: Params,
}

impl Resource for Llm {
    const KIND: ResourceKind = ResourceKind::Llm;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("provider".to_string(), Value::String(self.provider.clone()));
        table.insert("model".to_string(), Value::String(self.model.clone()));
        table.insert("temperature".to_string(), Value::Float(self.temperature));
        insert_optional(&mut table, "max_tokens", self.max_tokens.map(Value::Integer));
        insert_params(&mut table, &self.params);
        table
    }
}

/// An embedding model served by a provider.
#[derive(Debug, Clone, PartialEq)]
pub struct Embedding {
    pub name: String,
    pub provider: String,
    pub model: String,
    pub params: Params,
}

impl Resource for Embedding {
    const KIND: ResourceKind = ResourceKind::Embedding;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("provider".to_string(), Value::String(self.provider.clone()));
        table.insert("model".to_string(), Value::String(self.model.clone()));
        insert_params(&mut table, &self.params);
        table
    }
}

/// A vector memory store.
#[derive(Debug, Clone, PartialEq)]
pub struct Memory {
    pub name: String,
    pub memory_type: String,
    pub persist: bool,
    pub namespace: Option<String>,
    pub embedding: Option<String>,
    pub params: Params,
}

impl Resource for Memory {
    const KIND: ResourceKind = ResourceKind::Memory;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("type".to_string(), Value::String(self.memory_type.clone()));
        table.insert("persist".to_string(), Value::Boolean(self.persist));
        insert_optional(&mut table, "namespace", self.namespace.clone().map(Value::String));
        insert_optional(&mut table, "embedding", self.embedding.clone().map(Value::String));
        insert_params(&mut table, &self.params);
        table
    }
}

/// The fixed set of tool types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ToolKind {
    Function,
    Api,
    VectorLookup,
}

impl ToolKind {
    pub const ALL: [ToolKind; 3] = [ToolKind::Function, ToolKind::Api, ToolKind::VectorLookup];

    pub fn as_str(&self) -> &'static str {
        match self {
            ToolKind::Function => "function",
            ToolKind::Api => "api",
            ToolKind::VectorLookup => "vector_lookup",
        }
    }

    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

/// An external capability an agent may use.
#[derive(Debug, Clone, PartialEq)]
pub struct Tool {
    pub name: String,
    /// Kept as written; checked against [`ToolKind`] at verify time.
    pub tool_type: String,
    pub params: Params,
}

impl Tool {
    /// The memory this tool reads from (`params.memory`), if any.
    pub fn memory(&self) -> Option<&str> {
        self.params.get("memory").and_then(Value::as_str)
    }
}

impl Resource for Tool {
    const KIND: ResourceKind = ResourceKind::Tool;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("type".to_string(), Value::String(self.tool_type.clone()));
        insert_params(&mut table, &self.params);
        table
    }
}

/// A persona bound to a language model.
#[derive(Debug, Clone, PartialEq)]
pub struct Agent {
    pub name: String,
    /// Literal system prompt, or an `@file:` indirection.
    pub prompt: String,
    pub llm: String,
    pub tools: Vec<String>,
    pub memory: Option<String>,
    pub params: Params,
}

impl Resource for Agent {
    const KIND: ResourceKind = ResourceKind::Agent;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("prompt".to_string(), Value::String(self.prompt.clone()));
        table.insert("llm".to_string(), Value::String(self.llm.clone()));
        table.insert("tools".to_string(), string_list(&self.tools));
        insert_optional(&mut table, "memory", self.memory.clone().map(Value::String));
        insert_params(&mut table, &self.params);
        table
    }
}

/// An ordered hand-off of work between agents.
#[derive(Debug, Clone, PartialEq)]
pub struct Task {
    pub name: String,
    pub description: String,
    pub flow: Vec<String>,
    pub input_schema: toml::Table,
    pub output_schema: toml::Table,
    pub params: Params,
}

impl Task {
    /// Whether every step's output should be returned (`params.output_intermediate`).
    pub fn emits_trace(&self) -> bool {
        self.params
            .get("output_intermediate")
            .and_then(Value::as_bool)
            .unwrap_or(false)
    }
}

impl Resource for Task {
    const KIND: ResourceKind = ResourceKind::Task;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert(
            "description".to_string(),
            Value::String(self.description.clone()),
        );
        table.insert("flow".to_string(), string_list(&self.flow));
        table.insert(
            "input_schema".to_string(),
            Value::Table(self.input_schema.clone()),
        );
        table.insert(
            "output_schema".to_string(),
            Value::Table(self.output_schema.clone()),
        );
        insert_params(&mut table, &self.params);
        table
    }
}

/// Hosting configuration exposing tasks over a runtime.
#[derive(Debug, Clone, PartialEq)]
pub struct Deployment {
    pub name: String,
    pub runtime: String,
    /// `task.<name>` references.
    pub expose: Vec<String>,
    /// Kept as written; range-checked at verify time.
    pub port: i64,
    pub params: Params,
}

impl Deployment {
    /// Exposed task names with the `task.` prefix removed.
    ///
    /// Entries without the prefix are skipped.
    pub fn exposed_tasks(&self) -> impl Iterator<Item = &str> {
        self.expose
            .iter()
            .filter_map(|entry| entry.strip_prefix(TASK_REFERENCE_PREFIX))
    }
}

impl Resource for Deployment {
    const KIND: ResourceKind = ResourceKind::Deployment;

    fn name(&self) -> &str {
        &self.name
    }

    fn attributes(&self) -> toml::Table {
        let mut table = toml::Table::new();
        table.insert("runtime".to_string(), Value::String(self.runtime.clone()));
        table.insert("expose".to_string(), string_list(&self.expose));
        table.insert("port".to_string(), Value::Integer(self.port));
        insert_params(&mut table, &self.params);
        table
    }
}

/// The `[vars]` singleton: secrets and substitutions for `@var:` lookups.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Vars {
    pub values: BTreeMap<String, String>,
}
