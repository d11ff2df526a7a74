//! Typed resource model.
//!
//! A configuration document declares named resources of a fixed set of kinds.
//! Each kind has an explicit struct with its first-class fields plus a
//! [`Params`] bag holding every key the kind does not recognize. Params are
//! passed through untouched and only interpreted by the component that reads
//! a particular key.
//!
//! Identity across runs is the pair (kind, name); resources are rebuilt from
//! scratch on every parse.

mod kinds;


pub use kinds::{
    Agent, Deployment, Embedding, Llm, Memory, Provider, Task, Tool, ToolKind, Vars,
    DEFAULT_TEMPERATURE, TASK_REFERENCE_PREFIX,
};

use std::collections::BTreeMap;
use std::fmt;

/// Passthrough parameters, in document order.
pub type Params = toml::Table;

/// The resource kinds the document parser recognizes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ResourceKind {
    Provider,
    Llm,
    Embedding,
    Memory,
    Tool,
    Agent,
    Task,
    Deployment,
    Vars,
}

impl ResourceKind {
    /// Every kind, in dependency order (leaves first).
    pub const ALL: [ResourceKind; 9] = [
        ResourceKind::Provider,
        ResourceKind::Llm,
        ResourceKind::Embedding,
        ResourceKind::Memory,
        ResourceKind::Tool,
        ResourceKind::Agent,
        ResourceKind::Task,
        ResourceKind::Deployment,
        ResourceKind::Vars,
    ];

    /// The document section name for this kind.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Provider => "provider",
            ResourceKind::Llm => "llm",
            ResourceKind::Embedding => "embedding",
            ResourceKind::Memory => "memory",
            ResourceKind::Tool => "tool",
            ResourceKind::Agent => "agent",
            ResourceKind::Task => "task",
            ResourceKind::Deployment => "deployment",
            ResourceKind::Vars => "vars",
        }
    }

    /// Look up a kind by its section name.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.as_str() == s)
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Common behavior of every named resource.
pub trait Resource {
    /// The kind this record belongs to.
    const KIND: ResourceKind;

    /// The resource name, unique within its kind.
    fn name(&self) -> &str;

    /// The resource as a plain attribute table, without its name.
    ///
    /// Absent optional fields are omitted; a non-empty params bag appears as
    /// a nested `params` table.
    fn attributes(&self) -> toml::Table;
}

/// A fully parsed configuration: every recognized kind mapped by name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ResourceGraph {
    pub providers: BTreeMap<String, Provider>,
    pub llms: BTreeMap<String, Llm>,
    pub embeddings: BTreeMap<String, Embedding>,
    pub memories: BTreeMap<String, Memory>,
    pub tools: BTreeMap<String, Tool>,
    pub agents: BTreeMap<String, Agent>,
    pub tasks: BTreeMap<String, Task>,
    pub deployments: BTreeMap<String, Deployment>,
    /// The singleton `[vars]` section, if declared.
    pub vars: Option<Vars>,
}

impl ResourceGraph {
    /// True when no resource of any kind is declared.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
            && self.llms.is_empty()
            && self.embeddings.is_empty()
            && self.memories.is_empty()
            && self.tools.is_empty()
            && self.agents.is_empty()
            && self.tasks.is_empty()
            && self.deployments.is_empty()
            && self.vars.is_none()
    }

    /// Whether a resource of `kind` named `name` exists.
    pub fn contains(&self, kind: ResourceKind, name: &str) -> bool {
        match kind {
            ResourceKind::Provider => self.providers.contains_key(name),
            ResourceKind::Llm => self.llms.contains_key(name),
            ResourceKind::Embedding => self.embeddings.contains_key(name),
            ResourceKind::Memory => self.memories.contains_key(name),
            ResourceKind::Tool => self.tools.contains_key(name),
            ResourceKind::Agent => self.agents.contains_key(name),
            ResourceKind::Task => self.tasks.contains_key(name),
            ResourceKind::Deployment => self.deployments.contains_key(name),
            ResourceKind::Vars => self.vars.is_some() && name == "vars",
        }
    }

    /// Names declared for a kind, sorted. `vars` reports its synthetic key.
    pub fn names(&self, kind: ResourceKind) -> Vec<&str> {
        fn keys<T>(map: &BTreeMap<String, T>) -> Vec<&str> {
            map.keys().map(String::as_str).collect()
        }

        match kind {
            ResourceKind::Provider => keys(&self.providers),
            ResourceKind::Llm => keys(&self.llms),
            ResourceKind::Embedding => keys(&self.embeddings),
            ResourceKind::Memory => keys(&self.memories),
            ResourceKind::Tool => keys(&self.tools),
            ResourceKind::Agent => keys(&self.agents),
            ResourceKind::Task => keys(&self.tasks),
            ResourceKind::Deployment => keys(&self.deployments),
            ResourceKind::Vars => self.vars.iter().map(|_| "vars").collect(),
        }
    }

    /// Every named (non-singleton) resource as `(kind, name, attributes)`.
    ///
    /// The `vars` singleton is not part of this listing.
    pub fn entries(&self) -> Vec<(ResourceKind, &str, toml::Table)> {
        fn collect<'a, R: Resource>(
            out: &mut Vec<(ResourceKind, &'a str, toml::Table)>,
            map: &'a BTreeMap<String, R>,
        ) {
            out.extend(
                map.iter()
                    .map(|(name, resource)| (R::KIND, name.as_str(), resource.attributes())),
            );
        }

        let mut out = Vec::new();
        collect(&mut out, &self.providers);
        collect(&mut out, &self.llms);
        collect(&mut out, &self.embeddings);
        collect(&mut out, &self.memories);
        collect(&mut out, &self.tools);
        collect(&mut out, &self.agents);
        collect(&mut out, &self.tasks);
        collect(&mut out, &self.deployments);
        out
    }

    /// Look up a `[vars]` value.
    pub fn var(&self, key: &str) -> Option<&str> {
        self.vars
            .as_ref()
            .and_then(|vars| vars.values.get(key))
            .map(String::as_str)
    }
}
