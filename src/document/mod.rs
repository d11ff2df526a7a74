//! Configuration document parsing and rendering.
//!
//! The document is a TOML table of tables: `[<kind>.<name>]` blocks for every
//! named resource plus a singleton `[vars]` section. Parsing dispatches each
//! recognized section to a per-kind mapper that checks required fields and
//! primitive types, and collects every unrecognized key into `params`.
//!
//! Sections with unknown names are ignored so newer documents can still be
//! read. Parsing never returns a partial graph: the first malformed resource
//! fails the whole parse.
//!
//! Indirection tokens (`@file:`, `@var:`, `@env:`) are kept verbatim here and
//! resolved later by [`crate::indirection`].

mod fields;


pub(crate) use fields::type_name;

use crate::error::{AgentformError, Result};
use crate::resource::{
    Agent, DEFAULT_TEMPERATURE, Deployment, Embedding, Llm, Memory, Provider, ResourceGraph,
    ResourceKind, Task, Tool, Vars,
};
use fields::Fields;
use std::collections::BTreeMap;
use std::path::Path;
use toml::Value;
use tracing::debug;

/// Per-kind mapping from a raw block to a typed record.
trait FromFields: Sized {
    /// Keys consumed as first-class fields; everything else goes to `params`.
    const KNOWN_KEYS: &'static [&'static str];

    fn from_fields(fields: &Fields<'_>) -> Result<Self>;
}

impl FromFields for Provider {
    const KNOWN_KEYS: &'static [&'static str] = &["type", "api_key"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Provider {
            name: fields.name(),
            provider_type: fields.required_str("type")?,
            api_key: fields.optional_str("api_key")?,
            params: fields.params(Self::KNOWN_KEYS),
        })
    }
}

impl FromFields for Llm {
    const KNOWN_KEYS: &'static [&'static str] = &["provider", "model", "temperature", "max_tokens"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Llm {
            name: fields.name(),
            provider: fields.required_str("provider")?,
            model: fields.required_str("model")?,
            temperature: fields
                .optional_number("temperature")?
                .unwrap_or(DEFAULT_TEMPERATURE),
            max_tokens: fields.optional_int("max_tokens")?,
            params: fields.params(Self::KNOWN_KEYS),
        })
    }
}

impl FromFields for Embedding {
    const KNOWN_KEYS: &'static [&'static str] = &["provider", "model"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Embedding {
            name: fields.name(),
            provider: fields.required_str("provider")?,
            model: fields.required_str("model")?,
            params: fields.params(Self::KNOWN_KEYS),
        })
    }
}

impl FromFields for Memory {
    const KNOWN_KEYS: &'static [&'static str] = &["type", "persist", "namespace", "embedding"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Memory {
            name: fields.name(),
            memory_type: fields.required_str("type")?,
            persist: fields.optional_bool("persist")?.unwrap_or(false),
            namespace: fields.optional_str("namespace")?,
            embedding: fields.optional_str("embedding")?,
            params: fields.params(Self::KNOWN_KEYS),
        })
    }
}

impl FromFields for Tool {
    const KNOWN_KEYS: &'static [&'static str] = &["type"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Tool {
            name: fields.name(),
            tool_type: fields.required_str("type")?,
            params: fields.params(Self::KNOWN_KEYS),
        })
    }
}

impl FromFields for Agent {
    const KNOWN_KEYS: &'static [&'static str] = &["prompt", "llm", "tools", "memory"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Agent {
            name: fields.name(),
            prompt: fields.required_str("prompt")?,
            llm: fields.required_str("llm")?,
            tools: fields.optional_list("tools")?.unwrap_or_default(),
            memory: fields.optional_str("memory")?,
            params: fields.params(Self::KNOWN_KEYS),
        })
    }
}

impl FromFields for Task {
    const KNOWN_KEYS: &'static [&'static str] =
        &["description", "flow", "input_schema", "output_schema"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Task {
            name: fields.name(),
            description: fields.required_str("description")?,
            flow: fields.required_list("flow")?,
            input_schema: fields.optional_table("input_schema")?.unwrap_or_default(),
            output_schema: fields.optional_table("output_schema")?.unwrap_or_default(),
            params: fields.params(Self::KNOWN_KEYS),
        })
    }
}

impl FromFields for Deployment {
    const KNOWN_KEYS: &'static [&'static str] = &["runtime", "expose", "port"];

    fn from_fields(fields: &Fields<'_>) -> Result<Self> {
        Ok(Deployment {
            name: fields.name(),
            runtime: fields.required_str("runtime")?,
            expose: fields.required_list("expose")?,
            port: fields.required_int("port")?,
            params: fields.params(Self::KNOWN_KEYS),
        })
    }
}

fn parse_section<R: FromFields>(
    kind: ResourceKind,
    blocks: &toml::Table,
    out: &mut BTreeMap<String, R>,
) -> Result<()> {
    for (name, block) in blocks {
        let table = block.as_table().ok_or_else(|| {
            AgentformError::Document(format!(
                "{}.{} must be a table, found {}",
                kind,
                name,
                type_name(block)
            ))
        })?;
        let resource = R::from_fields(&Fields::new(kind, name, table))?;
        out.insert(name.clone(), resource);
    }
    Ok(())
}

fn parse_vars(section: &toml::Table) -> Result<Vars> {
    let values = section
        .iter()
        .map(|(key, value)| match value {
            Value::String(s) => Ok((key.clone(), s.clone())),
            other => Err(AgentformError::InvalidFieldType {
                kind: ResourceKind::Vars.to_string(),
                name: "vars".to_string(),
                field: key.clone(),
                expected: "string",
                actual: type_name(other),
            }),
        })
        .collect::<Result<BTreeMap<_, _>>>()?;
    Ok(Vars { values })
}

/// Parse a configuration document into a resource graph.
pub fn parse_document(text: &str) -> Result<ResourceGraph> {
    let doc: toml::Table =
        toml::from_str(text).map_err(|e| AgentformError::Document(e.to_string()))?;

    let mut graph = ResourceGraph::default();

    for (section, value) in &doc {
        let Some(kind) = ResourceKind::from_str(section) else {
            debug!(section = %section, "ignoring unrecognized section");
            continue;
        };

        let blocks = value.as_table().ok_or_else(|| {
            AgentformError::Document(format!(
                "section '{}' must be a table, found {}",
                section,
                type_name(value)
            ))
        })?;

        match kind {
            ResourceKind::Provider => parse_section(kind, blocks, &mut graph.providers)?,
            ResourceKind::Llm => parse_section(kind, blocks, &mut graph.llms)?,
            ResourceKind::Embedding => parse_section(kind, blocks, &mut graph.embeddings)?,
            ResourceKind::Memory => parse_section(kind, blocks, &mut graph.memories)?,
            ResourceKind::Tool => parse_section(kind, blocks, &mut graph.tools)?,
            ResourceKind::Agent => parse_section(kind, blocks, &mut graph.agents)?,
            ResourceKind::Task => parse_section(kind, blocks, &mut graph.tasks)?,
            ResourceKind::Deployment => parse_section(kind, blocks, &mut graph.deployments)?,
            ResourceKind::Vars => graph.vars = Some(parse_vars(blocks)?),
        }
    }

    Ok(graph)
}

/// Read and parse a configuration document from disk.
pub fn parse_file<P: AsRef<Path>>(path: P) -> Result<ResourceGraph> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| {
        AgentformError::Io(format!(
            "failed to read configuration document '{}': {}",
            path.display(),
            e
        ))
    })?;
    debug!(path = %path.display(), "parsing configuration document");
    parse_document(&text)
}

/// Render a graph back into the document format.
///
/// Params are written inline with the first-class fields so that parsing
/// the output reproduces the same records. The `[vars]` section is never
/// rendered.
pub fn render_document(graph: &ResourceGraph) -> Result<String> {
    let mut sections: BTreeMap<ResourceKind, toml::Table> = BTreeMap::new();

    for (kind, name, mut block) in graph.entries() {
        if let Some(Value::Table(params)) = block.remove("params") {
            block.extend(params);
        }
        sections
            .entry(kind)
            .or_default()
            .insert(name.to_string(), Value::Table(block));
    }

    let doc: toml::Table = sections
        .into_iter()
        .map(|(kind, blocks)| (kind.as_str().to_string(), Value::Table(blocks)))
        .collect();

    toml::to_string(&doc)
        .map_err(|e| AgentformError::Document(format!("failed to render document: {}", e)))
}
