//! Tasks: sequential hand-off through an ordered flow of agents.

use super::Agent;
use crate::error::{AgentformError, Result};
use serde::Serialize;
use std::fmt::Write as _;
use std::sync::Arc;
use tracing::debug;

/// Payload handed to every step after the first.
#[derive(Debug, Serialize)]
struct Envelope<'a> {
    previous_agent_output: &'a str,
    original_input: &'a str,
}

pub struct Task {
    name: String,
    description: String,
    flow: Vec<Arc<Agent>>,
    input_schema: toml::Table,
    output_schema: toml::Table,
    emit_trace: bool,
}

impl Task {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        flow: Vec<Arc<Agent>>,
    ) -> Result<Self> {
        let name = name.into();
        if flow.is_empty() {
            return Err(AgentformError::UserError(format!(
                "task.{}: flow must name at least one agent",
                name
            )));
        }
        Ok(Self {
            name,
            description: description.into(),
            flow,
            input_schema: toml::Table::new(),
            output_schema: toml::Table::new(),
            emit_trace: false,
        })
    }

    pub fn with_schemas(mut self, input_schema: toml::Table, output_schema: toml::Table) -> Self {
        self.input_schema = input_schema;
        self.output_schema = output_schema;
        self
    }

    /// Return every step's output instead of only the last one.
    pub fn with_trace(mut self, emit_trace: bool) -> Self {
        self.emit_trace = emit_trace;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn flow(&self) -> &[Arc<Agent>] {
        &self.flow
    }

    pub fn input_schema(&self) -> &toml::Table {
        &self.input_schema
    }

    pub fn output_schema(&self) -> &toml::Table {
        &self.output_schema
    }

    /// Instruction given to the final step of a multi-agent flow.
    ///
    /// Empty when the task declares no output schema.
    pub fn schema_instruction(&self) -> Result<String> {
        if self.output_schema.is_empty() {
            return Ok(String::new());
        }
        let schema = serde_json::to_string_pretty(&self.output_schema).map_err(|e| {
            AgentformError::UserError(format!(
                "task.{}: output_schema cannot be rendered as JSON: {}",
                self.name, e
            ))
        })?;
        Ok(format!(
            "Please structure your output to match the following schema:\n{}",
            schema
        ))
    }

    /// Run the flow on `input`.
    ///
    /// The first agent gets `input` unchanged. Every later agent gets a JSON
    /// envelope of the previous output and the original input; the last one
    /// of a multi-agent flow also gets the schema instruction. A one-agent
    /// flow is a direct call. Any model failure ends the run.
    pub fn run(&self, input: &str) -> Result<String> {
        let last = self.flow.len() - 1;
        let mut current = String::new();
        let mut trace = String::new();

        for (step, agent) in self.flow.iter().enumerate() {
            debug!(task = %self.name, step, agent = %agent.name(), "running step");

            current = if step == 0 {
                agent.message(input, None)?
            } else {
                let envelope = serde_json::to_string(&Envelope {
                    previous_agent_output: &current,
                    original_input: input,
                })
                .map_err(|e| AgentformError::UserError(format!("failed to encode envelope: {}", e)))?;

                if step == last {
                    let instruction = self.schema_instruction()?;
                    agent.message(&envelope, Some(&instruction))?
                } else {
                    agent.message(&envelope, None)?
                }
            };

            if self.emit_trace {
                let _ = write!(
                    trace,
                    "AGENT: {}\nMODEL: {}\n\n{}\n\n",
                    agent.name(),
                    agent.model(),
                    current
                );
            }
        }

        Ok(if self.emit_trace { trace } else { current })
    }
}

impl std::fmt::Debug for Task {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Task")
            .field("name", &self.name)
            .field(
                "flow",
                &self.flow.iter().map(|a| a.name()).collect::<Vec<_>>(),
            )
            .field("emit_trace", &self.emit_trace)
            .finish()
    }
}
