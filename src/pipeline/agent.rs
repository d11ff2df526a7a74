//! Agents: a persona bound to a language model.

use crate::error::Result;
use crate::memory::Memory;
use crate::provider::LanguageModel;
use crate::resource::{Params, ToolKind};
use std::fmt;
use std::sync::Arc;
use tracing::debug;

/// A tool made available to an agent. Invocation is left to the model
/// integration; the binding only carries the declaration.
#[derive(Clone)]
pub struct ToolBinding {
    pub name: String,
    pub kind: ToolKind,
    pub params: Params,
    pub memory: Option<Arc<dyn Memory>>,
}

impl fmt::Debug for ToolBinding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolBinding")
            .field("name", &self.name)
            .field("kind", &self.kind)
            .field("params", &self.params)
            .field("memory", &self.memory.is_some())
            .finish()
    }
}

pub struct Agent {
    name: String,
    prompt: Option<String>,
    llm: Arc<dyn LanguageModel>,
    tools: Vec<ToolBinding>,
    memory: Option<Arc<dyn Memory>>,
}

impl Agent {
    pub fn new(name: impl Into<String>, llm: Arc<dyn LanguageModel>) -> Self {
        Self {
            name: name.into(),
            prompt: None,
            llm,
            tools: Vec::new(),
            memory: None,
        }
    }

    /// Set the system prompt. An empty prompt counts as none.
    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        let prompt = prompt.into();
        self.prompt = (!prompt.is_empty()).then_some(prompt);
        self
    }

    pub fn with_tools(mut self, tools: Vec<ToolBinding>) -> Self {
        self.tools = tools;
        self
    }

    pub fn with_memory(mut self, memory: Option<Arc<dyn Memory>>) -> Self {
        self.memory = memory;
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn prompt(&self) -> Option<&str> {
        self.prompt.as_deref()
    }

    /// Identifier of the bound model.
    pub fn model(&self) -> &str {
        self.llm.model()
    }

    pub fn tools(&self) -> &[ToolBinding] {
        &self.tools
    }

    pub fn memory(&self) -> Option<&Arc<dyn Memory>> {
        self.memory.as_ref()
    }

    /// The full text sent to the model for one message.
    ///
    /// Layout: `{injected}\n\n{prompt}\n\nUser: {input}`, with the injected
    /// and prompt parts dropped when absent.
    pub fn compose(&self, input: &str, injected_prompt: Option<&str>) -> String {
        let mut text = match &self.prompt {
            Some(prompt) => format!("{}\n\nUser: {}", prompt, input),
            None => input.to_string(),
        };
        if let Some(injected) = injected_prompt.filter(|s| !s.is_empty()) {
            text = format!("{}\n\n{}", injected, text);
        }
        text
    }

    /// Send `input` to the bound model and return its reply.
    ///
    /// Model failures are returned as-is; nothing is retried.
    pub fn message(&self, input: &str, injected_prompt: Option<&str>) -> Result<String> {
        let text = self.compose(input, injected_prompt);
        debug!(agent = %self.name, model = %self.llm.model(), chars = text.len(), "agent message");
        Ok(self.llm.query(&text)?)
    }
}

impl fmt::Debug for Agent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Agent")
            .field("name", &self.name)
            .field("model", &self.llm.model())
            .field("prompt", &self.prompt)
            .field("tools", &self.tools)
            .finish()
    }
}
