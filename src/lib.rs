//! Agentform: declarative multi-agent LLM pipelines.
//!
//! A single TOML document declares providers, language models, embeddings,
//! memories, tools, agents, tasks and deployments. This crate parses that
//! document into a typed [`resource::ResourceGraph`], checks its
//! cross-references ([`verify`]), reconciles it against the last-applied
//! state ([`plan`], [`state`]) and runs task pipelines ([`runtime`],
//! [`pipeline`], [`deploy`]).

pub mod cli;
pub mod commands;
pub mod context;
pub mod deploy;
pub mod document;
pub mod error;
pub mod exit_codes;
pub mod fs;
pub mod indirection;
pub mod logging;
pub mod memory;
pub mod pipeline;
pub mod plan;
pub mod provider;
pub mod resource;
pub mod runtime;
pub mod state;
pub mod verify;

#[cfg(test)]
mod test_support;
