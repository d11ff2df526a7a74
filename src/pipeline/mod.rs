//! Task execution.
//!
//! A [`Task`] runs its agents one after another on the calling thread. Agents
//! and tasks are immutable once built and are shared behind `Arc`, so
//! concurrent runs of the same task are independent; per-run state lives on
//! the stack of [`Task::run`].

mod agent;
mod task;

#[cfg(test)]
mod tests;

pub use agent::{Agent, ToolBinding};
pub use task::Task;

use serde_json::Value as JsonValue;

/// Text handed to a task for a structured request payload.
///
/// A JSON string is used as-is; any other value is passed as compact JSON.
pub fn task_input(payload: &JsonValue) -> String {
    match payload {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
