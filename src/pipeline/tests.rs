//! Tests for agents and task execution.

use super::*;
use crate::error::AgentformError;
use crate::provider::{LanguageModel, ProviderError};
use crate::test_support::FakeModel;
use serde_json::json;
use std::sync::Arc;

fn agent(name: &str, model: &Arc<FakeModel>) -> Arc<Agent> {
    Arc::new(Agent::new(name, Arc::clone(model) as Arc<dyn LanguageModel>))
}

fn schema() -> toml::Table {
    toml::from_str("answer = \"string\"\nconfidence = \"float\"").unwrap()
}

#[test]
fn test_three_agent_flow_envelope_shape() {
    let (ma, mb, mc) = (FakeModel::new("a"), FakeModel::new("b"), FakeModel::new("c"));
    let task = Task::new(
        "qa",
        "answer",
        vec![agent("a", &ma), agent("b", &mb), agent("c", &mc)],
    )
    .unwrap()
    .with_schemas(toml::Table::new(), schema());

    let output = task.run("Q").unwrap();

    assert_eq!(output, "c-out");
    assert_eq!(ma.prompts(), vec!["Q"]);
    assert_eq!(
        mb.prompts(),
        vec![r#"{"previous_agent_output":"a-out","original_input":"Q"}"#]
    );
    assert_eq!(
        mc.prompts(),
        vec![
            "Please structure your output to match the following schema:\n\
             {\n  \"answer\": \"string\",\n  \"confidence\": \"float\"\n}\n\n\
             {\"previous_agent_output\":\"b-out\",\"original_input\":\"Q\"}"
        ]
    );
}

#[test]
fn test_single_agent_flow_is_a_direct_call() {
    let ma = FakeModel::new("a");
    let task = Task::new("qa", "answer", vec![agent("a", &ma)])
        .unwrap()
        .with_schemas(toml::Table::new(), schema());

    assert_eq!(task.run("Q").unwrap(), "a-out");
    assert_eq!(ma.prompts(), vec!["Q"]);
}

#[test]
fn test_final_step_without_schema_gets_no_instruction() {
    let (ma, mb) = (FakeModel::new("a"), FakeModel::new("b"));
    let task = Task::new("qa", "answer", vec![agent("a", &ma), agent("b", &mb)]).unwrap();

    task.run("Q").unwrap();
    assert_eq!(
        mb.prompts(),
        vec![r#"{"previous_agent_output":"a-out","original_input":"Q"}"#]
    );
}

#[test]
fn test_trace_mode_returns_every_step() {
    let (ma, mb) = (FakeModel::new("gpt-a"), FakeModel::new("gpt-b"));
    let task = Task::new(
        "qa",
        "answer",
        vec![agent("first", &ma), agent("second", &mb)],
    )
    .unwrap()
    .with_trace(true);

    assert_eq!(
        task.run("Q").unwrap(),
        "AGENT: first\nMODEL: gpt-a\n\ngpt-a-out\n\n\
         AGENT: second\nMODEL: gpt-b\n\ngpt-b-out\n\n"
    );
}

#[test]
fn test_model_failure_aborts_the_run() {
    let (ma, mb, mc) = (FakeModel::new("a"), FakeModel::failing("b"), FakeModel::new("c"));
    let task = Task::new(
        "qa",
        "answer",
        vec![agent("a", &ma), agent("b", &mb), agent("c", &mc)],
    )
    .unwrap()
    .with_trace(true);

    let err = task.run("Q").unwrap_err();
    assert!(matches!(
        err,
        AgentformError::ModelCall(ProviderError::Api { status: 429, .. })
    ));
    assert!(mc.prompts().is_empty());
}

#[test]
fn test_empty_flow_is_rejected() {
    let err = Task::new("qa", "answer", Vec::new()).unwrap_err();
    assert!(err.to_string().contains("task.qa"));
}

#[test]
fn test_agent_prompt_layout() {
    let model = FakeModel::new("m");
    let agent = Agent::new("writer", Arc::clone(&model) as Arc<dyn LanguageModel>)
        .with_prompt("You are terse.");

    assert_eq!(agent.compose("hi", None), "You are terse.\n\nUser: hi");
    assert_eq!(
        agent.compose("hi", Some("Use JSON.")),
        "Use JSON.\n\nYou are terse.\n\nUser: hi"
    );
    assert_eq!(agent.compose("hi", Some("")), "You are terse.\n\nUser: hi");

    agent.message("hi", None).unwrap();
    assert_eq!(model.prompts(), vec!["You are terse.\n\nUser: hi"]);
}

#[test]
fn test_empty_prompt_counts_as_none() {
    let model = FakeModel::new("m");
    let agent = Agent::new("writer", model as Arc<dyn LanguageModel>).with_prompt("");
    assert_eq!(agent.prompt(), None);
    assert_eq!(agent.compose("hi", None), "hi");
}

#[test]
fn test_task_input_from_json() {
    assert_eq!(task_input(&json!("plain text")), "plain text");
    assert_eq!(task_input(&json!({"q": "why?"})), r#"{"q":"why?"}"#);
    assert_eq!(task_input(&json!(42)), "42");
}
