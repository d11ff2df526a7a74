//! Tests for the command implementations.

use super::apply::apply_with;
use super::destroy::destroy_state;
use super::init::{Scaffolded, scaffold};
use super::plan::pending_plan;
use super::run::run_task;
use super::serve::select_deployment;
use super::*;
use crate::document::parse_document;
use crate::state::StateStore;
use crate::test_support::fake_registry;
use tempfile::TempDir;

const DOC: &str = r#"
[provider.main]
type = "fake"
api_key = "@var:key"

[llm.default]
provider = "main"
model = "gpt-test"

[agent.writer]
prompt = "@file:prompts/writer.prompt"
llm = "default"

[agent.editor]
prompt = "Tighten the draft."
llm = "default"

[task.qa]
description = "Answer"
flow = ["writer", "editor"]

[deployment.default]
runtime = "http-server"
expose = ["task.qa"]
port = 8080

[vars]
key = "sk-test"
"#;

fn project(doc: &str) -> (TempDir, ProjectContext) {
    let dir = TempDir::new().unwrap();
    std::fs::create_dir_all(dir.path().join("prompts")).unwrap();
    std::fs::write(dir.path().join("prompts/writer.prompt"), "You write.").unwrap();
    std::fs::write(dir.path().join("agentform.toml"), doc).unwrap();
    let ctx = ProjectContext::resolve(Some(dir.path()), None, None).unwrap();
    (dir, ctx)
}

#[test]
fn test_scaffold_is_valid_and_idempotent() {
    let dir = TempDir::new().unwrap();
    let config = dir.path().join("agentform.toml");

    let first = scaffold(&config).unwrap();
    assert!(matches!(first[0], Scaffolded::Created(_)));
    assert!(dir.path().join("prompts/assistant.prompt").is_file());

    let ctx = ProjectContext::resolve(Some(dir.path()), None, None).unwrap();
    let graph = load_config(&ctx).unwrap();
    let report = verify_graph(&ctx, &graph, &ProviderRegistry::default());
    assert!(report.is_valid(), "{}", report);

    std::fs::write(&config, "# edited\n").unwrap();
    let second = scaffold(&config).unwrap();
    assert!(second.iter().all(|o| matches!(o, Scaffolded::Kept(_))));
    assert_eq!(std::fs::read_to_string(&config).unwrap(), "# edited\n");
}

#[test]
fn test_load_config_requires_document() {
    let dir = TempDir::new().unwrap();
    let ctx = ProjectContext::resolve(Some(dir.path()), None, None).unwrap();
    let err = load_config(&ctx).unwrap_err();
    assert_eq!(err.exit_code(), crate::exit_codes::USER_ERROR);
}

#[test]
fn test_apply_records_state_then_plan_is_empty() {
    let (_dir, ctx) = project(DOC);
    let providers = fake_registry(Default::default());

    let plan = apply_with(&ctx, &providers).unwrap();
    assert_eq!(plan.to_create.len(), 6);
    assert!(ctx.state_path.is_file());

    let (_, again) = pending_plan(&ctx, &providers).unwrap();
    assert!(again.is_empty(), "{}", again);
}

#[test]
fn test_nan_temperature_survives_state_round_trip() {
    let (_dir, ctx) = project(&DOC.replace(
        "model = \"gpt-test\"",
        "model = \"gpt-test\"\ntemperature = nan",
    ));
    let providers = fake_registry(Default::default());

    apply_with(&ctx, &providers).unwrap();
    let (_, again) = pending_plan(&ctx, &providers).unwrap();
    assert!(again.is_empty(), "{}", again);
}

#[test]
fn test_apply_never_persists_vars() {
    let (_dir, ctx) = project(DOC);
    apply_with(&ctx, &fake_registry(Default::default())).unwrap();

    let state = std::fs::read_to_string(&ctx.state_path).unwrap();
    assert!(!state.contains("sk-test"));
    assert!(state.contains("@var:key"));
}

#[test]
fn test_apply_refuses_invalid_document() {
    let doc = DOC.replace(
        "llm = \"default\"\n\n[agent.editor]",
        "llm = \"missing\"\n\n[agent.editor]",
    );
    let (_dir, ctx) = project(&doc);

    let err = apply_with(&ctx, &fake_registry(Default::default())).unwrap_err();
    assert!(matches!(err, AgentformError::ValidationFailed(1)));
    assert!(!ctx.state_path.exists());
}

#[test]
fn test_apply_does_not_save_when_instantiation_fails() {
    let (_dir, ctx) = project(&DOC.replace("@var:key", "@var:absent"));

    let err = apply_with(&ctx, &fake_registry(Default::default())).unwrap_err();
    assert!(matches!(err, AgentformError::Unresolved(_)));
    assert!(!ctx.state_path.exists());
}

#[test]
fn test_plan_reports_updates_after_edit() {
    let (_dir, ctx) = project(DOC);
    let providers = fake_registry(Default::default());
    apply_with(&ctx, &providers).unwrap();

    std::fs::write(&ctx.config_path, DOC.replace("port = 8080", "port = 9090")).unwrap();
    let (_, plan) = pending_plan(&ctx, &providers).unwrap();

    assert_eq!(plan.summary(), "0 to create, 1 to update, 0 to delete");
    assert_eq!(plan.to_update[0].lines(), vec!["~ port: 8080 -> 9090"]);
}

#[test]
fn test_run_task_through_fake_provider() {
    let (_dir, ctx) = project(DOC);
    let output = run_task(&ctx, "qa", "Q", &fake_registry(Default::default())).unwrap();
    assert_eq!(output, "gpt-test-out");
}

#[test]
fn test_run_unknown_task_lists_declared() {
    let (_dir, ctx) = project(DOC);
    let err = run_task(&ctx, "nope", "Q", &fake_registry(Default::default())).unwrap_err();
    assert_eq!(err.to_string(), "no task named 'nope' (declared: qa)");
}

#[test]
fn test_destroy_plans_every_delete_and_clears_state() {
    let (_dir, ctx) = project(DOC);
    apply_with(&ctx, &fake_registry(Default::default())).unwrap();

    let plan = destroy_state(&ctx).unwrap();
    assert_eq!(plan.summary(), "0 to create, 0 to update, 6 to delete");
    assert!(!ctx.state_path.exists());

    let again = destroy_state(&ctx).unwrap();
    assert!(again.is_empty());
}

#[test]
fn test_destroy_keeps_configuration() {
    let (_dir, ctx) = project(DOC);
    apply_with(&ctx, &fake_registry(Default::default())).unwrap();
    destroy_state(&ctx).unwrap();

    assert!(ctx.config_path.is_file());
    assert!(StateStore::new(&ctx.state_path).load().unwrap().is_empty());
}

#[test]
fn test_select_deployment() {
    let one = parse_document(DOC).unwrap();
    assert_eq!(select_deployment(&one, None).unwrap(), "default");
    assert_eq!(select_deployment(&one, Some("public")).unwrap(), "public");

    let two = parse_document(&DOC.replace(
        "[deployment.default]",
        "[deployment.internal]\nruntime = \"http-server\"\nexpose = [\"task.qa\"]\nport = 8081\n\n[deployment.public]",
    ))
    .unwrap();
    let err = select_deployment(&two, None).unwrap_err();
    assert!(err.to_string().contains("internal, public"));

    let none = parse_document("").unwrap();
    assert!(select_deployment(&none, None).is_err());
}
