//! The `http-server` runtime: one `POST /<task>` route per exposed task.

use super::DeploymentRuntime;
use crate::error::{AgentformError, Result};
use crate::pipeline::{Task, task_input};
use axum::extract::{Json, State};
use axum::http::StatusCode;
use axum::routing::{get, post};
use axum::{Router, Server};
use serde_json::{Value as JsonValue, json};
use std::collections::BTreeSet;
use std::net::SocketAddr;
use std::sync::Arc;
use tracing::{debug, error, info};

pub const HTTP_SERVER: &str = "http-server";

const HEALTH_PATH: &str = "health";

/// Serves tasks over HTTP with axum on a dedicated tokio runtime.
#[derive(Debug, Default)]
pub struct HttpServer;

impl DeploymentRuntime for HttpServer {
    fn serve(&self, tasks: &[Arc<Task>], port: u16) -> Result<()> {
        let app = router(tasks)?;
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .enable_all()
            .build()
            .map_err(|e| AgentformError::Deploy(format!("failed to start runtime: {}", e)))?;

        runtime.block_on(async move {
            let addr = SocketAddr::from(([0, 0, 0, 0], port));
            let server = Server::try_bind(&addr)
                .map_err(|e| AgentformError::Deploy(format!("cannot bind {}: {}", addr, e)))?;
            info!(%addr, "serving tasks");
            server
                .serve(app.into_make_service())
                .with_graceful_shutdown(shutdown_signal())
                .await
                .map_err(|e| AgentformError::Deploy(e.to_string()))
        })
    }
}

/// Routes for the given tasks plus `GET /health`.
///
/// Task names become path segments, so they must be plain identifiers and
/// must not collide with `health`.
pub fn router(tasks: &[Arc<Task>]) -> Result<Router> {
    let mut seen = BTreeSet::new();
    let mut app = Router::new().route(&format!("/{}", HEALTH_PATH), get(health));

    for task in tasks {
        let name = task.name();
        if !is_route_segment(name) {
            return Err(AgentformError::Deploy(format!(
                "task name '{}' cannot be used as a route",
                name
            )));
        }
        if name == HEALTH_PATH || !seen.insert(name) {
            return Err(AgentformError::Deploy(format!(
                "route '/{}' is declared more than once",
                name
            )));
        }
        app = app.route(
            &format!("/{}", name),
            post(run_task).with_state(Arc::clone(task)),
        );
    }

    Ok(app)
}

fn is_route_segment(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

async fn health() -> Json<JsonValue> {
    Json(json!({ "status": "ok" }))
}

async fn run_task(
    State(task): State<Arc<Task>>,
    Json(payload): Json<JsonValue>,
) -> (StatusCode, Json<JsonValue>) {
    let input = task_input(&payload);
    let name = task.name().to_string();
    debug!(task = %name, "request received");

    match tokio::task::spawn_blocking(move || task.run(&input)).await {
        Ok(Ok(output)) => (StatusCode::OK, Json(output_json(output))),
        Ok(Err(err)) => {
            error!(task = %name, error = %err, "task failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": err.to_string() })),
            )
        }
        Err(join) => {
            error!(task = %name, error = %join, "task worker aborted");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "error": format!("task worker aborted: {}", join) })),
            )
        }
    }
}

/// Output that is itself JSON is returned as JSON; anything else as a string.
fn output_json(output: String) -> JsonValue {
    match serde_json::from_str(&output) {
        Ok(value) => value,
        Err(_) => JsonValue::String(output),
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Agent;
    use crate::provider::LanguageModel;
    use crate::test_support::FakeModel;
    use axum::body::Body;
    use axum::http::Request;
    use hyper::body::to_bytes;
    use tower::ServiceExt;

    fn task(name: &str, model: Arc<FakeModel>) -> Arc<Task> {
        let agent = Agent::new("a", model as Arc<dyn LanguageModel>);
        Arc::new(Task::new(name, "desc", vec![Arc::new(agent)]).unwrap())
    }

    fn post_json(uri: &str, body: &str) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> JsonValue {
        let bytes = to_bytes(response.into_body()).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health_route() {
        let app = router(&[]).unwrap();
        let response = app
            .oneshot(
                Request::builder()
                    .uri("/health")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_task_route_runs_the_task() {
        let model = FakeModel::new("m");
        let app = router(&[task("qa", Arc::clone(&model))]).unwrap();

        let response = app.oneshot(post_json("/qa", r#""why?""#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await, json!("m-out"));
        assert_eq!(model.prompts(), vec!["why?"]);
    }

    #[tokio::test]
    async fn test_object_payload_is_passed_as_json_text() {
        let model = FakeModel::new("m");
        let app = router(&[task("qa", Arc::clone(&model))]).unwrap();

        app.oneshot(post_json("/qa", r#"{"q": "why?"}"#))
            .await
            .unwrap();

        assert_eq!(model.prompts(), vec![r#"{"q":"why?"}"#]);
    }

    #[tokio::test]
    async fn test_task_failure_is_a_500_with_message() {
        let app = router(&[task("qa", FakeModel::failing("m"))]).unwrap();

        let response = app.oneshot(post_json("/qa", r#""Q""#)).await.unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert!(body["error"].as_str().unwrap().contains("rate limited"));
    }

    #[tokio::test]
    async fn test_unexposed_task_is_not_routed() {
        let app = router(&[task("qa", FakeModel::new("m"))]).unwrap();
        let response = app.oneshot(post_json("/other", r#""Q""#)).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_output_json_parses_when_possible() {
        assert_eq!(output_json(r#"{"a": 1}"#.to_string()), json!({"a": 1}));
        assert_eq!(output_json("plain".to_string()), json!("plain"));
    }

    #[test]
    fn test_route_names_are_checked() {
        let model = FakeModel::new("m");
        assert!(router(&[task("health", Arc::clone(&model))]).is_err());
        assert!(router(&[task("a/b", Arc::clone(&model))]).is_err());
        assert!(router(&[task("qa", Arc::clone(&model)), task("qa", model)]).is_err());
    }
}
