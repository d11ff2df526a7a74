//! Deployment runtimes.
//!
//! A deployment exposes a set of tasks through a named runtime. Runtimes are
//! looked up by the deployment's `runtime` string in a [`RuntimeRegistry`].

mod http;

pub use http::{HTTP_SERVER, HttpServer, router};

use crate::error::{AgentformError, Result};
use crate::pipeline::Task;
use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;
use tracing::info;

/// Serves a fixed set of tasks until shut down.
pub trait DeploymentRuntime: Send + Sync {
    fn serve(&self, tasks: &[Arc<Task>], port: u16) -> Result<()>;
}

/// An instantiated deployment block.
#[derive(Debug, Clone)]
pub struct Deployment {
    pub name: String,
    pub runtime: String,
    pub tasks: Vec<Arc<Task>>,
    pub port: u16,
}

impl Deployment {
    /// Hand the exposed tasks to the deployment's runtime. Blocks while serving.
    pub fn start(&self, runtimes: &RuntimeRegistry) -> Result<()> {
        let runtime = runtimes.get(&self.runtime).ok_or_else(|| {
            AgentformError::UnsupportedKind {
                kind: "deployment".to_string(),
                name: self.name.clone(),
                field: "runtime".to_string(),
                value: self.runtime.clone(),
            }
        })?;

        if self.tasks.is_empty() {
            return Err(AgentformError::Deploy(format!(
                "deployment.{} exposes no tasks",
                self.name
            )));
        }

        info!(
            deployment = %self.name,
            runtime = %self.runtime,
            port = self.port,
            tasks = self.tasks.len(),
            "starting deployment"
        );
        runtime.serve(&self.tasks, self.port)
    }
}

/// Deployment runtimes keyed by `runtime` string.
pub struct RuntimeRegistry {
    runtimes: BTreeMap<String, Box<dyn DeploymentRuntime>>,
}

impl RuntimeRegistry {
    pub fn empty() -> Self {
        Self {
            runtimes: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, kind: impl Into<String>, runtime: Box<dyn DeploymentRuntime>) {
        self.runtimes.insert(kind.into(), runtime);
    }

    pub fn get(&self, kind: &str) -> Option<&dyn DeploymentRuntime> {
        self.runtimes.get(kind).map(|runtime| runtime.as_ref())
    }

    pub fn kinds(&self) -> Vec<String> {
        self.runtimes.keys().cloned().collect()
    }
}

impl Default for RuntimeRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(HTTP_SERVER, Box::new(HttpServer));
        registry
    }
}

impl fmt::Debug for RuntimeRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RuntimeRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pipeline::Agent;
    use crate::provider::LanguageModel;
    use crate::test_support::FakeModel;
    use std::sync::Mutex;

    struct Recorder {
        calls: Arc<Mutex<Vec<(Vec<String>, u16)>>>,
    }

    impl DeploymentRuntime for Recorder {
        fn serve(&self, tasks: &[Arc<Task>], port: u16) -> Result<()> {
            let names = tasks.iter().map(|t| t.name().to_string()).collect();
            self.calls.lock().unwrap().push((names, port));
            Ok(())
        }
    }

    fn task(name: &str) -> Arc<Task> {
        let agent = Agent::new("a", FakeModel::new("m") as Arc<dyn LanguageModel>);
        Arc::new(Task::new(name, "desc", vec![Arc::new(agent)]).unwrap())
    }

    fn deployment(runtime: &str, tasks: Vec<Arc<Task>>) -> Deployment {
        Deployment {
            name: "default".to_string(),
            runtime: runtime.to_string(),
            tasks,
            port: 8080,
        }
    }

    #[test]
    fn test_default_registry_has_http_server() {
        assert_eq!(RuntimeRegistry::default().kinds(), vec!["http-server"]);
    }

    #[test]
    fn test_start_hands_tasks_to_runtime() {
        let calls = Arc::new(Mutex::new(Vec::new()));
        let mut registry = RuntimeRegistry::empty();
        registry.register(
            "recorder",
            Box::new(Recorder {
                calls: Arc::clone(&calls),
            }),
        );

        deployment("recorder", vec![task("qa"), task("summarize")])
            .start(&registry)
            .unwrap();

        assert_eq!(
            *calls.lock().unwrap(),
            vec![(vec!["qa".to_string(), "summarize".to_string()], 8080)]
        );
    }

    #[test]
    fn test_unknown_runtime_is_rejected() {
        let err = deployment("lambda", vec![task("qa")])
            .start(&RuntimeRegistry::empty())
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "deployment.default: unsupported runtime 'lambda'"
        );
    }

    #[test]
    fn test_deployment_without_tasks_is_rejected() {
        let err = deployment(HTTP_SERVER, Vec::new())
            .start(&RuntimeRegistry::default())
            .unwrap_err();
        assert!(matches!(err, AgentformError::Deploy(_)));
        assert_eq!(err.exit_code(), crate::exit_codes::DEPLOY_FAILURE);
    }
}
