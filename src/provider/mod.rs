//! Model provider capability.
//!
//! The pipeline only talks to [`LanguageModel`] and [`EmbeddingModel`]. Each
//! provider `type` registers a factory in the [`ProviderRegistry`] that turns
//! a provider block into a [`ProviderClient`], which in turn builds the models
//! declared against it.

mod openai;

pub use openai::OpenAiClient;

use crate::error::{AgentformError, Result};
use crate::resource::Params;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Failures reported by a provider adapter. Never retried.
#[derive(Error, Debug)]
pub enum ProviderError {
    #[error("request failed: {0}")]
    Http(String),

    #[error("provider returned HTTP {status}: {message}")]
    Api { status: u16, message: String },

    #[error("unexpected response: {0}")]
    Decode(String),

    #[error("provider '{0}' has no api_key configured")]
    MissingApiKey(String),
}

pub type ProviderResult<T> = std::result::Result<T, ProviderError>;

/// A completion model.
pub trait LanguageModel: Send + Sync {
    /// Model identifier, as sent to the provider.
    fn model(&self) -> &str;

    fn query(&self, prompt: &str) -> ProviderResult<String>;
}

/// A text embedding model.
pub trait EmbeddingModel: Send + Sync {
    fn model(&self) -> &str;

    fn embed(&self, text: &str) -> ProviderResult<Vec<f32>>;

    fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>>;
}

/// Resolved provider block handed to a factory.
#[derive(Debug, Clone)]
pub struct ProviderSettings {
    pub name: String,
    /// Already resolved from any indirection.
    pub api_key: Option<String>,
    pub params: Params,
}

/// Options for a completion model.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    pub model: String,
    pub temperature: f64,
    pub max_tokens: Option<i64>,
    pub params: Params,
}

/// A connected provider account.
pub trait ProviderClient: Send + Sync {
    fn language_model(&self, settings: LlmSettings) -> Result<Arc<dyn LanguageModel>>;

    fn embedding_model(&self, model: &str, params: &Params) -> Result<Arc<dyn EmbeddingModel>>;
}

pub type ProviderFactory =
    Box<dyn Fn(ProviderSettings) -> Result<Arc<dyn ProviderClient>> + Send + Sync>;

/// Provider `type` values and how to build them.
pub struct ProviderRegistry {
    factories: BTreeMap<String, ProviderFactory>,
}

impl ProviderRegistry {
    /// A registry with nothing registered.
    pub fn empty() -> Self {
        Self {
            factories: BTreeMap::new(),
        }
    }

    pub fn register(&mut self, kind: impl Into<String>, factory: ProviderFactory) {
        self.factories.insert(kind.into(), factory);
    }

    /// Registered kinds, sorted.
    pub fn kinds(&self) -> Vec<String> {
        self.factories.keys().cloned().collect()
    }

    /// Build the client for a provider block of the given `type`.
    pub fn connect(
        &self,
        kind: &str,
        settings: ProviderSettings,
    ) -> Result<Arc<dyn ProviderClient>> {
        let factory = self
            .factories
            .get(kind)
            .ok_or_else(|| AgentformError::UnsupportedKind {
                kind: "provider".to_string(),
                name: settings.name.clone(),
                field: "type".to_string(),
                value: kind.to_string(),
            })?;
        factory(settings)
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        let mut registry = Self::empty();
        registry.register(
            "openai",
            Box::new(
                |settings: ProviderSettings| -> Result<Arc<dyn ProviderClient>> {
                    Ok(Arc::new(OpenAiClient::new(settings)?))
                },
            ),
        );
        registry
    }
}

impl std::fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn settings(name: &str) -> ProviderSettings {
        ProviderSettings {
            name: name.to_string(),
            api_key: None,
            params: Params::new(),
        }
    }

    #[test]
    fn test_default_registry_knows_openai() {
        assert_eq!(ProviderRegistry::default().kinds(), vec!["openai"]);
    }

    #[test]
    fn test_unknown_kind_is_unsupported() {
        let err = ProviderRegistry::default()
            .connect("anthropic", settings("claude"))
            .err()
            .unwrap();
        assert_eq!(
            err.to_string(),
            "provider.claude: unsupported type 'anthropic'"
        );
    }

    #[test]
    fn test_empty_registry_has_no_kinds() {
        assert!(ProviderRegistry::empty().kinds().is_empty());
    }
}
