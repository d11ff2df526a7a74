//! Shared fakes for unit tests.

use crate::error::Result;
use crate::provider::{
    EmbeddingModel, LanguageModel, LlmSettings, ProviderClient, ProviderError, ProviderRegistry,
    ProviderResult, ProviderSettings,
};
use crate::resource::Params;
use std::path::{Path, PathBuf};
use std::sync::{Arc, LazyLock, Mutex, MutexGuard};

/// Provider `type` served by [`fake_registry`].
pub(crate) const FAKE_PROVIDER: &str = "fake";

/// Records every prompt and answers `<model>-out`, or fails when asked to.
pub(crate) struct FakeModel {
    name: String,
    fail: bool,
    prompts: Mutex<Vec<String>>,
}

impl FakeModel {
    pub(crate) fn new(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail: false,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn failing(name: &str) -> Arc<Self> {
        Arc::new(Self {
            name: name.to_string(),
            fail: true,
            prompts: Mutex::new(Vec::new()),
        })
    }

    pub(crate) fn prompts(&self) -> Vec<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .clone()
    }
}

impl LanguageModel for FakeModel {
    fn model(&self) -> &str {
        &self.name
    }

    fn query(&self, prompt: &str) -> ProviderResult<String> {
        self.prompts
            .lock()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(prompt.to_string());
        if self.fail {
            return Err(ProviderError::Api {
                status: 429,
                message: "rate limited".to_string(),
            });
        }
        Ok(format!("{}-out", self.name))
    }
}

/// Embeds text as counts of the letters `a`, `b` and `c`.
pub(crate) struct LetterEmbedder;

impl EmbeddingModel for LetterEmbedder {
    fn model(&self) -> &str {
        "letters"
    }

    fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        Ok(['a', 'b', 'c']
            .iter()
            .map(|c| text.chars().filter(|t| t == c).count() as f32)
            .collect())
    }

    fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        texts.iter().map(|t| self.embed(t)).collect()
    }
}

/// Provider client whose models are [`FakeModel`]s named after the model id.
pub(crate) struct FakeProvider;

impl ProviderClient for FakeProvider {
    fn language_model(&self, settings: LlmSettings) -> Result<Arc<dyn LanguageModel>> {
        Ok(FakeModel::new(&settings.model))
    }

    fn embedding_model(&self, _model: &str, _params: &Params) -> Result<Arc<dyn EmbeddingModel>> {
        Ok(Arc::new(LetterEmbedder))
    }
}

/// A registry with the `fake` provider kind; connection settings are pushed
/// into `seen` so tests can check indirection resolution.
pub(crate) fn fake_registry(seen: Arc<Mutex<Vec<ProviderSettings>>>) -> ProviderRegistry {
    let mut registry = ProviderRegistry::empty();
    registry.register(
        FAKE_PROVIDER,
        Box::new(
            move |settings: ProviderSettings| -> Result<Arc<dyn ProviderClient>> {
                seen.lock()
                    .unwrap_or_else(|poison| poison.into_inner())
                    .push(settings);
                Ok(Arc::new(FakeProvider))
            },
        ),
    );
    registry
}

static CWD_LOCK: LazyLock<Mutex<()>> = LazyLock::new(|| Mutex::new(()));

/// Changes the process working directory for the guard's lifetime.
pub(crate) struct DirGuard {
    original: PathBuf,
    _lock: MutexGuard<'static, ()>,
}

impl DirGuard {
    pub(crate) fn new(new_dir: &Path) -> Self {
        // The working directory is process-global; hold the lock even under #[serial].
        let lock = CWD_LOCK.lock().unwrap_or_else(|poison| poison.into_inner());
        let original = std::env::current_dir().unwrap();
        std::env::set_current_dir(new_dir).unwrap();
        Self {
            original,
            _lock: lock,
        }
    }
}

impl Drop for DirGuard {
    fn drop(&mut self) {
        let _ = std::env::set_current_dir(&self.original);
    }
}
