//! Vector memory stores.
//!
//! Only the in-process `local` store exists. It keeps every record with its
//! embedding and ranks records by dot product against the query embedding.

use crate::error::{AgentformError, Result};
use crate::provider::EmbeddingModel;
use crate::resource;
use serde_json::Value as JsonValue;
use std::sync::{Arc, RwLock};
use tracing::debug;

pub const LOCAL_MEMORY: &str = "local";

/// A stored text and its caller-supplied metadata.
#[derive(Debug, Clone, PartialEq)]
pub struct MemoryRecord {
    pub text: String,
    pub metadata: JsonValue,
}

pub trait Memory: Send + Sync {
    fn add(&self, text: &str, metadata: JsonValue) -> Result<()>;

    /// Up to `k` records, best match first.
    fn query(&self, text: &str, k: usize) -> Result<Vec<MemoryRecord>>;
}

struct Entry {
    record: MemoryRecord,
    embedding: Vec<f32>,
}

/// In-process memory scored by dot product.
pub struct LocalMemory {
    embedder: Arc<dyn EmbeddingModel>,
    entries: RwLock<Vec<Entry>>,
}

impl LocalMemory {
    pub fn new(embedder: Arc<dyn EmbeddingModel>) -> Self {
        Self {
            embedder,
            entries: RwLock::new(Vec::new()),
        }
    }

    pub fn len(&self) -> usize {
        self.entries
            .read()
            .unwrap_or_else(|poison| poison.into_inner())
            .len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| x * y).sum()
}

impl Memory for LocalMemory {
    fn add(&self, text: &str, metadata: JsonValue) -> Result<()> {
        let embedding = self.embedder.embed(text)?;
        self.entries
            .write()
            .unwrap_or_else(|poison| poison.into_inner())
            .push(Entry {
                record: MemoryRecord {
                    text: text.to_string(),
                    metadata,
                },
                embedding,
            });
        Ok(())
    }

    fn query(&self, text: &str, k: usize) -> Result<Vec<MemoryRecord>> {
        if self.is_empty() || k == 0 {
            return Ok(Vec::new());
        }

        let query = self.embedder.embed(text)?;
        let entries = self
            .entries
            .read()
            .unwrap_or_else(|poison| poison.into_inner());

        let mut scored: Vec<(f32, &MemoryRecord)> = entries
            .iter()
            .map(|entry| (dot(&query, &entry.embedding), &entry.record))
            .collect();
        scored.sort_by(|a, b| b.0.total_cmp(&a.0));

        debug!(candidates = scored.len(), k, "memory query");
        Ok(scored
            .into_iter()
            .take(k)
            .map(|(_, record)| record.clone())
            .collect())
    }
}

/// Build the store declared by a memory block.
pub fn build_memory(
    memory: &resource::Memory,
    embedder: Option<Arc<dyn EmbeddingModel>>,
) -> Result<Arc<dyn Memory>> {
    match memory.memory_type.as_str() {
        LOCAL_MEMORY => {
            let embedder = embedder.ok_or_else(|| {
                AgentformError::UserError(format!(
                    "memory.{}: local memory requires an embedding",
                    memory.name
                ))
            })?;
            Ok(Arc::new(LocalMemory::new(embedder)))
        }
        other => Err(AgentformError::UnsupportedKind {
            kind: "memory".to_string(),
            name: memory.name.clone(),
            field: "type".to_string(),
            value: other.to_string(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::provider::{ProviderError, ProviderResult};
    use crate::resource::Params;
    use crate::test_support::LetterEmbedder;
    use serde_json::json;

    struct BrokenEmbedder;

    impl EmbeddingModel for BrokenEmbedder {
        fn model(&self) -> &str {
            "broken"
        }

        fn embed(&self, _text: &str) -> ProviderResult<Vec<f32>> {
            Err(ProviderError::Http("connection refused".to_string()))
        }

        fn embed_batch(&self, _texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
            Err(ProviderError::Http("connection refused".to_string()))
        }
    }

    fn memory_block(memory_type: &str) -> resource::Memory {
        resource::Memory {
            name: "docs".to_string(),
            memory_type: memory_type.to_string(),
            persist: false,
            namespace: None,
            embedding: Some("letters".to_string()),
            params: Params::new(),
        }
    }

    #[test]
    fn test_query_ranks_by_dot_product() {
        let memory = LocalMemory::new(Arc::new(LetterEmbedder));
        memory.add("aaa", json!({"id": 1})).unwrap();
        memory.add("bbb", json!({"id": 2})).unwrap();
        memory.add("aab", json!({"id": 3})).unwrap();

        let hits = memory.query("a", 2).unwrap();
        let texts: Vec<&str> = hits.iter().map(|r| r.text.as_str()).collect();
        assert_eq!(texts, vec!["aaa", "aab"]);
        assert_eq!(hits[0].metadata, json!({"id": 1}));
    }

    #[test]
    fn test_empty_memory_returns_nothing() {
        let memory = LocalMemory::new(Arc::new(BrokenEmbedder));
        assert!(memory.query("anything", 5).unwrap().is_empty());
    }

    #[test]
    fn test_embedding_failure_is_a_model_call_error() {
        let memory = LocalMemory::new(Arc::new(BrokenEmbedder));
        let err = memory.add("text", JsonValue::Null).unwrap_err();
        assert!(matches!(err, AgentformError::ModelCall(_)));
        assert!(memory.is_empty());
    }

    #[test]
    fn test_build_memory_kinds() {
        assert!(build_memory(&memory_block("local"), Some(Arc::new(LetterEmbedder))).is_ok());
        assert!(matches!(
            build_memory(&memory_block("local"), None).err(),
            Some(AgentformError::UserError(_))
        ));
        assert!(matches!(
            build_memory(&memory_block("pinecone"), Some(Arc::new(LetterEmbedder))).err(),
            Some(AgentformError::UnsupportedKind { .. })
        ));
    }
}
