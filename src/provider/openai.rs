//! OpenAI-compatible HTTP adapter (`type = "openai"`).
//!
//! Calls are blocking: a task step waits on its model call. Recognized
//! provider params: `base_url` (default `https://api.openai.com/v1`) and
//! `timeout_secs` (default 60). A missing api key falls back to
//! `OPENAI_API_KEY` and is only reported when a request is made.
//!
//! Every `llm` param except `messages` is copied into the chat request body
//! as-is, so `top_p`, `stop`, `seed` and the like reach the API unchanged.

use super::{
    EmbeddingModel, LanguageModel, LlmSettings, ProviderClient, ProviderError, ProviderResult,
    ProviderSettings,
};
use crate::error::{AgentformError, Result};
use crate::resource::Params;
use reqwest::blocking::Client;
use serde::{Deserialize, Serialize};
use serde_json::{Map as JsonMap, Number as JsonNumber, Value as JsonValue};
use std::sync::Arc;
use std::time::Duration;
use toml::Value;
use tracing::{debug, error};

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_SECS: u64 = 60;
const API_KEY_ENV: &str = "OPENAI_API_KEY";

#[derive(Debug)]
struct Connection {
    provider: String,
    http: Client,
    base_url: String,
    api_key: Option<String>,
}

impl Connection {
    fn post<Req: Serialize, Resp: for<'de> Deserialize<'de>>(
        &self,
        path: &str,
        body: &Req,
    ) -> ProviderResult<Resp> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or_else(|| ProviderError::MissingApiKey(self.provider.clone()))?;
        let url = format!("{}{}", self.base_url, path);
        debug!(url = %url, "provider request");

        let response = self
            .http
            .post(&url)
            .bearer_auth(api_key)
            .json(body)
            .send()
            .map_err(|e| ProviderError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let text = response
                .text()
                .unwrap_or_else(|_| "unknown error".to_string());
            error!(status = status.as_u16(), "provider request failed");
            return Err(ProviderError::Api {
                status: status.as_u16(),
                message: error_message(&text),
            });
        }

        response
            .json::<Resp>()
            .map_err(|e| ProviderError::Decode(e.to_string()))
    }
}

/// Pull `error.message` out of an OpenAI error body, or keep the raw text.
fn error_message(body: &str) -> String {
    #[derive(Deserialize)]
    struct ErrorBody {
        error: ErrorDetail,
    }
    #[derive(Deserialize)]
    struct ErrorDetail {
        message: String,
    }

    serde_json::from_str::<ErrorBody>(body)
        .map(|b| b.error.message)
        .unwrap_or_else(|_| body.trim().to_string())
}

/// A connected OpenAI account.
#[derive(Debug)]
pub struct OpenAiClient {
    connection: Arc<Connection>,
}

impl OpenAiClient {
    pub fn new(settings: ProviderSettings) -> Result<Self> {
        let base_url = match settings.params.get("base_url") {
            None => DEFAULT_BASE_URL.to_string(),
            Some(Value::String(url)) => url.trim_end_matches('/').to_string(),
            Some(other) => {
                return Err(AgentformError::InvalidFieldType {
                    kind: "provider".to_string(),
                    name: settings.name,
                    field: "params.base_url".to_string(),
                    expected: "string",
                    actual: crate::document::type_name(other),
                });
            }
        };
        let timeout = settings
            .params
            .get("timeout_secs")
            .and_then(Value::as_integer)
            .and_then(|secs| u64::try_from(secs).ok())
            .unwrap_or(DEFAULT_TIMEOUT_SECS);

        let http = Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| AgentformError::UserError(format!("failed to build HTTP client: {}", e)))?;

        let api_key = settings
            .api_key
            .or_else(|| std::env::var(API_KEY_ENV).ok())
            .filter(|key| !key.is_empty());

        Ok(Self {
            connection: Arc::new(Connection {
                provider: settings.name,
                http,
                base_url,
                api_key,
            }),
        })
    }
}

impl ProviderClient for OpenAiClient {
    fn language_model(&self, settings: LlmSettings) -> Result<Arc<dyn LanguageModel>> {
        Ok(Arc::new(self.chat_model(settings)))
    }

    fn embedding_model(&self, model: &str, _params: &Params) -> Result<Arc<dyn EmbeddingModel>> {
        Ok(Arc::new(OpenAiEmbeddingModel {
            connection: Arc::clone(&self.connection),
            model: model.to_string(),
        }))
    }
}

impl OpenAiClient {
    fn chat_model(&self, settings: LlmSettings) -> OpenAiChatModel {
        let extra = settings
            .params
            .iter()
            .filter(|(key, _)| key.as_str() != "messages")
            .map(|(key, value)| (key.clone(), to_json(value)))
            .collect();
        OpenAiChatModel {
            connection: Arc::clone(&self.connection),
            model: settings.model,
            temperature: settings.temperature,
            max_tokens: settings.max_tokens,
            extra,
        }
    }
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_tokens: Option<i64>,
    #[serde(flatten)]
    extra: &'a JsonMap<String, JsonValue>,
}

/// TOML param value as JSON. Non-finite floats become `null`.
fn to_json(value: &Value) -> JsonValue {
    match value {
        Value::String(s) => JsonValue::String(s.clone()),
        Value::Integer(i) => JsonValue::from(*i),
        Value::Float(f) => JsonNumber::from_f64(*f).map_or(JsonValue::Null, JsonValue::Number),
        Value::Boolean(b) => JsonValue::Bool(*b),
        Value::Datetime(dt) => JsonValue::String(dt.to_string()),
        Value::Array(items) => JsonValue::Array(items.iter().map(to_json).collect()),
        Value::Table(table) => JsonValue::Object(
            table
                .iter()
                .map(|(k, v)| (k.clone(), to_json(v)))
                .collect(),
        ),
    }
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Debug, Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Debug, Deserialize)]
struct ChatReply {
    content: Option<String>,
}

#[derive(Debug)]
struct OpenAiChatModel {
    connection: Arc<Connection>,
    model: String,
    temperature: f64,
    max_tokens: Option<i64>,
    extra: JsonMap<String, JsonValue>,
}

impl OpenAiChatModel {
    fn request<'a>(&'a self, prompt: &'a str) -> ChatRequest<'a> {
        ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            temperature: self.temperature,
            max_tokens: self.max_tokens,
            extra: &self.extra,
        }
    }
}

impl LanguageModel for OpenAiChatModel {
    fn model(&self) -> &str {
        &self.model
    }

    fn query(&self, prompt: &str) -> ProviderResult<String> {
        let response: ChatResponse = self
            .connection
            .post("/chat/completions", &self.request(prompt))?;

        response
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .ok_or_else(|| ProviderError::Decode("response contained no message content".to_string()))
    }
}

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    input: &'a [String],
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

#[derive(Debug)]
struct OpenAiEmbeddingModel {
    connection: Arc<Connection>,
    model: String,
}

impl EmbeddingModel for OpenAiEmbeddingModel {
    fn model(&self) -> &str {
        &self.model
    }

    fn embed(&self, text: &str) -> ProviderResult<Vec<f32>> {
        self.embed_batch(&[text.to_string()])?
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("response contained no embedding".to_string()))
    }

    fn embed_batch(&self, texts: &[String]) -> ProviderResult<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        let response: EmbeddingResponse = self.connection.post(
            "/embeddings",
            &EmbeddingRequest {
                model: &self.model,
                input: texts,
            },
        )?;

        if response.data.len() != texts.len() {
            return Err(ProviderError::Decode(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                response.data.len()
            )));
        }
        Ok(response.data.into_iter().map(|d| d.embedding).collect())
    }
}
