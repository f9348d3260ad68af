//! Mem0 REST binding for `MemoryEngine`.

use crate::engine::MemoryEngine;
use crate::error::EngineError;
use crate::options::{DeleteAllOptions, GetMemoriesOptions, SearchMemoriesOptions, StoreOptions};
use async_trait::async_trait;
use log::{debug, info, warn};
use memgate_config::{Credentials, EngineConfig};
use memgate_protocol::{
    DeleteResult, MemoryEvent, MemoryRecord, MemoryScope, Message, Metadata, StoreResult,
    UpdateResult,
};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderName, HeaderValue};
use reqwest::{Client, RequestBuilder, StatusCode, Url};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Prefix the engine expects on the authorization header.
const TOKEN_PREFIX: &str = "Token ";
/// Maximum characters of a raw error body echoed into an error message.
const MAX_ERROR_BODY_CHARS: usize = 512;

const ORGANIZATION_HEADER: &str = "mem0-organization-id";
const PROJECT_HEADER: &str = "mem0-project-id";

/// HTTP client for a Mem0-compatible engine.
///
/// Cloning is cheap and shares the underlying connection pool.
#[derive(Debug, Clone)]
pub struct HttpMemoryEngine {
    client: Client,
    base_url: Url,
    output_format: Option<String>,
}

impl HttpMemoryEngine {
    /// Build a client from immutable config and the resolved credential.
    pub fn new(config: &EngineConfig, credentials: &Credentials) -> Result<Self, EngineError> {
        let base_url = Url::parse(config.base_url.trim())
            .map_err(|err| EngineError::Config(format!("invalid base_url: {err}")))?;
        if base_url.cannot_be_a_base() {
            return Err(EngineError::Config(
                "base_url cannot carry a path".to_string(),
            ));
        }

        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&authorization_value(credentials.api_key()))
            .map_err(|_| {
                EngineError::Config("api key contains invalid header characters".to_string())
            })?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        for (name, value) in [
            (ORGANIZATION_HEADER, config.organization_id.as_deref()),
            (PROJECT_HEADER, config.project_id.as_deref()),
        ] {
            let Some(value) = value.filter(|value| !value.is_empty()) else {
                continue;
            };
            let value = HeaderValue::from_str(value).map_err(|_| {
                EngineError::Config(format!("{name} contains invalid header characters"))
            })?;
            headers.insert(HeaderName::from_static(name), value);
        }

        let client = Client::builder()
            .default_headers(headers)
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|err| EngineError::Config(err.to_string()))?;

        info!(
            "initialized http memory engine (base_url={}, timeout_secs={}, organization_set={}, project_set={})",
            base_url,
            config.timeout_secs,
            config.organization_id.is_some(),
            config.project_id.is_some()
        );
        Ok(Self {
            client,
            base_url,
            output_format: config.output_format.clone(),
        })
    }

    /// Base URL joined with the given path segments and a trailing slash.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, EngineError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| EngineError::Config("base_url cannot carry a path".to_string()))?;
            path.pop_if_empty().extend(segments).push("");
        }
        Ok(url)
    }

    /// Send a request and return the decoded JSON body, `Null` when empty.
    async fn execute(&self, op: &'static str, request: RequestBuilder) -> Result<Value, EngineError> {
        let response = request.send().await.map_err(transport_error)?;
        let status = response.status();
        let body = response.text().await.map_err(transport_error)?;
        debug!(
            "engine response (op={op}, status={}, body_len={})",
            status.as_u16(),
            body.len()
        );

        if status == StatusCode::NOT_FOUND {
            return Err(EngineError::NotFound(error_message(&body, status)));
        }
        if !status.is_success() {
            let message = error_message(&body, status);
            warn!("engine call failed (op={op}, status={})", status.as_u16());
            return Err(EngineError::Api {
                status: status.as_u16(),
                message,
            });
        }
        if body.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&body).map_err(|err| EngineError::Decode(err.to_string()))
    }
}

#[derive(Serialize)]
struct StorePayload<'a> {
    messages: &'a [Message],
    #[serde(flatten)]
    scope: &'a MemoryScope,
    metadata: &'a Metadata,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<&'a str>,
}

#[derive(Serialize)]
struct SearchPayload<'a> {
    query: &'a str,
    limit: u32,
    #[serde(flatten)]
    scope: &'a MemoryScope,
    #[serde(skip_serializing_if = "Option::is_none")]
    output_format: Option<&'a str>,
}

#[derive(Serialize)]
struct UpdatePayload<'a> {
    text: &'a str,
}

/// List-shaped responses arrive either bare or wrapped in `results`.
#[derive(Deserialize)]
#[serde(untagged)]
enum Listing<T> {
    Bare(Vec<T>),
    Wrapped { results: Vec<T> },
}

impl<T> Listing<T> {
    fn into_vec(self) -> Vec<T> {
        match self {
            Listing::Bare(items) => items,
            Listing::Wrapped { results } => results,
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StoreResponse {
    Bare(Vec<MemoryEvent>),
    Wrapped(StoreResult),
}

/// Entity (user, agent, app or run) known to the engine.
#[derive(Debug, Deserialize)]
struct Entity {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(rename = "type")]
    kind: String,
}

#[async_trait]
impl MemoryEngine for HttpMemoryEngine {
    async fn store(&self, options: StoreOptions) -> Result<StoreResult, EngineError> {
        let url = self.endpoint(&["memories"])?;
        debug!(
            "engine request (op=store, url={url}, messages={}, metadata_keys={})",
            options.messages.len(),
            options.metadata.len()
        );
        let payload = StorePayload {
            messages: &options.messages,
            scope: &options.scope,
            metadata: &options.metadata,
            output_format: self.output_format.as_deref(),
        };
        let value = self
            .execute("store", self.client.post(url).json(&payload))
            .await?;
        let result = match decode::<StoreResponse>(value)? {
            StoreResponse::Bare(results) => StoreResult {
                results,
                ..StoreResult::default()
            },
            StoreResponse::Wrapped(result) => result,
        };
        debug!("stored memories (events={})", result.results.len());
        Ok(result)
    }

    async fn get_memories(
        &self,
        options: GetMemoriesOptions,
    ) -> Result<Vec<MemoryRecord>, EngineError> {
        let url = self.endpoint(&["memories"])?;
        debug!(
            "engine request (op=get_memories, url={url}, filters={})",
            options.scope.pairs().len()
        );
        let mut request = self.client.get(url).query(&options.scope.pairs());
        if let Some(format) = self.output_format.as_deref() {
            request = request.query(&[("output_format", format)]);
        }
        let value = self.execute("get_memories", request).await?;
        let records = decode::<Listing<MemoryRecord>>(value)?.into_vec();
        debug!("listed memories (returned={})", records.len());
        Ok(records)
    }

    async fn search_memories(
        &self,
        options: SearchMemoriesOptions,
    ) -> Result<Vec<MemoryRecord>, EngineError> {
        let url = self.endpoint(&["memories", "search"])?;
        debug!(
            "engine request (op=search_memories, url={url}, query_len={}, limit={})",
            options.query.len(),
            options.limit
        );
        let payload = SearchPayload {
            query: &options.query,
            limit: options.limit,
            scope: &options.scope,
            output_format: self.output_format.as_deref(),
        };
        let value = self
            .execute("search_memories", self.client.post(url).json(&payload))
            .await?;
        let records = decode::<Listing<MemoryRecord>>(value)?.into_vec();
        debug!("searched memories (returned={})", records.len());
        Ok(records)
    }

    async fn update_memory(
        &self,
        memory_id: &str,
        new_content: &str,
    ) -> Result<UpdateResult, EngineError> {
        let url = self.endpoint(&["memories", memory_id])?;
        debug!(
            "engine request (op=update_memory, url={url}, content_len={})",
            new_content.len()
        );
        let value = self
            .execute(
                "update_memory",
                self.client.put(url).json(&UpdatePayload { text: new_content }),
            )
            .await
            .map_err(|err| not_found_for(err, memory_id))?;
        let memory = value
            .get("memory")
            .or_else(|| value.get("text"))
            .and_then(Value::as_str)
            .map(str::to_string);
        Ok(UpdateResult {
            id: memory_id.to_string(),
            memory,
            message: response_message(&value),
        })
    }

    async fn delete_memory(&self, memory_id: &str) -> Result<DeleteResult, EngineError> {
        let url = self.endpoint(&["memories", memory_id])?;
        debug!("engine request (op=delete_memory, url={url})");
        let value = self
            .execute("delete_memory", self.client.delete(url))
            .await
            .map_err(|err| not_found_for(err, memory_id))?;
        Ok(DeleteResult::new(
            response_message(&value).unwrap_or_else(|| "Memory deleted successfully!".to_string()),
        ))
    }

    async fn delete_all_memories(
        &self,
        options: DeleteAllOptions,
    ) -> Result<DeleteResult, EngineError> {
        let url = self.endpoint(&["memories"])?;
        debug!(
            "engine request (op=delete_all_memories, url={url}, filters={})",
            options.scope.pairs().len()
        );
        let request = self.client.delete(url).query(&options.scope.pairs());
        let value = self.execute("delete_all_memories", request).await?;
        Ok(DeleteResult::new(
            response_message(&value).unwrap_or_else(|| "Memories deleted successfully!".to_string()),
        ))
    }

    async fn reset(&self) -> Result<DeleteResult, EngineError> {
        let url = self.endpoint(&["entities"])?;
        debug!("engine request (op=reset, url={url})");
        let value = self.execute("list_entities", self.client.get(url)).await?;
        let entities = decode::<Listing<Entity>>(value)?.into_vec();
        let mut deleted = 0usize;
        for entity in &entities {
            let Some(key) = entity.id.as_deref().or(entity.name.as_deref()) else {
                warn!("skipping entity without id (type={})", entity.kind);
                continue;
            };
            let url = self.endpoint(&["entities", entity.kind.as_str(), key])?;
            match self.execute("delete_entity", self.client.delete(url)).await {
                Ok(_) => deleted += 1,
                Err(EngineError::NotFound(_)) => {
                    debug!("entity already gone (type={}, id={key})", entity.kind);
                }
                Err(err) => {
                    warn!(
                        "reset aborted (entities_deleted={deleted}, entities_total={})",
                        entities.len()
                    );
                    return Err(partial_reset(err, deleted, entities.len()));
                }
            }
        }
        info!("engine reset (entities_deleted={deleted})");
        Ok(DeleteResult::new(format!(
            "Memory store reset successfully (entities={deleted})"
        )))
    }
}

/// Authorization value with the `Token ` prefix applied once.
fn authorization_value(api_key: &str) -> String {
    let api_key = api_key.trim();
    if api_key.starts_with(TOKEN_PREFIX) {
        api_key.to_string()
    } else {
        format!("{TOKEN_PREFIX}{api_key}")
    }
}

fn decode<T: DeserializeOwned>(value: Value) -> Result<T, EngineError> {
    serde_json::from_value(value).map_err(|err| EngineError::Decode(err.to_string()))
}

/// Replace the engine's not-found text with the id the caller asked for.
fn not_found_for(err: EngineError, memory_id: &str) -> EngineError {
    match err {
        EngineError::NotFound(_) => EngineError::NotFound(memory_id.to_string()),
        other => other,
    }
}

/// Record how far a reset got before `err` stopped it.
fn partial_reset(err: EngineError, deleted: usize, total: usize) -> EngineError {
    let progress = format!("reset incomplete, entities_deleted={deleted} of {total}");
    match err {
        EngineError::Api { status, message } => EngineError::Api {
            status,
            message: format!("{message} ({progress})"),
        },
        EngineError::Transport(message) => EngineError::Transport(format!("{message} ({progress})")),
        EngineError::Decode(message) => EngineError::Decode(format!("{message} ({progress})")),
        EngineError::Config(message) => EngineError::Config(format!("{message} ({progress})")),
        EngineError::NotFound(message) => EngineError::NotFound(message),
    }
}

fn response_message(value: &Value) -> Option<String> {
    value
        .get("message")
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Describe a transport failure without the request URL.
fn transport_error(err: reqwest::Error) -> EngineError {
    let kind = if err.is_timeout() {
        "timed out"
    } else if err.is_connect() {
        "connection failed"
    } else {
        "request failed"
    };
    let err = err.without_url();
    let mut description = format!("{kind}: {err}");
    let mut source = std::error::Error::source(&err);
    while let Some(cause) = source {
        description.push_str(": ");
        description.push_str(&cause.to_string());
        source = cause.source();
    }
    EngineError::Transport(description)
}

#[derive(Debug, Deserialize)]
struct ErrorDocument {
    #[serde(default)]
    detail: Option<Value>,
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    messages: Vec<ErrorDocumentMessage>,
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ErrorDocumentMessage {
    #[serde(default)]
    message: String,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    token_class: Option<String>,
}

/// Extract a readable message from an engine error body.
fn error_message(body: &str, status: StatusCode) -> String {
    if let Ok(doc) = serde_json::from_str::<ErrorDocument>(body) {
        if let Some(detail) = doc.detail {
            let detail = match detail {
                Value::String(text) => text,
                other => other.to_string(),
            };
            return match doc.code {
                Some(code) => format!("{detail} (code: {code})"),
                None => detail,
            };
        }
        if let Some(first) = doc.messages.first() {
            return format!(
                "{} (token type: {}, token class: {})",
                first.message,
                first.token_type.as_deref().unwrap_or("unknown"),
                first.token_class.as_deref().unwrap_or("unknown")
            );
        }
        if let Some(text) = doc.error.or(doc.message) {
            return text;
        }
    }
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return status
            .canonical_reason()
            .unwrap_or("engine request failed")
            .to_string();
    }
    trimmed.chars().take(MAX_ERROR_BODY_CHARS).collect()
}
