//! Memory records and engine result payloads.

use crate::Metadata;
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// One conversational turn handed to the engine for fact extraction.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct Message {
    #[serde(default)]
    pub role: String,
    #[serde(default)]
    pub content: String,
}

impl Message {
    /// Build a message from a role and content.
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: content.into(),
        }
    }
}

/// Scoping identifiers that select which records an operation touches.
///
/// Every field is optional and the engine ANDs whichever are present.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct MemoryScope {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub agent_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub run_id: Option<String>,
}

impl MemoryScope {
    /// Scope restricted to a single user.
    pub fn user(user_id: impl Into<String>) -> Self {
        Self {
            user_id: Some(user_id.into()),
            ..Self::default()
        }
    }

    /// True when no identifier is set.
    pub fn is_empty(&self) -> bool {
        self.user_id.is_none()
            && self.agent_id.is_none()
            && self.app_id.is_none()
            && self.run_id.is_none()
    }

    /// Identifier pairs that are set, in a fixed order.
    pub fn pairs(&self) -> Vec<(&'static str, &str)> {
        [
            ("user_id", self.user_id.as_deref()),
            ("agent_id", self.agent_id.as_deref()),
            ("app_id", self.app_id.as_deref()),
            ("run_id", self.run_id.as_deref()),
        ]
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key, value)))
        .collect()
    }

    /// True when every identifier set on `self` matches `other`.
    pub fn matches(&self, other: &MemoryScope) -> bool {
        fn field_matches(filter: &Option<String>, value: &Option<String>) -> bool {
            filter.is_none() || filter == value
        }
        field_matches(&self.user_id, &other.user_id)
            && field_matches(&self.agent_id, &other.agent_id)
            && field_matches(&self.app_id, &other.app_id)
            && field_matches(&self.run_id, &other.run_id)
    }
}

/// A memory record as reported by the engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryRecord {
    /// Engine-assigned opaque identifier.
    pub id: String,
    /// Fact text. The engine reports it as `memory`.
    #[serde(alias = "memory", default)]
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metadata: Option<Metadata>,
    #[serde(flatten)]
    pub scope: MemoryScope,
    /// Relevance score, present on search results.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub categories: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hash: Option<String>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "lenient_timestamp",
        skip_serializing_if = "Option::is_none"
    )]
    pub updated_at: Option<DateTime<Utc>>,
    /// Engine fields without a typed counterpart, kept verbatim.
    #[serde(flatten)]
    pub extra: Metadata,
}

/// RFC 3339 timestamps, or offset-less ones read as UTC. Anything else is
/// dropped rather than failing the whole record.
fn lenient_timestamp<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
where
    D: Deserializer<'de>,
{
    let Some(raw) = Option::<String>::deserialize(deserializer)? else {
        return Ok(None);
    };
    if let Ok(parsed) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(Some(parsed.with_timezone(&Utc)));
    }
    Ok(NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc()))
}

impl MemoryRecord {
    /// Minimal record with content and scope.
    pub fn new(id: impl Into<String>, content: impl Into<String>, scope: MemoryScope) -> Self {
        Self {
            id: id.into(),
            content: content.into(),
            metadata: None,
            scope,
            score: None,
            categories: None,
            hash: None,
            created_at: None,
            updated_at: None,
            extra: Metadata::new(),
        }
    }
}

/// What the engine did with an extracted fact.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum MemoryEventKind {
    Add,
    Update,
    Delete,
    #[default]
    None,
    #[serde(other)]
    Other,
}

/// A single extraction outcome from a store call.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct MemoryEvent {
    pub id: String,
    #[serde(default, alias = "content")]
    pub memory: String,
    #[serde(default)]
    pub event: MemoryEventKind,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub previous_memory: Option<String>,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl MemoryEvent {
    pub fn new(id: impl Into<String>, memory: impl Into<String>, event: MemoryEventKind) -> Self {
        Self {
            id: id.into(),
            memory: memory.into(),
            event,
            previous_memory: None,
            extra: Metadata::new(),
        }
    }
}

/// Result of a store call: every fact the engine extracted.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct StoreResult {
    #[serde(default)]
    pub results: Vec<MemoryEvent>,
    /// Graph relations, when the engine has graph memory enabled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relations: Option<serde_json::Value>,
    #[serde(flatten)]
    pub extra: Metadata,
}

impl StoreResult {
    /// Engine-assigned ids in result order.
    pub fn ids(&self) -> Vec<&str> {
        self.results.iter().map(|event| event.id.as_str()).collect()
    }
}

/// Result of replacing a record's content.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UpdateResult {
    pub id: String,
    /// New content as echoed by the engine, absent when it did not echo it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub memory: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Acknowledgement for destructive operations.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DeleteResult {
    pub message: String,
}

impl DeleteResult {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
