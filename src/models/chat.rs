use serde::{ Serialize, Deserialize };
use serde_json::{ Map, Value };

use crate::error::ChatError;

const DEFAULT_AUDIO_LANGUAGE: &str = "ms";

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self { role: "system".to_string(), content: content.into() }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self { role: "user".to_string(), content: content.into() }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Text,
    Audio,
}

/// Inbound `/chat` body.
///
/// Unknown fields are kept in `extra` so the forwarding variant can relay the
/// request without dropping anything the remote side expects.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChatRequest {
    #[serde(rename = "type")]
    pub kind: RequestKind,
    #[serde(default)]
    pub session_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub audio_data: Option<Value>,
    /// Prior turns supplied by the client. Relayed to the completion service, never stored.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub messages: Vec<ChatMessage>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ChatRequest {
    pub fn text(session_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            kind: RequestKind::Text,
            session_id: session_id.into(),
            text: Some(text.into()),
            filename: None,
            language: None,
            audio_data: None,
            messages: Vec::new(),
            extra: Map::new(),
        }
    }

    /// Rejects text requests without usable text.
    pub fn validate(&self) -> Result<(), ChatError> {
        if self.kind == RequestKind::Text && self.query().is_empty() {
            return Err(ChatError::Validation("text is required when type is 'text'".to_string()));
        }
        Ok(())
    }

    /// The free-text query, trimmed. Empty when the request carries none.
    pub fn query(&self) -> &str {
        self.text.as_deref().map(str::trim).unwrap_or("")
    }

    pub fn language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_AUDIO_LANGUAGE)
    }

    pub fn meta(&self, retries: u32) -> Meta {
        Meta {
            query_used: self.query().to_string(),
            retries,
            session_id: self.session_id.clone(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Meta {
    pub query_used: String,
    pub retries: u32,
    pub session_id: String,
}

impl Meta {
    /// Best-effort meta block for bodies that could not be parsed into a `ChatRequest`.
    pub fn from_raw(body: &Value) -> Self {
        let field = |name: &str| {
            body.get(name)
                .and_then(Value::as_str)
                .unwrap_or_default()
                .to_string()
        };
        Self {
            query_used: field("text").trim().to_string(),
            retries: 0,
            session_id: field("sessionId"),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResponseKind {
    GovernmentService,
    Journey,
    General,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ActionKind {
    Link,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LinkSubtype {
    Map,
    Website,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionItem {
    #[serde(rename = "type")]
    pub kind: ActionKind,
    pub subtype: LinkSubtype,
    pub label: String,
    pub url: String,
}

impl ActionItem {
    pub fn map(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self { kind: ActionKind::Link, subtype: LinkSubtype::Map, label: label.into(), url: url.into() }
    }

    pub fn website(label: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            kind: ActionKind::Link,
            subtype: LinkSubtype::Website,
            label: label.into(),
            url: url.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceItem {
    pub title: String,
    pub url: String,
}

impl SourceItem {
    pub fn new(title: impl Into<String>, url: impl Into<String>) -> Self {
        Self { title: title.into(), url: url.into() }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ResponseEnvelope {
    #[serde(rename = "type")]
    pub kind: ResponseKind,
    pub answer: String,
    pub actions: Vec<ActionItem>,
    pub sources: Vec<SourceItem>,
    pub structured_data: Option<Value>,
    pub suggestions: Vec<String>,
    pub meta: Meta,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorEnvelope {
    pub error: String,
    pub meta: Meta,
}
