use async_trait::async_trait;
use log::debug;
use reqwest::{Client as HttpClient, header::{HeaderMap, HeaderValue, CONTENT_TYPE, AUTHORIZATION}};
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;

use super::{ChatClient, CompletionResponse, TokenStream, http_stream_generate};
use crate::llm::{LlmConfig, LlmType};
use crate::models::chat::ChatMessage;

/// Client for any provider exposing the OpenAI `/chat/completions` API
/// (Cerebras, OpenAI, Groq).
pub struct OpenAIChatClient {
    http: HttpClient,
    model: String,
    base_url: String,
}

#[derive(Serialize, Deserialize, Clone)]
struct OpenAIMessage {
    role: String,
    content: String,
}

#[derive(Serialize)]
struct OpenAIChatRequest {
    model: String,
    messages: Vec<OpenAIMessage>,
    temperature: f32,
    #[serde(skip_serializing_if = "Option::is_none")]
    max_completion_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    top_p: Option<f32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    stream: Option<bool>,
}

#[derive(Deserialize)]
struct OpenAIResponse {
    choices: Vec<OpenAIChoice>,
}

#[derive(Deserialize)]
struct OpenAIChoice {
    message: OpenAIMessage,
}

#[derive(Deserialize)]
struct OpenAIStreamResponse {
    choices: Vec<OpenAIStreamChoice>,
}

#[derive(Deserialize)]
struct OpenAIStreamChoice {
    delta: OpenAIDelta,
}

#[derive(Deserialize)]
struct OpenAIDelta {
    content: Option<String>,
}

fn default_base_url(llm_type: LlmType) -> &'static str {
    match llm_type {
        LlmType::Groq => "https://api.groq.com/openai/v1",
        LlmType::OpenAI => "https://api.openai.com/v1",
        _ => "https://api.cerebras.ai/v1",
    }
}

fn default_model(llm_type: LlmType) -> &'static str {
    match llm_type {
        LlmType::Groq => "llama-3.1-8b-instant",
        LlmType::OpenAI => "gpt-4o",
        _ => "qwen-3-235b-a22b-instruct-2507",
    }
}

/// Extracts the delta text from one `data: {...}` server-sent-event line.
fn parse_sse_line(line: &str) -> Option<String> {
    let data = line.strip_prefix("data:")?.trim();
    if data.is_empty() || data == "[DONE]" {
        return None;
    }
    match serde_json::from_str::<OpenAIStreamResponse>(data) {
        Ok(stream_resp) => {
            let content: String = stream_resp.choices
                .into_iter()
                .filter_map(|choice| choice.delta.content)
                .collect();
            if content.is_empty() { None } else { Some(content) }
        }
        Err(e) => {
            debug!("JSON parse error: {} for data: {}", e, data);
            None
        }
    }
}

impl OpenAIChatClient {
    pub fn new(
        api_key: String,
        model: String,
        base_url: String,
    ) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {}", api_key))
                .map_err(|e| format!("Invalid API key format: {}", e))?
        );

        let http = HttpClient::builder()
            .default_headers(headers)
            .build()
            .map_err(|e| Box::new(e) as Box<dyn StdError + Send + Sync>)?;

        Ok(Self {
            http,
            model,
            base_url,
        })
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        let api_key = config.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| format!("{} API key is required", config.llm_type))?;

        Self::new(
            api_key,
            config.completion_model
                .clone()
                .unwrap_or_else(|| default_model(config.llm_type).to_string()),
            config.base_url
                .clone()
                .unwrap_or_else(|| default_base_url(config.llm_type).to_string()),
        )
    }

    fn completions_url(&self) -> String {
        format!("{}/chat/completions", self.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, messages: &[ChatMessage], stream: bool) -> OpenAIChatRequest {
        OpenAIChatRequest {
            model: self.model.clone(),
            messages: messages
                .iter()
                .map(|m| OpenAIMessage { role: m.role.clone(), content: m.content.clone() })
                .collect(),
            temperature: 0.7,
            max_completion_tokens: Some(4096),
            top_p: Some(0.8),
            stream: if stream { Some(true) } else { None },
        }
    }
}

#[async_trait]
impl ChatClient for OpenAIChatClient {
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let req = self.build_request(messages, false);

        let resp = self.http.post(self.completions_url())
            .json(&req)
            .send()
            .await?
            .error_for_status()?
            .json::<OpenAIResponse>()
            .await?;

        let content = resp.choices.into_iter().next()
            .ok_or_else(|| "No choices in completion response".to_string())?
            .message.content;

        Ok(CompletionResponse { response: content })
    }

    async fn stream_completion(
        &self,
        messages: &[ChatMessage]
    ) -> Result<TokenStream, Box<dyn StdError + Send + Sync>> {
        http_stream_generate(
            self.http.clone(),
            self.completions_url(),
            self.build_request(messages, true),
            parse_sse_line,
        ).await
    }

    fn supports_native_streaming(&self) -> bool {
        true
    }

    fn get_model(&self) -> String {
        self.model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }
}
