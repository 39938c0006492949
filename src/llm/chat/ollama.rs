use reqwest::Client as HttpClient;
use serde::{ Deserialize, Serialize };
use async_trait::async_trait;
use std::error::Error as StdError;
use super::{ ChatClient, CompletionResponse, TokenStream, http_stream_generate };
use crate::llm::LlmConfig;
use crate::models::chat::ChatMessage;
use log::debug;

#[derive(Debug)]
pub struct OllamaClient {
    http: HttpClient,
    base_url: String,
    completion_model: String,
}

#[derive(Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<ChatMessage>,
    stream: bool,
}

#[derive(Deserialize)]
struct ChatResponse {
    message: ChatMessage,
}

#[derive(Deserialize)]
struct StreamResponse {
    message: Option<StreamMessage>,
}

#[derive(Deserialize)]
struct StreamMessage {
    content: String,
}

fn parse_stream_line(line: &str) -> Option<String> {
    if line.is_empty() {
        return None;
    }
    match serde_json::from_str::<StreamResponse>(line) {
        Ok(stream_resp) => stream_resp.message
            .map(|m| m.content)
            .filter(|c| !c.is_empty()),
        Err(e) => {
            debug!("JSON parse error: {} for line: {}", e, line);
            None
        }
    }
}

impl OllamaClient {
    pub fn new(base_url: Option<String>, completion_model: Option<String>) -> Self {
        let model = completion_model.unwrap_or_else(|| "llama3.1".to_string());
        let url = base_url.unwrap_or_else(|| "http://localhost:11434".into());

        Self {
            http: HttpClient::new(),
            base_url: url,
            completion_model: model,
        }
    }

    pub fn from_config(config: &LlmConfig) -> Result<Self, Box<dyn StdError + Send + Sync>> {
        if config.llm_type != crate::llm::LlmType::Ollama {
            return Err("Invalid config type for OllamaClient".into());
        }

        Ok(Self::new(config.base_url.clone(), config.completion_model.clone()))
    }

    fn chat_url(&self) -> String {
        format!("{}/api/chat", self.base_url.trim_end_matches('/'))
    }

    fn build_request(&self, messages: &[ChatMessage], stream: bool) -> ChatRequest {
        ChatRequest {
            model: self.completion_model.clone(),
            messages: messages.to_vec(),
            stream,
        }
    }
}

#[async_trait]
impl ChatClient for OllamaClient {
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>> {
        let req = self.build_request(messages, false);
        let resp = self.http.post(self.chat_url()).json(&req).send().await?.error_for_status()?;
        let data = resp.json::<ChatResponse>().await?;
        Ok(CompletionResponse { response: data.message.content })
    }

    async fn stream_completion(
        &self,
        messages: &[ChatMessage]
    ) -> Result<TokenStream, Box<dyn StdError + Send + Sync>> {
        http_stream_generate(
            self.http.clone(),
            self.chat_url(),
            self.build_request(messages, true),
            parse_stream_line,
        ).await
    }

    fn get_model(&self) -> String {
        self.completion_model.clone()
    }

    fn get_base_url(&self) -> Option<String> {
        Some(self.base_url.clone())
    }

    fn supports_native_streaming(&self) -> bool {
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stream_lines_yield_message_content() {
        let line = r#"{"model":"llama3.1","message":{"role":"assistant","content":"Boleh"},"done":false}"#;
        assert_eq!(parse_stream_line(line).as_deref(), Some("Boleh"));
    }

    #[test]
    fn final_and_malformed_lines_are_skipped() {
        let done = r#"{"model":"llama3.1","message":{"role":"assistant","content":""},"done":true}"#;
        assert_eq!(parse_stream_line(done), None);
        assert_eq!(parse_stream_line("{oops"), None);
        assert_eq!(parse_stream_line(""), None);
    }

    #[test]
    fn rejects_foreign_config() {
        assert!(OllamaClient::from_config(&LlmConfig::default()).is_err());
    }
}
