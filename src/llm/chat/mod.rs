pub mod ollama;
pub mod openai;

use async_trait::async_trait;
use log::debug;
use futures::{ Stream, StreamExt, Future };
use serde::Deserialize;
use std::error::Error as StdError;
use std::pin::Pin;
use std::sync::Arc;
use super::{ LlmConfig, LlmType };
use self::ollama::OllamaClient;
use self::openai::OpenAIChatClient;
use crate::error::UpstreamError;
use crate::models::chat::ChatMessage;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;

pub type TokenStream = Pin<Box<dyn Stream<Item = Result<String, Box<dyn StdError + Send + Sync>>> + Send>>;

#[derive(Deserialize, Debug, Clone)]
pub struct CompletionResponse {
    pub response: String,
}

#[async_trait]
pub trait ChatClient: Send + Sync {
    async fn complete(
        &self,
        messages: &[ChatMessage]
    ) -> Result<CompletionResponse, Box<dyn StdError + Send + Sync>>;

    /// Token stream for the completion. Clients without native streaming yield
    /// the batched response as a single item.
    async fn stream_completion(
        &self,
        messages: &[ChatMessage]
    ) -> Result<TokenStream, Box<dyn StdError + Send + Sync>> {
        let resp = self.complete(messages).await?;
        Ok(Box::pin(futures::stream::once(async move { Ok(resp.response) })))
    }

    fn get_model(&self) -> String;
    fn get_base_url(&self) -> Option<String>;
    fn supports_native_streaming(&self) -> bool {
        false
    }
}

/// Runs a completion and concatenates the streamed tokens into one answer.
pub async fn complete_text(
    client: &dyn ChatClient,
    messages: &[ChatMessage]
) -> Result<String, Box<dyn StdError + Send + Sync>> {
    let mut stream = client.stream_completion(messages).await?;
    let mut text = String::new();
    while let Some(chunk) = stream.next().await {
        text.push_str(&chunk?);
    }
    if text.trim().is_empty() {
        return Err(Box::new(UpstreamError::InvalidResponse("empty completion".to_string())));
    }
    Ok(text)
}

pub fn create_streaming_response<F, Fut>(
    response_fn: F
) -> Result<TokenStream, Box<dyn StdError + Send + Sync>>
where
    F: FnOnce(mpsc::Sender<Result<String, Box<dyn StdError + Send + Sync>>>) -> Fut + Send + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    let (tx, rx) = mpsc::channel(32);

    tokio::spawn(async move {
        response_fn(tx).await;
    });

    Ok(Box::pin(ReceiverStream::new(rx)))
}

pub fn new_client(
    config: &LlmConfig
) -> Result<Arc<dyn ChatClient>, Box<dyn StdError + Send + Sync>> {
    let client: Arc<dyn ChatClient> = match config.llm_type {
        LlmType::Ollama => {
            let specific_client = OllamaClient::from_config(config)?;
            Arc::new(specific_client)
        }
        LlmType::Cerebras | LlmType::OpenAI | LlmType::Groq => {
            let specific_client = OpenAIChatClient::from_config(config)?;
            Arc::new(specific_client)
        }
    };
    Ok(client)
}

/// POSTs `payload` and streams back whatever `line_parser` extracts from each
/// newline-delimited line of the body. Lines split across chunks are rejoined.
/// The request is abandoned, and its connection released, once the stream is dropped.
pub async fn http_stream_generate(
    http: reqwest::Client,
    url: String,
    payload: impl serde::Serialize + Send + Sync + 'static,
    line_parser: fn(&str) -> Option<String>,
) -> Result<TokenStream, Box<dyn StdError + Send + Sync>> {
    create_streaming_response(move |tx| async move {
        tokio::select! {
            _ = tx.closed() => {
                debug!("Token stream from {} dropped by caller; aborting request", url);
            }
            _ = pump_lines(&http, &url, &payload, line_parser, &tx) => {}
        }
    })
}

async fn pump_lines(
    http: &reqwest::Client,
    url: &str,
    payload: &(impl serde::Serialize + Sync),
    line_parser: fn(&str) -> Option<String>,
    tx: &mpsc::Sender<Result<String, Box<dyn StdError + Send + Sync>>>,
) {
    let resp = match http.post(url).json(payload).send().await {
        Ok(resp) => resp,
        Err(e) => {
            let _ = tx.send(Err(Box::new(e) as _)).await;
            return;
        }
    };
    if let Err(e) = resp.error_for_status_ref() {
        let _ = tx.send(Err(Box::new(e) as _)).await;
        return;
    }

    let mut bytes = resp.bytes_stream();
    let mut pending: Vec<u8> = Vec::new();
    while let Some(chunk) = bytes.next().await {
        match chunk {
            Ok(buf) => {
                pending.extend_from_slice(&buf);
                while let Some(newline) = pending.iter().position(|b| *b == b'\n') {
                    let line: Vec<u8> = pending.drain(..=newline).collect();
                    let line = String::from_utf8_lossy(&line);
                    if let Some(tok) = line_parser(line.trim()) {
                        if tx.send(Ok(tok)).await.is_err() {
                            return;
                        }
                    }
                }
            }
            Err(e) => {
                let _ = tx.send(Err(Box::new(e) as _)).await;
                return;
            }
        }
    }

    let rest = String::from_utf8_lossy(&pending);
    if let Some(tok) = line_parser(rest.trim()) {
        let _ = tx.send(Ok(tok)).await;
    }
}
