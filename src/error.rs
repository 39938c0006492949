use std::error::Error as StdError;
use std::time::Duration;
use thiserror::Error;

/// Failure of an outbound call (completion service, forward endpoint or health probe).
#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("upstream call timed out after {0:?}")]
    Timeout(Duration),
    #[error("upstream transport error: {0}")]
    Transport(String),
    #[error("upstream returned status {status}: {body}")]
    Status { status: u16, body: String },
    #[error("invalid upstream response: {0}")]
    InvalidResponse(String),
}

impl UpstreamError {
    /// Timeouts, connection failures and 5xx/429 answers are worth another attempt.
    pub fn is_retryable(&self) -> bool {
        match self {
            UpstreamError::Timeout(_) | UpstreamError::Transport(_) => true,
            UpstreamError::Status { status, .. } => *status >= 500 || *status == 429,
            UpstreamError::InvalidResponse(_) => false,
        }
    }

    /// Converts the boxed errors returned by the LLM clients.
    pub fn from_boxed(err: Box<dyn StdError + Send + Sync>) -> Self {
        match err.downcast::<reqwest::Error>() {
            Ok(e) => UpstreamError::from(*e),
            Err(other) =>
                match other.downcast::<UpstreamError>() {
                    Ok(e) => *e,
                    Err(other) => UpstreamError::Transport(other.to_string()),
                }
        }
    }
}

impl From<reqwest::Error> for UpstreamError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return UpstreamError::Status {
                status: status.as_u16(),
                body: err.to_string(),
            };
        }
        if err.is_decode() {
            return UpstreamError::InvalidResponse(err.to_string());
        }
        UpstreamError::Transport(err.to_string())
    }
}

#[derive(Debug, Error)]
pub enum ChatError {
    #[error("{0}")]
    Validation(String),
    #[error("{source}")]
    Upstream {
        #[source]
        source: UpstreamError,
        retries: u32,
    },
    #[error("{resource} not found")]
    NotFound {
        resource: &'static str,
        id: String,
    },
}

impl ChatError {
    pub fn upstream(source: UpstreamError, retries: u32) -> Self {
        ChatError::Upstream { source, retries }
    }

    /// Retries spent before the error surfaced; 0 for anything that never left the process.
    pub fn retries(&self) -> u32 {
        match self {
            ChatError::Upstream { retries, .. } => *retries,
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_are_human_readable() {
        let err = ChatError::Validation("text is required when type is 'text'".into());
        assert_eq!(err.to_string(), "text is required when type is 'text'");

        let err = ChatError::upstream(UpstreamError::Timeout(Duration::from_secs(30)), 2);
        assert_eq!(err.to_string(), "upstream call timed out after 30s");
        assert_eq!(err.retries(), 2);

        let err = UpstreamError::Status { status: 503, body: "busy".into() };
        assert_eq!(err.to_string(), "upstream returned status 503: busy");
    }

    #[test]
    fn client_errors_are_not_retried() {
        assert!(UpstreamError::Status { status: 502, body: String::new() }.is_retryable());
        assert!(UpstreamError::Status { status: 429, body: String::new() }.is_retryable());
        assert!(!UpstreamError::Status { status: 401, body: String::new() }.is_retryable());
        assert!(!UpstreamError::InvalidResponse("eof".into()).is_retryable());
    }

    #[test]
    fn boxed_errors_keep_their_kind() {
        let boxed: Box<dyn StdError + Send + Sync> = Box::new(UpstreamError::Timeout(Duration::from_secs(1)));
        assert!(matches!(UpstreamError::from_boxed(boxed), UpstreamError::Timeout(_)));

        let boxed: Box<dyn StdError + Send + Sync> = "No response from completion API".into();
        assert!(matches!(UpstreamError::from_boxed(boxed), UpstreamError::Transport(_)));
    }
}
