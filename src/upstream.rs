//! The one place outbound calls are awaited.
//!
//! Completion requests, forwarded chats and health probes all go through
//! [`call`], which bounds every attempt with a timeout and retries transient
//! failures according to a [`CallPolicy`].

use std::future::Future;
use std::time::Duration;

use log::{ error, warn };

use crate::error::{ ChatError, UpstreamError };

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CallPolicy {
    pub timeout: Duration,
    pub max_retries: u32,
    /// Delay before the first retry; the n-th retry waits n times this.
    pub backoff: Duration,
}

impl CallPolicy {
    pub fn new(timeout: Duration) -> Self {
        Self { timeout, max_retries: 0, backoff: Duration::ZERO }
    }

    pub fn with_retries(mut self, max_retries: u32, backoff: Duration) -> Self {
        self.max_retries = max_retries;
        self.backoff = backoff;
        self
    }
}

#[derive(Debug)]
pub struct Attempted<T> {
    pub result: Result<T, UpstreamError>,
    pub retries: u32,
}

impl<T> Attempted<T> {
    pub fn into_chat_result(self) -> Result<(T, u32), ChatError> {
        let retries = self.retries;
        self.result
            .map(|value| (value, retries))
            .map_err(|e| ChatError::upstream(e, retries))
    }
}

pub async fn call<T, F, Fut>(policy: &CallPolicy, label: &str, mut op: F) -> Attempted<T>
    where F: FnMut() -> Fut, Fut: Future<Output = Result<T, UpstreamError>>
{
    let mut retries = 0;
    loop {
        let outcome = match tokio::time::timeout(policy.timeout, op()).await {
            Ok(outcome) => outcome,
            Err(_) => Err(UpstreamError::Timeout(policy.timeout)),
        };

        match outcome {
            Ok(value) => {
                return Attempted { result: Ok(value), retries };
            }
            Err(e) if retries < policy.max_retries && e.is_retryable() => {
                retries += 1;
                warn!(
                    "{} failed, retrying ({}/{}): {}",
                    label,
                    retries,
                    policy.max_retries,
                    e
                );
                tokio::time::sleep(policy.backoff * retries).await;
            }
            Err(e) => {
                error!("{} failed after {} retries: {}", label, retries, e);
                return Attempted { result: Err(e), retries };
            }
        }
    }
}
