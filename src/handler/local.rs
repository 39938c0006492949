use async_trait::async_trait;

use super::{ ChatHandler, ChatReply, Mode };
use crate::error::ChatError;
use crate::models::chat::ChatRequest;
use crate::router::QueryRouter;

/// Runs the classification pipeline in-process.
pub struct LocalHandler {
    router: QueryRouter,
}

impl LocalHandler {
    pub fn new(router: QueryRouter) -> Self {
        Self { router }
    }
}

#[async_trait]
impl ChatHandler for LocalHandler {
    async fn handle(&self, request: &ChatRequest) -> Result<ChatReply, ChatError> {
        self.router.route(request).await.map(ChatReply::Envelope)
    }

    fn mode(&self) -> Mode {
        Mode::Local
    }
}
