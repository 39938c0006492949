//! Query classification and response normalization.
//!
//! [`QueryRouter::route`] picks a handler from the ordered intent table, falls
//! back to the general path when the chosen handler has nothing to offer, and
//! assembles the uniform [`ResponseEnvelope`].

pub mod actions;
pub mod intent;

use log::{ debug, info };
use std::sync::Arc;

use crate::answer::AnswerGenerator;
use crate::catalog::{ self, ServiceCatalog };
use crate::error::ChatError;
use crate::models::chat::{ ChatRequest, ResponseEnvelope, ResponseKind, SourceItem };
use crate::search::WebSearch;
use crate::transport;
use self::intent::{ classify, Intent };

const SUGGESTIONS: [&str; 3] = [
    "Ask about government services (passport, MyKad, license)",
    "Plan a journey (How to go from KLCC to KL Sentral?)",
    "Get information about Malaysian public services",
];

const NO_TRANSCRIPT_ANSWER: &str = "Maaf, mesej suara belum dapat diproses. Sila taip soalan anda.\n\nSorry, voice messages cannot be processed yet. Please type your question.";

fn suggestions() -> Vec<String> {
    SUGGESTIONS.iter().map(|s| s.to_string()).collect()
}

pub struct QueryRouter {
    catalog: Arc<ServiceCatalog>,
    search: Arc<dyn WebSearch>,
    answers: Arc<dyn AnswerGenerator>,
}

impl QueryRouter {
    pub fn new(
        catalog: Arc<ServiceCatalog>,
        search: Arc<dyn WebSearch>,
        answers: Arc<dyn AnswerGenerator>
    ) -> Self {
        Self { catalog, search, answers }
    }

    pub async fn route(&self, request: &ChatRequest) -> Result<ResponseEnvelope, ChatError> {
        request.validate()?;

        let query = request.query();
        if query.is_empty() {
            info!(
                "No transcript for {:?} request in session '{}' (language={})",
                request.kind,
                request.session_id,
                request.language()
            );
            return Ok(self.envelope(request, ResponseKind::General, NO_TRANSCRIPT_ANSWER.to_string(), None, Vec::new(), 0));
        }

        let intent = classify(query);
        debug!("Query '{}' classified as {:?}", query, intent);

        let handled = match intent {
            Intent::GovernmentService => self.service_answer(request),
            Intent::Journey => self.journey_answer(request),
            Intent::General => None,
        };
        if let Some(envelope) = handled {
            return Ok(envelope);
        }
        if intent != Intent::General {
            info!("{:?} keywords matched but no structured result; answering as general query", intent);
        }

        self.general_answer(request).await
    }

    fn service_answer(&self, request: &ChatRequest) -> Option<ResponseEnvelope> {
        let (id, service) = self.catalog.find_by_query(request.query())?;
        info!("Matched government service '{}'", id);

        let sources = service.online_link
            .iter()
            .map(|link| SourceItem::new(service.department.clone(), link.clone()))
            .collect();
        let structured = serde_json::to_value(service).ok();

        Some(self.envelope(
            request,
            ResponseKind::GovernmentService,
            catalog::render_service_answer(service),
            structured,
            sources,
            0
        ))
    }

    fn journey_answer(&self, request: &ChatRequest) -> Option<ResponseEnvelope> {
        let journey = transport::extract_journey(request.query())?;
        info!("Planning journey from '{}' to '{}'", journey.origin, journey.destination);

        let plan = transport::plan_journey(&journey.origin, &journey.destination);
        let answer = transport::render_journey_answer(&journey, &plan);
        let structured = serde_json::to_value(&plan).ok();

        Some(self.envelope(request, ResponseKind::Journey, answer, structured, Vec::new(), 0))
    }

    async fn general_answer(&self, request: &ChatRequest) -> Result<ResponseEnvelope, ChatError> {
        let query = request.query();
        let found = self.search.search(query).await;
        debug!("Search returned {} sources for '{}'", found.sources.len(), query);

        let generated = self.answers
            .generate_answer(query, &request.session_id, &found.context, &request.messages)
            .await?;

        Ok(self.envelope(
            request,
            ResponseKind::General,
            generated.text,
            None,
            found.sources,
            generated.retries
        ))
    }

    fn envelope(
        &self,
        request: &ChatRequest,
        kind: ResponseKind,
        answer: String,
        structured_data: Option<serde_json::Value>,
        sources: Vec<SourceItem>,
        retries: u32
    ) -> ResponseEnvelope {
        ResponseEnvelope {
            kind,
            answer,
            actions: actions::actions_for(request.query()),
            sources,
            structured_data,
            suggestions: suggestions(),
            meta: request.meta(retries),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answer::Generated;
    use crate::error::UpstreamError;
    use crate::models::chat::{ ChatMessage, LinkSubtype, RequestKind };
    use crate::search::StaticWebSearch;
    use async_trait::async_trait;
    use std::sync::atomic::{ AtomicUsize, Ordering };

    #[derive(Default)]
    struct CannedAnswers {
        calls: AtomicUsize,
        fail: bool,
    }

    #[async_trait]
    impl AnswerGenerator for CannedAnswers {
        async fn generate_answer(
            &self,
            query: &str,
            _session_id: &str,
            context: &str,
            _history: &[ChatMessage]
        ) -> Result<Generated, ChatError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                return Err(ChatError::upstream(UpstreamError::Transport("refused".into()), 1));
            }
            Ok(Generated { text: format!("answer to '{}' with context '{}'", query, context), retries: 1 })
        }
    }

    fn router(answers: Arc<CannedAnswers>) -> QueryRouter {
        QueryRouter::new(Arc::new(ServiceCatalog::builtin()), Arc::new(StaticWebSearch), answers)
    }

    #[tokio::test]
    async fn service_query_returns_full_record() {
        let answers = Arc::new(CannedAnswers::default());
        let envelope = router(answers.clone())
            .route(&ChatRequest::text("s1", "How do I renew my passport? Passport Renewal steps"))
            .await
            .unwrap();

        assert_eq!(envelope.kind, ResponseKind::GovernmentService);
        let expected = serde_json::to_value(ServiceCatalog::builtin().get("passport_renewal").unwrap()).unwrap();
        assert_eq!(envelope.structured_data, Some(expected));
        assert_eq!(envelope.sources, vec![SourceItem::new("Immigration Department of Malaysia", "https://www.imi.gov.my")]);
        assert_eq!(envelope.meta.retries, 0);
        assert_eq!(answers.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn unmatched_service_keyword_falls_through_to_general() {
        let answers = Arc::new(CannedAnswers::default());
        let envelope = router(answers.clone())
            .route(&ChatRequest::text("s1", "renew my work permit"))
            .await
            .unwrap();
        assert_eq!(envelope.kind, ResponseKind::General);
        assert!(envelope.structured_data.is_none());
        assert_eq!(answers.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn journey_query_interpolates_endpoints() {
        let envelope = router(Arc::new(CannedAnswers::default()))
            .route(&ChatRequest::text("s2", "How to go from KLCC to KL Sentral?"))
            .await
            .unwrap();

        assert_eq!(envelope.kind, ResponseKind::Journey);
        let steps = &envelope.structured_data.as_ref().unwrap()["routes"][0]["steps"];
        assert_eq!(steps[0], "Walk to nearest LRT station from klcc");
        assert_eq!(steps[3], "Alight at station nearest to kl sentral?");
        assert_eq!(envelope.meta.query_used, "How to go from KLCC to KL Sentral?");
        assert_eq!(envelope.actions[0].subtype, LinkSubtype::Map);
    }

    #[tokio::test]
    async fn journey_without_endpoints_is_general() {
        let answers = Arc::new(CannedAnswers::default());
        let envelope = router(answers.clone())
            .route(&ChatRequest::text("s2", "Is the LRT running today?"))
            .await
            .unwrap();
        assert_eq!(envelope.kind, ResponseKind::General);
        assert_eq!(answers.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn general_query_uses_search_and_reports_retries() {
        let envelope = router(Arc::new(CannedAnswers::default()))
            .route(&ChatRequest::text("s3", "Best cafe in Cyberjaya"))
            .await
            .unwrap();

        assert!(envelope.answer.contains("Cyberjaya is a planned city"));
        assert_eq!(envelope.sources[0].title, "Cyberjaya - Wikipedia");
        assert_eq!(envelope.actions.len(), 3);
        assert_eq!(envelope.meta.retries, 1);
        assert_eq!(envelope.meta.session_id, "s3");
    }

    #[tokio::test]
    async fn answer_failure_is_propagated() {
        let answers = Arc::new(CannedAnswers { fail: true, ..CannedAnswers::default() });
        let err = router(answers)
            .route(&ChatRequest::text("s4", "what's happening this weekend"))
            .await
            .unwrap_err();
        assert!(matches!(err, ChatError::Upstream { .. }));
        assert_eq!(err.retries(), 1);
    }

    #[tokio::test]
    async fn empty_text_is_rejected_before_any_call() {
        let answers = Arc::new(CannedAnswers::default());
        let err = router(answers.clone()).route(&ChatRequest::text("s5", "")).await.unwrap_err();
        assert!(matches!(err, ChatError::Validation(_)));
        assert_eq!(answers.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn audio_without_transcript_gets_fixed_prompt() {
        let answers = Arc::new(CannedAnswers::default());
        let mut request = ChatRequest::text("s6", "");
        request.kind = RequestKind::Audio;
        request.text = None;

        let envelope = router(answers.clone()).route(&request).await.unwrap();
        assert_eq!(envelope.answer, NO_TRANSCRIPT_ANSWER);
        assert!(envelope.actions.is_empty());
        assert_eq!(envelope.meta.query_used, "");
        assert_eq!(answers.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn static_paths_are_repeatable() {
        let router = router(Arc::new(CannedAnswers::default()));
        let request = ChatRequest::text("s7", "mykad renewal please");
        let first = router.route(&request).await.unwrap();
        let second = router.route(&request).await.unwrap();
        assert_eq!(first, second);
    }
}
