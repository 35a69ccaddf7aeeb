//! FilterEngine: the single entry point for turning a user utterance into a
//! new filter state. Tries the model-backed extractor first and substitutes
//! keyword extraction on any failure.

use crate::completion::CompletionClient;
use crate::config::EngineConfig;
use crate::error::ExtractError;
use crate::gemini::GeminiClient;
use crate::keyword::KeywordExtractor;
use crate::remote::RemoteExtractor;
use crate::types::{ExtractionRequest, ExtractionResult, FilterState};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::{info, warn};

/// Extraction engine (thread-safe via Arc)
pub struct FilterEngine {
    remote: Option<RemoteExtractor>,
    local: KeywordExtractor,
    timeout: Duration,
    fallbacks: AtomicU64,
}

pub type SharedFilterEngine = Arc<FilterEngine>;

impl FilterEngine {
    /// Create an engine from config. Without an API key the engine is
    /// keyword-only.
    pub fn new(config: &EngineConfig) -> SharedFilterEngine {
        let remote = match GeminiClient::from_config(config) {
            Ok(client) => {
                info!("Remote extraction enabled: model={}, timeout={:?}", config.model, config.timeout);
                Some(RemoteExtractor::new(Box::new(client)))
            }
            Err(ExtractError::NotConfigured) => {
                info!("No API key configured, using keyword extraction only");
                None
            }
            Err(e) => {
                warn!("Failed to build completion client: {}. Using keyword extraction only", e);
                None
            }
        };

        Arc::new(Self {
            remote,
            local: KeywordExtractor::new(),
            timeout: config.timeout,
            fallbacks: AtomicU64::new(0),
        })
    }

    /// Create an engine over an arbitrary completion backend
    pub fn with_client(client: Box<dyn CompletionClient>, timeout: Duration) -> SharedFilterEngine {
        Arc::new(Self {
            remote: Some(RemoteExtractor::new(client)),
            local: KeywordExtractor::new(),
            timeout,
            fallbacks: AtomicU64::new(0),
        })
    }

    /// Create a keyword-only engine
    pub fn local_only() -> SharedFilterEngine {
        Arc::new(Self {
            remote: None,
            local: KeywordExtractor::new(),
            timeout: Duration::from_millis(crate::config::DEFAULT_TIMEOUT_MS),
            fallbacks: AtomicU64::new(0),
        })
    }

    pub fn remote_enabled(&self) -> bool {
        self.remote.is_some()
    }

    /// Number of turns where a configured remote extractor failed
    pub fn fallback_count(&self) -> u64 {
        self.fallbacks.load(Ordering::Relaxed)
    }

    /// Main entry point: always returns a well-formed result
    pub async fn extract_filters(&self, req: &ExtractionRequest) -> ExtractionResult {
        let start = Instant::now();

        // Clear commands short-circuit every other rule, remote included.
        if KeywordExtractor::is_clear_command(&req.user_query) {
            info!("Clear command: '{}'", req.user_query);
            return KeywordExtractor::cleared();
        }

        let Some(remote) = &self.remote else {
            info!(
                reason = "not_configured",
                "Remote extraction not configured, using keyword extraction"
            );
            return self.extract_fallback(&req.user_query, Some(&req.current_filters));
        };

        match self.try_remote(remote, req).await {
            Ok(mut result) => {
                result.filters.keep_view_of(&req.current_filters);
                info!(
                    "Remote extraction via {} in {}ms (confidence {:.2})",
                    remote.backend_name(),
                    start.elapsed().as_millis(),
                    result.confidence
                );
                result
            }
            Err(e) => {
                self.fallbacks.fetch_add(1, Ordering::Relaxed);
                warn!(
                    reason = e.reason(),
                    "Remote extraction failed, falling back to keyword extraction: {}", e
                );
                self.extract_fallback(&req.user_query, Some(&req.current_filters))
            }
        }
    }

    /// Keyword extraction on its own
    pub fn extract_fallback(
        &self,
        user_query: &str,
        current_filters: Option<&FilterState>,
    ) -> ExtractionResult {
        self.local.extract(user_query, current_filters)
    }

    async fn try_remote(
        &self,
        remote: &RemoteExtractor,
        req: &ExtractionRequest,
    ) -> Result<ExtractionResult, ExtractError> {
        match tokio::time::timeout(self.timeout, remote.extract(req)).await {
            Ok(result) => result,
            Err(_) => Err(ExtractError::Timeout(self.timeout.as_millis() as u64)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::completion::MockCompletion;
    use crate::types::ExtractionSource;

    #[tokio::test]
    async fn test_no_key_means_local_only() {
        let engine = FilterEngine::new(&EngineConfig::default());
        assert!(!engine.remote_enabled());

        let req = ExtractionRequest::new("black tops", FilterState::default());
        let result = engine.extract_filters(&req).await;
        assert_eq!(result.source, ExtractionSource::Local);
        assert_eq!(engine.fallback_count(), 0);
    }

    /// Collects the level and `reason` field of every event that carries one
    #[derive(Clone, Default)]
    struct ReasonLog(Arc<std::sync::Mutex<Vec<(tracing::Level, String)>>>);

    struct ReasonVisitor(Option<String>);

    impl tracing::field::Visit for ReasonVisitor {
        fn record_str(&mut self, field: &tracing::field::Field, value: &str) {
            if field.name() == "reason" {
                self.0 = Some(value.to_string());
            }
        }

        fn record_debug(&mut self, _field: &tracing::field::Field, _value: &dyn std::fmt::Debug) {}
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for ReasonLog {
        fn on_event(&self, event: &tracing::Event<'_>, _ctx: tracing_subscriber::layer::Context<'_, S>) {
            let mut visitor = ReasonVisitor(None);
            event.record(&mut visitor);
            if let Some(reason) = visitor.0 {
                self.0.lock().unwrap().push((*event.metadata().level(), reason));
            }
        }
    }

    fn reasons_logged_by(engine: SharedFilterEngine, query: &str) -> Vec<(tracing::Level, String)> {
        use tracing_subscriber::layer::SubscriberExt;

        let log = ReasonLog::default();
        let subscriber = tracing_subscriber::registry().with(log.clone());
        let req = ExtractionRequest::new(query, FilterState::default());
        tracing::subscriber::with_default(subscriber, || {
            tokio_test::block_on(engine.extract_filters(&req));
        });
        let entries = log.0.lock().unwrap().clone();
        entries
    }

    #[test]
    fn test_keyword_only_mode_is_logged_at_info() {
        let reasons = reasons_logged_by(FilterEngine::local_only(), "black tops");
        assert_eq!(reasons, vec![(tracing::Level::INFO, "not_configured".to_string())]);
    }

    #[test]
    fn test_remote_failure_reason_is_logged() {
        let engine = FilterEngine::with_client(Box::new(MockCompletion::failing(500)), Duration::from_secs(1));
        let reasons = reasons_logged_by(engine, "black tops");
        assert_eq!(reasons, vec![(tracing::Level::WARN, "status".to_string())]);
    }

    #[tokio::test]
    async fn test_remote_result_keeps_sort_and_page() {
        let engine = FilterEngine::with_client(
            Box::new(MockCompletion::canned(r#"{"filters": {"gender": ["Men", "Women"]}}"#)),
            Duration::from_secs(1),
        );
        let current = FilterState {
            gender: Some(vec![crate::types::Gender::Men]),
            sort_by: Some("price-asc".to_string()),
            page: Some(2),
            ..Default::default()
        };
        let result = engine
            .extract_filters(&ExtractionRequest::new("also show women", current))
            .await;
        assert_eq!(result.source, ExtractionSource::Remote);
        assert_eq!(result.filters.sort_by.as_deref(), Some("price-asc"));
        assert_eq!(result.filters.page, Some(2));
    }

    #[tokio::test]
    async fn test_remote_success_is_used() {
        let engine = FilterEngine::with_client(
            Box::new(MockCompletion::canned(
                r#"{"filters": {"category": ["Dresses"]}, "confidence": 0.9}"#,
            )),
            Duration::from_secs(1),
        );
        let req = ExtractionRequest::new("something for a wedding", FilterState::default());
        let result = engine.extract_filters(&req).await;
        assert_eq!(result.source, ExtractionSource::Remote);
        assert_eq!(result.filters.category, Some(vec!["Dresses".to_string()]));
        assert_eq!(engine.fallback_count(), 0);
    }

    #[tokio::test]
    async fn test_timeout_falls_back() {
        let engine = FilterEngine::with_client(
            Box::new(MockCompletion::canned("{}").slow(Duration::from_millis(500))),
            Duration::from_millis(20),
        );
        let req = ExtractionRequest::new("red dresses", FilterState::default());
        let result = engine.extract_filters(&req).await;
        assert_eq!(result, engine.extract_fallback("red dresses", Some(&FilterState::default())));
        assert_eq!(engine.fallback_count(), 1);
    }

    #[tokio::test]
    async fn test_empty_completion_falls_back() {
        let engine = FilterEngine::with_client(Box::new(MockCompletion::empty()), Duration::from_secs(1));
        let req = ExtractionRequest::new("tops", FilterState::default());
        let result = engine.extract_filters(&req).await;
        assert_eq!(result.source, ExtractionSource::Local);
        assert_eq!(engine.fallback_count(), 1);
    }
}
