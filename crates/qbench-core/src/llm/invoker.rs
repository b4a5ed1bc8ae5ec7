//! Retrying answer generation

use super::backend::Backend;
use super::prompt::MAX_CHOICES;
use super::question::{BackendKind, Question};
use super::registry::BackendRegistry;
use crate::config::BenchConfig;
use crate::error::{BenchError, BenchResult};
use crate::recovery::RetryPolicy;
use crate::types::Answer;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{sleep, timeout};
use tracing::instrument;

/// Picks a backend for each question, calls it, and retries with
/// exponential backoff.
///
/// Failure is a value here: once the retry budget is spent the caller gets
/// [`Answer::Failed`], never an error.
#[derive(Clone)]
pub struct AnswerInvoker {
    registry: Arc<BackendRegistry>,
    policy: RetryPolicy,
    call_timeout: Duration,
}

impl AnswerInvoker {
    /// Create an invoker over a registry
    pub fn new(registry: Arc<BackendRegistry>, policy: RetryPolicy, call_timeout: Duration) -> Self {
        Self {
            registry,
            policy,
            call_timeout,
        }
    }

    /// Create an invoker using the retry and timeout settings of `config`
    pub fn from_config(registry: Arc<BackendRegistry>, config: &BenchConfig) -> Self {
        Self::new(registry, config.retry.policy(), config.call_timeout())
    }

    /// Retry policy in effect
    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Answer one question
    #[instrument(skip(self, question), fields(kind = %question.required_kind()), level = "debug")]
    pub async fn answer(&self, question: &Question) -> Answer {
        let kind = question.required_kind();
        if let Some(count) = question.choices().map(<[String]>::len).filter(|&n| n > MAX_CHOICES) {
            let error = BenchError::adapter(format!(
                "{} choices exceed the {} labels A-Z",
                count, MAX_CHOICES
            ));
            tracing::error!(error = %error, "question cannot be asked");
            return Answer::failed(error.to_string());
        }

        let max_attempts = self.policy.max_attempts();
        let mut last_error: Option<BenchError> = None;

        for attempt in 0..max_attempts {
            match self.attempt(kind, question).await {
                Ok(answer) => {
                    if attempt > 0 {
                        tracing::info!(attempt = attempt + 1, "answer succeeded after retry");
                    }
                    return Answer::Text(answer);
                }
                Err(error) => {
                    if error.is_transient() {
                        tracing::warn!(
                            attempt = attempt + 1,
                            max_attempts,
                            error = %error,
                            "transient error while getting answer from model"
                        );
                    } else {
                        tracing::error!(
                            attempt = attempt + 1,
                            max_attempts,
                            error = %error,
                            "unexpected error while getting answer from model"
                        );
                    }
                    last_error = Some(error);

                    if self.policy.has_next(attempt) {
                        let delay = self.policy.delay_for_attempt(attempt);
                        tracing::debug!(delay_secs = delay.as_secs_f64(), "retrying after backoff");
                        sleep(delay).await;
                    }
                }
            }
        }

        tracing::error!(attempts = max_attempts, "all retry attempts exhausted");
        Answer::failed(
            last_error
                .map(|e| e.to_string())
                .unwrap_or_else(|| "no attempts made".to_string()),
        )
    }

    async fn attempt(&self, kind: BackendKind, question: &Question) -> BenchResult<String> {
        let backend: Arc<dyn Backend> = self.registry.get(kind).await?;
        match timeout(self.call_timeout, backend.invoke(question)).await {
            Ok(result) => result,
            Err(_) => Err(BenchError::timeout(
                self.call_timeout.as_secs(),
                format!("{} did not answer in time", backend.name()),
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::backend::{BackendFactory, MockBackend};
    use crate::llm::question::ImageRef;
    use async_trait::async_trait;
    use parking_lot::Mutex;
    use tokio::time::Instant;

    /// Factory handing out pre-built backends per kind
    struct FixedFactory {
        text: Arc<dyn Backend>,
        multimodal: Arc<dyn Backend>,
    }

    #[async_trait]
    impl BackendFactory for FixedFactory {
        async fn construct(&self, kind: BackendKind) -> BenchResult<Arc<dyn Backend>> {
            Ok(match kind {
                BackendKind::Text => Arc::clone(&self.text),
                BackendKind::Multimodal => Arc::clone(&self.multimodal),
            })
        }
    }

    fn invoker_with(text: MockBackend, multimodal: MockBackend, policy: RetryPolicy) -> AnswerInvoker {
        let factory = FixedFactory {
            text: Arc::new(text),
            multimodal: Arc::new(multimodal),
        };
        let registry = Arc::new(BackendRegistry::new(Arc::new(factory)));
        AnswerInvoker::new(registry, policy, Duration::from_secs(30))
    }

    fn named(mut mock: MockBackend, name: &str) -> MockBackend {
        mock.expect_name().return_const(name.to_string());
        mock
    }

    #[tokio::test]
    async fn test_success_returns_immediately() {
        let mut text = MockBackend::new();
        text.expect_invoke()
            .times(1)
            .returning(|_| Ok("B".to_string()));
        let invoker = invoker_with(named(text, "text"), named(MockBackend::new(), "mm"), RetryPolicy::immediate(3));

        let answer = invoker.answer(&Question::new("q")).await;
        assert_eq!(answer, Answer::Text("B".to_string()));
    }

    #[tokio::test]
    async fn test_persistent_failure_makes_exactly_max_attempts() {
        let mut text = MockBackend::new();
        text.expect_invoke()
            .times(3)
            .returning(|_| Err(BenchError::connection("connection refused")));
        let invoker = invoker_with(named(text, "text"), named(MockBackend::new(), "mm"), RetryPolicy::immediate(3));

        let answer = invoker.answer(&Question::new("q")).await;
        assert!(answer.is_failed());
        assert!(answer.failure_reason().unwrap().contains("connection refused"));
    }

    #[tokio::test]
    async fn test_non_transient_errors_are_retried_too() {
        let mut text = MockBackend::new();
        let mut seq = mockall::Sequence::new();
        text.expect_invoke()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Err(BenchError::backend("unparseable")));
        text.expect_invoke()
            .times(1)
            .in_sequence(&mut seq)
            .returning(|_| Ok("A".to_string()));
        let invoker = invoker_with(named(text, "text"), named(MockBackend::new(), "mm"), RetryPolicy::immediate(3));

        let answer = invoker.answer(&Question::new("q")).await;
        assert_eq!(answer.text(), Some("A"));
    }

    #[tokio::test]
    async fn test_images_route_to_multimodal_backend() {
        let mut text = MockBackend::new();
        text.expect_invoke().never();
        let mut multimodal = MockBackend::new();
        multimodal
            .expect_invoke()
            .withf(|q: &Question| q.images.len() == 1)
            .times(1)
            .returning(|_| Ok("a cat".to_string()));
        let invoker = invoker_with(named(text, "text"), named(multimodal, "mm"), RetryPolicy::immediate(1));

        let question = Question::new("What animal?").with_image(ImageRef::Base64("AAAA".into()));
        let answer = invoker.answer(&question).await;
        assert_eq!(answer.text(), Some("a cat"));
    }

    #[tokio::test]
    async fn test_more_choices_than_labels_fails_without_calling_backend() {
        let mut text = MockBackend::new();
        text.expect_invoke().never();
        let invoker = invoker_with(named(text, "text"), named(MockBackend::new(), "mm"), RetryPolicy::immediate(3));

        let choices = (0..=MAX_CHOICES).map(|i| i.to_string()).collect();
        let answer = invoker.answer(&Question::new("q").with_choices(choices)).await;
        assert!(answer.is_failed());
        assert!(answer.failure_reason().unwrap().contains("27 choices"));
    }

    /// Records when each call happened; always fails
    struct FlakyBackend {
        calls: Mutex<Vec<Instant>>,
    }

    #[async_trait]
    impl Backend for FlakyBackend {
        fn name(&self) -> String {
            "flaky".to_string()
        }

        fn kind(&self) -> BackendKind {
            BackendKind::Text
        }

        async fn invoke(&self, _question: &Question) -> BenchResult<String> {
            self.calls.lock().push(Instant::now());
            Err(BenchError::timeout(1, "upstream timed out"))
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_backoff_doubles_between_attempts() {
        let flaky = Arc::new(FlakyBackend {
            calls: Mutex::new(Vec::new()),
        });
        let factory = FixedFactory {
            text: flaky.clone(),
            multimodal: flaky.clone(),
        };
        let registry = Arc::new(BackendRegistry::new(Arc::new(factory)));
        let invoker = AnswerInvoker::new(
            registry,
            RetryPolicy::new(4, Duration::from_secs(5)),
            Duration::from_secs(60),
        );

        let started = Instant::now();
        let answer = invoker.answer(&Question::new("q")).await;
        assert!(answer.is_failed());

        let calls = flaky.calls.lock().clone();
        assert_eq!(calls.len(), 4);
        let gaps: Vec<Duration> = calls.windows(2).map(|w| w[1] - w[0]).collect();
        assert_eq!(
            gaps,
            vec![Duration::from_secs(5), Duration::from_secs(10), Duration::from_secs(20)]
        );
        // No sleep after the final attempt.
        assert_eq!(started.elapsed(), Duration::from_secs(35));
    }

    /// Never answers within the deadline
    struct StuckBackend;

    #[async_trait]
    impl Backend for StuckBackend {
        fn name(&self) -> String {
            "stuck".to_string()
        }

        fn kind(&self) -> BackendKind {
            BackendKind::Text
        }

        async fn invoke(&self, _question: &Question) -> BenchResult<String> {
            sleep(Duration::from_secs(3600)).await;
            Ok("late".to_string())
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_call_timeout_counts_as_failed_attempt() {
        let factory = FixedFactory {
            text: Arc::new(StuckBackend),
            multimodal: Arc::new(StuckBackend),
        };
        let registry = Arc::new(BackendRegistry::new(Arc::new(factory)));
        let invoker = AnswerInvoker::new(registry, RetryPolicy::immediate(2), Duration::from_secs(10));

        let answer = invoker.answer(&Question::new("q")).await;
        assert!(answer.is_failed());
        assert!(answer.failure_reason().unwrap().contains("Timeout"));
    }
}
