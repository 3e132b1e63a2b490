//! Selection runner.
//!
//! The [`SelectionRunner`] pages through the provider search for the compiled
//! query, fetches metadata for each candidate with bounded concurrency, and
//! folds every decision into one [`SelectionStats`] on the calling task.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::stream::{self, StreamExt};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::events::{EventSink, RunEvent, TracingSink};
use super::retry::{call_with_retry, RetryError, RetryPolicy};
use crate::config::{FilterConfig, SelectionSettings, MAX_PAGE_SIZE};
use crate::domain::{EmailId, MessageMetadata};
use crate::filter::{Categorizer, PredicateEngine, QueryCompiler, SelectionStats};
use crate::providers::email::{ErrorClass, MessageSource, ProviderError, SearchPage};

/// Outcome of a selection pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SelectionResult {
    /// Provider query used for retrieval.
    pub query: String,
    /// Instant every age comparison was made against.
    pub reference_time: DateTime<Utc>,
    /// Accepted messages in search order.
    pub accepted: Vec<MessageMetadata>,
    /// Totals over every candidate evaluated.
    pub stats: SelectionStats,
    /// The pass stopped early on the cancellation signal.
    pub cancelled: bool,
}

impl SelectionResult {
    fn empty(query: String, reference_time: DateTime<Utc>) -> Self {
        Self {
            query,
            reference_time,
            accepted: Vec::new(),
            stats: SelectionStats::default(),
            cancelled: false,
        }
    }

    /// Ids of the accepted messages.
    pub fn accepted_ids(&self) -> Vec<EmailId> {
        self.accepted.iter().map(|m| m.id.clone()).collect()
    }
}

/// A selection pass that could not continue.
#[derive(Debug, Error)]
pub enum SelectionError {
    /// The source rejected the capability or could not be reached.
    #[error("selection aborted: {error}")]
    Aborted {
        /// Error that stopped the pass.
        error: ProviderError,
        /// Everything gathered before the failure.
        partial: Box<SelectionResult>,
    },
}

impl SelectionError {
    /// The error that stopped the pass.
    pub fn error(&self) -> &ProviderError {
        match self {
            Self::Aborted { error, .. } => error,
        }
    }

    /// Results gathered before the failure.
    pub fn partial(&self) -> &SelectionResult {
        match self {
            Self::Aborted { partial, .. } => partial,
        }
    }
}

/// Runs selection passes against a [`MessageSource`].
///
/// # Example
///
/// ```ignore
/// let runner = SelectionRunner::new(source, SelectionSettings::default())
///     .with_cancellation(token.clone());
///
/// let result = runner.select(&FilterConfig::default()).await?;
/// println!("{} of {} accepted", result.stats.accepted, result.stats.evaluated);
/// ```
pub struct SelectionRunner<S: MessageSource> {
    source: Arc<S>,
    settings: SelectionSettings,
    retry: RetryPolicy,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
}

impl<S: MessageSource> SelectionRunner<S> {
    /// Creates a runner with the default retry budget and a tracing sink.
    pub fn new(source: Arc<S>, settings: SelectionSettings) -> Self {
        let retry = RetryPolicy {
            timeout: settings.call_timeout,
            ..RetryPolicy::default()
        };
        Self {
            source,
            settings,
            retry,
            sink: Arc::new(TracingSink),
            cancel: CancellationToken::new(),
        }
    }

    /// Replaces the retry policy. The per-call timeout is kept from settings.
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = RetryPolicy {
            timeout: self.settings.call_timeout,
            ..retry
        };
        self
    }

    /// Routes progress events to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Stops the pass when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Selects messages matching `config`.
    ///
    /// Metadata fetch failures are recorded in the stats and skipped. The
    /// pass aborts only when the source rejects the capability, or when a
    /// search page cannot be retrieved.
    ///
    /// # Errors
    ///
    /// Returns [`SelectionError::Aborted`] with the partial result.
    pub async fn select(&self, config: &FilterConfig) -> Result<SelectionResult, SelectionError> {
        self.select_at(config, Utc::now()).await
    }

    /// Selects messages with `now` as the reference instant for the whole pass.
    pub async fn select_at(
        &self,
        config: &FilterConfig,
        now: DateTime<Utc>,
    ) -> Result<SelectionResult, SelectionError> {
        let query = QueryCompiler::compile(config);
        let engine = PredicateEngine::new(config.clone());
        let categorizer = Categorizer::new(config);
        let mut result = SelectionResult::empty(query.clone(), now);

        self.sink.emit(RunEvent::SelectionStarted {
            query: query.clone(),
        });

        let mut page_token: Option<String> = None;
        let mut page = 0;
        loop {
            let remaining = self
                .settings
                .max_results
                .map(|max| max.saturating_sub(result.stats.total_candidates));
            if remaining == Some(0) {
                break;
            }

            let search = match self.search_page(&query, page_token.as_deref(), remaining).await {
                Ok(search) => search,
                Err(RetryError::Cancelled { .. }) => {
                    result.cancelled = true;
                    break;
                }
                Err(RetryError::Failed { error, .. }) => return Err(self.abort(error, result)),
            };

            let mut ids = search.ids;
            if let Some(remaining) = remaining {
                ids.truncate(remaining);
            }
            self.sink.emit(RunEvent::PageFetched {
                page,
                ids: ids.len(),
            });
            page += 1;
            result.stats.total_candidates += ids.len();

            if let Err(error) = self
                .evaluate_page(ids, &engine, &categorizer, &mut result)
                .await
            {
                return Err(self.abort(error, result));
            }
            if result.cancelled {
                break;
            }

            page_token = match search.next_page_token {
                Some(token) => Some(token),
                None => break,
            };
        }

        if result.cancelled {
            self.sink.emit(RunEvent::Cancelled {
                processed: result.stats.evaluated,
            });
        }
        self.sink.emit(RunEvent::SelectionFinished {
            candidates: result.stats.total_candidates,
            accepted: result.stats.accepted,
            cancelled: result.cancelled,
        });
        Ok(result)
    }

    async fn search_page(
        &self,
        query: &str,
        page_token: Option<&str>,
        remaining: Option<usize>,
    ) -> Result<SearchPage, RetryError> {
        let page_size = self.settings.page_size.clamp(1, MAX_PAGE_SIZE);
        let max_results = match remaining {
            Some(remaining) => u32::try_from(remaining).map_or(page_size, |r| r.min(page_size)),
            None => page_size,
        };

        call_with_retry(
            &self.retry,
            &self.cancel,
            |attempt, error| {
                self.sink.emit(RunEvent::Retrying {
                    id: None,
                    attempt,
                    reason: error.to_string(),
                })
            },
            || {
                self.source
                    .search_ids(query, page_token, Some(max_results))
            },
        )
        .await
    }

    /// Fetches and evaluates one page of candidates. Returns a fatal error,
    /// if any; per-item failures are recorded in the stats.
    async fn evaluate_page(
        &self,
        ids: Vec<EmailId>,
        engine: &PredicateEngine,
        categorizer: &Categorizer,
        result: &mut SelectionResult,
    ) -> Result<(), ProviderError> {
        let now = result.reference_time;
        let concurrency = self.settings.fetch_concurrency.max(1);

        let mut fetches = stream::iter(ids)
            .map(|id| async move {
                let fetched = call_with_retry(
                    &self.retry,
                    &self.cancel,
                    |attempt, error| {
                        self.sink.emit(RunEvent::Retrying {
                            id: Some(id.clone()),
                            attempt,
                            reason: error.to_string(),
                        })
                    },
                    || self.source.get_metadata(&id),
                )
                .await;
                (id, fetched)
            })
            .buffered(concurrency);

        while let Some((id, fetched)) = fetches.next().await {
            match fetched {
                Ok(message) => {
                    let decision = engine.evaluate_at(&message, now);
                    let scores = categorizer.categorize(&message);
                    result.stats.record(&message, &decision, &scores, now);
                    self.sink.emit(RunEvent::Evaluated {
                        id,
                        accepted: decision.accepted,
                        stage: decision.stage,
                    });
                    if decision.accepted {
                        result.accepted.push(message);
                    }
                }
                Err(RetryError::Cancelled { .. }) => {
                    result.cancelled = true;
                    return Ok(());
                }
                Err(RetryError::Failed { error, .. }) if error.class() == ErrorClass::Fatal => {
                    result.stats.record_failure(id, error.to_string());
                    return Err(error);
                }
                Err(RetryError::Failed { error, .. }) => {
                    let reason = error.to_string();
                    self.sink.emit(RunEvent::FetchFailed {
                        id: id.clone(),
                        reason: reason.clone(),
                    });
                    result.stats.record_failure(id, reason);
                }
            }
        }
        Ok(())
    }

    fn abort(&self, error: ProviderError, partial: SelectionResult) -> SelectionError {
        self.sink.emit(RunEvent::Aborted {
            reason: error.to_string(),
        });
        SelectionError::Aborted {
            error,
            partial: Box::new(partial),
        }
    }
}
