//! Batch mutation pipeline.
//!
//! The [`BatchMutator`] turns a selected set into single-item trash or delete
//! calls. Items are processed sequentially in fixed-size batches with a fixed
//! pause before every outbound call. A failing item is recorded and skipped;
//! only a rejected capability, or a source that cannot be reached on the
//! very first call, stops the run.

use std::collections::HashSet;
use std::sync::Arc;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use super::events::{EventSink, RunEvent, TracingSink};
use super::ledger::{LedgerEntry, UndoLedger};
use super::retry::{call_with_retry, RetryError, RetryPolicy};
use super::selection_service::SelectionResult;
use crate::config::SafetyConfig;
use crate::domain::{EmailId, LabelId, MutationAction, ThreadId};
use crate::providers::email::{ErrorClass, MessageMutator, ProviderError};

/// How a mutation run ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RunStatus {
    /// Every item was processed (or would have been, in a dry run).
    Completed,
    /// The cancellation signal stopped the run early.
    Cancelled,
    /// A fatal error stopped the run early.
    Aborted,
}

/// An item the run could not mutate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FailedItem {
    /// Message that was not mutated.
    pub id: EmailId,
    /// Error from the last attempt.
    pub reason: String,
    /// Calls issued for this id, retries included.
    pub attempts: u32,
}

/// Result of a mutation run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationOutcome {
    /// How the run ended.
    pub status: RunStatus,
    /// Action performed after `soft_delete` was applied.
    pub action: MutationAction,
    /// No destructive call was issued.
    pub dry_run: bool,
    /// Ids mutated, or that would have been in a dry run.
    pub succeeded: Vec<EmailId>,
    /// Ids that failed after retries, in processing order.
    pub failed: Vec<FailedItem>,
    /// Ids for which at least one call was issued. In a dry run, every id.
    pub total_attempted: usize,
    /// Outbound calls issued, retries included.
    pub mutations_issued: usize,
    /// Present when rollback recording is enabled and the run was live.
    pub ledger: Option<UndoLedger>,
    /// Batches started.
    pub batches: usize,
}

impl MutationOutcome {
    fn new(action: MutationAction, dry_run: bool, ledger: Option<UndoLedger>) -> Self {
        Self {
            status: RunStatus::Completed,
            action,
            dry_run,
            succeeded: Vec::new(),
            failed: Vec::new(),
            total_attempted: 0,
            mutations_issued: 0,
            ledger,
            batches: 0,
        }
    }

    /// Ledger entries for ids that were actually mutated.
    pub fn rollback_entries(&self) -> Vec<&LedgerEntry> {
        let Some(ledger) = &self.ledger else {
            return Vec::new();
        };
        let succeeded: HashSet<&EmailId> = self.succeeded.iter().collect();
        ledger
            .entries()
            .iter()
            .filter(|e| succeeded.contains(&e.message_id))
            .collect()
    }

    /// Whether the run finished without cancellation, abort or failed items.
    pub fn is_success(&self) -> bool {
        self.status == RunStatus::Completed && self.failed.is_empty()
    }

    /// Ids that could not be mutated.
    pub fn failed_ids(&self) -> Vec<EmailId> {
        self.failed.iter().map(|f| f.id.clone()).collect()
    }
}

/// A mutation run that could not continue.
#[derive(Debug, Error)]
pub enum MutationError {
    /// The mutator rejected the capability or could not be reached.
    #[error("mutation aborted: {error}")]
    Aborted {
        /// Error that stopped the run.
        error: ProviderError,
        /// Everything done before the failure, ledger included.
        partial: Box<MutationOutcome>,
    },
}

impl MutationError {
    /// The error that stopped the run.
    pub fn error(&self) -> &ProviderError {
        match self {
            Self::Aborted { error, .. } => error,
        }
    }

    /// Work done before the failure.
    pub fn partial(&self) -> &MutationOutcome {
        match self {
            Self::Aborted { partial, .. } => partial,
        }
    }
}

/// One message to mutate, with the context recorded in the ledger.
#[derive(Debug, Clone)]
struct Target {
    id: EmailId,
    thread_id: Option<ThreadId>,
    labels: Vec<LabelId>,
}

/// Applies trash or delete to a set of messages.
///
/// # Example
///
/// ```ignore
/// let mutator = BatchMutator::new(client, settings.safety.clone())
///     .with_cancellation(token.clone());
///
/// let outcome = mutator.apply_selection(MutationAction::Trash, &selection).await?;
/// for item in &outcome.failed {
///     eprintln!("{}: {}", item.id, item.reason);
/// }
/// ```
pub struct BatchMutator<M: MessageMutator> {
    mutator: Arc<M>,
    safety: SafetyConfig,
    call_timeout: Duration,
    sink: Arc<dyn EventSink>,
    cancel: CancellationToken,
}

impl<M: MessageMutator> BatchMutator<M> {
    /// Creates a mutator with a 30 second call timeout and a tracing sink.
    pub fn new(mutator: Arc<M>, safety: SafetyConfig) -> Self {
        Self {
            mutator,
            safety,
            call_timeout: Duration::from_secs(30),
            sink: Arc::new(TracingSink),
            cancel: CancellationToken::new(),
        }
    }

    /// Sets the deadline for each outbound call.
    pub fn with_call_timeout(mut self, timeout: Duration) -> Self {
        self.call_timeout = timeout;
        self
    }

    /// Routes progress events to `sink`.
    pub fn with_sink(mut self, sink: Arc<dyn EventSink>) -> Self {
        self.sink = sink;
        self
    }

    /// Stops the run when `token` is cancelled.
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    /// Applies `action` to `ids`. Duplicate ids are processed once.
    ///
    /// # Errors
    ///
    /// Returns [`MutationError::Aborted`] with the partial outcome when the
    /// capability is rejected or the very first call cannot reach the
    /// source. Per-item failures never produce an error.
    pub async fn apply(
        &self,
        action: MutationAction,
        ids: &[EmailId],
    ) -> Result<MutationOutcome, MutationError> {
        let targets = ids
            .iter()
            .map(|id| Target {
                id: id.clone(),
                thread_id: None,
                labels: Vec::new(),
            })
            .collect();
        self.run(action, targets).await
    }

    /// Applies `action` to the accepted messages of a selection, recording
    /// their thread and labels in the ledger.
    pub async fn apply_selection(
        &self,
        action: MutationAction,
        selection: &SelectionResult,
    ) -> Result<MutationOutcome, MutationError> {
        let targets = selection
            .accepted
            .iter()
            .map(|m| Target {
                id: m.id.clone(),
                thread_id: Some(m.thread_id.clone()),
                labels: m.labels.iter().cloned().collect(),
            })
            .collect();
        self.run(action, targets).await
    }

    async fn run(
        &self,
        requested: MutationAction,
        targets: Vec<Target>,
    ) -> Result<MutationOutcome, MutationError> {
        let action = requested.resolve(self.safety.soft_delete);
        let targets = dedupe(targets);
        let batch_size = self.safety.batch_size.max(1);
        let dry_run = self.safety.dry_run_mode;

        self.sink.emit(RunEvent::MutationStarted {
            action,
            total: targets.len(),
            dry_run,
        });

        if dry_run {
            let mut outcome = MutationOutcome::new(action, true, None);
            outcome.total_attempted = targets.len();
            outcome.batches = targets.len().div_ceil(batch_size);
            outcome.succeeded = targets.into_iter().map(|t| t.id).collect();
            self.finish(&outcome);
            return Ok(outcome);
        }

        let ledger = self.safety.enable_rollback.then(UndoLedger::new);
        let mut outcome = MutationOutcome::new(action, false, ledger);
        let policy = RetryPolicy::from_safety(&self.safety, self.call_timeout);
        let mut reached = false;

        'batches: for (index, batch) in targets.chunks(batch_size).enumerate() {
            if self.cancel.is_cancelled() {
                outcome.status = RunStatus::Cancelled;
                break;
            }
            self.sink.emit(RunEvent::BatchStarted {
                batch: index,
                size: batch.len(),
            });
            outcome.batches += 1;

            for target in batch {
                if outcome.mutations_issued > 0 && !self.pause().await {
                    outcome.status = RunStatus::Cancelled;
                    break 'batches;
                }

                if let Some(ledger) = outcome.ledger.as_mut() {
                    ledger.record(
                        target.id.clone(),
                        target.thread_id.clone(),
                        action,
                        target.labels.clone(),
                    );
                }

                let mut issued = 0;
                let result = call_with_retry(
                    &policy,
                    &self.cancel,
                    |attempt, error| {
                        self.sink.emit(RunEvent::Retrying {
                            id: Some(target.id.clone()),
                            attempt,
                            reason: error.to_string(),
                        })
                    },
                    || {
                        issued += 1;
                        match action {
                            MutationAction::Trash => self.mutator.trash(&target.id),
                            MutationAction::Delete => self.mutator.delete(&target.id),
                        }
                    },
                )
                .await;

                outcome.mutations_issued += issued;
                if issued > 0 {
                    outcome.total_attempted += 1;
                }

                match result {
                    Ok(()) => {
                        reached = true;
                        self.sink.emit(RunEvent::ItemSucceeded {
                            id: target.id.clone(),
                        });
                        outcome.succeeded.push(target.id.clone());
                    }
                    Err(RetryError::Cancelled { attempts }) => {
                        if attempts > 0 {
                            self.record_failure(&mut outcome, &target.id, "cancelled", attempts);
                        }
                        outcome.status = RunStatus::Cancelled;
                        break 'batches;
                    }
                    Err(RetryError::Failed { error, attempts }) => {
                        let fatal = error.class() == ErrorClass::Fatal
                            || (error.is_connectivity() && !reached);
                        reached |= !error.is_connectivity();
                        self.record_failure(
                            &mut outcome,
                            &target.id,
                            &error.to_string(),
                            attempts,
                        );

                        if fatal {
                            outcome.status = RunStatus::Aborted;
                            self.sink.emit(RunEvent::Aborted {
                                reason: error.to_string(),
                            });
                            return Err(MutationError::Aborted {
                                error,
                                partial: Box::new(outcome),
                            });
                        }
                    }
                }
            }
        }

        if outcome.status == RunStatus::Cancelled {
            self.sink.emit(RunEvent::Cancelled {
                processed: outcome.total_attempted,
            });
        }
        self.finish(&outcome);
        Ok(outcome)
    }

    /// Waits out the inter-call delay. Returns false if cancelled meanwhile.
    async fn pause(&self) -> bool {
        tokio::select! {
            _ = self.cancel.cancelled() => false,
            _ = tokio::time::sleep(self.safety.rate_limit_delay) => true,
        }
    }

    fn record_failure(
        &self,
        outcome: &mut MutationOutcome,
        id: &EmailId,
        reason: &str,
        attempts: u32,
    ) {
        self.sink.emit(RunEvent::ItemFailed {
            id: id.clone(),
            reason: reason.to_string(),
            attempts,
        });
        outcome.failed.push(FailedItem {
            id: id.clone(),
            reason: reason.to_string(),
            attempts,
        });
    }

    fn finish(&self, outcome: &MutationOutcome) {
        self.sink.emit(RunEvent::MutationFinished {
            succeeded: outcome.succeeded.len(),
            failed: outcome.failed.len(),
        });
    }
}

fn dedupe(targets: Vec<Target>) -> Vec<Target> {
    let mut seen = HashSet::new();
    targets
        .into_iter()
        .filter(|t| seen.insert(t.id.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::MessageMetadata;
    use crate::filter::SelectionStats;
    use crate::providers::email::Result as ProviderResult;
    use crate::services::ledger::Compensation;
    use crate::services::NullSink;
    use async_trait::async_trait;
    use chrono::Utc;
    use mockall::mock;
    use pretty_assertions::assert_eq;
    use std::collections::{HashMap, VecDeque};
    use std::sync::Mutex;

    mock! {
        Mutator {}

        #[async_trait]
        impl MessageMutator for Mutator {
            async fn trash(&self, id: &EmailId) -> ProviderResult<()>;
            async fn delete(&self, id: &EmailId) -> ProviderResult<()>;
        }
    }

    #[derive(Default)]
    struct MockMailbox {
        calls: Mutex<Vec<(MutationAction, EmailId)>>,
        always_fail: HashMap<EmailId, ProviderError>,
        fail_first: Mutex<HashMap<EmailId, VecDeque<ProviderError>>>,
        cancel_after: Option<(usize, CancellationToken)>,
    }

    impl MockMailbox {
        fn always_failing(id: &str, error: ProviderError) -> Self {
            let mut mailbox = Self::default();
            mailbox.always_fail.insert(EmailId::from(id), error);
            mailbox
        }

        fn handle(&self, action: MutationAction, id: &EmailId) -> ProviderResult<()> {
            let count = {
                let mut calls = self.calls.lock().unwrap();
                calls.push((action, id.clone()));
                calls.len()
            };
            if let Some((after, token)) = &self.cancel_after {
                if count >= *after {
                    token.cancel();
                }
            }
            if let Some(error) = self.always_fail.get(id) {
                return Err(error.clone());
            }
            if let Some(error) = self
                .fail_first
                .lock()
                .unwrap()
                .get_mut(id)
                .and_then(|q| q.pop_front())
            {
                return Err(error);
            }
            Ok(())
        }

        fn calls(&self) -> Vec<(MutationAction, EmailId)> {
            self.calls.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl MessageMutator for MockMailbox {
        async fn trash(&self, id: &EmailId) -> ProviderResult<()> {
            self.handle(MutationAction::Trash, id)
        }

        async fn delete(&self, id: &EmailId) -> ProviderResult<()> {
            self.handle(MutationAction::Delete, id)
        }
    }

    fn ids(n: usize) -> Vec<EmailId> {
        (1..=n).map(|i| EmailId::from(format!("m{}", i))).collect()
    }

    fn live() -> SafetyConfig {
        SafetyConfig {
            dry_run_mode: false,
            rate_limit_delay: Duration::from_millis(100),
            ..SafetyConfig::default()
        }
    }

    fn mutator<M: MessageMutator>(mailbox: M, safety: SafetyConfig) -> BatchMutator<M> {
        BatchMutator::new(Arc::new(mailbox), safety).with_sink(Arc::new(NullSink))
    }

    #[tokio::test]
    async fn dry_run_issues_no_calls() {
        let mut mock = MockMutator::new();
        mock.expect_trash().never();
        mock.expect_delete().never();

        let ids = ids(7);
        let outcome = mutator(mock, SafetyConfig::default())
            .apply(MutationAction::Delete, &ids)
            .await
            .unwrap();

        assert!(outcome.dry_run);
        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.succeeded, ids);
        assert_eq!(outcome.total_attempted, 7);
        assert_eq!(outcome.mutations_issued, 0);
        assert!(outcome.ledger.is_none());
        assert_eq!(outcome.batches, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn live_run_trashes_every_id() {
        let mut mock = MockMutator::new();
        mock.expect_trash().times(3).returning(|_| Ok(()));
        mock.expect_delete().never();

        let outcome = mutator(mock, live())
            .apply(MutationAction::Trash, &ids(3))
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.succeeded, ids(3));
        assert_eq!(outcome.mutations_issued, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn one_failing_id_does_not_stop_the_run() {
        let mailbox = MockMailbox::always_failing("m3", ProviderError::NotFound("m3".into()));
        let batch = mutator(mailbox, live());

        let outcome = batch.apply(MutationAction::Trash, &ids(5)).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Completed);
        assert_eq!(outcome.succeeded.len(), 4);
        assert_eq!(outcome.failed.len(), 1);
        assert_eq!(outcome.total_attempted, 5);
        assert_eq!(outcome.failed[0].id, EmailId::from("m3"));
        assert_eq!(outcome.failed[0].attempts, 1);
        assert!(outcome.failed[0].reason.contains("not found"));
        assert!(!outcome.is_success());
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_exhausts_retries_then_continues() {
        let mailbox = MockMailbox::always_failing(
            "m2",
            ProviderError::RateLimited {
                retry_after_secs: None,
            },
        );
        let batch = mutator(mailbox, live());

        let outcome = batch.apply(MutationAction::Trash, &ids(3)).await.unwrap();

        assert_eq!(outcome.succeeded, vec![EmailId::from("m1"), EmailId::from("m3")]);
        assert_eq!(outcome.failed_ids(), vec![EmailId::from("m2")]);
        assert_eq!(outcome.failed[0].attempts, 4);
        assert_eq!(outcome.mutations_issued, 6);
        assert_eq!(outcome.total_attempted, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn transient_failure_recovers_on_retry() {
        let mailbox = MockMailbox::default();
        mailbox.fail_first.lock().unwrap().insert(
            EmailId::from("m1"),
            VecDeque::from(vec![ProviderError::Timeout(Duration::from_secs(1))]),
        );
        // The first call times out once; the retry succeeds.
        let outcome = mutator(mailbox, live())
            .apply(MutationAction::Trash, &ids(2))
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.mutations_issued, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unauthorized_aborts_with_partial_outcome() {
        let mailbox =
            MockMailbox::always_failing("m3", ProviderError::Unauthorized("revoked".into()));
        let batch = mutator(mailbox, live());

        let err = batch
            .apply(MutationAction::Trash, &ids(5))
            .await
            .unwrap_err();

        assert!(matches!(err.error(), ProviderError::Unauthorized(_)));
        let partial = err.partial();
        assert_eq!(partial.status, RunStatus::Aborted);
        assert_eq!(partial.succeeded, ids(2));
        assert_eq!(partial.failed_ids(), vec![EmailId::from("m3")]);
        assert_eq!(partial.failed[0].attempts, 1);
        assert_eq!(partial.ledger.as_ref().unwrap().len(), 3);
        assert_eq!(batch.mutator.calls().len(), 3);
    }

    #[tokio::test(start_paused = true)]
    async fn unreachable_source_on_first_call_is_fatal() {
        let mailbox =
            MockMailbox::always_failing("m1", ProviderError::Connection("refused".into()));
        let batch = mutator(mailbox, live());

        let err = batch
            .apply(MutationAction::Trash, &ids(3))
            .await
            .unwrap_err();

        assert!(matches!(err.error(), ProviderError::Connection(_)));
        assert!(err.partial().succeeded.is_empty());
        // Retried before giving up; later ids never attempted.
        assert_eq!(batch.mutator.calls().len(), 4);
    }

    #[tokio::test(start_paused = true)]
    async fn connectivity_failure_after_contact_is_per_item() {
        let mailbox = MockMailbox::always_failing("m2", ProviderError::Connection("reset".into()));
        let batch = mutator(mailbox, live());

        let outcome = batch.apply(MutationAction::Trash, &ids(3)).await.unwrap();

        assert_eq!(outcome.succeeded.len(), 2);
        assert_eq!(outcome.failed_ids(), vec![EmailId::from("m2")]);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_keeps_partial_results_and_ledger() {
        let token = CancellationToken::new();
        let mailbox = MockMailbox {
            cancel_after: Some((2, token.clone())),
            ..MockMailbox::default()
        };
        let batch = mutator(mailbox, live()).with_cancellation(token);

        let outcome = batch.apply(MutationAction::Trash, &ids(5)).await.unwrap();

        assert_eq!(outcome.status, RunStatus::Cancelled);
        assert_eq!(outcome.succeeded, ids(2));
        assert_eq!(outcome.total_attempted, 2);
        assert_eq!(outcome.ledger.as_ref().unwrap().len(), 2);
        assert_eq!(outcome.rollback_entries().len(), 2);
        assert_eq!(batch.mutator.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn soft_delete_turns_delete_into_trash() {
        let batch = mutator(MockMailbox::default(), live());

        let outcome = batch.apply(MutationAction::Delete, &ids(2)).await.unwrap();

        assert_eq!(outcome.action, MutationAction::Trash);
        assert!(batch
            .mutator
            .calls()
            .iter()
            .all(|(action, _)| *action == MutationAction::Trash));
        let entries = outcome.rollback_entries();
        assert!(entries
            .iter()
            .all(|e| e.compensation() == Compensation::Untrash));
    }

    #[tokio::test(start_paused = true)]
    async fn hard_delete_when_soft_delete_is_off() {
        let safety = SafetyConfig {
            soft_delete: false,
            ..live()
        };
        let batch = mutator(MockMailbox::default(), safety);

        let outcome = batch.apply(MutationAction::Delete, &ids(1)).await.unwrap();

        assert_eq!(outcome.action, MutationAction::Delete);
        assert_eq!(
            batch.mutator.calls(),
            vec![(MutationAction::Delete, EmailId::from("m1"))]
        );
        assert_eq!(
            outcome.rollback_entries()[0].compensation(),
            Compensation::Irrecoverable
        );
    }

    #[tokio::test(start_paused = true)]
    async fn items_are_processed_in_batches() {
        let safety = SafetyConfig {
            batch_size: 2,
            ..live()
        };
        let outcome = mutator(MockMailbox::default(), safety)
            .apply(MutationAction::Trash, &ids(5))
            .await
            .unwrap();

        assert_eq!(outcome.batches, 3);
        assert_eq!(outcome.succeeded, ids(5));
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_between_calls() {
        let start = tokio::time::Instant::now();

        mutator(MockMailbox::default(), live())
            .apply(MutationAction::Trash, &ids(4))
            .await
            .unwrap();

        assert_eq!(start.elapsed(), Duration::from_millis(300));
    }

    #[tokio::test(start_paused = true)]
    async fn rollback_disabled_keeps_no_ledger() {
        let safety = SafetyConfig {
            enable_rollback: false,
            ..live()
        };
        let outcome = mutator(MockMailbox::default(), safety)
            .apply(MutationAction::Trash, &ids(2))
            .await
            .unwrap();

        assert!(outcome.ledger.is_none());
        assert!(outcome.rollback_entries().is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn rollback_entries_exclude_failed_ids() {
        let mailbox = MockMailbox::always_failing("m2", ProviderError::NotFound("m2".into()));
        let outcome = mutator(mailbox, live())
            .apply(MutationAction::Trash, &ids(3))
            .await
            .unwrap();

        let ledger = outcome.ledger.as_ref().unwrap();
        assert_eq!(ledger.len(), 3);
        let entries = outcome.rollback_entries();
        let rolled: Vec<&EmailId> = entries.iter().map(|e| &e.message_id).collect();
        assert_eq!(rolled, vec![&EmailId::from("m1"), &EmailId::from("m3")]);
    }

    #[tokio::test(start_paused = true)]
    async fn duplicate_ids_are_processed_once() {
        let batch = mutator(MockMailbox::default(), live());
        let ids = vec![EmailId::from("a"), EmailId::from("b"), EmailId::from("a")];

        let outcome = batch.apply(MutationAction::Trash, &ids).await.unwrap();

        assert_eq!(outcome.succeeded, vec![EmailId::from("a"), EmailId::from("b")]);
        assert_eq!(batch.mutator.calls().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_context_reaches_the_ledger() {
        let selection = SelectionResult {
            query: String::new(),
            reference_time: Utc::now(),
            accepted: vec![MessageMetadata::new("m1", "t1").labels(["INBOX", "CATEGORY_SOCIAL"])],
            stats: SelectionStats::default(),
            cancelled: false,
        };
        let batch = mutator(MockMailbox::default(), live());

        let outcome = batch
            .apply_selection(MutationAction::Trash, &selection)
            .await
            .unwrap();

        let entries = outcome.rollback_entries();
        let entry = entries[0];
        assert_eq!(entry.thread_id, Some(ThreadId::from("t1")));
        assert_eq!(
            entry.labels,
            vec![LabelId::from("CATEGORY_SOCIAL"), LabelId::from("INBOX")]
        );
    }

    #[tokio::test]
    async fn empty_input_completes_immediately() {
        let mut mock = MockMutator::new();
        mock.expect_trash().never();

        let outcome = mutator(mock, live())
            .apply(MutationAction::Trash, &[])
            .await
            .unwrap();

        assert!(outcome.is_success());
        assert_eq!(outcome.total_attempted, 0);
        assert_eq!(outcome.batches, 0);
    }
}
