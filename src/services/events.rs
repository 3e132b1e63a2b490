//! Run progress events and the sinks that receive them.

use tokio::sync::broadcast;

use crate::domain::{EmailId, MutationAction};
use crate::filter::FilterStage;

/// Progress event emitted by the selection and mutation runners.
#[derive(Debug, Clone, PartialEq)]
pub enum RunEvent {
    /// Selection started with the compiled provider query.
    SelectionStarted { query: String },
    /// A search page was retrieved.
    PageFetched { page: usize, ids: usize },
    /// Metadata for a candidate could not be fetched.
    FetchFailed { id: EmailId, reason: String },
    /// A candidate was evaluated.
    Evaluated {
        id: EmailId,
        accepted: bool,
        stage: FilterStage,
    },
    /// Selection finished.
    SelectionFinished {
        candidates: usize,
        accepted: usize,
        cancelled: bool,
    },
    /// Mutation run started.
    MutationStarted {
        action: MutationAction,
        total: usize,
        dry_run: bool,
    },
    /// A batch is about to be processed.
    BatchStarted { batch: usize, size: usize },
    /// A transient failure is being retried.
    Retrying {
        id: Option<EmailId>,
        attempt: u32,
        reason: String,
    },
    /// One message was mutated.
    ItemSucceeded { id: EmailId },
    /// One message could not be mutated.
    ItemFailed {
        id: EmailId,
        reason: String,
        attempts: u32,
    },
    /// The cancellation signal was observed.
    Cancelled { processed: usize },
    /// Mutation run finished.
    MutationFinished { succeeded: usize, failed: usize },
    /// The run stopped on a fatal error.
    Aborted { reason: String },
}

/// Receiver of run progress.
pub trait EventSink: Send + Sync {
    /// Handles one event. Must not block.
    fn emit(&self, event: RunEvent);
}

/// Forwards events to `tracing` at a level matching their severity.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn emit(&self, event: RunEvent) {
        match event {
            RunEvent::SelectionStarted { query } => {
                tracing::info!(query = %query, "Selection started");
            }
            RunEvent::PageFetched { page, ids } => {
                tracing::debug!(page, ids, "Search page fetched");
            }
            RunEvent::FetchFailed { id, reason } => {
                tracing::warn!(message_id = %id, reason = %reason, "Metadata fetch failed");
            }
            RunEvent::Evaluated {
                id,
                accepted,
                stage,
            } => {
                tracing::trace!(message_id = %id, accepted, stage = %stage, "Evaluated");
            }
            RunEvent::SelectionFinished {
                candidates,
                accepted,
                cancelled,
            } => {
                tracing::info!(candidates, accepted, cancelled, "Selection finished");
            }
            RunEvent::MutationStarted {
                action,
                total,
                dry_run,
            } => {
                tracing::info!(action = %action, total, dry_run, "Mutation started");
            }
            RunEvent::BatchStarted { batch, size } => {
                tracing::debug!(batch, size, "Batch started");
            }
            RunEvent::Retrying {
                id,
                attempt,
                reason,
            } => {
                tracing::debug!(message_id = ?id, attempt, reason = %reason, "Retrying");
            }
            RunEvent::ItemSucceeded { id } => {
                tracing::debug!(message_id = %id, "Mutated");
            }
            RunEvent::ItemFailed {
                id,
                reason,
                attempts,
            } => {
                tracing::warn!(message_id = %id, attempts, reason = %reason, "Mutation failed");
            }
            RunEvent::Cancelled { processed } => {
                tracing::warn!(processed, "Run cancelled");
            }
            RunEvent::MutationFinished { succeeded, failed } => {
                tracing::info!(succeeded, failed, "Mutation finished");
            }
            RunEvent::Aborted { reason } => {
                tracing::error!(reason = %reason, "Run aborted");
            }
        }
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: RunEvent) {}
}

impl EventSink for broadcast::Sender<RunEvent> {
    fn emit(&self, event: RunEvent) {
        // No subscribers is fine.
        let _ = self.send(event);
    }
}
