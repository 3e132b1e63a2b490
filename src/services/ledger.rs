//! Undo ledger for destructive runs.
//!
//! An entry is appended before each destructive call, so the ledger is a
//! record of intent: it may list ids whose call later failed. Pair it with
//! the run outcome (see `MutationOutcome::rollback_entries`) to find what was
//! actually mutated. Nothing here executes a compensating action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::{EmailId, LabelId, MutationAction, ThreadId};

/// How a recorded mutation could be reversed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Compensation {
    /// Restore from trash while the provider still retains the message.
    Untrash,
    /// Permanently deleted; nothing can be restored.
    Irrecoverable,
}

/// One intended destructive action.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerEntry {
    /// Run that recorded the entry.
    pub run_id: Uuid,
    /// Message the action targets.
    pub message_id: EmailId,
    /// Thread, when known from selection.
    pub thread_id: Option<ThreadId>,
    /// Effective action, after `soft_delete` was applied.
    pub action: MutationAction,
    /// Labels the message carried when it was selected.
    pub labels: Vec<LabelId>,
    pub recorded_at: DateTime<Utc>,
}

impl LedgerEntry {
    /// The compensating action for this entry.
    pub fn compensation(&self) -> Compensation {
        match self.action {
            MutationAction::Trash => Compensation::Untrash,
            MutationAction::Delete => Compensation::Irrecoverable,
        }
    }
}

/// Append-only ledger for a single run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UndoLedger {
    /// Shared by every entry in this ledger.
    pub run_id: Uuid,
    entries: Vec<LedgerEntry>,
}

impl UndoLedger {
    /// Creates an empty ledger with a fresh run id.
    pub fn new() -> Self {
        Self {
            run_id: Uuid::new_v4(),
            entries: Vec::new(),
        }
    }

    /// Appends an entry for `message_id`.
    pub fn record(
        &mut self,
        message_id: EmailId,
        thread_id: Option<ThreadId>,
        action: MutationAction,
        labels: Vec<LabelId>,
    ) {
        self.entries.push(LedgerEntry {
            run_id: self.run_id,
            message_id,
            thread_id,
            action,
            labels,
            recorded_at: Utc::now(),
        });
    }

    /// Entries in recording order.
    pub fn entries(&self) -> &[LedgerEntry] {
        &self.entries
    }

    /// Number of recorded entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether nothing has been recorded yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether an entry exists for `id`.
    pub fn contains(&self, id: &EmailId) -> bool {
        self.entries.iter().any(|e| &e.message_id == id)
    }
}

impl Default for UndoLedger {
    fn default() -> Self {
        Self::new()
    }
}
