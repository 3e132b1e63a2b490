//! Run orchestration layer.
//!
//! This module drives the filter logic against the mailbox capabilities,
//! coordinating retrieval, evaluation and destructive calls.
//!
//! # Architecture
//!
//! ```text
//! External driver (config loading, credentials, presentation)
//!          |
//!          v
//!    Services Layer  <-- You are here
//!          |
//!          v
//! Filter logic + Capabilities (MessageSource, MessageMutator)
//! ```
//!
//! # Services Overview
//!
//! - [`SelectionRunner`]: Pages through search results and evaluates every candidate
//! - [`BatchMutator`]: Applies trash or delete in rate-limited, retried batches
//! - [`UndoLedger`]: Records intended destructive actions for later compensation
//! - [`EventSink`]: Receives run progress in place of a global logger

mod events;
mod ledger;
mod mutation_service;
mod retry;
mod selection_service;

pub use events::{EventSink, NullSink, RunEvent, TracingSink};
pub use ledger::{Compensation, LedgerEntry, UndoLedger};
pub use mutation_service::{BatchMutator, FailedItem, MutationError, MutationOutcome, RunStatus};
pub use retry::{call_with_retry, RetryError, RetryPolicy};
pub use selection_service::{SelectionError, SelectionResult, SelectionRunner};
