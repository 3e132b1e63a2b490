//! mailsweep - rule-driven mailbox cleanup
//!
//! This crate selects messages in a remote mailbox against a declarative rule
//! set and applies bulk trash/delete operations to the selection, with
//! dry-run, bounded retry and an undo ledger.
//!
//! The crate never authenticates or opens sockets. Callers hand it a
//! [`MessageSource`](providers::email::MessageSource) and a
//! [`MessageMutator`](providers::email::MessageMutator) and drive the two
//! entry points:
//!
//! ```ignore
//! let settings: Settings = load_somehow()?;
//! settings.validate()?;
//!
//! let runner = SelectionRunner::new(source, settings.selection.clone());
//! let selection = runner.select(&settings.filter).await?;
//!
//! let mutator = BatchMutator::new(mutator, settings.safety.clone());
//! let outcome = mutator.apply_selection(MutationAction::Trash, &selection).await?;
//! ```

pub mod config;
pub mod domain;
pub mod filter;
pub mod logging;
pub mod providers;
pub mod services;
