//! Domain layer types.
//!
//! Identifiers, addresses and the per-message metadata record the filter
//! engine and mutation pipeline operate on.

mod action;
mod label;
mod message;
mod types;

pub use action::MutationAction;
pub use label::system_labels;
pub use message::{Address, MessageMetadata};
pub use types::{EmailId, LabelId, ThreadId};
