//! Message selection logic.
//!
//! - [`PredicateEngine`]: authoritative accept/reject decision per message
//! - [`Categorizer`]: confidence-scored category signals, for reporting only
//! - [`QueryCompiler`]: best-effort provider query used to narrow retrieval
//! - [`SelectionStats`]: aggregate counters and histograms for a pass

mod categorizer;
mod decision;
mod engine;
mod query;
mod stats;

pub use categorizer::{Categorizer, Category, CategoryScores};
pub use decision::{FilterDecision, FilterStage, Rejection};
pub use engine::PredicateEngine;
pub use query::QueryCompiler;
pub use stats::{AgeHistogram, CategoryCounts, FetchFailure, SelectionStats, SizeHistogram};
