//! Provider search query compilation.
//!
//! The compiled string only narrows server-side retrieval. Every candidate it
//! returns still goes through [`PredicateEngine`](super::PredicateEngine).

use crate::config::FilterConfig;

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Translates a rule set into Gmail search syntax.
#[derive(Debug, Clone, Copy, Default)]
pub struct QueryCompiler;

impl QueryCompiler {
    /// Compiles `config` into a space-joined query.
    ///
    /// Clause order: age bounds, size bounds, excluded labels, excluded
    /// folders, required labels, excluded senders, allowed senders, then the
    /// custom fragments verbatim. Zero bounds are skipped.
    pub fn compile(config: &FilterConfig) -> String {
        let mut parts = Vec::new();

        if let Some(days) = config.older_than_days.filter(|d| *d > 0) {
            parts.push(format!("older_than:{}d", days));
        }
        if let Some(days) = config.newer_than_days.filter(|d| *d > 0) {
            parts.push(format!("newer_than:{}d", days));
        }

        if let Some(mb) = config.min_size_mb.filter(|m| *m > 0.0) {
            parts.push(format!("larger:{}", mb_to_bytes(mb)));
        }
        if let Some(mb) = config.max_size_mb.filter(|m| *m > 0.0) {
            parts.push(format!("smaller:{}", mb_to_bytes(mb)));
        }

        parts.extend(config.exclude_labels.iter().map(|l| format!("-label:{}", l)));
        parts.extend(config.exclude_folders.iter().map(|f| format!("-in:{}", f)));
        if let Some(group) = or_group("label", config.include_labels.iter()) {
            parts.push(group);
        }

        parts.extend(config.exclude_senders.iter().map(|s| format!("-from:{}", s)));
        if let Some(group) = or_group("from", config.include_senders.iter()) {
            parts.push(group);
        }

        parts.extend(config.custom_queries.iter().cloned());

        parts.join(" ")
    }
}

fn mb_to_bytes(mb: f64) -> u64 {
    (mb * BYTES_PER_MB) as u64
}

fn or_group<T: std::fmt::Display>(
    operator: &str,
    values: impl Iterator<Item = T>,
) -> Option<String> {
    let terms: Vec<String> = values.map(|v| format!("{}:{}", operator, v)).collect();
    if terms.is_empty() {
        None
    } else {
        Some(format!("({})", terms.join(" OR ")))
    }
}
