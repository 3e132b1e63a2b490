//! Predicate engine: the authoritative accept/reject decision.
//!
//! Stages run in a fixed order and the first rejection wins; later stages
//! are never consulted once one refuses. Every stage is a total function of
//! the message, the rule set and the evaluation instant, so evaluation never
//! fails. A missing date is a decision (conservative reject), not an error.

use chrono::{DateTime, TimeDelta, Utc};
use serde_json::json;

use super::decision::{FilterDecision, FilterStage, Rejection};
use crate::config::FilterConfig;
use crate::domain::MessageMetadata;

type Stage = fn(&PredicateEngine, &MessageMetadata, DateTime<Utc>) -> Option<Rejection>;

const STAGES: [Stage; 6] = [
    PredicateEngine::check_exclusions,
    PredicateEngine::check_time,
    PredicateEngine::check_size,
    PredicateEngine::check_sender,
    PredicateEngine::check_content,
    PredicateEngine::check_custom,
];

/// Evaluates messages against a [`FilterConfig`].
#[derive(Debug, Clone)]
pub struct PredicateEngine {
    config: FilterConfig,
}

impl PredicateEngine {
    /// Creates an engine over a rule set snapshot.
    pub fn new(config: FilterConfig) -> Self {
        Self { config }
    }

    /// The rule set this engine evaluates.
    pub fn config(&self) -> &FilterConfig {
        &self.config
    }

    /// Evaluates a message relative to the current time.
    pub fn evaluate(&self, message: &MessageMetadata) -> FilterDecision {
        self.evaluate_at(message, Utc::now())
    }

    /// Evaluates a message relative to `now`.
    pub fn evaluate_at(&self, message: &MessageMetadata, now: DateTime<Utc>) -> FilterDecision {
        STAGES
            .iter()
            .find_map(|stage| stage(self, message, now))
            .map(FilterDecision::from)
            .unwrap_or_else(FilterDecision::accept)
    }

    fn check_exclusions(
        &self,
        message: &MessageMetadata,
        _now: DateTime<Utc>,
    ) -> Option<Rejection> {
        if let Some(label) = self
            .config
            .exclude_labels
            .iter()
            .find(|l| message.has_label(l))
        {
            return Some(
                Rejection::new(
                    FilterStage::Exclusion,
                    1.0,
                    format!("has excluded label: {}", label),
                )
                .with("excluded_label", label.as_str()),
            );
        }

        if let Some(folder) = self
            .config
            .exclude_folders
            .iter()
            .find(|f| message.has_label(f))
        {
            return Some(
                Rejection::new(
                    FilterStage::Exclusion,
                    1.0,
                    format!("in excluded folder: {}", folder),
                )
                .with("excluded_folder", folder.as_str()),
            );
        }

        self.config
            .exclude_senders
            .iter()
            .find(|s| message.from.contains(s))
            .map(|sender| {
                Rejection::new(
                    FilterStage::Exclusion,
                    1.0,
                    format!("from excluded sender: {}", sender),
                )
                .with("excluded_sender", sender.as_str())
            })
    }

    fn check_time(&self, message: &MessageMetadata, now: DateTime<Utc>) -> Option<Rejection> {
        let Some(date) = message.date else {
            return Some(
                Rejection::new(FilterStage::Time, 0.5, "unparseable date")
                    .with("date_parse_error", true),
            );
        };
        let sent = date.with_timezone(&Utc);
        let age_days = (now - sent).num_days();

        if let Some(days) = self.older_than_days() {
            // An unrepresentable cutoff predates every message.
            let too_recent = cutoff(now, days).map_or(true, |cutoff| sent > cutoff);
            if too_recent {
                return Some(
                    Rejection::new(
                        FilterStage::Time,
                        1.0,
                        format!("email too recent (newer than {} days)", days),
                    )
                    .with("email_age_days", age_days)
                    .with("cutoff_days", days),
                );
            }
        }

        if let Some(days) = self.newer_than_days() {
            let too_old = cutoff(now, days).is_some_and(|cutoff| sent < cutoff);
            if too_old {
                return Some(
                    Rejection::new(
                        FilterStage::Time,
                        1.0,
                        format!("email too old (older than {} days)", days),
                    )
                    .with("email_age_days", age_days)
                    .with("max_age_days", days),
                );
            }
        }

        None
    }

    fn check_size(&self, message: &MessageMetadata, _now: DateTime<Utc>) -> Option<Rejection> {
        let size_mb = message.size_mb();

        if let Some(min) = self.min_size_mb() {
            if size_mb < min {
                return Some(
                    Rejection::new(
                        FilterStage::Size,
                        0.8,
                        format!("email too small ({:.2} MB < {} MB)", size_mb, min),
                    )
                    .with("size_mb", size_mb)
                    .with("min_size_mb", min),
                );
            }
        }

        if let Some(max) = self.max_size_mb() {
            if size_mb > max {
                return Some(
                    Rejection::new(
                        FilterStage::Size,
                        0.8,
                        format!("email too large ({:.2} MB > {} MB)", size_mb, max),
                    )
                    .with("size_mb", size_mb)
                    .with("max_size_mb", max),
                );
            }
        }

        None
    }

    fn check_sender(
        &self,
        message: &MessageMetadata,
        _now: DateTime<Utc>,
    ) -> Option<Rejection> {
        let allow = &self.config.include_senders;
        if allow.is_empty() || allow.iter().any(|s| message.from.contains(s)) {
            return None;
        }
        Some(
            Rejection::new(FilterStage::Sender, 0.9, "sender not in allowlist")
                .with("sender", message.from.email.to_lowercase())
                .with("allowlist_only", true),
        )
    }

    fn check_content(
        &self,
        message: &MessageMetadata,
        _now: DateTime<Utc>,
    ) -> Option<Rejection> {
        let required = &self.config.include_labels;
        if required.is_empty() || required.iter().any(|l| message.has_label(l)) {
            return None;
        }
        Some(
            Rejection::new(FilterStage::Content, 0.8, "missing required labels")
                .with("required_labels", json!(required))
                .with("email_labels", json!(message.labels)),
        )
    }

    /// Extension point for structured predicates. Free-text query fragments
    /// use provider syntax and only ever reach the server-side search.
    fn check_custom(
        &self,
        _message: &MessageMetadata,
        _now: DateTime<Utc>,
    ) -> Option<Rejection> {
        None
    }

    // A zero bound is treated as unset, matching the query compiler.

    fn older_than_days(&self) -> Option<u32> {
        self.config.older_than_days.filter(|d| *d > 0)
    }

    fn newer_than_days(&self) -> Option<u32> {
        self.config.newer_than_days.filter(|d| *d > 0)
    }

    fn min_size_mb(&self) -> Option<f64> {
        self.config.min_size_mb.filter(|m| *m > 0.0)
    }

    fn max_size_mb(&self) -> Option<f64> {
        self.config.max_size_mb.filter(|m| *m > 0.0)
    }
}

/// The instant `days` before `now`, if chrono can represent it.
fn cutoff(now: DateTime<Utc>, days: u32) -> Option<DateTime<Utc>> {
    TimeDelta::try_days(i64::from(days)).and_then(|delta| now.checked_sub_signed(delta))
}
