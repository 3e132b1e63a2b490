//! Aggregate statistics for a selection pass.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::categorizer::{Categorizer, Category, CategoryScores};
use super::decision::{FilterDecision, FilterStage};
use super::engine::PredicateEngine;
use crate::domain::{EmailId, MessageMetadata};

const MEDIUM_SIZE_MB: f64 = 1.0;
const LARGE_SIZE_MB: f64 = 10.0;
const MEDIUM_AGE_DAYS: i64 = 30;
const OLD_AGE_DAYS: i64 = 365;

/// Message counts per category flag.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCounts {
    /// Messages flagged as newsletters.
    pub newsletter: usize,
    /// Messages flagged as promotional.
    pub promotional: usize,
    /// Messages from automated senders.
    pub automated: usize,
    /// Receipts and order confirmations.
    pub receipt: usize,
}

impl CategoryCounts {
    fn add(&mut self, category: Category) {
        match category {
            Category::Newsletter => self.newsletter += 1,
            Category::Promotional => self.promotional += 1,
            Category::Automated => self.automated += 1,
            Category::Receipt => self.receipt += 1,
        }
    }
}

/// Size buckets: under 1 MB, 1 to 10 MB, 10 MB and up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SizeHistogram {
    /// Under 1 MB.
    pub small: usize,
    /// 1 MB up to 10 MB.
    pub medium: usize,
    /// 10 MB and up.
    pub large: usize,
}

/// Age buckets: under 30 days, 30 to 365 days, 365 days and up.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgeHistogram {
    /// Under 30 days old.
    pub recent: usize,
    /// 30 days up to a year old.
    pub medium: usize,
    /// A year old or more.
    pub old: usize,
    /// Messages without a usable timestamp.
    pub undated: usize,
}

/// A candidate whose metadata could not be retrieved.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FetchFailure {
    /// Candidate that was skipped.
    pub id: EmailId,
    /// Error from the last fetch attempt.
    pub reason: String,
}

/// Running totals for one selection pass.
///
/// Owned by a single task; callers fold per-message results into it
/// sequentially.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SelectionStats {
    /// Candidate ids returned by the search.
    pub total_candidates: usize,
    /// Candidates whose metadata was fetched and evaluated.
    pub evaluated: usize,
    /// Evaluated messages that passed every stage.
    pub accepted: usize,
    /// Rejections per stage.
    pub excluded: BTreeMap<FilterStage, usize>,
    pub categories: CategoryCounts,
    pub size: SizeHistogram,
    pub age: AgeHistogram,
    /// Total size of accepted messages, an estimate of reclaimable storage.
    pub accepted_bytes: u64,
    pub fetch_failures: Vec<FetchFailure>,
}

impl SelectionStats {
    /// Computes statistics for an already-fetched collection.
    pub fn from_messages<'a>(
        engine: &PredicateEngine,
        categorizer: &Categorizer,
        messages: impl IntoIterator<Item = &'a MessageMetadata>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut stats = Self::default();
        for message in messages {
            stats.total_candidates += 1;
            let decision = engine.evaluate_at(message, now);
            let scores = categorizer.categorize(message);
            stats.record(message, &decision, &scores, now);
        }
        stats
    }

    /// Folds one evaluated message into the totals.
    pub fn record(
        &mut self,
        message: &MessageMetadata,
        decision: &FilterDecision,
        scores: &CategoryScores,
        now: DateTime<Utc>,
    ) {
        self.evaluated += 1;
        if decision.accepted {
            self.accepted += 1;
            self.accepted_bytes += message.size_bytes;
        } else {
            *self.excluded.entry(decision.stage).or_insert(0) += 1;
        }

        for category in scores.flagged() {
            self.categories.add(category);
        }

        let size_mb = message.size_mb();
        if size_mb < MEDIUM_SIZE_MB {
            self.size.small += 1;
        } else if size_mb < LARGE_SIZE_MB {
            self.size.medium += 1;
        } else {
            self.size.large += 1;
        }

        match message.date {
            Some(date) => {
                let age_days = (now - date.with_timezone(&Utc)).num_days();
                if age_days < MEDIUM_AGE_DAYS {
                    self.age.recent += 1;
                } else if age_days < OLD_AGE_DAYS {
                    self.age.medium += 1;
                } else {
                    self.age.old += 1;
                }
            }
            None => self.age.undated += 1,
        }
    }

    /// Records a candidate whose metadata fetch failed.
    pub fn record_failure(&mut self, id: EmailId, reason: impl Into<String>) {
        self.fetch_failures.push(FetchFailure {
            id,
            reason: reason.into(),
        });
    }

    /// Rejections attributed to `stage`.
    pub fn excluded_by(&self, stage: FilterStage) -> usize {
        self.excluded.get(&stage).copied().unwrap_or(0)
    }

    /// Accepted share of evaluated messages, in percent.
    pub fn accept_percentage(&self) -> f64 {
        if self.evaluated == 0 {
            0.0
        } else {
            self.accepted as f64 * 100.0 / self.evaluated as f64
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::FilterConfig;
    use crate::domain::Address;
    use chrono::{Duration, TimeZone};
    use pretty_assertions::assert_eq;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
    }

    fn message(id: &str, days_old: i64, size_bytes: u64) -> MessageMetadata {
        MessageMetadata::new(id, "t")
            .sender(Address::new("person@example.com"))
            .subject("Hello")
            .date((now() - Duration::days(days_old)).fixed_offset())
            .labels(["INBOX"])
            .size_bytes(size_bytes)
    }

    #[test]
    fn stats_over_collection() {
        let config = FilterConfig::default();
        let engine = PredicateEngine::new(config.clone());
        let categorizer = Categorizer::new(&config);

        let messages = vec![
            message("old-small", 400, 1_000),
            message("old-large", 800, 12 * 1024 * 1024),
            message("recent", 5, 2 * 1024 * 1024),
            message("important", 400, 1_000).labels(["IMPORTANT"]),
            MessageMetadata::new("undated", "t").subject("Special Offer - 50% Off!"),
        ];

        let stats = SelectionStats::from_messages(&engine, &categorizer, &messages, now());

        assert_eq!(stats.total_candidates, 5);
        assert_eq!(stats.evaluated, 5);
        assert_eq!(stats.accepted, 2);
        assert_eq!(stats.excluded_by(FilterStage::Exclusion), 1);
        assert_eq!(stats.excluded_by(FilterStage::Time), 2);
        assert_eq!(stats.excluded_by(FilterStage::Size), 0);
        assert_eq!(stats.accepted_bytes, 1_000 + 12 * 1024 * 1024);
        assert_eq!(
            stats.size,
            SizeHistogram {
                small: 3,
                medium: 1,
                large: 1
            }
        );
        assert_eq!(
            stats.age,
            AgeHistogram {
                recent: 1,
                medium: 0,
                old: 3,
                undated: 1
            }
        );
        assert_eq!(stats.categories.promotional, 1);
        assert_eq!(stats.accept_percentage(), 40.0);
    }

    #[test]
    fn age_bucket_boundaries() {
        let engine = PredicateEngine::new(FilterConfig::empty());
        let categorizer = Categorizer::new(&FilterConfig::empty());
        let messages = [
            message("a", 29, 0),
            message("b", 30, 0),
            message("c", 364, 0),
            message("d", 365, 0),
        ];

        let stats = SelectionStats::from_messages(&engine, &categorizer, &messages, now());
        assert_eq!(stats.age.recent, 1);
        assert_eq!(stats.age.medium, 2);
        assert_eq!(stats.age.old, 1);
    }

    #[test]
    fn empty_collection() {
        let engine = PredicateEngine::new(FilterConfig::default());
        let categorizer = Categorizer::new(&FilterConfig::default());
        let stats = SelectionStats::from_messages(&engine, &categorizer, &[], now());

        assert_eq!(stats, SelectionStats::default());
        assert_eq!(stats.accept_percentage(), 0.0);
    }

    #[test]
    fn fetch_failures_are_kept() {
        let mut stats = SelectionStats::default();
        stats.record_failure(EmailId::from("gone"), "not found: gone");

        assert_eq!(stats.fetch_failures.len(), 1);
        assert_eq!(stats.fetch_failures[0].id, EmailId::from("gone"));
        assert_eq!(stats.evaluated, 0);
    }
}
