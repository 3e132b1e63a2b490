//! Heuristic message categorization.
//!
//! Scores are reporting signals only and never feed the accept/reject
//! decision. Each axis is additive, capped at 1.0, and matched as a
//! case-insensitive substring search: a keyword inside a longer word counts.
//!
//! Weights are kept in tenths so threshold comparisons are exact.

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};

use crate::config::FilterConfig;
use crate::domain::MessageMetadata;

const NEWSLETTER_PATTERNS: &[&str] = &[
    r"unsubscribe",
    r"newsletter",
    r"marketing",
    r"promotional?",
    r"offer",
    r"deal",
    r"sale",
    r"discount",
    r"click here",
    r"limited time",
];

const AUTOMATED_PATTERNS: &[&str] = &[
    r"noreply",
    r"no-reply",
    r"donotreply",
    r"automated",
    r"notification",
    r"alert",
    r"system",
];

const PROMOTIONAL_KEYWORDS: &[&str] = &["sale", "deal", "offer", "discount", "limited time", "%"];

const RECEIPT_KEYWORDS: &[&str] = &[
    "receipt",
    "invoice",
    "payment",
    "order",
    "purchase",
    "transaction",
];

/// Category axis.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    /// Mailing lists and bulk marketing.
    Newsletter,
    /// Sales and discount offers.
    Promotional,
    /// Machine-generated notifications.
    Automated,
    /// Receipts, invoices and order confirmations.
    Receipt,
}

/// Per-axis scores and threshold flags for one message.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CategoryScores {
    /// Newsletter score in [0, 1].
    pub newsletter: f64,
    /// Promotional score in [0, 1].
    pub promotional: f64,
    /// Automated score in [0, 1].
    pub automated: f64,
    /// Receipt score in [0, 1].
    pub receipt: f64,
    /// Newsletter score above 0.5.
    pub is_newsletter: bool,
    /// Promotional score at or above 0.4.
    pub is_promotional: bool,
    /// Automated score above 0.5.
    pub is_automated: bool,
    /// Receipt score above 0.6.
    pub is_receipt: bool,
}

impl CategoryScores {
    /// Categories whose threshold was crossed.
    pub fn flagged(&self) -> impl Iterator<Item = Category> {
        [
            (Category::Newsletter, self.is_newsletter),
            (Category::Promotional, self.is_promotional),
            (Category::Automated, self.is_automated),
            (Category::Receipt, self.is_receipt),
        ]
        .into_iter()
        .filter_map(|(category, flagged)| flagged.then_some(category))
    }
}

/// Scores messages across the category axes.
#[derive(Debug, Clone)]
pub struct Categorizer {
    newsletter_patterns: Vec<Regex>,
    automated_patterns: Vec<Regex>,
    newsletter_domains: Vec<String>,
}

impl Categorizer {
    /// Creates a categorizer using the rule set's newsletter sender fragments.
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            newsletter_patterns: compile(NEWSLETTER_PATTERNS),
            automated_patterns: compile(AUTOMATED_PATTERNS),
            newsletter_domains: config
                .newsletter_domains
                .iter()
                .map(|d| d.to_lowercase())
                .collect(),
        }
    }

    /// Scores one message. Pure: the same input always yields the same scores.
    pub fn categorize(&self, message: &MessageMetadata) -> CategoryScores {
        let subject = message.subject.to_lowercase();
        let sender = message.from.email.to_lowercase();

        let newsletter = 3 * count_regex(&self.newsletter_patterns, &subject)
            + 4 * self
                .newsletter_domains
                .iter()
                .filter(|d| sender.contains(d.as_str()))
                .count();

        let automated = 5 * count_regex(&self.automated_patterns, &sender)
            + 3 * count_regex(&self.automated_patterns, &subject);

        let promotional = 2 * count_keywords(PROMOTIONAL_KEYWORDS, &subject);
        let receipt = 3 * count_keywords(RECEIPT_KEYWORDS, &subject);

        CategoryScores {
            newsletter: capped(newsletter),
            promotional: capped(promotional),
            automated: capped(automated),
            receipt: capped(receipt),
            is_newsletter: newsletter > 5,
            is_promotional: promotional >= 4,
            is_automated: automated > 5,
            is_receipt: receipt > 6,
        }
    }
}

fn compile(patterns: &[&str]) -> Vec<Regex> {
    patterns
        .iter()
        .filter_map(|p| RegexBuilder::new(p).case_insensitive(true).build().ok())
        .collect()
}

fn count_regex(patterns: &[Regex], haystack: &str) -> usize {
    patterns.iter().filter(|p| p.is_match(haystack)).count()
}

fn count_keywords(keywords: &[&str], haystack: &str) -> usize {
    keywords.iter().filter(|k| haystack.contains(**k)).count()
}

fn capped(tenths: usize) -> f64 {
    (tenths as f64 / 10.0).min(1.0)
}
