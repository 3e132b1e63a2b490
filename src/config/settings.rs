//! Run settings: filter rules, safety parameters and selection tuning.
//!
//! Loading these from disk is the caller's business; every type here is
//! `serde`-ready with `#[serde(default)]` so a partial document fills in the
//! remaining fields from the defaults below.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::{system_labels, LabelId};

/// Largest page the provider serves for a single search request.
pub const MAX_PAGE_SIZE: u32 = 500;

/// Largest batch size accepted by validation.
pub const MAX_BATCH_SIZE: usize = 1000;

/// Largest day count accepted for an age bound.
pub const MAX_AGE_DAYS: u32 = 36_500;

/// A single configuration problem reported by validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Batch size outside `1..=MAX_BATCH_SIZE`.
    #[error("batch size must be between 1 and {max}: {value}")]
    BatchSize {
        /// Configured value.
        value: usize,
        /// Upper bound.
        max: usize,
    },

    /// Page size outside `1..=MAX_PAGE_SIZE`.
    #[error("page size must be between 1 and {max}: {value}")]
    PageSize {
        /// Configured value.
        value: u32,
        /// Upper bound.
        max: u32,
    },

    /// Fetch concurrency of zero.
    #[error("fetch concurrency must be at least 1")]
    Concurrency,

    /// Zero call timeout.
    #[error("call timeout must be greater than zero")]
    Timeout,

    /// Negative or non-finite size bound.
    #[error("{field} must be a non-negative number of megabytes: {value}")]
    SizeBound {
        /// Name of the offending field.
        field: &'static str,
        /// Configured value.
        value: f64,
    },

    /// `min_size_mb` above `max_size_mb`.
    #[error("min_size_mb ({min}) exceeds max_size_mb ({max})")]
    SizeRange {
        /// Configured minimum.
        min: f64,
        /// Configured maximum.
        max: f64,
    },

    /// Age bound above `MAX_AGE_DAYS`.
    #[error("{field} must be at most {max} days: {value}")]
    AgeBound {
        /// Name of the offending field.
        field: &'static str,
        /// Configured value.
        value: u32,
        /// Upper bound.
        max: u32,
    },

    /// `newer_than_days` not above `older_than_days`, so no message can match.
    #[error("empty age window: newer_than_days ({newer}) must exceed older_than_days ({older})")]
    AgeWindow {
        /// Configured older-than bound.
        older: u32,
        /// Configured newer-than bound.
        newer: u32,
    },

    /// Blank entry in a pattern list.
    #[error("{field} contains an empty entry")]
    EmptyPattern {
        /// Name of the offending field.
        field: &'static str,
    },
}

/// Top-level settings for one run.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Rule set deciding which messages are eligible.
    pub filter: FilterConfig,
    /// Safety parameters for destructive operations.
    pub safety: SafetyConfig,
    /// Candidate retrieval tuning.
    pub selection: SelectionSettings,
}

impl Settings {
    /// Validates every section, returning all problems found.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        let mut errors = Vec::new();
        errors.extend(self.filter.problems());
        errors.extend(self.safety.problems());
        errors.extend(self.selection.problems());
        into_result(errors)
    }
}

/// Rule set for selecting messages.
///
/// Absence of a rule is always an empty list, never a missing field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Only messages older than this many days are eligible.
    pub older_than_days: Option<u32>,
    /// Only messages newer than this many days are eligible.
    pub newer_than_days: Option<u32>,
    /// Minimum size in megabytes.
    pub min_size_mb: Option<f64>,
    /// Maximum size in megabytes.
    pub max_size_mb: Option<f64>,
    /// Sender substrings that protect a message.
    pub exclude_senders: Vec<String>,
    /// Sender substrings a message must match when non-empty.
    pub include_senders: Vec<String>,
    /// Sender fragments that mark newsletter traffic (categorization only).
    pub newsletter_domains: Vec<String>,
    /// Labels that protect a message.
    pub exclude_labels: Vec<LabelId>,
    /// Labels of which a message must carry at least one when non-empty.
    pub include_labels: Vec<LabelId>,
    /// Folders that protect a message.
    pub exclude_folders: Vec<LabelId>,
    /// Raw provider query fragments, forwarded to the server-side search only.
    pub custom_queries: Vec<String>,
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            older_than_days: Some(365),
            newer_than_days: None,
            min_size_mb: None,
            max_size_mb: None,
            exclude_senders: Vec::new(),
            include_senders: Vec::new(),
            newsletter_domains: [
                "noreply@",
                "no-reply@",
                "newsletter@",
                "marketing@",
                "notifications@",
                "updates@",
                "support@",
            ]
            .into_iter()
            .map(String::from)
            .collect(),
            exclude_labels: vec![system_labels::important(), system_labels::starred()],
            include_labels: Vec::new(),
            exclude_folders: vec![system_labels::sent(), system_labels::drafts()],
            custom_queries: Vec::new(),
        }
    }
}

impl FilterConfig {
    /// A rule set with no constraints at all.
    pub fn empty() -> Self {
        Self {
            older_than_days: None,
            newer_than_days: None,
            min_size_mb: None,
            max_size_mb: None,
            exclude_senders: Vec::new(),
            include_senders: Vec::new(),
            newsletter_domains: Vec::new(),
            exclude_labels: Vec::new(),
            include_labels: Vec::new(),
            exclude_folders: Vec::new(),
            custom_queries: Vec::new(),
        }
    }

    /// Validates the rule set.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        into_result(self.problems())
    }

    fn problems(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();

        let size_bounds = [
            ("min_size_mb", self.min_size_mb),
            ("max_size_mb", self.max_size_mb),
        ];
        for (field, bound) in size_bounds {
            if let Some(value) = bound {
                if !value.is_finite() || value < 0.0 {
                    errors.push(ConfigError::SizeBound { field, value });
                }
            }
        }
        // Zero bounds are unset, as in the engine and the query compiler.
        let min_size = self.min_size_mb.filter(|m| *m > 0.0);
        let max_size = self.max_size_mb.filter(|m| *m > 0.0);
        if let (Some(min), Some(max)) = (min_size, max_size) {
            if min > max {
                errors.push(ConfigError::SizeRange { min, max });
            }
        }

        let age_bounds = [
            ("older_than_days", self.older_than_days),
            ("newer_than_days", self.newer_than_days),
        ];
        for (field, bound) in age_bounds {
            if let Some(value) = bound.filter(|d| *d > MAX_AGE_DAYS) {
                errors.push(ConfigError::AgeBound {
                    field,
                    value,
                    max: MAX_AGE_DAYS,
                });
            }
        }
        let older = self.older_than_days.filter(|d| *d > 0);
        let newer = self.newer_than_days.filter(|d| *d > 0);
        if let (Some(older), Some(newer)) = (older, newer) {
            if newer <= older {
                errors.push(ConfigError::AgeWindow { older, newer });
            }
        }

        let string_lists = [
            ("exclude_senders", &self.exclude_senders),
            ("include_senders", &self.include_senders),
            ("newsletter_domains", &self.newsletter_domains),
        ];
        for (field, list) in string_lists {
            if list.iter().any(|s| s.trim().is_empty()) {
                errors.push(ConfigError::EmptyPattern { field });
            }
        }
        let label_lists = [
            ("exclude_labels", &self.exclude_labels),
            ("include_labels", &self.include_labels),
            ("exclude_folders", &self.exclude_folders),
        ];
        for (field, list) in label_lists {
            if list.iter().any(|l| l.as_str().trim().is_empty()) {
                errors.push(ConfigError::EmptyPattern { field });
            }
        }

        errors
    }
}

/// Safety parameters for the mutation pipeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SafetyConfig {
    /// Compute everything but issue no destructive calls.
    pub dry_run_mode: bool,
    /// Messages per batch.
    pub batch_size: usize,
    /// Fixed pause between outbound calls.
    #[serde(with = "duration_secs")]
    pub rate_limit_delay: Duration,
    /// Retries per item after the first attempt.
    pub max_retries: u32,
    /// Trash instead of permanently deleting.
    pub soft_delete: bool,
    /// Record an undo ledger entry before each destructive call.
    pub enable_rollback: bool,
}

impl Default for SafetyConfig {
    fn default() -> Self {
        Self {
            dry_run_mode: true,
            batch_size: 50,
            rate_limit_delay: Duration::from_millis(100),
            max_retries: 3,
            soft_delete: true,
            enable_rollback: true,
        }
    }
}

impl SafetyConfig {
    /// Validates the safety parameters.
    pub fn validate(&self) -> Result<(), Vec<ConfigError>> {
        into_result(self.problems())
    }

    fn problems(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.batch_size == 0 || self.batch_size > MAX_BATCH_SIZE {
            errors.push(ConfigError::BatchSize {
                value: self.batch_size,
                max: MAX_BATCH_SIZE,
            });
        }
        errors
    }
}

/// Tuning for candidate retrieval.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectionSettings {
    /// Stop after this many candidates.
    pub max_results: Option<usize>,
    /// Ids requested per search page.
    pub page_size: u32,
    /// Metadata fetches in flight at once.
    pub fetch_concurrency: usize,
    /// Upper bound on any single outbound call.
    #[serde(with = "duration_secs")]
    pub call_timeout: Duration,
}

impl Default for SelectionSettings {
    fn default() -> Self {
        Self {
            max_results: None,
            page_size: MAX_PAGE_SIZE,
            fetch_concurrency: 4,
            call_timeout: Duration::from_secs(30),
        }
    }
}

impl SelectionSettings {
    fn problems(&self) -> Vec<ConfigError> {
        let mut errors = Vec::new();
        if self.page_size == 0 || self.page_size > MAX_PAGE_SIZE {
            errors.push(ConfigError::PageSize {
                value: self.page_size,
                max: MAX_PAGE_SIZE,
            });
        }
        if self.fetch_concurrency == 0 {
            errors.push(ConfigError::Concurrency);
        }
        if self.call_timeout.is_zero() {
            errors.push(ConfigError::Timeout);
        }
        errors
    }
}

fn into_result(errors: Vec<ConfigError>) -> Result<(), Vec<ConfigError>> {
    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

/// Durations as fractional seconds.
mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        duration.as_secs_f64().serialize(serializer)
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs = f64::deserialize(deserializer)?;
        Duration::try_from_secs_f64(secs).map_err(|e| serde::de::Error::custom(e.to_string()))
    }
}
