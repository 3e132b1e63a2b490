//! Filter decision types.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Named predicate group, in evaluation order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FilterStage {
    /// Protected labels, folders and senders.
    Exclusion,
    /// Age window.
    Time,
    /// Size bounds.
    Size,
    /// Sender allowlist.
    Sender,
    /// Required labels.
    Content,
    /// Structured custom predicates.
    Custom,
    /// No stage rejected the message.
    Inclusive,
}

impl FilterStage {
    /// Returns the snake_case tag for this stage.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Exclusion => "exclusion",
            Self::Time => "time",
            Self::Size => "size",
            Self::Sender => "sender",
            Self::Content => "content",
            Self::Custom => "custom",
            Self::Inclusive => "inclusive",
        }
    }
}

impl fmt::Display for FilterStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stage's reason for refusing a message.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejection {
    /// Stage that rejected.
    pub stage: FilterStage,
    /// Human-readable reason.
    pub reason: String,
    /// Confidence in [0, 1].
    pub confidence: f64,
    /// Diagnostic context.
    pub attributes: BTreeMap<String, Value>,
}

impl Rejection {
    /// Creates a rejection with no diagnostic attributes.
    pub fn new(stage: FilterStage, confidence: f64, reason: impl Into<String>) -> Self {
        Self {
            stage,
            reason: reason.into(),
            confidence,
            attributes: BTreeMap::new(),
        }
    }

    /// Adds a diagnostic attribute.
    pub fn with(mut self, key: &str, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.to_string(), value.into());
        self
    }
}

/// Outcome of evaluating one message against the rule set.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterDecision {
    /// Whether the message is eligible for action.
    pub accepted: bool,
    /// Human-readable reason.
    pub reason: String,
    /// Confidence in [0, 1]. Hard exclusions are always 1.0.
    pub confidence: f64,
    /// Stage that produced the decision.
    pub stage: FilterStage,
    /// Diagnostic context.
    pub attributes: BTreeMap<String, Value>,
}

impl FilterDecision {
    /// Confidence attached to a message that passed every stage.
    pub const ACCEPT_CONFIDENCE: f64 = 0.8;

    /// The decision for a message no stage rejected.
    pub fn accept() -> Self {
        let mut attributes = BTreeMap::new();
        attributes.insert("passed_all_filters".to_string(), Value::Bool(true));
        Self {
            accepted: true,
            reason: "passed all filter criteria".to_string(),
            confidence: Self::ACCEPT_CONFIDENCE,
            stage: FilterStage::Inclusive,
            attributes,
        }
    }

    /// Whether the message was rejected.
    pub fn rejected(&self) -> bool {
        !self.accepted
    }
}

impl From<Rejection> for FilterDecision {
    fn from(rejection: Rejection) -> Self {
        Self {
            accepted: false,
            reason: rejection.reason,
            confidence: rejection.confidence,
            stage: rejection.stage,
            attributes: rejection.attributes,
        }
    }
}
