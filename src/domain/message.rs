//! Message metadata domain types.
//!
//! [`MessageMetadata`] is the fixed record of decision-relevant facts about
//! one message. Every predicate and every statistic is computed from it, so
//! it deliberately carries no body content.

use std::collections::BTreeSet;

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::{EmailId, LabelId, ThreadId};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// An email address with optional display name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Address {
    /// Email address.
    pub email: String,
    /// Display name (e.g., "John Doe").
    pub name: Option<String>,
}

impl Address {
    /// Creates a new address with just an email.
    pub fn new(email: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: None,
        }
    }

    /// Creates a new address with email and display name.
    pub fn with_name(email: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            name: Some(name.into()),
        }
    }

    /// Parses a header value like `"Name" <email@example.com>`.
    ///
    /// Values without angle brackets are taken as a bare address.
    pub fn parse(value: &str) -> Self {
        let value = value.trim();
        if let (Some(start), Some(end)) = (value.find('<'), value.rfind('>')) {
            if start < end {
                let email = value[start + 1..end].trim().to_string();
                let name = value[..start].trim().trim_matches('"').trim().to_string();
                return Self {
                    email,
                    name: if name.is_empty() { None } else { Some(name) },
                };
            }
        }
        Self::new(value)
    }

    /// Returns the display representation of this address.
    ///
    /// If a name is present, returns "Name <email>", otherwise just the email.
    pub fn display(&self) -> String {
        match &self.name {
            Some(name) => format!("{} <{}>", name, self.email),
            None => self.email.clone(),
        }
    }

    /// Case-insensitive substring match against the address or display name.
    pub fn contains(&self, needle: &str) -> bool {
        let needle = needle.to_lowercase();
        self.email.to_lowercase().contains(&needle)
            || self
                .name
                .as_ref()
                .is_some_and(|n| n.to_lowercase().contains(&needle))
    }
}

/// Decision-relevant facts about one message.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageMetadata {
    /// Provider message id.
    pub id: EmailId,
    /// Conversation the message belongs to.
    pub thread_id: ThreadId,
    /// Labels (and folders) applied to the message.
    pub labels: BTreeSet<LabelId>,
    /// Sender.
    pub from: Address,
    /// Subject line, empty when the header is missing.
    pub subject: String,
    /// Send date with the sender's UTC offset. `None` when missing or unparseable.
    pub date: Option<DateTime<FixedOffset>>,
    /// Provider size estimate in bytes.
    pub size_bytes: u64,
    /// Number of file attachments.
    pub attachment_count: u32,
}

impl MessageMetadata {
    /// Creates metadata with no labels, no date and zero size.
    pub fn new(id: impl Into<EmailId>, thread_id: impl Into<ThreadId>) -> Self {
        Self {
            id: id.into(),
            thread_id: thread_id.into(),
            labels: BTreeSet::new(),
            from: Address::default(),
            subject: String::new(),
            date: None,
            size_bytes: 0,
            attachment_count: 0,
        }
    }

    /// Sets the sender.
    pub fn sender(mut self, from: Address) -> Self {
        self.from = from;
        self
    }

    /// Sets the subject.
    pub fn subject(mut self, subject: impl Into<String>) -> Self {
        self.subject = subject.into();
        self
    }

    /// Sets the send date.
    pub fn date(mut self, date: DateTime<FixedOffset>) -> Self {
        self.date = Some(date);
        self
    }

    /// Sets the size estimate.
    pub fn size_bytes(mut self, size: u64) -> Self {
        self.size_bytes = size;
        self
    }

    /// Sets the attachment count.
    pub fn attachments(mut self, count: u32) -> Self {
        self.attachment_count = count;
        self
    }

    /// Adds labels.
    pub fn labels<I, L>(mut self, labels: I) -> Self
    where
        I: IntoIterator<Item = L>,
        L: Into<LabelId>,
    {
        self.labels.extend(labels.into_iter().map(Into::into));
        self
    }

    /// Whether the message carries the given label.
    pub fn has_label(&self, label: &LabelId) -> bool {
        self.labels.contains(label)
    }

    /// Whether the message has at least one attachment.
    pub fn has_attachments(&self) -> bool {
        self.attachment_count > 0
    }

    /// Size in mebibytes, the unit size bounds are configured in.
    pub fn size_mb(&self) -> f64 {
        self.size_bytes as f64 / BYTES_PER_MB
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn address_display_with_name() {
        let addr = Address::with_name("test@example.com", "Test User");
        assert_eq!(addr.display(), "Test User <test@example.com>");
    }

    #[test]
    fn address_display_without_name() {
        let addr = Address::new("test@example.com");
        assert_eq!(addr.display(), "test@example.com");
    }

    #[test]
    fn address_parse_with_quoted_name() {
        let addr = Address::parse("\"Acme Deals\" <deals@acme.example>");
        assert_eq!(addr.email, "deals@acme.example");
        assert_eq!(addr.name.as_deref(), Some("Acme Deals"));
    }

    #[test]
    fn address_parse_bare() {
        let addr = Address::parse("  alerts@bank.example ");
        assert_eq!(addr, Address::new("alerts@bank.example"));
    }

    #[test]
    fn address_contains_is_case_insensitive() {
        let addr = Address::with_name("News@Shop.example", "Shop Weekly");
        assert!(addr.contains("news@shop"));
        assert!(addr.contains("WEEKLY"));
        assert!(!addr.contains("billing"));
    }

    #[test]
    fn metadata_builder_collects_labels() {
        let msg = MessageMetadata::new("m1", "t1")
            .labels(["INBOX", "CATEGORY_PROMOTIONS", "INBOX"])
            .size_bytes(2 * 1024 * 1024)
            .attachments(2);

        assert_eq!(msg.labels.len(), 2);
        assert!(msg.has_label(&LabelId::from("INBOX")));
        assert!(msg.has_attachments());
        assert!((msg.size_mb() - 2.0).abs() < f64::EPSILON);
        assert!(msg.date.is_none());
    }
}
