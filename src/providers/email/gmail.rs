//! Gmail API resource decoding.
//!
//! Maps the JSON resources returned by the Gmail API v1 onto core types.
//! Transport and OAuth belong to the caller; whoever implements
//! [`MessageSource`](super::MessageSource) over HTTP can deserialize
//! responses into these types and convert them here:
//!
//! - `users.messages.list` → [`MessageList`] → [`SearchPage`]
//! - `users.messages.get` (`metadata` or `full` format) → [`GmailMessage`]
//!   → [`MessageMetadata`]
//! - non-2xx statuses → [`map_status`] → [`ProviderError`]

use chrono::{DateTime, FixedOffset};
use serde::Deserialize;

use super::{ProviderError, SearchPage};
use crate::domain::{Address, EmailId, MessageMetadata, ThreadId};

/// `users.messages.list` response.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessageList {
    messages: Option<Vec<MessageRef>>,
    next_page_token: Option<String>,
}

/// Id pair inside a list response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct MessageRef {
    id: String,
}

impl From<MessageList> for SearchPage {
    fn from(list: MessageList) -> Self {
        Self {
            ids: list
                .messages
                .unwrap_or_default()
                .into_iter()
                .map(|m| EmailId::from(m.id))
                .collect(),
            next_page_token: list.next_page_token.filter(|t| !t.is_empty()),
        }
    }
}

/// `users.messages.get` response.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GmailMessage {
    id: String,
    thread_id: String,
    label_ids: Option<Vec<String>>,
    size_estimate: Option<u64>,
    internal_date: Option<String>,
    payload: Option<GmailPart>,
}

/// Message part. The top-level payload is a part too.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailPart {
    headers: Option<Vec<GmailHeader>>,
    filename: Option<String>,
    body: Option<GmailBody>,
    parts: Option<Vec<GmailPart>>,
}

/// Message header.
#[derive(Debug, Deserialize)]
struct GmailHeader {
    name: String,
    value: String,
}

/// Part body. Only the attachment reference matters here.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GmailBody {
    attachment_id: Option<String>,
}

impl GmailPart {
    fn header(&self, name: &str) -> Option<&str> {
        self.headers.as_ref().and_then(|headers| {
            headers
                .iter()
                .find(|h| h.name.eq_ignore_ascii_case(name))
                .map(|h| h.value.as_str())
        })
    }

    fn is_attachment(&self) -> bool {
        let named = self.filename.as_deref().is_some_and(|f| !f.is_empty());
        let stored = self
            .body
            .as_ref()
            .and_then(|b| b.attachment_id.as_deref())
            .is_some_and(|id| !id.is_empty());
        named && stored
    }

    fn count_attachments(&self) -> u32 {
        self.parts
            .iter()
            .flatten()
            .map(|part| u32::from(part.is_attachment()) + part.count_attachments())
            .sum()
    }
}

impl GmailMessage {
    /// Converts the resource into [`MessageMetadata`].
    ///
    /// A missing or unparseable `Date` header falls back to `internalDate`;
    /// when both are unusable the date stays `None` for the filter engine to
    /// treat conservatively.
    pub fn into_metadata(self) -> MessageMetadata {
        let payload = self.payload.unwrap_or_default();

        let from = payload
            .header("From")
            .map(Address::parse)
            .unwrap_or_default();
        let subject = payload.header("Subject").unwrap_or_default().to_string();
        let date = payload
            .header("Date")
            .and_then(parse_date)
            .or_else(|| self.internal_date.as_deref().and_then(parse_internal_date));

        MessageMetadata {
            id: EmailId::from(self.id),
            thread_id: ThreadId::from(self.thread_id),
            labels: self
                .label_ids
                .unwrap_or_default()
                .into_iter()
                .map(Into::into)
                .collect(),
            from,
            subject,
            date,
            size_bytes: self.size_estimate.unwrap_or(0),
            attachment_count: payload.count_attachments(),
        }
    }
}

/// Parses an RFC 2822 `Date` header, keeping the sender's offset.
///
/// Trailing zone comments such as `(UTC)` are ignored.
pub fn parse_date(value: &str) -> Option<DateTime<FixedOffset>> {
    let value = value.trim();
    let value = match value.rfind('(') {
        Some(idx) if value.ends_with(')') => value[..idx].trim_end(),
        _ => value,
    };
    DateTime::parse_from_rfc2822(value).ok()
}

fn parse_internal_date(millis: &str) -> Option<DateTime<FixedOffset>> {
    millis
        .parse::<i64>()
        .ok()
        .and_then(DateTime::from_timestamp_millis)
        .map(|d| d.fixed_offset())
}

/// Maps an HTTP error status onto the capability error taxonomy.
pub fn map_status(status: u16, body: &str) -> ProviderError {
    match status {
        401 | 403 => ProviderError::Unauthorized(body.to_string()),
        404 | 410 => ProviderError::NotFound(body.to_string()),
        429 => ProviderError::RateLimited {
            retry_after_secs: None,
        },
        400 => ProviderError::InvalidRequest(body.to_string()),
        408 | 500..=599 => ProviderError::Connection(format!("HTTP {}: {}", status, body)),
        _ => ProviderError::Provider(format!("HTTP {}: {}", status, body)),
    }
}
