//! Mail capability trait definitions.
//!
//! The core never authenticates or talks to the wire itself. It is handed two
//! narrow capabilities: a [`MessageSource`] for read access (search and
//! metadata) and a [`MessageMutator`] for destructive calls. Both share the
//! [`ProviderError`] taxonomy so the retry path can classify failures without
//! knowing which backend produced them.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::{EmailId, MessageMetadata};

/// Result type alias for capability calls.
pub type Result<T> = std::result::Result<T, ProviderError>;

/// Errors that can occur during capability calls.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ProviderError {
    /// Credentials expired or were revoked.
    #[error("unauthorized: {0}")]
    Unauthorized(String),

    /// The message no longer exists (or was already deleted).
    #[error("not found: {0}")]
    NotFound(String),

    /// The provider is throttling requests.
    #[error("rate limit exceeded, retry after {retry_after_secs:?} seconds")]
    RateLimited {
        /// Seconds to wait before retrying, if known.
        retry_after_secs: Option<u64>,
    },

    /// The call did not complete within its deadline.
    #[error("timed out after {0:?}")]
    Timeout(Duration),

    /// Network or connection error.
    #[error("connection error: {0}")]
    Connection(String),

    /// Invalid request or parameters.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Provider-specific error.
    #[error("provider error: {0}")]
    Provider(String),
}

/// How a failure should be handled by the retry path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorClass {
    /// Worth retrying: throttling, timeouts, transport blips.
    Transient,
    /// Retrying cannot help; record against the item and move on.
    Permanent,
    /// The capability itself is unusable; abort the run.
    Fatal,
}

impl ProviderError {
    /// Classifies this error for retry decisions.
    pub fn class(&self) -> ErrorClass {
        match self {
            Self::RateLimited { .. } | Self::Timeout(_) | Self::Connection(_) => {
                ErrorClass::Transient
            }
            Self::NotFound(_) | Self::InvalidRequest(_) | Self::Provider(_) => {
                ErrorClass::Permanent
            }
            Self::Unauthorized(_) => ErrorClass::Fatal,
        }
    }

    /// Whether the error means the source could not be reached at all.
    pub fn is_connectivity(&self) -> bool {
        matches!(self, Self::Timeout(_) | Self::Connection(_))
    }
}

/// One page of search results.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SearchPage {
    /// Candidate ids on this page, in provider order.
    pub ids: Vec<EmailId>,
    /// Opaque cursor for the next page; `None` on the last page.
    pub next_page_token: Option<String>,
}

impl SearchPage {
    /// Creates a final page.
    pub fn last(ids: Vec<EmailId>) -> Self {
        Self {
            ids,
            next_page_token: None,
        }
    }

    /// Creates a page followed by another.
    pub fn with_next(ids: Vec<EmailId>, token: impl Into<String>) -> Self {
        Self {
            ids,
            next_page_token: Some(token.into()),
        }
    }
}

/// Read access to a mailbox.
///
/// # Example
///
/// ```ignore
/// use mailsweep::providers::email::MessageSource;
///
/// async fn first_page(source: &impl MessageSource) -> Result<()> {
///     let page = source.search_ids("older_than:365d", None, Some(100)).await?;
///     for id in &page.ids {
///         let meta = source.get_metadata(id).await?;
///         println!("{}: {}", meta.from.display(), meta.subject);
///     }
///     Ok(())
/// }
/// ```
#[async_trait]
pub trait MessageSource: Send + Sync {
    /// Searches for message ids matching a provider query.
    ///
    /// # Arguments
    ///
    /// * `query` - Provider-native search string
    /// * `page_token` - Cursor returned by the previous page
    /// * `max_results` - Upper bound on ids returned for this page
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::Unauthorized`] if the capability has expired.
    async fn search_ids(
        &self,
        query: &str,
        page_token: Option<&str>,
        max_results: Option<u32>,
    ) -> Result<SearchPage>;

    /// Fetches the decision-relevant metadata for one message.
    ///
    /// # Errors
    ///
    /// Returns [`ProviderError::NotFound`] if the message no longer exists.
    async fn get_metadata(&self, id: &EmailId) -> Result<MessageMetadata>;
}

/// Destructive access to a mailbox.
#[async_trait]
pub trait MessageMutator: Send + Sync {
    /// Moves a message to the trash, recoverable within the provider's
    /// retention window.
    async fn trash(&self, id: &EmailId) -> Result<()>;

    /// Permanently deletes a message.
    async fn delete(&self, id: &EmailId) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_classes() {
        assert_eq!(
            ProviderError::RateLimited {
                retry_after_secs: Some(5)
            }
            .class(),
            ErrorClass::Transient
        );
        assert_eq!(
            ProviderError::Timeout(Duration::from_secs(1)).class(),
            ErrorClass::Transient
        );
        assert_eq!(
            ProviderError::Connection("reset".into()).class(),
            ErrorClass::Transient
        );
        assert_eq!(
            ProviderError::NotFound("m1".into()).class(),
            ErrorClass::Permanent
        );
        assert_eq!(
            ProviderError::Unauthorized("expired".into()).class(),
            ErrorClass::Fatal
        );
    }

    #[test]
    fn connectivity_errors() {
        assert!(ProviderError::Connection("dns".into()).is_connectivity());
        assert!(ProviderError::Timeout(Duration::from_secs(3)).is_connectivity());
        assert!(!ProviderError::RateLimited {
            retry_after_secs: None
        }
        .is_connectivity());
    }

    #[test]
    fn provider_error_display() {
        let auth_err = ProviderError::Unauthorized("token expired".to_string());
        assert_eq!(auth_err.to_string(), "unauthorized: token expired");

        let rate_err = ProviderError::RateLimited {
            retry_after_secs: Some(60),
        };
        assert!(rate_err.to_string().contains("rate limit"));

        let not_found = ProviderError::NotFound("msg-123".to_string());
        assert!(not_found.to_string().contains("not found"));
    }

    #[test]
    fn search_page_constructors() {
        let page = SearchPage::with_next(vec![EmailId::from("a")], "tok");
        assert_eq!(page.next_page_token.as_deref(), Some("tok"));

        let last = SearchPage::last(vec![]);
        assert!(last.next_page_token.is_none());
        assert_eq!(last, SearchPage::default());
    }
}
