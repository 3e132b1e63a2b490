//! Destructive actions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// What to do with a selected message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MutationAction {
    /// Move to the trash, recoverable within the provider's retention window.
    Trash,
    /// Permanently delete.
    Delete,
}

impl MutationAction {
    /// The action actually performed once `soft_delete` is applied.
    ///
    /// Soft delete turns a requested delete into a trash call; a trash
    /// request is never escalated.
    pub fn resolve(self, soft_delete: bool) -> Self {
        match self {
            Self::Delete if soft_delete => Self::Trash,
            action => action,
        }
    }

    /// Whether the action cannot be undone through the provider.
    pub fn is_permanent(&self) -> bool {
        matches!(self, Self::Delete)
    }

    /// Lowercase name, as used in events and serialized output.
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Trash => "trash",
            Self::Delete => "delete",
        }
    }
}

impl fmt::Display for MutationAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
