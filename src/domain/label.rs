//! Well-known label identifiers.

/// Gmail system label IDs.
///
/// Folders are modelled as labels by the provider, so `SENT` and `DRAFTS`
/// show up in a message's label set just like `IMPORTANT` does.
pub mod system_labels {
    use crate::domain::LabelId;

    /// Returns the inbox label ID.
    pub fn inbox() -> LabelId {
        LabelId::from("INBOX")
    }

    /// Returns the sent label ID.
    pub fn sent() -> LabelId {
        LabelId::from("SENT")
    }

    /// Returns the drafts label ID.
    pub fn drafts() -> LabelId {
        LabelId::from("DRAFTS")
    }

    /// Returns the trash label ID.
    pub fn trash() -> LabelId {
        LabelId::from("TRASH")
    }

    /// Returns the spam label ID.
    pub fn spam() -> LabelId {
        LabelId::from("SPAM")
    }

    /// Returns the starred label ID.
    pub fn starred() -> LabelId {
        LabelId::from("STARRED")
    }

    /// Returns the important label ID.
    pub fn important() -> LabelId {
        LabelId::from("IMPORTANT")
    }
}

#[cfg(test)]
mod tests {
    use super::system_labels;

    #[test]
    fn system_label_ids() {
        assert_eq!(system_labels::inbox().0, "INBOX");
        assert_eq!(system_labels::sent().0, "SENT");
        assert_eq!(system_labels::drafts().0, "DRAFTS");
        assert_eq!(system_labels::trash().0, "TRASH");
        assert_eq!(system_labels::spam().0, "SPAM");
        assert_eq!(system_labels::starred().0, "STARRED");
        assert_eq!(system_labels::important().0, "IMPORTANT");
    }
}
