//! Provider capabilities.
//!
//! - [`email`] - Mailbox read and mutate capabilities

pub mod email;
