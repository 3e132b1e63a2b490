//! Mail capabilities consumed by the core.
//!
//! This module contains the [`MessageSource`] and [`MessageMutator`] traits
//! the selection and mutation services are given, plus decoding helpers for
//! Gmail API resources:
//!
//! - [`gmail`] - Gmail API v1 JSON resources mapped onto core types
//!
//! # Architecture
//!
//! Authentication, session handling and the wire transport live outside this
//! crate. An adapter implements the two traits over whatever client it owns;
//! the core only ever sees ids, [`MessageMetadata`](crate::domain::MessageMetadata)
//! and [`ProviderError`].

pub mod gmail;
mod traits;

pub use traits::{
    ErrorClass, MessageMutator, MessageSource, ProviderError, Result, SearchPage,
};
