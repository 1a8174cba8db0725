//! Shared primitives: error taxonomy and document-space geometry.

pub(crate) mod core;
pub(crate) mod error;
