//! Canonical region identifiers and per-node identity extraction.

pub(crate) mod region;
pub(crate) mod slug;
