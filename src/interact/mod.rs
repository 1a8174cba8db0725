//! Keyboard and pointer activation of region nodes.
//!
//! Bindings live in the document itself, so a freshly fetched document starts with none and
//! re-applying fills to the same document never binds a node twice.

pub(crate) mod wiring;
