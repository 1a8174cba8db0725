//! Arena-backed SVG document model.
//!
//! A [`RegionDocument`] owns every node it has ever created. Nodes are addressed by [`NodeId`]
//! and are never freed: detaching a node only unlinks it from its parent, so ids stay valid for
//! the lifetime of the document. Parsing goes through `roxmltree`; serialization is hand-written
//! so generated output stays stable.

pub(crate) mod arena;
pub(crate) mod parse;
pub(crate) mod write;

/// SVG namespace URI.
pub const SVG_NS: &str = "http://www.w3.org/2000/svg";
/// XLink namespace URI (legacy `xlink:href`).
pub const XLINK_NS: &str = "http://www.w3.org/1999/xlink";
