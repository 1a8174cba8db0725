//! Region fill injection.
//!
//! [`apply`] walks every region of a [`RegionDocument`](crate::RegionDocument), clears author
//! fills, and either paints the fallback color or wires the region to its bound image through
//! generated `<defs>` artifacts. Generated ids are deterministic, so applying again to the same
//! document reuses what is already there instead of duplicating it.

pub(crate) mod apply;
pub(crate) mod artifacts;
pub(crate) mod bindings;
pub(crate) mod geometry;
pub(crate) mod options;
