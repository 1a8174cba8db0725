//! Offline preview: embed region images and rasterize filled documents.

pub(crate) mod images;
pub(crate) mod raster;
