use std::path::Path;
use std::sync::Arc;

use anyhow::Context as _;

use crate::{
    document::{SVG_NS, arena::RegionDocument},
    foundation::error::{RegionFillError, RegionFillResult},
};

/// Largest raster edge accepted by [`render_png`].
pub const MAX_DIM: u32 = 16_384;

/// Straight-alpha RGBA8 pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RasterImage {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
    /// Row-major RGBA8, `width * height * 4` bytes.
    pub data: Vec<u8>,
}

impl RasterImage {
    /// Pixel at `(x, y)`, `None` outside the image.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = ((y * self.width + x) * 4) as usize;
        self.data.get(i..i + 4)?.try_into().ok()
    }

    /// Write as PNG, creating parent directories.
    pub fn save_png(&self, path: &Path) -> RegionFillResult<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create output dir '{}'", parent.display()))?;
        }
        image::save_buffer_with_format(
            path,
            &self.data,
            self.width,
            self.height,
            image::ColorType::Rgba8,
            image::ImageFormat::Png,
        )
        .with_context(|| format!("write png '{}'", path.display()))?;
        Ok(())
    }
}

/// Rasterize `doc` at `scale` times its intrinsic size.
///
/// External image hrefs are not fetched here; run
/// [`inline_images`](crate::inline_images) first to see region imagery.
#[tracing::instrument(skip(doc))]
pub fn render_png(doc: &RegionDocument, scale: f32) -> RegionFillResult<RasterImage> {
    if !scale.is_finite() || scale <= 0.0 {
        return Err(RegionFillError::validation("scale must be finite and > 0"));
    }

    let svg = if doc.attr(doc.root(), "xmlns").is_some() {
        doc.to_svg_string()
    } else {
        let mut owned = doc.clone();
        let root = owned.root();
        owned.set_attr(root, "xmlns", SVG_NS);
        owned.to_svg_string()
    };

    let mut fontdb = usvg::fontdb::Database::new();
    fontdb.load_system_fonts();
    let opts = usvg::Options {
        fontdb: Arc::new(fontdb),
        ..Default::default()
    };
    let tree = usvg::Tree::from_str(&svg, &opts)
        .map_err(|e| RegionFillError::parse("<document>", format!("svg rejected by renderer: {e}")))?;

    let (width, height) = raster_size(&tree, scale)?;
    let mut pixmap = resvg::tiny_skia::Pixmap::new(width, height)
        .ok_or_else(|| RegionFillError::validation("failed to allocate raster pixmap"))?;
    let sx = width as f32 / tree.size().width();
    let sy = height as f32 / tree.size().height();
    resvg::render(
        &tree,
        resvg::tiny_skia::Transform::from_scale(sx, sy),
        &mut pixmap.as_mut(),
    );

    let data = pixmap
        .pixels()
        .iter()
        .flat_map(|p| {
            let c = p.demultiply();
            [c.red(), c.green(), c.blue(), c.alpha()]
        })
        .collect();
    tracing::info!(width, height, "document rasterized");
    Ok(RasterImage {
        width,
        height,
        data,
    })
}

fn raster_size(tree: &usvg::Tree, scale: f32) -> RegionFillResult<(u32, u32)> {
    let to_px = |v: f32| -> RegionFillResult<u32> {
        let px = (v * scale).ceil();
        if !px.is_finite() || px <= 0.0 {
            return Err(RegionFillError::validation("document has invalid width/height"));
        }
        Ok((px as u32).max(1))
    };
    let size = tree.size();
    let (w, h) = (to_px(size.width())?, to_px(size.height())?);
    if w > MAX_DIM || h > MAX_DIM {
        return Err(RegionFillError::validation(format!(
            "raster size too large: {w}x{h} (max {MAX_DIM}x{MAX_DIM})"
        )));
    }
    Ok((w, h))
}

#[cfg(test)]
#[path = "../../tests/unit/render/raster.rs"]
mod tests;
