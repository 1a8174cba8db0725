use std::fmt;
use std::str::FromStr;

use crate::foundation::error::RegionFillError;

/// How a bound image is painted into its region.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FillStrategy {
    /// `<pattern>` fill on the region itself.
    Pattern,
    /// Image in the image layer, clipped to the region outline.
    #[default]
    Clip,
    /// Image in the image layer, masked by the region with an optional right-edge fade.
    Mask,
}

impl FillStrategy {
    /// Lowercase name used in artifact ids and markers.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Clip => "clip",
            Self::Mask => "mask",
        }
    }
}

impl fmt::Display for FillStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FillStrategy {
    type Err = RegionFillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pattern" => Ok(Self::Pattern),
            "clip" => Ok(Self::Clip),
            "mask" => Ok(Self::Mask),
            other => Err(RegionFillError::validation(format!(
                "unknown fill strategy '{other}' (expected pattern, clip or mask)"
            ))),
        }
    }
}

/// Outline drawn on regions that received an image.
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ImageStroke {
    /// Stroke paint.
    pub color: String,
    /// Stroke width in user units.
    pub width: f64,
}

impl Default for ImageStroke {
    fn default() -> Self {
        Self {
            color: "rgba(0,0,0,.4)".to_string(),
            width: 0.6,
        }
    }
}

/// Options for [`apply`](crate::apply) and [`degrade_region`](crate::degrade_region).
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct FillOptions {
    /// Painting technique for bound regions.
    pub strategy: FillStrategy,
    /// Flat color for regions without an image.
    pub fallback_fill: String,
    /// Strip author `fill` attributes and `fill:` style declarations before painting.
    pub clear_existing_fill: bool,
    /// `preserveAspectRatio` of generated `<image>` elements.
    pub preserve_aspect_ratio: String,
    /// Fade the right edge of masked images.
    pub mask_fade: bool,
    /// Inserted into generated ids (`rf-clip-<prefix>-<id>`) so several countries can share a page.
    pub country_prefix: Option<String>,
    /// Expected `<prefix>` of region element ids (`<prefix>-<code>`).
    pub id_prefix: Option<String>,
    /// Outline for image-filled regions; `None` leaves strokes alone.
    pub image_stroke: Option<ImageStroke>,
}

impl FillOptions {
    /// Default fallback color.
    pub const DEFAULT_FALLBACK: &'static str = "#f4f1e6";

    /// Defaults with another strategy.
    pub fn with_strategy(strategy: FillStrategy) -> Self {
        Self {
            strategy,
            ..Self::default()
        }
    }
}

impl Default for FillOptions {
    fn default() -> Self {
        Self {
            strategy: FillStrategy::default(),
            fallback_fill: Self::DEFAULT_FALLBACK.to_string(),
            clear_existing_fill: true,
            preserve_aspect_ratio: "xMidYMid slice".to_string(),
            mask_fade: true,
            country_prefix: None,
            id_prefix: None,
            image_stroke: Some(ImageStroke::default()),
        }
    }
}
