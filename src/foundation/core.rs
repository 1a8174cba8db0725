use crate::foundation::error::{RegionFillError, RegionFillResult};

pub use kurbo::{Affine, BezPath, Point, Rect};

/// Document-space bounding box of an SVG, as declared by (or synthesized for) its `viewBox`.
#[derive(Clone, Copy, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct ViewBox {
    /// Left edge in user units.
    pub min_x: f64,
    /// Top edge in user units.
    pub min_y: f64,
    /// Width in user units, always > 0.
    pub width: f64,
    /// Height in user units, always > 0.
    pub height: f64,
}

impl ViewBox {
    /// Width used when neither `viewBox` nor `width` yields a usable value.
    pub const DEFAULT_WIDTH: f64 = 1000.0;
    /// Height used when neither `viewBox` nor `height` yields a usable value.
    pub const DEFAULT_HEIGHT: f64 = 800.0;

    /// Create a validated box with finite origin and positive size.
    pub fn new(min_x: f64, min_y: f64, width: f64, height: f64) -> RegionFillResult<Self> {
        if !(min_x.is_finite() && min_y.is_finite()) {
            return Err(RegionFillError::validation("viewBox origin must be finite"));
        }
        if !(width.is_finite() && height.is_finite()) || width <= 0.0 || height <= 0.0 {
            return Err(RegionFillError::validation(
                "viewBox width/height must be finite and > 0",
            ));
        }
        Ok(Self {
            min_x,
            min_y,
            width,
            height,
        })
    }

    /// Parse a `viewBox` attribute (`"minx miny w h"`, whitespace and/or comma separated).
    ///
    /// Returns `None` for anything that would leave a degenerate box.
    pub fn parse(s: &str) -> Option<Self> {
        let nums = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|p| !p.is_empty())
            .map(|p| p.parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;
        let [x, y, w, h] = nums.as_slice() else {
            return None;
        };
        Self::new(*x, *y, *w, *h).ok()
    }

    /// The box as a `kurbo::Rect`.
    pub fn to_rect(self) -> Rect {
        Rect::new(
            self.min_x,
            self.min_y,
            self.min_x + self.width,
            self.min_y + self.height,
        )
    }

    /// Serialize back into `viewBox` attribute syntax.
    pub fn to_attr(self) -> String {
        format!(
            "{} {} {} {}",
            fmt_num(self.min_x),
            fmt_num(self.min_y),
            fmt_num(self.width),
            fmt_num(self.height)
        )
    }
}

/// Parse an SVG length attribute in user units.
///
/// Accepts plain numbers and a trailing `px`. Percentages and other units yield `None`.
pub fn parse_length(s: &str) -> Option<f64> {
    let s = s.trim();
    let s = s.strip_suffix("px").unwrap_or(s).trim_end();
    let v = s.parse::<f64>().ok()?;
    v.is_finite().then_some(v)
}

/// Format a coordinate for attribute output: integers without a fraction, others with at most
/// three decimals and no trailing zeros.
pub fn fmt_num(v: f64) -> String {
    if v.fract() == 0.0 && v.abs() < 1e15 {
        return format!("{}", v as i64);
    }
    let s = format!("{v:.3}");
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" { "0".to_string() } else { s.to_string() }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
