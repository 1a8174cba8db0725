use crate::foundation::core::{Point, Rect};

/// Latitude limit of the square Web-Mercator world.
const MAX_LAT: f64 = 85.051_128_78;

/// Spherical Mercator in radians, y growing southwards (SVG orientation).
pub(crate) fn mercator(lon_deg: f64, lat_deg: f64) -> Point {
    let lat = lat_deg.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let x = lon_deg.to_radians();
    let y = -(std::f64::consts::FRAC_PI_4 + lat / 2.0).tan().ln();
    Point::new(x, y)
}

/// Uniform scale plus translation mapping projected bounds into an output extent, centered.
#[derive(Clone, Copy, Debug, PartialEq)]
pub(crate) struct Fit {
    pub(crate) scale: f64,
    pub(crate) tx: f64,
    pub(crate) ty: f64,
}

impl Fit {
    pub(crate) fn extent(bounds: Rect, extent: Rect) -> Self {
        let (bw, bh) = (bounds.width(), bounds.height());
        let (ew, eh) = (extent.width(), extent.height());
        let scale = match (bw > 0.0, bh > 0.0) {
            (true, true) => (ew / bw).min(eh / bh),
            (true, false) => ew / bw,
            (false, true) => eh / bh,
            (false, false) => 1.0,
        };
        Self {
            scale,
            tx: extent.x0 + (ew - bw * scale) / 2.0 - bounds.x0 * scale,
            ty: extent.y0 + (eh - bh * scale) / 2.0 - bounds.y0 * scale,
        }
    }

    pub(crate) fn apply(self, p: Point) -> Point {
        Point::new(p.x * self.scale + self.tx, p.y * self.scale + self.ty)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geo/projection.rs"]
mod tests;
