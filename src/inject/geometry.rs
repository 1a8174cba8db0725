use std::collections::BTreeSet;

use kurbo::Shape as _;

use crate::{
    document::arena::{NodeId, RegionDocument},
    foundation::core::{Affine, BezPath, Point, Rect, ViewBox, parse_length},
};

/// Document bounding box per the `viewBox` > `width`/`height` > 1000×800 rule.
///
/// The flag is `true` when the box did not come from a usable `viewBox` attribute.
pub fn document_box(doc: &RegionDocument) -> (ViewBox, bool) {
    let root = doc.root();
    if let Some(vb) = doc.attr(root, "viewBox").and_then(ViewBox::parse) {
        return (vb, false);
    }

    let dim = |name: &str, default: f64| {
        doc.attr(root, name)
            .and_then(parse_length)
            .filter(|v| *v > 0.0)
            .unwrap_or(default)
    };
    let vb = ViewBox {
        min_x: 0.0,
        min_y: 0.0,
        width: dim("width", ViewBox::DEFAULT_WIDTH),
        height: dim("height", ViewBox::DEFAULT_HEIGHT),
    };
    (vb, true)
}

/// Untransformed geometric bounds of a drawable node in its own user space.
///
/// `None` for `use` elements, transformed nodes (or ancestors), and unparsable geometry.
pub fn node_bounds(doc: &RegionDocument, node: NodeId) -> Option<Rect> {
    let transformed = std::iter::once(node)
        .chain(doc.ancestors(node))
        .any(|n| doc.non_empty_attr(n, "transform").is_some());
    if transformed {
        return None;
    }

    let num = |name: &str| doc.attr(node, name).and_then(parse_length);
    let rect = match doc.local_name(node)? {
        "path" => {
            let path = BezPath::from_svg(doc.attr(node, "d")?).ok()?;
            if path.elements().is_empty() {
                return None;
            }
            path.bounding_box()
        }
        "rect" => {
            let (x, y) = (num("x").unwrap_or(0.0), num("y").unwrap_or(0.0));
            let (w, h) = (num("width")?, num("height")?);
            Rect::new(x, y, x + w, y + h)
        }
        "circle" => {
            let r = num("r")?;
            let c = Point::new(num("cx").unwrap_or(0.0), num("cy").unwrap_or(0.0));
            Rect::new(c.x - r, c.y - r, c.x + r, c.y + r)
        }
        "ellipse" => {
            let (rx, ry) = (num("rx")?, num("ry")?);
            let c = Point::new(num("cx").unwrap_or(0.0), num("cy").unwrap_or(0.0));
            Rect::new(c.x - rx, c.y - ry, c.x + rx, c.y + ry)
        }
        "polygon" | "polyline" => points_bounds(doc.attr(node, "points")?)?,
        _ => return None,
    };

    let finite = [rect.x0, rect.y0, rect.x1, rect.y1]
        .iter()
        .all(|v| v.is_finite());
    (finite && rect.width() > 0.0 && rect.height() > 0.0).then_some(rect)
}

/// Parse an SVG `transform` list into one matrix; `None` when any item is malformed.
pub fn parse_transform(list: &str) -> Option<Affine> {
    let mut out = Affine::IDENTITY;
    let mut rest = list.trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    while !rest.is_empty() {
        let open = rest.find('(')?;
        let close = open + rest[open..].find(')')?;
        let args = rest[open + 1..close]
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|a| !a.is_empty())
            .map(|a| a.parse::<f64>().ok())
            .collect::<Option<Vec<_>>>()?;
        let item = match (rest[..open].trim(), args.as_slice()) {
            ("matrix", &[a, b, c, d, e, f]) => Affine::new([a, b, c, d, e, f]),
            ("translate", &[x]) => Affine::translate((x, 0.0)),
            ("translate", &[x, y]) => Affine::translate((x, y)),
            ("scale", &[k]) => Affine::scale(k),
            ("scale", &[x, y]) => Affine::scale_non_uniform(x, y),
            ("rotate", &[deg]) => Affine::rotate(deg.to_radians()),
            ("rotate", &[deg, cx, cy]) => Affine::rotate_about(deg.to_radians(), Point::new(cx, cy)),
            ("skewX", &[deg]) => Affine::skew(deg.to_radians().tan(), 0.0),
            ("skewY", &[deg]) => Affine::skew(0.0, deg.to_radians().tan()),
            _ => return None,
        };
        out *= item;
        rest = rest[close + 1..].trim_start_matches(|c: char| c.is_whitespace() || c == ',');
    }
    out.is_finite().then_some(out)
}

/// Composed `transform` of the ancestors of `node` that do not also contain `other`.
///
/// Maps the user space `node` is drawn in to the user space of `other`'s parent, which is where
/// generated elements placed next to `other` live. Malformed transforms count as identity.
pub fn transform_between(doc: &RegionDocument, node: NodeId, other: NodeId) -> Affine {
    let shared: BTreeSet<NodeId> = std::iter::once(other).chain(doc.ancestors(other)).collect();
    doc.ancestors(node)
        .take_while(|a| !shared.contains(a))
        .filter_map(|a| {
            let attr = doc.non_empty_attr(a, "transform")?;
            let parsed = parse_transform(attr);
            if parsed.is_none() {
                tracing::debug!(transform = attr, "ignoring malformed transform");
            }
            parsed
        })
        .fold(Affine::IDENTITY, |inner, t| t * inner)
}

fn points_bounds(points: &str) -> Option<Rect> {
    let nums = points
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|p| !p.is_empty())
        .map(|p| p.parse::<f64>().ok())
        .collect::<Option<Vec<_>>>()?;
    nums.chunks_exact(2)
        .map(|xy| Rect::from_points((xy[0], xy[1]), (xy[0], xy[1])))
        .reduce(|a, b| a.union(b))
}

#[cfg(test)]
#[path = "../../tests/unit/inject/geometry.rs"]
mod tests;
