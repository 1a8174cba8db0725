use serde_json::{Map, Value};

use crate::{
    document::arena::RegionDocument,
    foundation::{
        core::{BezPath, Point, Rect, ViewBox, fmt_num},
        error::{RegionFillError, RegionFillResult},
    },
    geo::projection::{Fit, mercator},
    identity::slug::resolve,
};

/// Output options for [`build_admin1_svg`].
#[derive(Clone, Debug, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct Admin1Options {
    /// Canvas width in user units.
    pub width: f64,
    /// Canvas height in user units.
    pub height: f64,
    /// Empty border kept around the fitted geometry.
    pub margin: f64,
    /// Region outline color.
    pub stroke: String,
    /// Region outline width.
    pub stroke_width: f64,
    /// Keep only features whose `adm0_a3` (or `adm0_a3_us`) matches, case-insensitively.
    pub country: Option<String>,
}

impl Default for Admin1Options {
    fn default() -> Self {
        Self {
            width: 900.0,
            height: 850.0,
            margin: 12.0,
            stroke: "#2f2f2f".to_string(),
            stroke_width: 1.25,
            country: None,
        }
    }
}

/// A GeoJSON `FeatureCollection` reduced to what region building needs.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct FeatureCollection {
    /// Member features.
    pub features: Vec<Feature>,
}

/// One GeoJSON feature.
#[derive(Clone, Debug, serde::Deserialize)]
pub struct Feature {
    /// Free-form properties (`name`, `iso_3166_2`, ...).
    #[serde(default)]
    pub properties: Option<Map<String, Value>>,
    /// Geometry; only polygons produce regions.
    #[serde(default)]
    pub geometry: Option<Geometry>,
}

/// Supported geometry types. Positions are `[lon, lat, ...]`.
#[derive(Clone, Debug, serde::Deserialize)]
#[serde(tag = "type")]
pub enum Geometry {
    /// Rings of one polygon.
    Polygon {
        /// Exterior ring followed by holes.
        coordinates: Vec<Vec<Vec<f64>>>,
    },
    /// Several polygons.
    MultiPolygon {
        /// Polygons, each a list of rings.
        coordinates: Vec<Vec<Vec<Vec<f64>>>>,
    },
    /// Points, lines and collections: ignored.
    #[serde(other)]
    Unsupported,
}

impl Geometry {
    fn rings(&self) -> Vec<&Vec<Vec<f64>>> {
        match self {
            Self::Polygon { coordinates } => coordinates.iter().collect(),
            Self::MultiPolygon { coordinates } => coordinates.iter().flatten().collect(),
            Self::Unsupported => Vec::new(),
        }
    }
}

impl FeatureCollection {
    /// Parse a GeoJSON payload. `source` names it in errors.
    pub fn from_json(bytes: &[u8], source: &str) -> RegionFillResult<Self> {
        let value: Value = serde_json::from_slice(bytes)
            .map_err(|e| RegionFillError::parse(source, format!("invalid GeoJSON: {e}")))?;
        match value.get("type").and_then(Value::as_str) {
            Some("FeatureCollection") => {}
            other => {
                return Err(RegionFillError::parse(
                    source,
                    format!("expected a FeatureCollection, got {other:?}"),
                ));
            }
        }
        serde_json::from_value(value)
            .map_err(|e| RegionFillError::parse(source, format!("invalid GeoJSON: {e}")))
    }
}

/// Project a collection with Mercator, fit it to the canvas, and emit one region path per
/// polygon feature.
#[tracing::instrument(skip(collection), fields(features = collection.features.len()))]
pub fn build_admin1_svg(
    collection: &FeatureCollection,
    opts: &Admin1Options,
) -> RegionFillResult<RegionDocument> {
    let view = ViewBox::new(0.0, 0.0, opts.width, opts.height)?;
    if !opts.margin.is_finite() || opts.margin < 0.0 || opts.margin * 2.0 >= view.width.min(view.height)
    {
        return Err(RegionFillError::validation(
            "margin must be >= 0 and leave a drawable area",
        ));
    }

    let features: Vec<&Feature> = collection
        .features
        .iter()
        .filter(|f| match &opts.country {
            Some(want) => country_of(f).is_some_and(|a3| a3.eq_ignore_ascii_case(want)),
            None => true,
        })
        .collect();

    let projected: Vec<(&Feature, Vec<Vec<Point>>)> = features
        .iter()
        .filter_map(|f| {
            let rings = project_rings(f.geometry.as_ref()?);
            (!rings.is_empty()).then_some((*f, rings))
        })
        .collect();

    let a3 = features
        .first()
        .and_then(|f| country_of(f))
        .map(str::to_string)
        .or_else(|| opts.country.clone())
        .unwrap_or_else(|| "ADM0".to_string())
        .to_uppercase();

    let mut doc = RegionDocument::new_svg();
    let root = doc.root();
    doc.set_attr(root, "width", fmt_num(view.width));
    doc.set_attr(root, "height", fmt_num(view.height));
    doc.set_attr(root, "viewBox", view.to_attr());

    let style = doc.create_element("style");
    let css = doc.create_text(&format!(
        ".region{{fill:none;stroke:{};stroke-width:{};vector-effect:non-scaling-stroke;pointer-events:all}}",
        opts.stroke,
        fmt_num(opts.stroke_width)
    ));
    doc.append_child(style, css);
    doc.append_child(root, style);

    let layer = doc.create_element("g");
    doc.set_attr(layer, "id", "regions");
    doc.append_child(root, layer);

    let Some(bounds) = projected
        .iter()
        .flat_map(|(_, rings)| rings.iter().flatten())
        .map(|p| Rect::from_points(*p, *p))
        .reduce(|a, b| a.union(b))
    else {
        tracing::warn!(country = %a3, "no polygon features to draw");
        return Ok(doc);
    };

    let extent = Rect::new(
        opts.margin,
        opts.margin,
        view.width - opts.margin,
        view.height - opts.margin,
    );
    let fit = Fit::extent(bounds, extent);

    let mut used_ids = std::collections::HashSet::new();
    for (feature, rings) in &projected {
        let props = feature.properties.as_ref();
        let name = pick_region_name(props);
        let code = pick_region_code(props, &a3, &name);

        let mut path = BezPath::new();
        for ring in rings {
            let mut pts = ring.iter().map(|p| round2(fit.apply(*p)));
            let Some(first) = pts.next() else {
                continue;
            };
            path.move_to(first);
            for p in pts {
                path.line_to(p);
            }
            path.close_path();
        }

        let base = format!("adm1-{code}");
        let mut id = base.clone();
        let mut n = 2;
        while !used_ids.insert(id.clone()) {
            id = format!("{base}-{n}");
            n += 1;
        }

        let node = doc.create_element("path");
        doc.set_attr(node, "id", id);
        doc.set_attr(node, "class", "region");
        doc.set_attr(node, "d", path.to_svg());
        doc.set_attr(node, "data-name", name);
        doc.set_attr(node, "data-iso", code);
        doc.append_child(layer, node);
    }

    tracing::debug!(country = %a3, regions = projected.len(), "built admin-1 svg");
    Ok(doc)
}

fn project_rings(geometry: &Geometry) -> Vec<Vec<Point>> {
    geometry
        .rings()
        .into_iter()
        .map(|ring| {
            ring.iter()
                .filter(|pos| pos.len() >= 2 && pos[0].is_finite() && pos[1].is_finite())
                .map(|pos| mercator(pos[0], pos[1]))
                .collect::<Vec<_>>()
        })
        .filter(|ring| ring.len() >= 3)
        .collect()
}

fn round2(p: Point) -> Point {
    Point::new((p.x * 100.0).round() / 100.0, (p.y * 100.0).round() / 100.0)
}

fn country_of(f: &Feature) -> Option<&str> {
    let props = f.properties.as_ref()?;
    ["adm0_a3", "adm0_a3_us"]
        .iter()
        .find_map(|k| props.get(*k).and_then(Value::as_str))
}

fn prop_str(props: Option<&Map<String, Value>>, key: &str) -> Option<String> {
    match props?.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Display name precedence used for `data-name`.
pub fn pick_region_name(props: Option<&Map<String, Value>>) -> String {
    [
        "name",
        "name_en",
        "name_local",
        "name_1",
        "NAME_1",
        "name_alt",
        "nam",
        "prefecture",
    ]
    .iter()
    .find_map(|k| prop_str(props, k))
    .unwrap_or_default()
}

/// Stable code precedence: `iso_3166_2`, `gn_a1_code`, `adm1_code`, else `<A3>-<slug(name)>`.
/// Always uppercase, `.` replaced by `-`.
pub fn pick_region_code(props: Option<&Map<String, Value>>, a3: &str, name: &str) -> String {
    let explicit = ["iso_3166_2", "gn_a1_code", "adm1_code"]
        .iter()
        .find_map(|k| prop_str(props, k));
    match explicit {
        Some(code) => code.replace('.', "-").to_uppercase(),
        None => {
            let slug = resolve(name);
            let slug = if slug.is_empty() { "region" } else { slug.as_str() };
            format!("{a3}-{slug}").to_uppercase()
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/geo/admin1.rs"]
mod tests;
