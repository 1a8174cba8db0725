use std::collections::BTreeMap;

use crate::{
    document::{
        XLINK_NS,
        arena::{NodeId, RegionDocument},
    },
    foundation::core::{Affine, Rect, ViewBox, fmt_num},
    identity::{
        region::{RegionIdentity, collect_regions},
        slug::CanonicalRegionId,
    },
    inject::{
        artifacts::{
            ArtifactKind, IMAGE_LAYER_ID, ensure_artifact, ensure_child, remove_layer_image,
            unique_id,
        },
        bindings::{ImageBindings, ImageRef},
        geometry::{document_box, node_bounds, transform_between},
        options::{FillOptions, FillStrategy},
    },
    interact::wiring::{bind_region, ensure_hover_style},
};

/// Outcome for one region node.
#[derive(Clone, Debug, PartialEq)]
pub struct RegionFill {
    /// The region element.
    pub node: NodeId,
    /// Its canonical id (possibly empty).
    pub id: CanonicalRegionId,
    /// Its label.
    pub label: String,
    /// `true` when an image was wired in, `false` for the fallback fill.
    pub filled: bool,
    /// Untransformed geometric bounds, when computable.
    pub bounds: Option<Rect>,
    /// The generated `<image>` element painting this region.
    pub image: Option<NodeId>,
}

/// What [`apply`] did to a document.
#[derive(Clone, Debug, PartialEq)]
pub struct FillReport {
    /// Box every generated image is sized to.
    pub view_box: ViewBox,
    /// Region nodes in document order.
    pub regions: Vec<RegionFill>,
    /// Generated elements created by this call.
    pub created: usize,
    /// Generated elements found from an earlier call and reused.
    pub reused: usize,
}

impl FillReport {
    /// Region nodes that received an image.
    pub fn filled(&self) -> impl Iterator<Item = &RegionFill> {
        self.regions.iter().filter(|r| r.filled)
    }

    /// Number of region nodes that took the fallback fill.
    pub fn fallback_count(&self) -> usize {
        self.regions.iter().filter(|r| !r.filled).count()
    }

    /// Every node reported for `id`.
    pub fn region<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a RegionFill> + 'a {
        self.regions.iter().filter(move |r| r.id.as_str() == id)
    }
}

/// Fill every region of `doc` from `bindings`.
///
/// Regions without a binding (and regions whose id is empty) get `opts.fallback_fill`, and any
/// image previously generated for them is removed. Safe to call repeatedly on the same document:
/// generated elements are found again by their markers and updated in place, and activation
/// wiring happens once per node.
#[tracing::instrument(skip_all, fields(strategy = %opts.strategy, bindings = bindings.len()))]
pub fn apply(doc: &mut RegionDocument, bindings: &ImageBindings, opts: &FillOptions) -> FillReport {
    let root = doc.root();
    let (view_box, synthesized) = document_box(doc);
    if synthesized {
        doc.set_attr(root, "viewBox", view_box.to_attr());
    }
    if doc.attr(root, "xmlns:xlink").is_none() {
        doc.set_attr(root, "xmlns:xlink", XLINK_NS);
    }

    let regions = collect_regions(doc, opts.id_prefix.as_deref());
    let defs = ensure_defs(doc);
    let layer = ensure_image_layer(doc, &regions);

    let mut region_bounds: BTreeMap<&CanonicalRegionId, Rect> = BTreeMap::new();
    let node_rects: Vec<Option<Rect>> = regions.iter().map(|(n, _)| node_bounds(doc, *n)).collect();
    for ((_, ident), rect) in regions.iter().zip(&node_rects) {
        if let Some(rect) = rect {
            region_bounds
                .entry(&ident.id)
                .and_modify(|r| *r = r.union(*rect))
                .or_insert(*rect);
        }
    }

    let mut painter = Painter {
        opts,
        view_box,
        defs,
        layer,
        created: 0,
        reused: 0,
    };
    let mut out = Vec::with_capacity(regions.len());
    let mut wired = 0usize;

    for ((node, ident), bounds) in regions.iter().zip(node_rects) {
        let node = *node;
        if opts.clear_existing_fill {
            strip_fill(doc, node);
        }

        let binding = if ident.id.is_empty() {
            None
        } else {
            bindings.get(&ident.id)
        };

        let image = match binding {
            None => {
                doc.set_attr(node, "fill", opts.fallback_fill.as_str());
                if remove_layer_image(doc, &ident.id) > 0 {
                    tracing::debug!(region = %ident.id, "removed stale region image");
                }
                None
            }
            Some(img) => {
                let fade_bounds = region_bounds.get(&ident.id).copied();
                Some(painter.paint(doc, node, &ident.id, img, fade_bounds))
            }
        };

        tracing::debug!(region = %ident.id, filled = image.is_some(), "region processed");

        if !ident.id.is_empty() && bind_region(doc, node, &ident.id, &ident.label) {
            wired += 1;
        }

        out.push(RegionFill {
            node,
            id: ident.id.clone(),
            label: ident.label.clone(),
            filled: image.is_some(),
            bounds,
            image,
        });
    }

    if wired > 0 {
        ensure_hover_style(doc);
    }

    let report = FillReport {
        view_box,
        regions: out,
        created: painter.created,
        reused: painter.reused,
    };
    tracing::info!(
        regions = report.regions.len(),
        filled = report.filled().count(),
        created = report.created,
        reused = report.reused,
        "fills applied"
    );
    report
}

/// Put region `id` back on the fallback fill and drop its image-layer element.
///
/// Other regions are left untouched. Returns the number of nodes degraded.
pub fn degrade_region(doc: &mut RegionDocument, id: &CanonicalRegionId, opts: &FillOptions) -> usize {
    let nodes: Vec<NodeId> = collect_regions(doc, opts.id_prefix.as_deref())
        .into_iter()
        .filter(|(_, ident)| &ident.id == id)
        .map(|(n, _)| n)
        .collect();
    for node in &nodes {
        if opts.clear_existing_fill {
            strip_fill(doc, *node);
        }
        doc.set_attr(*node, "fill", opts.fallback_fill.as_str());
    }
    remove_layer_image(doc, id);
    tracing::warn!(region = %id, nodes = nodes.len(), "region degraded to fallback fill");
    nodes.len()
}

struct Painter<'o> {
    opts: &'o FillOptions,
    view_box: ViewBox,
    defs: NodeId,
    layer: NodeId,
    created: usize,
    reused: usize,
}

impl Painter<'_> {
    fn artifact(
        &mut self,
        doc: &mut RegionDocument,
        parent: NodeId,
        kind: ArtifactKind,
        region: &CanonicalRegionId,
    ) -> (NodeId, String) {
        let a = ensure_artifact(doc, parent, kind, self.opts.country_prefix.as_deref(), region);
        if a.created {
            self.created += 1;
        } else {
            self.reused += 1;
        }
        (a.node, a.id)
    }

    fn paint(
        &mut self,
        doc: &mut RegionDocument,
        node: NodeId,
        region: &CanonicalRegionId,
        img: &ImageRef,
        fade_bounds: Option<Rect>,
    ) -> NodeId {
        let node_id = ensure_node_id(doc, node, region);
        let href = img.to_href();

        // Images are sized in the region's user space: the document box is mapped back through
        // every ancestor transform, and layer images carry the transforms the layer lacks.
        let root = doc.root();
        let area = local_area(transform_between(doc, node, root), self.view_box.to_rect());
        let local = transform_between(doc, node, self.layer);

        let image = match self.opts.strategy {
            FillStrategy::Pattern => {
                let (pattern, pattern_id) = self.artifact(doc, self.defs, ArtifactKind::Pattern, region);
                doc.set_attr(pattern, "patternUnits", "userSpaceOnUse");
                doc.set_attr(pattern, "patternContentUnits", "userSpaceOnUse");
                set_box(doc, pattern, area);
                let image = ensure_child(doc, pattern, "image");
                self.set_image(doc, image, region, &href, area);
                remove_layer_image(doc, region);
                doc.set_attr(node, "fill", format!("url(#{pattern_id})"));
                image
            }
            FillStrategy::Clip => {
                let clip_id = self.clip_path(doc, region, &node_id);
                let (image, _) = self.artifact(doc, self.layer, ArtifactKind::Image, region);
                self.set_image(doc, image, region, &href, area);
                set_transform(doc, image, local);
                doc.remove_attr(image, "mask");
                doc.set_attr(image, "clip-path", format!("url(#{clip_id})"));
                doc.set_attr(node, "fill", "none");
                image
            }
            FillStrategy::Mask => {
                let clip_id = self.clip_path(doc, region, &node_id);
                let paint = if self.opts.mask_fade {
                    format!("url(#{})", self.fade(doc, region, fade_bounds.unwrap_or(area)))
                } else {
                    "white".to_string()
                };
                let (mask, mask_id) = self.artifact(doc, self.defs, ArtifactKind::Mask, region);
                doc.set_attr(mask, "maskUnits", "userSpaceOnUse");
                doc.set_attr(mask, "maskContentUnits", "userSpaceOnUse");
                set_box(doc, mask, area);
                let rect = ensure_child(doc, mask, "rect");
                set_box(doc, rect, area);
                doc.set_attr(rect, "fill", paint);
                doc.set_attr(rect, "clip-path", format!("url(#{clip_id})"));

                let (image, _) = self.artifact(doc, self.layer, ArtifactKind::Image, region);
                self.set_image(doc, image, region, &href, area);
                set_transform(doc, image, local);
                doc.remove_attr(image, "clip-path");
                doc.set_attr(image, "mask", format!("url(#{mask_id})"));
                doc.set_attr(node, "fill", "none");
                image
            }
        };

        if let Some(stroke) = &self.opts.image_stroke {
            doc.set_attr(node, "stroke", stroke.color.as_str());
            doc.set_attr(node, "stroke-width", fmt_num(stroke.width));
        }
        image
    }

    /// Clip path referencing every node of the region by `<use>`.
    fn clip_path(&mut self, doc: &mut RegionDocument, region: &CanonicalRegionId, node_id: &str) -> String {
        let (clip, clip_id) = self.artifact(doc, self.defs, ArtifactKind::Clip, region);
        doc.set_attr(clip, "clipPathUnits", "userSpaceOnUse");
        let target = format!("#{node_id}");
        let present = doc
            .element_children(clip)
            .any(|c| doc.attr(c, "href") == Some(target.as_str()));
        if !present {
            let use_el = doc.create_element("use");
            doc.set_attr(use_el, "href", target.as_str());
            doc.set_attr(use_el, "xlink:href", target.as_str());
            doc.append_child(clip, use_el);
        }
        clip_id
    }

    /// Left-to-right fade spanning `bounds`: opaque until 80%, transparent at the right edge.
    fn fade(&mut self, doc: &mut RegionDocument, region: &CanonicalRegionId, bounds: Rect) -> String {
        let (grad, grad_id) = self.artifact(doc, self.defs, ArtifactKind::Fade, region);
        doc.set_attr(grad, "gradientUnits", "userSpaceOnUse");
        doc.set_attr(grad, "x1", fmt_num(bounds.x0));
        doc.set_attr(grad, "y1", fmt_num(bounds.y0));
        doc.set_attr(grad, "x2", fmt_num(bounds.x1));
        doc.set_attr(grad, "y2", fmt_num(bounds.y0));
        if doc.element_children(grad).next().is_none() {
            for (offset, color) in [("0%", "white"), ("80%", "white"), ("100%", "black")] {
                let stop = doc.create_element("stop");
                doc.set_attr(stop, "offset", offset);
                doc.set_attr(stop, "stop-color", color);
                doc.append_child(grad, stop);
            }
        }
        grad_id
    }

    fn set_image(
        &self,
        doc: &mut RegionDocument,
        image: NodeId,
        region: &CanonicalRegionId,
        href: &str,
        area: Rect,
    ) {
        if doc.attr(image, "href").is_some_and(|old| old != href) {
            tracing::debug!(%region, "region image changed, updating href");
        }
        set_box(doc, image, area);
        doc.set_attr(image, "href", href);
        doc.set_attr(image, "xlink:href", href);
        doc.set_attr(image, "preserveAspectRatio", self.opts.preserve_aspect_ratio.as_str());
        doc.set_attr(image, "data-region", region.as_str());
    }
}

fn set_box(doc: &mut RegionDocument, node: NodeId, area: Rect) {
    doc.set_attr(node, "x", fmt_num(area.x0));
    doc.set_attr(node, "y", fmt_num(area.y0));
    doc.set_attr(node, "width", fmt_num(area.width()));
    doc.set_attr(node, "height", fmt_num(area.height()));
}

fn set_transform(doc: &mut RegionDocument, node: NodeId, t: Affine) {
    if t == Affine::IDENTITY {
        doc.remove_attr(node, "transform");
        return;
    }
    let coeffs: Vec<String> = t.as_coeffs().iter().map(|c| fmt_num(*c)).collect();
    doc.set_attr(node, "transform", format!("matrix({})", coeffs.join(" ")));
}

/// `area` expressed in the user space that `local` maps to the document.
fn local_area(local: Affine, area: Rect) -> Rect {
    if local == Affine::IDENTITY || local.determinant().abs() < 1e-12 {
        return area;
    }
    local.inverse().transform_rect_bbox(area)
}

/// Reuse the first root-level `<defs>`, else create one as the root's first child.
fn ensure_defs(doc: &mut RegionDocument) -> NodeId {
    let root = doc.root();
    if let Some(defs) = doc
        .element_children(root)
        .find(|c| doc.local_name(*c) == Some("defs"))
    {
        return defs;
    }
    let defs = doc.create_element("defs");
    doc.prepend_child(root, defs);
    defs
}

/// Reuse the `data-layer="images"` group, else insert one before the regions layer.
fn ensure_image_layer(doc: &mut RegionDocument, regions: &[(NodeId, RegionIdentity)]) -> NodeId {
    if let Some(layer) = doc.find_by_attr("data-layer", "images") {
        return layer;
    }

    let root = doc.root();
    let layer = doc.create_element("g");
    doc.set_attr(layer, "id", IMAGE_LAYER_ID);
    doc.set_attr(layer, "data-layer", "images");
    doc.set_attr(layer, "pointer-events", "none");

    let regions_layer = doc
        .find_by_id("regions")
        .or_else(|| doc.find_by_attr("data-layer", "regions"))
        .or_else(|| {
            let first = regions.first()?.0;
            doc.parent(first)
                .filter(|p| *p != root && doc.local_name(*p) == Some("g"))
        })
        .filter(|n| *n != root);

    match regions_layer {
        Some(reference) => doc.insert_before(reference, layer),
        None => doc.append_child(root, layer),
    }
    layer
}

/// Region element id, assigning `rf-region-<id>` (collision-suffixed) when missing.
fn ensure_node_id(doc: &mut RegionDocument, node: NodeId, region: &CanonicalRegionId) -> String {
    if let Some(id) = doc.non_empty_attr(node, "id") {
        return id.to_string();
    }
    let id = unique_id(doc, &format!("rf-region-{region}"));
    doc.set_attr(node, "id", id.clone());
    id
}

/// Remove the `fill` attribute and any `fill:` declaration in `style`.
fn strip_fill(doc: &mut RegionDocument, node: NodeId) {
    doc.remove_attr(node, "fill");
    let Some(style) = doc.attr(node, "style") else {
        return;
    };
    let kept: Vec<&str> = style
        .split(';')
        .map(str::trim)
        .filter(|decl| !decl.is_empty())
        .filter(|decl| {
            decl.split_once(':')
                .is_none_or(|(prop, _)| !prop.trim().eq_ignore_ascii_case("fill"))
        })
        .collect();
    let kept = kept.join(";");
    if kept.is_empty() {
        doc.remove_attr(node, "style");
    } else {
        doc.set_attr(node, "style", kept);
    }
}

#[cfg(test)]
#[path = "../../tests/unit/inject/apply.rs"]
mod tests;
