use crate::{
    document::arena::{NodeId, RegionDocument},
    identity::slug::CanonicalRegionId,
};

/// Marker attribute carried by every generated artifact: `<kind>:<region>`.
pub const ARTIFACT_ATTR: &str = "data-rf-artifact";

/// Id of the image layer group.
pub const IMAGE_LAYER_ID: &str = "rf-image-layer";

/// Generated element kinds. Each exists at most once per region.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum ArtifactKind {
    Pattern,
    Clip,
    Fade,
    Mask,
    Image,
}

impl ArtifactKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Clip => "clip",
            Self::Fade => "fade",
            Self::Mask => "mask",
            Self::Image => "img",
        }
    }

    fn tag(self) -> &'static str {
        match self {
            Self::Pattern => "pattern",
            Self::Clip => "clipPath",
            Self::Fade => "linearGradient",
            Self::Mask => "mask",
            Self::Image => "image",
        }
    }
}

/// `rf-<kind>-[<prefix>-]<region>`.
pub(crate) fn base_id(kind: ArtifactKind, prefix: Option<&str>, region: &CanonicalRegionId) -> String {
    match prefix.map(str::trim).filter(|p| !p.is_empty()) {
        Some(p) => format!("rf-{}-{p}-{region}", kind.as_str()),
        None => format!("rf-{}-{region}", kind.as_str()),
    }
}

pub(crate) fn marker(kind: ArtifactKind, region: &CanonicalRegionId) -> String {
    format!("{}:{region}", kind.as_str())
}

/// `base`, or the first of `base-2`, `base-3`, ... not used by any attached element.
pub(crate) fn unique_id(doc: &RegionDocument, base: &str) -> String {
    if doc.find_by_id(base).is_none() {
        return base.to_string();
    }
    let mut n = 2;
    loop {
        let candidate = format!("{base}-{n}");
        if doc.find_by_id(&candidate).is_none() {
            return candidate;
        }
        n += 1;
    }
}

/// The attached artifact of `kind` for `region`, if any.
pub(crate) fn find_artifact(
    doc: &RegionDocument,
    kind: ArtifactKind,
    region: &CanonicalRegionId,
) -> Option<NodeId> {
    doc.find_by_attr(ARTIFACT_ATTR, &marker(kind, region))
}

/// Result of [`ensure_artifact`].
pub(crate) struct Artifact {
    pub(crate) node: NodeId,
    pub(crate) id: String,
    pub(crate) created: bool,
}

/// Find the artifact of `kind` for `region`, or create it under `parent` with a fresh id.
pub(crate) fn ensure_artifact(
    doc: &mut RegionDocument,
    parent: NodeId,
    kind: ArtifactKind,
    prefix: Option<&str>,
    region: &CanonicalRegionId,
) -> Artifact {
    if let Some(node) = find_artifact(doc, kind, region) {
        let id = match doc.non_empty_attr(node, "id") {
            Some(id) => id.to_string(),
            None => {
                let id = unique_id(doc, &base_id(kind, prefix, region));
                doc.set_attr(node, "id", id.clone());
                id
            }
        };
        return Artifact {
            node,
            id,
            created: false,
        };
    }

    let id = unique_id(doc, &base_id(kind, prefix, region));
    let node = doc.create_element(kind.tag());
    doc.set_attr(node, "id", id.clone());
    doc.set_attr(node, ARTIFACT_ATTR, marker(kind, region));
    doc.append_child(parent, node);
    Artifact {
        node,
        id,
        created: true,
    }
}

/// Detach every image-layer element generated for `region`. Returns how many were removed.
pub(crate) fn remove_layer_image(doc: &mut RegionDocument, region: &CanonicalRegionId) -> usize {
    let mut removed = 0;
    while let Some(node) = find_artifact(doc, ArtifactKind::Image, region) {
        doc.detach(node);
        removed += 1;
    }
    removed
}

/// First element child named `tag`, created and appended when missing.
pub(crate) fn ensure_child(doc: &mut RegionDocument, parent: NodeId, tag: &str) -> NodeId {
    if let Some(child) = doc
        .element_children(parent)
        .find(|c| doc.local_name(*c) == Some(tag))
    {
        return child;
    }
    let child = doc.create_element(tag);
    doc.append_child(parent, child);
    child
}
