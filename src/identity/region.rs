use crate::{
    document::arena::{NodeId, RegionDocument},
    identity::slug::{CanonicalRegionId, resolve},
};

/// Shapes that can carry a region fill.
const DRAWABLE: &[&str] = &["path", "polygon", "polyline", "rect", "circle", "ellipse", "use"];

/// Containers whose content is never rendered directly.
const NON_RENDERED: &[&str] = &["defs", "clipPath", "mask", "pattern", "symbol", "marker"];

/// Which attribute (or child) supplied a region's identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdSource {
    /// `data-code` attribute.
    DataCode,
    /// `data-iso` attribute.
    DataIso,
    /// `id` attribute of the form `<prefix>-<code>`.
    ElementId,
    /// `data-name` attribute.
    DataName,
    /// Text of a `<title>` child.
    Title,
    /// `name` attribute.
    NameAttr,
}

/// Resolved identity of one fillable node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RegionIdentity {
    /// Canonical join key. May be empty (the node then takes the fallback fill).
    pub id: CanonicalRegionId,
    /// Human-readable label reported on activation.
    pub label: String,
    /// Where `id` came from.
    pub source: IdSource,
}

/// Resolve the identity of `node`, or `None` when it is not a region.
///
/// Identifier precedence: `data-code`, `data-iso`, an `id` of the form `<prefix>-<code>`,
/// `data-name`, `<title>` text, `name`. `id_prefix` pins the expected id prefix; without it the
/// text before the first `-` is taken as the prefix.
pub fn region_identity(
    doc: &RegionDocument,
    node: NodeId,
    id_prefix: Option<&str>,
) -> Option<RegionIdentity> {
    let local = doc.local_name(node)?;
    if !DRAWABLE.contains(&local) || in_non_rendered(doc, node) {
        return None;
    }

    let title = title_text(doc, node);
    let name_attr = doc.non_empty_attr(node, "name");
    let data_name = doc.non_empty_attr(node, "data-name");

    let (raw, source) = if let Some(v) = doc.non_empty_attr(node, "data-code") {
        (v.to_string(), IdSource::DataCode)
    } else if let Some(v) = doc.non_empty_attr(node, "data-iso") {
        (v.to_string(), IdSource::DataIso)
    } else if let Some(v) = doc
        .non_empty_attr(node, "id")
        .and_then(|id| code_from_element_id(id, id_prefix))
    {
        (v.to_string(), IdSource::ElementId)
    } else if let Some(v) = data_name {
        (v.to_string(), IdSource::DataName)
    } else if let Some(v) = title.as_deref() {
        (v.to_string(), IdSource::Title)
    } else if let Some(v) = name_attr {
        (v.to_string(), IdSource::NameAttr)
    } else {
        return None;
    };

    let label = data_name
        .map(str::to_string)
        .or(title)
        .or_else(|| name_attr.map(str::to_string))
        .unwrap_or_else(|| raw.clone());

    Some(RegionIdentity {
        id: resolve(&raw),
        label,
        source,
    })
}

/// All region nodes of the attached tree in document order, paired with their identity.
pub fn collect_regions(
    doc: &RegionDocument,
    id_prefix: Option<&str>,
) -> Vec<(NodeId, RegionIdentity)> {
    doc.descendants(doc.root())
        .filter_map(|n| region_identity(doc, n, id_prefix).map(|ident| (n, ident)))
        .collect()
}

fn code_from_element_id<'a>(id: &'a str, id_prefix: Option<&str>) -> Option<&'a str> {
    let code = match id_prefix {
        Some(prefix) => {
            let head = id.get(..prefix.len())?;
            if !head.eq_ignore_ascii_case(prefix) {
                return None;
            }
            id[prefix.len()..].strip_prefix('-')?
        }
        None => id.split_once('-').map(|(head, rest)| if head.is_empty() { "" } else { rest })?,
    };
    (!code.trim().is_empty()).then_some(code)
}

fn in_non_rendered(doc: &RegionDocument, node: NodeId) -> bool {
    doc.ancestors(node).any(|a| {
        doc.local_name(a).is_some_and(|n| NON_RENDERED.contains(&n))
            || doc.attr(a, "data-layer") == Some("images")
    })
}

fn title_text(doc: &RegionDocument, node: NodeId) -> Option<String> {
    let title = doc
        .element_children(node)
        .find(|c| doc.is_element(*c, "title"))?;
    let text = doc.text_content(title);
    let text = text.trim();
    (!text.is_empty()).then(|| text.to_string())
}

#[cfg(test)]
#[path = "../../tests/unit/identity/region.rs"]
mod tests;
