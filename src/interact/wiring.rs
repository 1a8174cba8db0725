use crate::{
    document::arena::{NodeId, RegionDocument},
    identity::slug::CanonicalRegionId,
};

/// Id of the hover stylesheet inserted by [`ensure_hover_style`].
pub const HOVER_STYLE_ID: &str = "rf-style";

/// Class added to every bound region.
pub const REGION_CLASS: &str = "rf-region";

/// Canonical id written onto bound nodes. Kept apart from `data-code` so re-parsing output
/// resolves the same labels as the source document.
pub const REGION_CODE_ATTR: &str = "data-rf-code";

/// Registry entry for one bound node.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct Activation {
    pub(crate) id: CanonicalRegionId,
    pub(crate) label: String,
}

/// Emitted when a bound region is clicked or activated from the keyboard.
#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize)]
pub struct RegionActivated {
    /// Region that was activated.
    pub id: CanonicalRegionId,
    /// Its human-readable label.
    pub label: String,
}

/// Input events routed to region nodes.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UiEvent {
    /// Pointer click.
    Click,
    /// Key press, by key name (`"Enter"`, `" "`, `"Escape"`, ...).
    Key(String),
}

impl UiEvent {
    fn activates(&self) -> bool {
        match self {
            Self::Click => true,
            Self::Key(k) => k == "Enter" || k == " ",
        }
    }
}

/// Make `node` focusable and activatable as region `id`.
///
/// Returns `false` without touching the node when it is already bound.
pub fn bind_region(
    doc: &mut RegionDocument,
    node: NodeId,
    id: &CanonicalRegionId,
    label: &str,
) -> bool {
    if doc.activations.contains_key(&node) {
        return false;
    }

    doc.set_attr(node, "tabindex", "0");
    doc.set_attr(node, "role", "button");
    doc.set_attr(node, "aria-label", label);
    doc.set_attr(node, REGION_CODE_ATTR, id.as_str());

    let style = doc.attr(node, "style").unwrap_or_default();
    if !style.contains("cursor:") {
        let style = style.trim().trim_end_matches(';');
        let style = if style.is_empty() {
            "cursor:pointer".to_string()
        } else {
            format!("{style};cursor:pointer")
        };
        doc.set_attr(node, "style", style);
    }

    let class = doc.attr(node, "class").unwrap_or_default();
    if !class.split_whitespace().any(|c| c == REGION_CLASS) {
        let class = if class.trim().is_empty() {
            REGION_CLASS.to_string()
        } else {
            format!("{} {REGION_CLASS}", class.trim())
        };
        doc.set_attr(node, "class", class);
    }

    doc.activations.insert(
        node,
        Activation {
            id: id.clone(),
            label: label.to_string(),
        },
    );
    true
}

/// `true` when `node` has been passed to [`bind_region`] on this document.
pub fn is_bound(doc: &RegionDocument, node: NodeId) -> bool {
    doc.activations.contains_key(&node)
}

/// Insert the hover stylesheet once per document.
pub fn ensure_hover_style(doc: &mut RegionDocument) {
    if doc.find_by_id(HOVER_STYLE_ID).is_some() {
        return;
    }
    let style = doc.create_element("style");
    doc.set_attr(style, "id", HOVER_STYLE_ID);
    let css = doc.create_text(&format!(
        ".{REGION_CLASS}:hover{{filter:brightness(.92)}}"
    ));
    doc.append_child(style, css);
    let root = doc.root();
    doc.append_child(root, style);
}

/// Route `event` on `target` to the nearest bound node at or above it.
pub fn dispatch(doc: &RegionDocument, target: NodeId, event: &UiEvent) -> Option<RegionActivated> {
    if !event.activates() {
        return None;
    }
    std::iter::once(target)
        .chain(doc.ancestors(target))
        .find_map(|n| doc.activations.get(&n))
        .map(|a| RegionActivated {
            id: a.id.clone(),
            label: a.label.clone(),
        })
}

#[cfg(test)]
#[path = "../../tests/unit/interact/wiring.rs"]
mod tests;
