use crate::{
    document::arena::{NodeId, RegionDocument},
    foundation::error::{RegionFillError, RegionFillResult},
};

const XML_NS: &str = "http://www.w3.org/XML/1998/namespace";

/// Elements whose whitespace-only text children are significant.
const TEXT_CONTENT_ELEMENTS: &[&str] = &["text", "tspan", "textPath", "title", "desc", "style"];

impl RegionDocument {
    /// Parse SVG text into a document.
    ///
    /// `source` names the payload in error messages (usually the fetched URL). Comments and
    /// processing instructions are dropped; namespace declarations are preserved on the element
    /// that introduced them.
    pub fn parse(text: &str, source: &str) -> RegionFillResult<Self> {
        let opts = roxmltree::ParsingOptions {
            allow_dtd: true,
            ..Default::default()
        };
        let xml = roxmltree::Document::parse_with_options(text, opts)
            .map_err(|e| RegionFillError::parse(source, e.to_string()))?;

        let xml_root = xml.root_element();
        if xml_root.tag_name().name() != "svg" {
            return Err(RegionFillError::parse(
                source,
                format!(
                    "root element is <{}>, expected <svg>",
                    xml_root.tag_name().name()
                ),
            ));
        }

        let mut doc = RegionDocument::with_root(&qualified_tag(xml_root));
        let root = doc.root();
        copy_attributes(&mut doc, root, xml_root);
        copy_children(&mut doc, root, xml_root);
        Ok(doc)
    }
}

fn copy_children(doc: &mut RegionDocument, parent: NodeId, xml: roxmltree::Node<'_, '_>) {
    let keep_ws = TEXT_CONTENT_ELEMENTS.contains(&xml.tag_name().name());
    for child in xml.children() {
        if child.is_element() {
            let id = doc.create_element(&qualified_tag(child));
            copy_attributes(doc, id, child);
            doc.append_child(parent, id);
            copy_children(doc, id, child);
        } else if child.is_text() {
            let Some(text) = child.text() else {
                continue;
            };
            if !keep_ws && text.trim().is_empty() {
                continue;
            }
            let id = doc.create_text(text);
            doc.append_child(parent, id);
        }
    }
}

fn copy_attributes(doc: &mut RegionDocument, id: NodeId, xml: roxmltree::Node<'_, '_>) {
    let inherited: Vec<(Option<&str>, &str)> = xml
        .parent_element()
        .map(|p| p.namespaces().map(|ns| (ns.name(), ns.uri())).collect())
        .unwrap_or_default();

    for ns in xml.namespaces() {
        if ns.uri() == XML_NS || inherited.contains(&(ns.name(), ns.uri())) {
            continue;
        }
        match ns.name() {
            Some(prefix) => doc.set_attr(id, &format!("xmlns:{prefix}"), ns.uri()),
            None => doc.set_attr(id, "xmlns", ns.uri()),
        }
    }

    for attr in xml.attributes() {
        let name = match attr.namespace() {
            Some(XML_NS) => format!("xml:{}", attr.name()),
            Some(uri) => match xml.lookup_prefix(uri) {
                Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", attr.name()),
                _ => attr.name().to_string(),
            },
            None => attr.name().to_string(),
        };
        doc.set_attr(id, &name, attr.value());
    }
}

fn qualified_tag(node: roxmltree::Node<'_, '_>) -> String {
    let tag = node.tag_name();
    match tag.namespace().and_then(|uri| node.lookup_prefix(uri)) {
        Some(prefix) if !prefix.is_empty() => format!("{prefix}:{}", tag.name()),
        _ => tag.name().to_string(),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/parse.rs"]
mod tests;
