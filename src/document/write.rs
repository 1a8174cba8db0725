use crate::document::arena::{NodeData, NodeId, RegionDocument};

impl RegionDocument {
    /// Serialize the attached tree as an SVG document with an XML declaration.
    ///
    /// Elements holding only element children are indented two spaces per level; elements with
    /// character data are written inline so text content is preserved byte-for-byte.
    pub fn to_svg_string(&self) -> String {
        let mut out = String::from("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
        write_node(self, self.root(), 0, &mut out);
        out.push('\n');
        out
    }
}

fn write_node(doc: &RegionDocument, id: NodeId, depth: usize, out: &mut String) {
    let el = match doc.data(id) {
        NodeData::Text(t) => {
            escape_into(t, false, out);
            return;
        }
        NodeData::Element(el) => el,
    };

    out.push('<');
    out.push_str(&el.name);
    for a in &el.attrs {
        out.push(' ');
        out.push_str(&a.name);
        out.push_str("=\"");
        escape_into(&a.value, true, out);
        out.push('"');
    }

    let children = doc.children(id);
    if children.is_empty() {
        out.push_str("/>");
        return;
    }
    out.push('>');

    let inline = children
        .iter()
        .any(|c| matches!(doc.data(*c), NodeData::Text(_)));
    for c in children {
        if !inline {
            out.push('\n');
            push_indent(depth + 1, out);
        }
        write_node(doc, *c, depth + 1, out);
    }
    if !inline {
        out.push('\n');
        push_indent(depth, out);
    }

    out.push_str("</");
    out.push_str(&el.name);
    out.push('>');
}

fn push_indent(depth: usize, out: &mut String) {
    for _ in 0..depth {
        out.push_str("  ");
    }
}

fn escape_into(s: &str, attr: bool, out: &mut String) {
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' if attr => out.push_str("&quot;"),
            '\n' if attr => out.push_str("&#10;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/document/write.rs"]
mod tests;
