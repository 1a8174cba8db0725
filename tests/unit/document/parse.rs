use crate::document::arena::NodeData;
use crate::foundation::error::RegionFillError;

use super::*;

#[test]
fn parses_regions_and_namespaces() {
    let src = r##"<?xml version="1.0"?>
<svg xmlns="http://www.w3.org/2000/svg" xmlns:xlink="http://www.w3.org/1999/xlink" viewBox="0 0 10 10">
  <!-- comment -->
  <g id="regions">
    <path id="adm1-JP-01" class="region" d="M0 0L5 0L5 5Z" data-name="Hokkaid&#333;"/>
    <use xlink:href="#adm1-JP-01"/>
  </g>
</svg>"##;
    let doc = RegionDocument::parse(src, "test.svg").unwrap();
    let root = doc.root();
    assert_eq!(doc.attr(root, "xmlns"), Some("http://www.w3.org/2000/svg"));
    assert_eq!(
        doc.attr(root, "xmlns:xlink"),
        Some("http://www.w3.org/1999/xlink")
    );

    let path = doc.find_by_id("adm1-JP-01").unwrap();
    assert_eq!(doc.attr(path, "data-name"), Some("Hokkaidō"));

    let g = doc.find_by_id("regions").unwrap();
    let children: Vec<_> = doc.element_children(g).collect();
    assert_eq!(children.len(), 2);
    assert_eq!(doc.attr(children[1], "xlink:href"), Some("#adm1-JP-01"));
    // whitespace between elements is not kept
    assert!(
        doc.children(g)
            .iter()
            .all(|c| !matches!(doc.data(*c), NodeData::Text(_)))
    );
}

#[test]
fn keeps_title_text() {
    let src = r#"<svg xmlns="http://www.w3.org/2000/svg"><path d="M0 0"><title>Tokyo</title></path></svg>"#;
    let doc = RegionDocument::parse(src, "t.svg").unwrap();
    let root = doc.root();
    let path = doc.element_children(root).next().unwrap();
    assert_eq!(doc.text_content(path), "Tokyo");
}

#[test]
fn rejects_malformed_and_non_svg() {
    let err = RegionDocument::parse("<svg", "bad.svg").unwrap_err();
    assert!(matches!(err, RegionFillError::Parse { ref url, .. } if url == "bad.svg"));

    let err = RegionDocument::parse("<html></html>", "page.html").unwrap_err();
    assert!(err.to_string().contains("expected <svg>"));
}
