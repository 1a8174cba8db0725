use crate::{
    identity::slug::resolve,
    source::transport::{Method, MemoryTransport},
};

use super::*;

fn ids(raw: &[&str]) -> Vec<CanonicalRegionId> {
    raw.iter().map(|s| resolve(s)).collect()
}

#[test]
fn image_ref_string_forms() {
    let url = ImageRef::parse("/images/pref/jp-01.jpg");
    assert_eq!(url, ImageRef::Url("/images/pref/jp-01.jpg".to_string()));

    let inline = ImageRef::inline("image/png", vec![1, 2, 3]);
    let href = inline.to_href();
    assert_eq!(href, "data:image/png;base64,AQID");
    assert_eq!(ImageRef::parse(&href), inline);
    assert!(inline.is_inline());

    // Not base64: kept verbatim as an href.
    let svg = ImageRef::parse("data:image/svg+xml,<svg/>");
    assert!(matches!(svg, ImageRef::Url(_)));

    let json = serde_json::to_string(&inline).unwrap();
    assert_eq!(json, "\"data:image/png;base64,AQID\"");
    let back: ImageRef = serde_json::from_str(&json).unwrap();
    assert_eq!(back, inline);
}

#[test]
fn image_source_builds_hrefs() {
    let src = ImageSource::new("/images/pref/");
    assert_eq!(src.href_for(&resolve("JP-01")), "/images/pref/jp-01.jpg");
    let png = ImageSource::new("https://cdn.example/img").with_ext(".png");
    assert_eq!(png.href_for(&resolve("kr-11")), "https://cdn.example/img/kr-11.png");
}

#[tokio::test]
async fn index_present_means_zero_probes() {
    let t = MemoryTransport::new();
    let resolver = BindingResolver::new(&t, Some(ImageSource::new("/images/pref")));
    let index = AvailabilityIndex::from_ids(["jp-01", "jp-02"]);
    let regions = ids(&["jp-01", "jp-02", "jp-03"]);

    let out = resolver
        .resolve(&regions, &ImageBindings::new(), Some(&index))
        .await;

    assert_eq!(out.len(), 2);
    assert_eq!(
        out.get(&resolve("jp-01")),
        Some(&ImageRef::Url("/images/pref/jp-01.jpg".to_string()))
    );
    assert!(out.contains_key(&resolve("jp-02")));
    assert!(!out.contains_key(&resolve("jp-03")));
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn failed_index_falls_back_to_probing_every_region() {
    let t = MemoryTransport::new()
        .with_failure("/images/pref/index.json", "connection refused")
        .with_body("/images/pref/jp-02.jpg", vec![0u8; 4]);
    let resolver = BindingResolver::new(&t, Some(ImageSource::new("/images/pref")));
    let index = resolver.load_index().await;
    assert!(index.is_none());

    let regions = ids(&["jp-01", "jp-02", "jp-03"]);
    let out = resolver
        .resolve(&regions, &ImageBindings::new(), index.as_ref())
        .await;

    assert_eq!(out.keys().map(|k| k.as_str()).collect::<Vec<_>>(), vec!["jp-02"]);
    for id in ["jp-01", "jp-02", "jp-03"] {
        let url = format!("/images/pref/{id}.jpg");
        assert!(t.requests().contains(&(Method::Head, url)));
    }
    // Misses retry with GET; the hit answered HEAD.
    assert_eq!(t.request_count("/images/pref/jp-01.jpg"), 2);
    assert_eq!(t.request_count("/images/pref/jp-02.jpg"), 1);
}

#[tokio::test]
async fn explicit_bindings_win_and_skip_probes() {
    let t = MemoryTransport::new();
    let resolver = BindingResolver::new(&t, Some(ImageSource::new("/images/pref")));
    let mut explicit = ImageBindings::new();
    explicit.insert(resolve("jp-03"), ImageRef::inline("image/png", vec![7]));

    let index = AvailabilityIndex::from_ids(["jp-01"]);
    let regions = ids(&["jp-01", "jp-03"]);
    let out = resolver.resolve(&regions, &explicit, Some(&index)).await;

    assert!(out.get(&resolve("jp-03")).is_some_and(ImageRef::is_inline));
    assert!(out.contains_key(&resolve("jp-01")));

    let without_index = resolver.resolve(&ids(&["jp-03"]), &explicit, None).await;
    assert_eq!(without_index.len(), 1);
    assert!(t.requests().is_empty());
}

#[tokio::test]
async fn no_source_and_empty_ids_never_probe() {
    let t = MemoryTransport::new().with_body("/jp-01.jpg", vec![1u8]);
    let resolver = BindingResolver::new(&t, None);
    assert!(resolver.load_index().await.is_none());
    let out = resolver
        .resolve(&ids(&["jp-01"]), &ImageBindings::new(), None)
        .await;
    assert!(out.is_empty());

    let resolver = BindingResolver::new(&t, Some(ImageSource::new("")));
    let out = resolver
        .resolve(&ids(&["", "--"]), &ImageBindings::new(), None)
        .await;
    assert!(out.is_empty());
    assert!(t.requests().is_empty());
}
