use crate::source::transport::MemoryTransport;

use super::*;

const SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 10 10"><path id="adm1-JP-01" d="M0 0L1 0L1 1Z"/></svg>"#;

#[tokio::test]
async fn fetch_parses_svg() {
    let loader = RegionSourceLoader::new(MemoryTransport::new().with_body("/regions/jpn.svg", SVG));
    let doc = loader.fetch("/regions/jpn.svg").await.unwrap();
    assert!(doc.find_by_id("adm1-JP-01").is_some());
}

#[tokio::test]
async fn fetch_error_taxonomy() {
    let t = MemoryTransport::new()
        .with_status("/regions/fra.svg", 404)
        .with_failure("/regions/deu.svg", "connection reset")
        .with_body("/regions/bad.svg", "<svg><g></svg>")
        .with_body("/regions/bin.svg", vec![0xffu8, 0xfe, 0x00]);
    let loader = RegionSourceLoader::new(t);

    let err = loader.fetch("/regions/fra.svg").await.unwrap_err();
    assert!(matches!(err, RegionFillError::NotFound { status: 404, ref url } if url == "/regions/fra.svg"));

    let err = loader.fetch("/regions/deu.svg").await.unwrap_err();
    assert!(matches!(err, RegionFillError::Network { .. }));

    let err = loader.fetch("/regions/bad.svg").await.unwrap_err();
    assert!(matches!(err, RegionFillError::Parse { .. }));

    let err = loader.fetch("/regions/bin.svg").await.unwrap_err();
    assert!(matches!(err, RegionFillError::Parse { .. }));
}

#[tokio::test]
async fn fetch_converts_geojson() {
    let gj = r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{"iso_3166_2":"KR-11","name":"Seoul"},"geometry":{"type":"Polygon","coordinates":[[[126.8,37.4],[127.2,37.4],[127.2,37.7],[126.8,37.4]]]}}]}"#;
    let loader = RegionSourceLoader::new(MemoryTransport::new().with_body("/geo/kor.json", gj));
    let doc = loader.fetch("/geo/kor.json").await.unwrap();
    assert!(doc.find_by_id("adm1-KR-11").is_some());
}

#[tokio::test]
async fn probe_falls_back_from_head_to_get() {
    let t = MemoryTransport::new()
        .with_body("/img/jp-01.jpg", vec![1u8, 2, 3])
        .with_failing_head();
    assert!(probe_exists(&t, "/img/jp-01.jpg").await);
    assert_eq!(
        t.requests(),
        vec![
            (Method::Head, "/img/jp-01.jpg".to_string()),
            (Method::Get, "/img/jp-01.jpg".to_string()),
        ]
    );
}

#[tokio::test]
async fn probe_is_false_on_any_failure() {
    let t = MemoryTransport::new()
        .with_failure("/img/down.jpg", "refused")
        .with_status("/img/forbidden.jpg", 403);
    assert!(!probe_exists(&t, "/img/down.jpg").await);
    assert!(!probe_exists(&t, "/img/forbidden.jpg").await);
    assert!(!probe_exists(&t, "/img/missing.jpg").await);
}

#[tokio::test]
async fn probe_head_success_skips_get() {
    let t = MemoryTransport::new().with_body("/img/jp-02.jpg", vec![9u8]);
    assert!(probe_exists(&t, "/img/jp-02.jpg").await);
    assert_eq!(t.request_count("/img/jp-02.jpg"), 1);
}
