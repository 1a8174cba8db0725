use crate::inject::options::FillStrategy;

use super::*;

#[test]
fn empty_object_yields_defaults() {
    let cfg = ViewerConfig::from_reader("{}".as_bytes()).unwrap();
    assert_eq!(cfg, ViewerConfig::default());
    assert!(cfg.use_index);
    assert_eq!(cfg.fill.strategy, FillStrategy::Clip);
    assert_eq!(cfg.fill.fallback_fill, "#f4f1e6");
}

#[test]
fn parses_overrides_and_merges_catalog() {
    let json = r##"{
        "countries": {
            "fra": { "document_url": "/geo/fra.geojson", "prefix": "fra", "image_base": "/images/fr" }
        },
        "numeric_codes": { "250": "fra" },
        "fill": { "strategy": "mask", "fallback_fill": "#ddd", "mask_fade": false },
        "use_index": false,
        "image_ext": "png",
        "static_root": "site",
        "store_path": "uploads.json"
    }"##;
    let cfg = ViewerConfig::from_reader(json.as_bytes()).unwrap();
    assert_eq!(cfg.fill.strategy, FillStrategy::Mask);
    assert!(!cfg.fill.mask_fade);
    assert!(cfg.fill.clear_existing_fill);
    assert_eq!(cfg.static_root, PathBuf::from("site"));

    let catalog = cfg.catalog();
    assert_eq!(catalog.lookup("250").image_base.as_deref(), Some("/images/fr"));
    assert!(catalog.contains("jpn"));
}

#[test]
fn rejects_unknown_fields_and_bad_values() {
    let err = ViewerConfig::from_reader(r#"{"strategy":"clip"}"#.as_bytes()).unwrap_err();
    assert!(matches!(err, RegionFillError::Validation(_)));

    let err = ViewerConfig::from_reader(r#"{"image_ext":""}"#.as_bytes()).unwrap_err();
    assert!(err.to_string().contains("image_ext"));
}

#[test]
fn from_path_reads_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("viewer.json");
    std::fs::write(&path, r#"{"image_ext":"webp"}"#).unwrap();
    assert_eq!(ViewerConfig::from_path(&path).unwrap().image_ext, "webp");

    let missing = ViewerConfig::from_path(dir.path().join("nope.json")).unwrap_err();
    assert!(missing.to_string().contains("nope.json"));
}
