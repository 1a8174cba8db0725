use crate::identity::region::collect_regions;

use super::*;

const SAMPLE: &str = r#"{
  "type": "FeatureCollection",
  "features": [
    {"type": "Feature",
     "properties": {"adm0_a3": "JPN", "iso_3166_2": "JP-01", "name": "Hokkaidō"},
     "geometry": {"type": "Polygon", "coordinates": [[[140,41],[146,41],[146,45.5],[140,45.5],[140,41]]]}},
    {"type": "Feature",
     "properties": {"adm0_a3": "JPN", "gn_a1_code": "JP.02", "name_en": "Aomori"},
     "geometry": {"type": "MultiPolygon", "coordinates": [[[[140,40],[141.5,40],[141.5,41],[140,41],[140,40]]]]}},
    {"type": "Feature",
     "properties": {"adm0_a3": "JPN", "name": "Ōsaka"},
     "geometry": {"type": "Polygon", "coordinates": [[[135,34.3,0],[135.7,34.3,0],[135.7,35,0],[135,34.3,0]]]}},
    {"type": "Feature",
     "properties": {"adm0_a3": "KOR", "iso_3166_2": "KR-11", "name": "Seoul"},
     "geometry": {"type": "Polygon", "coordinates": [[[126.8,37.4],[127.2,37.4],[127.2,37.7],[126.8,37.4]]]}},
    {"type": "Feature",
     "properties": {"adm0_a3": "JPN", "iso_3166_2": "JP-99"},
     "geometry": {"type": "Point", "coordinates": [139, 35]}}
  ]
}"#;

#[test]
fn builds_country_regions_with_stable_ids() {
    let fc = FeatureCollection::from_json(SAMPLE.as_bytes(), "sample.geojson").unwrap();
    let opts = Admin1Options {
        country: Some("jpn".to_string()),
        ..Admin1Options::default()
    };
    let doc = build_admin1_svg(&fc, &opts).unwrap();

    let root = doc.root();
    assert_eq!(doc.attr(root, "viewBox"), Some("0 0 900 850"));
    assert!(doc.find_by_id("regions").is_some());

    let hokkaido = doc.find_by_id("adm1-JP-01").unwrap();
    assert_eq!(doc.attr(hokkaido, "data-iso"), Some("JP-01"));
    assert_eq!(doc.attr(hokkaido, "data-name"), Some("Hokkaidō"));
    assert_eq!(doc.attr(hokkaido, "class"), Some("region"));
    assert!(doc.attr(hokkaido, "d").unwrap().starts_with('M'));

    assert!(doc.find_by_id("adm1-JP-02").is_some());
    assert!(doc.find_by_id("adm1-JPN-OSAKA").is_some());
    assert!(doc.find_by_id("adm1-KR-11").is_none());
    assert!(doc.find_by_id("adm1-JP-99").is_none());

    let ids: Vec<_> = collect_regions(&doc, None)
        .into_iter()
        .map(|(_, r)| r.id.as_str().to_string())
        .collect();
    assert_eq!(ids, vec!["jp-01", "jp-02", "jpn-osaka"]);
}

#[test]
fn geometry_fits_inside_margins() {
    let fc = FeatureCollection::from_json(SAMPLE.as_bytes(), "sample.geojson").unwrap();
    let opts = Admin1Options::default();
    let doc = build_admin1_svg(&fc, &opts).unwrap();
    for (node, _) in collect_regions(&doc, None) {
        let path = BezPath::from_svg(doc.attr(node, "d").unwrap()).unwrap();
        let bb = kurbo::Shape::bounding_box(&path);
        assert!(bb.x0 >= opts.margin - 0.01 && bb.y0 >= opts.margin - 0.01);
        assert!(bb.x1 <= opts.width - opts.margin + 0.01);
        assert!(bb.y1 <= opts.height - opts.margin + 0.01);
    }
}

#[test]
fn duplicate_codes_get_suffixed_ids() {
    let src = r#"{"type":"FeatureCollection","features":[
      {"type":"Feature","properties":{"iso_3166_2":"KR-49"},"geometry":{"type":"Polygon","coordinates":[[[126,33],[127,33],[127,34],[126,33]]]}},
      {"type":"Feature","properties":{"iso_3166_2":"KR-49"},"geometry":{"type":"Polygon","coordinates":[[[126,32],[127,32],[127,32.5],[126,32]]]}}
    ]}"#;
    let fc = FeatureCollection::from_json(src.as_bytes(), "dup.geojson").unwrap();
    let doc = build_admin1_svg(&fc, &Admin1Options::default()).unwrap();
    assert!(doc.find_by_id("adm1-KR-49").is_some());
    assert!(doc.find_by_id("adm1-KR-49-2").is_some());
}

#[test]
fn rejects_non_collections_and_bad_options() {
    let err = FeatureCollection::from_json(br#"{"type":"Feature"}"#, "f.json").unwrap_err();
    assert!(matches!(err, RegionFillError::Parse { .. }));
    assert!(FeatureCollection::from_json(b"{", "f.json").is_err());

    let fc = FeatureCollection { features: vec![] };
    let opts = Admin1Options {
        margin: 500.0,
        ..Admin1Options::default()
    };
    assert!(build_admin1_svg(&fc, &opts).is_err());

    let empty = build_admin1_svg(&fc, &Admin1Options::default()).unwrap();
    let layer = empty.find_by_id("regions").unwrap();
    assert!(empty.children(layer).is_empty());
}

#[test]
fn code_and_name_precedence() {
    let props: Map<String, Value> =
        serde_json::from_str(r#"{"adm1_code":"JPN-1863","gn_a1_code":"JP.40","NAME_1":"Fukuoka"}"#)
            .unwrap();
    assert_eq!(pick_region_code(Some(&props), "JPN", "Fukuoka"), "JP-40");
    assert_eq!(pick_region_name(Some(&props)), "Fukuoka");
    assert_eq!(pick_region_code(None, "kor", ""), "KOR-REGION");
}
