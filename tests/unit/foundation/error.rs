use super::*;

#[test]
fn display_prefixes_are_stable() {
    assert!(
        RegionFillError::not_found("/regions/jpn.svg", 404)
            .to_string()
            .contains("not found:")
    );
    assert!(
        RegionFillError::network("http://x", "refused")
            .to_string()
            .contains("network error:")
    );
    assert!(
        RegionFillError::parse("a.svg", "bad")
            .to_string()
            .contains("parse error:")
    );
    assert!(
        RegionFillError::validation("x")
            .to_string()
            .contains("validation error:")
    );
    assert!(
        RegionFillError::storage("x")
            .to_string()
            .contains("storage error:")
    );
}

#[test]
fn not_found_carries_url_and_status() {
    let err = RegionFillError::not_found("/regions/fra.svg", 404);
    assert_eq!(err.status(), Some(404));
    assert_eq!(err.url(), Some("/regions/fra.svg"));
    assert!(err.to_string().contains("HTTP 404"));
}

#[test]
fn other_preserves_source() {
    let base = std::io::Error::other("boom");
    let err = RegionFillError::Other(anyhow::Error::new(base));
    assert!(err.to_string().contains("boom"));
    assert_eq!(err.status(), None);
    assert_eq!(err.url(), None);
}
