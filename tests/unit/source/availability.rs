use crate::source::transport::MemoryTransport;

use super::*;

#[test]
fn from_json_is_all_or_nothing() {
    let idx = AvailabilityIndex::from_json(r#"["jp-01", "JP-02", "Tōkyō"]"#.as_bytes()).unwrap();
    assert_eq!(idx.len(), 3);
    assert!(idx.contains(&resolve("jp-02")));
    assert!(idx.contains(&resolve("tokyo")));

    assert!(AvailabilityIndex::from_json(br#"["jp-01", 2]"#).is_none());
    assert!(AvailabilityIndex::from_json(br#"{"jp-01": true}"#).is_none());
    assert!(AvailabilityIndex::from_json(b"not json").is_none());

    let empty = AvailabilityIndex::from_json(b"[]").unwrap();
    assert!(empty.is_empty());
}

#[tokio::test]
async fn load_fetches_manifest_under_base() {
    let t = MemoryTransport::new().with_body("/images/pref/index.json", r#"["jp-01","jp-02"]"#);
    let idx = AvailabilityIndex::load(&t, "/images/pref/").await.unwrap();
    assert_eq!(
        idx.iter().map(|id| id.as_str()).collect::<Vec<_>>(),
        vec!["jp-01", "jp-02"]
    );
}

#[tokio::test]
async fn load_failures_are_absent() {
    let down = MemoryTransport::new().with_failure("/img/index.json", "refused");
    assert!(AvailabilityIndex::load(&down, "/img").await.is_none());

    let missing = MemoryTransport::new();
    assert!(AvailabilityIndex::load(&missing, "/img").await.is_none());

    let broken = MemoryTransport::new().with_body("/img/index.json", "[\"jp-01\",");
    assert!(AvailabilityIndex::load(&broken, "/img").await.is_none());
}
