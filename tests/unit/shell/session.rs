use crate::{
    identity::slug::resolve,
    source::transport::{Method, MemoryTransport},
    store::storage::MemoryStorage,
};

use super::*;

const JPN_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 900 850"><g id="regions"><path id="adm1-JP-01" data-name="Hokkaido" d="M0 0L10 0L10 10Z"/><path id="adm1-JP-02" data-name="Aomori" d="M20 0L30 0L30 10Z"/><path id="adm1-JP-03" data-name="Iwate" d="M40 0L50 0L50 10Z"/></g></svg>"#;
const KOR_SVG: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 500 500"><g id="regions"><path id="adm1-KR-11" data-name="Seoul" d="M0 0L10 0L10 10Z"/></g></svg>"#;

fn transport() -> MemoryTransport {
    MemoryTransport::new()
        .with_body("/regions/jpn_regions.svg", JPN_SVG)
        .with_body("/regions/kor_regions.svg", KOR_SVG)
}

fn filled_ids(state: &AppState) -> Vec<String> {
    state
        .report()
        .unwrap()
        .filled()
        .map(|r| r.id.to_string())
        .collect()
}

#[tokio::test]
async fn index_drives_bindings_without_probes() {
    let t = transport().with_body("/images/pref/index.json", r#"["jp-01","jp-02"]"#);
    let shell = Shell::new(t, MemoryStorage::new());

    assert!(shell.open_country("JPN").await);
    assert_eq!(filled_ids(&shell.state()), vec!["jp-01", "jp-02"]);
    assert_eq!(
        shell.transport().requests(),
        vec![
            (Method::Get, "/regions/jpn_regions.svg".to_string()),
            (Method::Get, "/images/pref/index.json".to_string()),
        ]
    );

    let state = shell.state();
    let doc = state.document().unwrap();
    let jp3 = doc.find_by_id("adm1-JP-03").unwrap();
    assert_eq!(doc.attr(jp3, "fill"), Some(FillOptions::DEFAULT_FALLBACK));
    assert!(doc.find_by_id("rf-clip-jpn-jp-01").is_some());
}

#[tokio::test]
async fn failed_index_falls_back_to_probes() {
    let t = transport()
        .with_failure("/images/pref/index.json", "refused")
        .with_body("/images/pref/jp-03.jpg", vec![1u8]);
    let shell = Shell::new(t, MemoryStorage::new());

    assert!(shell.open_country("392").await);
    assert_eq!(filled_ids(&shell.state()), vec!["jp-03"]);
    for id in ["jp-01", "jp-02", "jp-03"] {
        assert!(shell.transport().request_count(&format!("/images/pref/{id}.jpg")) >= 1);
    }
}

#[tokio::test]
async fn newer_selection_wins_over_slow_fetch() {
    let t = transport();
    t.gate("/regions/jpn_regions.svg");
    let shell = Shell::new(t, MemoryStorage::new()).with_use_index(false);

    let (a, b) = futures::join!(shell.open_country("jpn"), async {
        let shown = shell.open_country("kor").await;
        shell.transport().open_gate("/regions/jpn_regions.svg");
        shown
    });

    assert!(!a);
    assert!(b);
    let state = shell.state();
    assert_eq!(state.selected_country(), Some("kor"));
    match state.view() {
        ViewState::Ready { country, document, .. } => {
            assert_eq!(country, "kor");
            assert!(document.find_by_id("adm1-KR-11").is_some());
        }
        other => panic!("unexpected view: {other:?}"),
    }
}

#[tokio::test]
async fn missing_document_shows_diagnostic() {
    let shell = Shell::new(transport(), MemoryStorage::new());
    assert!(!shell.open_country("fra").await);

    let state = shell.state();
    let d = state.diagnostic().unwrap();
    assert_eq!(d.url, "/regions/fra.svg");
    assert_eq!(d.status, Some(404));
}

#[tokio::test]
async fn uploads_layer_over_remote_bindings() {
    let t = transport().with_body("/images/pref/index.json", r#"["jp-01"]"#);
    let shell = Shell::new(t, MemoryStorage::new());
    assert!(shell.open_country("jpn").await);

    let jp3 = resolve("jp-03");
    shell
        .upload_image(&jp3, "Iwate", ImageRef::inline("image/png", vec![1, 2, 3]))
        .unwrap();
    assert_eq!(filled_ids(&shell.state()), vec!["jp-01", "jp-03"]);
    assert_eq!(shell.uploads().countries_with_uploads(), vec!["jpn"]);

    assert!(shell.remove_image(&jp3).unwrap());
    assert!(!shell.remove_image(&jp3).unwrap());
    assert_eq!(filled_ids(&shell.state()), vec!["jp-01"]);

    shell
        .upload_image(&resolve("jp-01"), "Hokkaido", ImageRef::parse("mine.jpg"))
        .unwrap();
    {
        let state = shell.state();
        let report = state.report().unwrap();
        let img = report.region("jp-01").next().unwrap().image.unwrap();
        assert_eq!(state.document().unwrap().attr(img, "href"), Some("mine.jpg"));
    }

    shell.clear_uploads().unwrap();
    let state = shell.state();
    let report = state.report().unwrap();
    let img = report.region("jp-01").next().unwrap().image.unwrap();
    assert_eq!(
        state.document().unwrap().attr(img, "href"),
        Some("/images/pref/jp-01.jpg")
    );
}

#[tokio::test]
async fn stored_uploads_skip_probing() {
    let mut store = UploadStore::open(MemoryStorage::new());
    store
        .upsert("jpn", &resolve("jp-01"), "Hokkaido", ImageRef::parse("mine.jpg"))
        .unwrap();
    let storage = store.storage().clone();

    let shell = Shell::new(transport(), storage).with_use_index(false);
    assert!(shell.open_country("jpn").await);
    assert_eq!(filled_ids(&shell.state()), vec!["jp-01"]);
    assert_eq!(shell.transport().request_count("/images/pref/jp-01.jpg"), 0);
    assert_eq!(shell.transport().request_count("/images/pref/jp-02.jpg"), 2);
}

#[tokio::test]
async fn activation_updates_selection() {
    let shell = Shell::new(transport(), MemoryStorage::new()).with_use_index(false);
    assert!(shell.open_country("jpn").await);

    let node = shell
        .state()
        .document()
        .unwrap()
        .find_by_id("adm1-JP-02")
        .unwrap();
    let ev = shell.activate(node, &UiEvent::Click).unwrap();
    assert_eq!(ev.id.as_str(), "jp-02");
    assert_eq!(ev.label, "Aomori");
    assert_eq!(shell.state().selected_region(), Some(&ev));

    assert!(shell.activate(node, &UiEvent::Key("Tab".into())).is_none());
}

#[tokio::test]
async fn upload_requires_open_country() {
    let shell = Shell::new(transport(), MemoryStorage::new());
    let err = shell
        .upload_image(&resolve("jp-01"), "x", ImageRef::parse("a.jpg"))
        .unwrap_err();
    assert!(matches!(err, RegionFillError::Validation(_)));
}

#[tokio::test]
async fn upload_for_unknown_region_is_rejected() {
    let shell = Shell::new(transport(), MemoryStorage::new()).with_use_index(false);
    assert!(shell.open_country("jpn").await);

    let err = shell
        .upload_image(&resolve("Aomori"), "Aomori", ImageRef::parse("a.jpg"))
        .unwrap_err();
    assert!(matches!(err, RegionFillError::Validation(_)));
    assert!(shell.uploads().countries_with_uploads().is_empty());

    shell
        .upload_image(&resolve("JP-02"), "Aomori", ImageRef::parse("a.jpg"))
        .unwrap();
    assert_eq!(filled_ids(&shell.state()), vec!["jp-02"]);
}

#[tokio::test]
async fn upload_while_loading_shows_on_first_render() {
    let t = transport().with_body("/images/pref/index.json", r#"["jp-01"]"#);
    t.gate("/images/pref/index.json");
    let shell = Shell::new(t, MemoryStorage::new());

    let (shown, uploaded) = futures::join!(shell.open_country("jpn"), async {
        let uploaded = shell.upload_image(&resolve("jp-03"), "Iwate", ImageRef::parse("iwate.jpg"));
        shell.transport().open_gate("/images/pref/index.json");
        uploaded
    });

    assert!(shown);
    uploaded.unwrap();
    assert_eq!(filled_ids(&shell.state()), vec!["jp-01", "jp-03"]);
}
