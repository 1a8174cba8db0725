use std::io::Cursor;

use crate::{
    identity::slug::resolve,
    inject::{
        apply::apply,
        bindings::{ImageBindings, ImageRef},
        options::{FillOptions, FillStrategy},
    },
};

use super::*;

fn red_png() -> Vec<u8> {
    let img = image::RgbaImage::from_pixel(4, 4, image::Rgba([255, 0, 0, 255]));
    let mut buf = Vec::new();
    img.write_to(&mut Cursor::new(&mut buf), image::ImageFormat::Png)
        .unwrap();
    buf
}

fn doc() -> RegionDocument {
    RegionDocument::parse(
        r#"<svg viewBox="0 0 20 10"><rect data-code="a" width="10" height="10"/><rect data-code="b" x="10" width="10" height="10"/></svg>"#,
        "t.svg",
    )
    .unwrap()
}

#[test]
fn renders_fallback_fill_at_scale() {
    let mut d = doc();
    let opts = FillOptions {
        fallback_fill: "#0000ff".to_string(),
        image_stroke: None,
        ..FillOptions::default()
    };
    apply(&mut d, &ImageBindings::new(), &opts);

    let img = render_png(&d, 2.0).unwrap();
    assert_eq!((img.width, img.height), (40, 20));
    assert_eq!(img.data.len(), 40 * 20 * 4);
    assert_eq!(img.pixel(10, 10), Some([0, 0, 255, 255]));
    assert_eq!(img.pixel(30, 10), Some([0, 0, 255, 255]));
    assert_eq!(img.pixel(40, 0), None);
}

#[test]
fn renders_clipped_inline_image() {
    let mut d = doc();
    let opts = FillOptions {
        fallback_fill: "#0000ff".to_string(),
        image_stroke: None,
        ..FillOptions::with_strategy(FillStrategy::Clip)
    };
    let bindings: ImageBindings = [(resolve("a"), ImageRef::inline("image/png", red_png()))]
        .into_iter()
        .collect();
    apply(&mut d, &bindings, &opts);

    let img = render_png(&d, 1.0).unwrap();
    assert_eq!(img.pixel(5, 5), Some([255, 0, 0, 255]));
    assert_eq!(img.pixel(15, 5), Some([0, 0, 255, 255]));
}

#[test]
fn rejects_bad_scale_and_huge_output() {
    let d = doc();
    assert!(matches!(render_png(&d, 0.0), Err(RegionFillError::Validation(_))));
    assert!(matches!(render_png(&d, f32::NAN), Err(RegionFillError::Validation(_))));
    assert!(render_png(&d, 10_000.0).is_err());
}

#[test]
fn save_png_writes_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("out").join("map.png");
    let img = RasterImage {
        width: 1,
        height: 1,
        data: vec![1, 2, 3, 255],
    };
    img.save_png(&path).unwrap();
    let back = image::open(&path).unwrap().to_rgba8();
    assert_eq!(back.get_pixel(0, 0).0, [1, 2, 3, 255]);
}

#[test]
fn images_follow_transformed_region_groups() {
    for strategy in [FillStrategy::Pattern, FillStrategy::Clip, FillStrategy::Mask] {
        let mut d = RegionDocument::parse(
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 40"><g id="regions" transform="translate(50,0)"><rect id="adm1-A-1" width="40" height="40"/></g></svg>"#,
            "t.svg",
        )
        .unwrap();
        let opts = FillOptions {
            image_stroke: None,
            mask_fade: false,
            ..FillOptions::with_strategy(strategy)
        };
        let bindings: ImageBindings = [(resolve("a-1"), ImageRef::inline("image/png", red_png()))]
            .into_iter()
            .collect();
        apply(&mut d, &bindings, &opts);

        let img = render_png(&d, 1.0).unwrap();
        assert_eq!(img.pixel(70, 20), Some([255, 0, 0, 255]), "{strategy} inside region");
        assert_eq!(img.pixel(20, 20).map(|p| p[3]), Some(0), "{strategy} outside region");
    }
}

#[test]
fn images_follow_scaled_region_groups() {
    let mut d = RegionDocument::parse(
        r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 100 40"><g transform="translate(100,0) scale(0.5)"><g id="regions"><rect id="adm1-A-1" x="-100" width="80" height="80"/></g></g></svg>"#,
        "t.svg",
    )
    .unwrap();
    let opts = FillOptions {
        image_stroke: None,
        ..FillOptions::with_strategy(FillStrategy::Clip)
    };
    let bindings: ImageBindings = [(resolve("a-1"), ImageRef::inline("image/png", red_png()))]
        .into_iter()
        .collect();
    apply(&mut d, &bindings, &opts);

    let img = render_png(&d, 1.0).unwrap();
    assert_eq!(img.pixel(70, 20), Some([255, 0, 0, 255]));
    assert_eq!(img.pixel(20, 20).map(|p| p[3]), Some(0));
}
