use super::*;

#[test]
fn viewbox_parse_accepts_commas_and_spaces() {
    let vb = ViewBox::parse("0 0 900 850").unwrap();
    assert_eq!(vb.width, 900.0);
    assert_eq!(vb.height, 850.0);

    let vb = ViewBox::parse(" -10,5, 20 , 30 ").unwrap();
    assert_eq!(vb.min_x, -10.0);
    assert_eq!(vb.min_y, 5.0);
}

#[test]
fn viewbox_parse_rejects_degenerate() {
    assert!(ViewBox::parse("0 0 0 100").is_none());
    assert!(ViewBox::parse("0 0 100").is_none());
    assert!(ViewBox::parse("0 0 -1 5").is_none());
    assert!(ViewBox::parse("a b c d").is_none());
    assert!(ViewBox::new(0.0, 0.0, f64::NAN, 1.0).is_err());
}

#[test]
fn viewbox_rect_and_attr() {
    let vb = ViewBox::new(10.0, 20.0, 100.0, 50.5).unwrap();
    assert_eq!(vb.to_rect(), Rect::new(10.0, 20.0, 110.0, 70.5));
    assert_eq!(vb.to_attr(), "10 20 100 50.5");
}

#[test]
fn parse_length_units() {
    assert_eq!(parse_length("900"), Some(900.0));
    assert_eq!(parse_length("720px"), Some(720.0));
    assert_eq!(parse_length("100%"), None);
    assert_eq!(parse_length(""), None);
}

#[test]
fn fmt_num_trims() {
    assert_eq!(fmt_num(900.0), "900");
    assert_eq!(fmt_num(1.25), "1.25");
    assert_eq!(fmt_num(1.0 / 3.0), "0.333");
    assert_eq!(fmt_num(-0.0001), "0");
}
