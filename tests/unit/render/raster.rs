use super::*;

const SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" width="20" height="10" viewBox="0 0 20 10">
  <rect width="100%" height="100%" fill="#ffffff"/>
  <rect x="0" y="0" width="10" height="10" fill="#ff0000"/>
</svg>"##;

#[test]
fn rasterizes_fills_at_intrinsic_size() {
    let frame = rasterize(SVG, 1.0).unwrap();
    assert_eq!((frame.width, frame.height), (20, 10));
    assert_eq!(frame.data.len(), 20 * 10 * 4);
    assert_eq!(frame.pixel(5, 5), Some([255, 0, 0, 255]));
    assert_eq!(frame.pixel(15, 5), Some([255, 255, 255, 255]));
    assert_eq!(frame.pixel(20, 0), None);
}

#[test]
fn scale_multiplies_the_raster_size() {
    let frame = rasterize(SVG, 2.0).unwrap();
    assert_eq!((frame.width, frame.height), (40, 20));
    assert_eq!(frame.pixel(30, 10), Some([255, 255, 255, 255]));
}

#[test]
fn bad_input_is_a_render_error() {
    assert!(matches!(
        rasterize("not svg", 1.0),
        Err(WaterfallError::Render(_))
    ));
    assert!(rasterize(SVG, 0.0).is_err());
}
