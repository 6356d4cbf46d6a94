use super::*;

#[test]
fn canvas_rejects_zero_area() {
    assert!(Canvas::new(0, 10).is_err());
    assert!(Canvas::new(10, 0).is_err());
    assert_eq!(Canvas::new(1080, 1920).unwrap().area(), 1080 * 1920);
}

#[test]
fn from_dynamic_records_color_model() {
    let gray = DynamicImage::ImageLuma8(image::GrayImage::new(2, 2));
    assert_eq!(Bitmap::from_dynamic(gray).color_model(), ColorModel::Gray);

    let rgb = DynamicImage::ImageRgb8(image::RgbImage::new(2, 2));
    let bmp = Bitmap::from_dynamic(rgb);
    assert_eq!(bmp.color_model(), ColorModel::Rgb);
    assert_eq!(bmp.pixel(0, 0), [0, 0, 0, 255]);
}

#[test]
fn map_pixels_leaves_source_untouched() {
    let src = Bitmap::solid(2, 1, [10, 20, 30, 255]);
    let out = src.map_pixels(ColorModel::Rgb, |[r, g, b, a]| [255 - r, 255 - g, 255 - b, a]);
    assert_eq!(src.pixel(0, 0), [10, 20, 30, 255]);
    assert_eq!(out.pixel(1, 0), [245, 235, 225, 255]);
}

#[test]
fn ensure_non_empty_is_an_extraction_error() {
    let err = Bitmap::transparent(0, 5).ensure_non_empty("route").unwrap_err();
    assert!(matches!(err, OverlayError::Extraction(_)));
}
