use super::*;

fn opaque(width: u32, height: u32) -> Bitmap {
    Bitmap::solid(width, height, [200, 100, 50, 255])
}

#[test]
fn contain_pads_with_transparency() {
    let out = fit(&opaque(100, 50), 100, 100, FitPolicy::Contain, FilterType::Nearest).unwrap();
    assert_eq!(out.dimensions(), (100, 100));
    assert_eq!(out.pixel(50, 0)[3], 0);
    assert_eq!(out.pixel(50, 99)[3], 0);
    assert_eq!(out.pixel(50, 50), [200, 100, 50, 255]);
    // 100x50 centered vertically: rows 25..75 are content
    assert_eq!(out.pixel(0, 25)[3], 255);
    assert_eq!(out.pixel(0, 24)[3], 0);
    assert_eq!(out.pixel(0, 74)[3], 255);
    assert_eq!(out.pixel(0, 75)[3], 0);
}

#[test]
fn cover_fills_the_frame() {
    let out = fit(&opaque(100, 50), 60, 60, FitPolicy::Cover, FilterType::Triangle).unwrap();
    assert_eq!(out.dimensions(), (60, 60));
    assert!(out.pixels().pixels().all(|p| p.0[3] == 255));
}

#[test]
fn cover_crops_around_center() {
    let src = Bitmap::from_rgba(image::RgbaImage::from_fn(30, 10, |x, _| {
        if (10..20).contains(&x) {
            image::Rgba([255, 255, 255, 255])
        } else {
            image::Rgba([0, 0, 0, 255])
        }
    }));
    let out = fit(&src, 10, 10, FitPolicy::Cover, FilterType::Nearest).unwrap();
    assert!(out.pixels().pixels().all(|p| p.0 == [255, 255, 255, 255]));
}

#[test]
fn fill_stretches() {
    let out = fit(&opaque(10, 10), 40, 5, FitPolicy::Fill, FilterType::Nearest).unwrap();
    assert_eq!(out.dimensions(), (40, 5));
    assert!(out.pixels().pixels().all(|p| p.0 == [200, 100, 50, 255]));
}

#[test]
fn same_size_is_passthrough() {
    let src = opaque(7, 9);
    let out = fit(&src, 7, 9, FitPolicy::Cover, FilterType::Lanczos3).unwrap();
    assert_eq!(out, src);
}

#[test]
fn zero_target_is_a_composite_error() {
    let err = fit(&opaque(4, 4), 0, 4, FitPolicy::Fill, FilterType::Nearest).unwrap_err();
    assert!(matches!(err, OverlayError::Composite(_)));
}

#[test]
fn crop_bottom_fraction() {
    let src = Bitmap::from_rgba(image::RgbaImage::from_fn(10, 100, |_, y| {
        image::Rgba([y as u8, 0, 0, 255])
    }));
    let out = crop(&src, CropRegion::bottom(0.15)).unwrap();
    assert_eq!(out.dimensions(), (10, 15));
    assert_eq!(out.pixel(0, 0)[0], 85);
}

#[test]
fn degenerate_crop_is_an_extraction_error() {
    let region = CropRegion {
        x: 0.5,
        y: 0.0,
        width: 0.0,
        height: 1.0,
    };
    let err = crop(&opaque(10, 10), region).unwrap_err();
    assert!(matches!(err, OverlayError::Extraction(_)));
}
