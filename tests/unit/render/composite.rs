use super::*;

fn layer(bitmap: Bitmap, blend: BlendMode, opacity: f32, left: i64, top: i64) -> Layer {
    Layer {
        bitmap,
        blend,
        opacity,
        placement: Placement::Offset { left, top },
    }
}

#[test]
fn blend_opacity_0_is_noop() {
    let dst = [1, 2, 3, 4];
    let src = [200, 200, 200, 200];
    assert_eq!(blend_px(dst, src, BlendMode::Screen, 0.0), dst);
}

#[test]
fn blend_src_alpha_0_is_noop() {
    let dst = [10, 20, 30, 40];
    let src = [255, 255, 255, 0];
    assert_eq!(blend_px(dst, src, BlendMode::Screen, 1.0), dst);
}

#[test]
fn normal_opaque_replaces_dst() {
    let dst = [0, 0, 0, 255];
    let src = [255, 0, 0, 255];
    assert_eq!(blend_px(dst, src, BlendMode::Normal, 1.0), src);
}

#[test]
fn transparent_dst_takes_src_color() {
    let dst = [0, 0, 0, 0];
    let src = [100, 110, 120, 200];
    assert_eq!(blend_px(dst, src, BlendMode::Screen, 1.0), src);
}

#[test]
fn screen_matches_its_formula() {
    let dst = [128, 0, 255, 255];
    let src = [128, 128, 128, 255];
    // 1 - (1 - b)(1 - o), per channel
    assert_eq!(blend_px(dst, src, BlendMode::Screen, 1.0), [192, 128, 255, 255]);
}

#[test]
fn screen_with_black_leaves_base() {
    let dst = [37, 99, 201, 255];
    assert_eq!(blend_px(dst, [0, 0, 0, 255], BlendMode::Screen, 0.9), dst);
}

#[test]
fn screen_white_at_partial_opacity_lerps() {
    let out = blend_px([0, 0, 0, 255], [255, 255, 255, 255], BlendMode::Screen, 0.5);
    assert_eq!(out, [128, 128, 128, 255]);
}

#[test]
fn multiply_and_add() {
    let dst = [200, 100, 0, 255];
    let src = [128, 200, 50, 255];
    assert_eq!(blend_px(dst, src, BlendMode::Multiply, 1.0), [100, 78, 0, 255]);
    assert_eq!(blend_px(dst, src, BlendMode::Add, 1.0), [255, 255, 50, 255]);
}

#[test]
fn anchors_resolve_like_gravity() {
    let canvas = Canvas::new(100, 100).unwrap();
    let at = |a| Placement::Anchor(a).resolve(canvas, (20, 10)).unwrap();
    assert_eq!(at(Anchor::Center), (40, 45));
    assert_eq!(at(Anchor::South), (40, 90));
    assert_eq!(at(Anchor::NorthEast), (80, 0));
    assert_eq!(at(Anchor::SouthWest), (0, 90));
    assert_eq!(at(Anchor::West), (0, 45));
}

#[test]
fn relative_placement_floors() {
    let canvas = Canvas::new(1080, 1920).unwrap();
    let p = Placement::Relative {
        left: 0.1,
        top: 0.85,
    };
    assert_eq!(p.resolve(canvas, (864, 192)).unwrap(), (108, 1632));
}

#[test]
fn placement_validation_rejects_out_of_range_fractions() {
    let p = Placement::Relative {
        left: 1.5,
        top: 0.0,
    };
    assert!(matches!(p.validate("p"), Err(OverlayError::Config(_))));
    assert!(Placement::Offset { left: -5, top: 9000 }.validate("p").is_ok());
}

#[test]
fn layer_past_the_edge_is_clipped() {
    let base = Bitmap::solid(10, 10, [0, 0, 0, 255]);
    let white = Bitmap::solid(4, 4, [255, 255, 255, 255]);
    let out = composite_layers(&base, &[layer(white, BlendMode::Normal, 1.0, 8, 8)]).unwrap();
    assert_eq!(out.dimensions(), (10, 10));
    assert_eq!(out.pixel(9, 9), [255, 255, 255, 255]);
    assert_eq!(out.pixel(8, 8), [255, 255, 255, 255]);
    assert_eq!(out.pixel(7, 9), [0, 0, 0, 255]);
}

#[test]
fn layer_outside_the_canvas_is_a_noop() {
    let base = Bitmap::solid(10, 10, [9, 9, 9, 255]);
    let white = Bitmap::solid(4, 4, [255, 255, 255, 255]);
    let out = composite_layers(&base, &[layer(white, BlendMode::Normal, 1.0, -20, 3)]).unwrap();
    assert_eq!(out, base);
}

#[test]
fn zero_size_layer_is_a_composite_error() {
    let base = Bitmap::solid(10, 10, [0, 0, 0, 255]);
    let err = composite_layers(
        &base,
        &[layer(Bitmap::transparent(0, 3), BlendMode::Screen, 1.0, 0, 0)],
    )
    .unwrap_err();
    assert!(matches!(err, OverlayError::Composite(_)));
}

#[test]
fn overflowing_offset_is_a_composite_error() {
    let base = Bitmap::solid(10, 10, [0, 0, 0, 255]);
    let white = Bitmap::solid(4, 4, [255, 255, 255, 255]);
    let err = composite_layers(&base, &[layer(white, BlendMode::Screen, 1.0, i64::MAX, 0)])
        .unwrap_err();
    assert!(matches!(err, OverlayError::Composite(_)));
}

#[test]
fn swapping_non_commutative_layers_changes_only_the_overlap() {
    let base = Bitmap::solid(10, 1, [128, 128, 128, 255]);
    let red = layer(
        Bitmap::solid(6, 1, [255, 0, 0, 255]),
        BlendMode::Normal,
        0.5,
        0,
        0,
    );
    let blue = layer(
        Bitmap::solid(6, 1, [0, 0, 255, 255]),
        BlendMode::Normal,
        0.5,
        4,
        0,
    );

    let ab = composite_layers(&base, &[red.clone(), blue.clone()]).unwrap();
    let ba = composite_layers(&base, &[blue, red]).unwrap();

    for x in 0..10 {
        let overlap = (4..6).contains(&x);
        if overlap {
            assert_ne!(ab.pixel(x, 0), ba.pixel(x, 0), "x={x}");
        } else {
            assert_eq!(ab.pixel(x, 0), ba.pixel(x, 0), "x={x}");
        }
    }
}

#[test]
fn screen_layers_commute_on_an_opaque_base() {
    let base = Bitmap::solid(4, 1, [40, 80, 120, 255]);
    let a = layer(
        Bitmap::solid(4, 1, [200, 10, 90, 255]),
        BlendMode::Screen,
        0.4,
        0,
        0,
    );
    let b = layer(
        Bitmap::solid(4, 1, [30, 220, 60, 255]),
        BlendMode::Screen,
        0.7,
        0,
        0,
    );
    let ab = composite_layers(&base, &[a.clone(), b.clone()]).unwrap();
    let ba = composite_layers(&base, &[b, a]).unwrap();
    for (p, q) in ab.pixel(0, 0).iter().zip(ba.pixel(0, 0).iter()) {
        assert!(p.abs_diff(*q) <= 1);
    }
}
