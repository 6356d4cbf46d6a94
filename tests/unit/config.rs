use super::*;

#[test]
fn defaults_validate() {
    let cfg = OverlayConfig::default();
    cfg.validate().unwrap();
    assert_eq!((cfg.canvas_width, cfg.canvas_height), (1080, 1920));
    assert_eq!(cfg.route_threshold, 200);
    assert_eq!(cfg.stats_threshold, 225);
    assert_eq!(cfg.background_encode_quality, Some(80));
    Preset::Blue.config().validate().unwrap();
}

#[test]
fn partial_json_keeps_base_values() {
    let base = Preset::Blue.config();
    let cfg = OverlayConfig::from_json_with_base(r#"{"statsThreshold": 200}"#, &base).unwrap();
    assert_eq!(cfg.stats_threshold, 200);
    assert_eq!(cfg.route_threshold, base.route_threshold);
    assert_eq!(cfg.route_color_matrix, base.route_color_matrix);
}

#[test]
fn empty_object_round_trips_the_base() {
    let base = OverlayConfig::default();
    let cfg = OverlayConfig::from_json_with_base("{}", &base).unwrap();
    assert_eq!(cfg, base);
}

#[test]
fn unknown_keys_are_rejected() {
    let err =
        OverlayConfig::from_json_with_base(r#"{"routeTreshold": 10}"#, &OverlayConfig::default())
            .unwrap_err();
    assert!(matches!(err, OverlayError::Config(_)), "{err}");
}

#[test]
fn non_object_json_is_rejected() {
    let err = OverlayConfig::from_json_with_base("[1, 2]", &OverlayConfig::default()).unwrap_err();
    assert!(matches!(err, OverlayError::Config(_)));
}

#[test]
fn out_of_range_values_fail_validation() {
    let base = OverlayConfig::default();
    for json in [
        r#"{"routeOpacity": 1.5}"#,
        r#"{"statsOpacity": -0.1}"#,
        r#"{"backgroundEncodeQuality": 0}"#,
        r#"{"canvasWidth": 0}"#,
        r#"{"routeContrastGain": 0.0}"#,
        r#"{"statsRegion": {"width": 0.0, "height": 0.1}}"#,
        r#"{"processingTimeoutMs": 0}"#,
    ] {
        let err = OverlayConfig::from_json_with_base(json, &base).unwrap_err();
        assert!(matches!(err, OverlayError::Config(_)), "{json}: {err}");
    }
}

#[test]
fn placement_shapes_parse() {
    let base = OverlayConfig::default();
    let cfg = OverlayConfig::from_json_with_base(
        r#"{
            "routePlacement": {"anchor": "south"},
            "statsPlacement": {"offset": {"left": 108, "top": 1632}}
        }"#,
        &base,
    )
    .unwrap();
    assert_eq!(cfg.route_placement, Placement::Anchor(Anchor::South));
    assert_eq!(
        cfg.stats_placement,
        Placement::Offset {
            left: 108,
            top: 1632
        }
    );

    let cfg = OverlayConfig::from_json_with_base(
        r#"{"statsPlacement": {"relative": {"left": 0.25, "top": 0.5}}}"#,
        &base,
    )
    .unwrap();
    assert_eq!(
        cfg.stats_placement,
        Placement::Relative {
            left: 0.25,
            top: 0.5
        }
    );
}

#[test]
fn null_quality_disables_the_jpeg_round_trip() {
    let cfg = OverlayConfig::from_json_with_base(
        r#"{"backgroundEncodeQuality": null, "statsCropRegion": {"x": 0.0, "y": 0.7, "width": 1.0, "height": 0.3}}"#,
        &OverlayConfig::default(),
    )
    .unwrap();
    assert_eq!(cfg.background_encode_quality, None);
    assert_eq!(
        cfg.stats_crop_region,
        Some(CropRegion {
            x: 0.0,
            y: 0.7,
            width: 1.0,
            height: 0.3
        })
    );
}

#[test]
fn canvas_follows_policy() {
    let mut cfg = OverlayConfig::default();
    assert_eq!(
        cfg.canvas_for((4000, 3000)).unwrap(),
        Canvas::new(1080, 1920).unwrap()
    );
    cfg.canvas_policy = CanvasPolicy::Background;
    assert_eq!(
        cfg.canvas_for((4000, 3000)).unwrap(),
        Canvas::new(4000, 3000).unwrap()
    );
}

#[test]
fn stats_region_resolves_on_the_default_canvas() {
    let cfg = OverlayConfig::default();
    let canvas = Canvas::new(1080, 1920).unwrap();
    assert_eq!(cfg.stats_region.resolve(canvas), (864, 192));
    let tiny = RegionSize {
        width: 0.01,
        height: 0.01,
    };
    assert_eq!(tiny.resolve(Canvas::new(10, 10).unwrap()), (1, 1));
}

#[test]
fn load_reports_the_path() {
    let err = OverlayConfig::load(Path::new("/nonexistent/overlay.json"), &OverlayConfig::default())
        .unwrap_err();
    assert!(format!("{err:#}").contains("/nonexistent/overlay.json"));
}

#[test]
fn filter_names_map_to_image_filters() {
    assert_eq!(ResizeFilter::Triangle.filter_type(), FilterType::Triangle);
    let f: ResizeFilter = serde_json::from_str(r#""catmullRom""#).unwrap();
    assert_eq!(f, ResizeFilter::CatmullRom);
}

#[test]
fn mask_polarity_defaults_to_keeping_bright_pixels() {
    for cfg in [Preset::Warm.config(), Preset::Blue.config()] {
        assert!(!cfg.route_invert);
        assert!(!cfg.stats_invert);
    }
    let cfg = OverlayConfig::from_json_with_base(
        r#"{"routeInvert": true, "statsInvert": true}"#,
        &OverlayConfig::default(),
    )
    .unwrap();
    assert!(cfg.route_invert && cfg.stats_invert);
}
