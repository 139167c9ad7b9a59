//! End-to-end conversions through the public API.

use glam::dvec2;
use serde_json::{Value, json};
use uvtt_convert::{
    ConvertError, ConvertOptions, GridPoint, ScenePredicate, Strategy, Warning, convert_str,
};

const TOLERANCE: f64 = 1e-9;

/// Route library logs through the test harness; set RUST_LOG to see them.
fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// Wrap a scene in a two-line container with an unrelated record first.
fn container(scene: Value) -> String {
    format!(
        "{}\n{}\n",
        json!({ "_id": "actor01", "name": "Goblin", "type": "npc" }),
        scene
    )
}

fn base_scene(walls: Value) -> Value {
    json!({
        "name": "Test Hall",
        "width": 1400,
        "height": 1000,
        "grid": { "size": 100 },
        "padding": 0,
        "walls": walls,
    })
}

fn assert_close(actual: GridPoint, expected: (f64, f64)) {
    assert!(
        (actual.x - expected.0).abs() < TOLERANCE && (actual.y - expected.1).abs() < TOLERANCE,
        "expected {expected:?}, got {actual:?}"
    );
}

#[test]
fn single_wall_becomes_one_segment() {
    init_logging();
    let text = container(base_scene(json!([{ "c": [0, 0, 1400, 0] }])));
    let conv = convert_str(&text, &ConvertOptions::default()).unwrap();

    insta::assert_snapshot!(conv.document.to_json_pretty().unwrap(), @r#"
    {
      "format": 1.0,
      "resolution": {
        "map_origin": {
          "x": 0.0,
          "y": 0.0
        },
        "map_size": {
          "x": 14.0,
          "y": 10.0
        },
        "pixels_per_grid": 100.0
      },
      "image": "",
      "line_of_sight": [
        [
          {
            "x": 0.0,
            "y": 0.0
          },
          {
            "x": 14.0,
            "y": 0.0
          }
        ]
      ],
      "portals": []
    }
    "#);
}

#[test]
fn summary_reports_every_offset_component() {
    let text = container(base_scene(json!([{ "c": [0, 0, 1400, 0] }])));
    let conv = convert_str(&text, &ConvertOptions::default()).unwrap();
    let mut summary = conv.summary.clone();
    summary.scene_name = None;

    insta::assert_snapshot!(summary.to_string().trim_end(), @r"
    strategy          : declared-offset
    scene             : line 2
    canvas            : 1400 x 1000 px
    pixels per grid   : 100
    padding offset    : (0, 0) px
    background shift  : (0, 0) px
    grid shift        : (0, 0) px
    total offset      : (0, 0) px (padding + background + grid)
    furthest vertex   : (14, 0) grid
    map size          : 14 x 10 grid
    line of sight     : 1
    portals           : 0
    skipped walls     : 0
    ");
}

#[test]
fn closed_door_becomes_a_portal() {
    let text = container(base_scene(json!([{ "c": [0, 0, 1400, 0], "door": 1, "ds": 0 }])));
    let doc = convert_str(&text, &ConvertOptions::default())
        .unwrap()
        .document;

    assert!(doc.line_of_sight.is_empty());
    assert_eq!(doc.portals.len(), 1);
    let portal = &doc.portals[0];
    assert_eq!(portal.position, GridPoint { x: 7.0, y: 0.0 });
    assert_eq!(
        portal.bounds,
        [GridPoint { x: 0.0, y: 0.0 }, GridPoint { x: 14.0, y: 0.0 }]
    );
    assert!(portal.closed);
    assert!(!portal.freestanding);
}

#[test]
fn door_state_defaults_to_closed() {
    let text = container(base_scene(json!([
        { "c": [0, 0, 100, 0], "door": 1 },
        { "c": [0, 0, 100, 0], "door": 1, "ds": 1 },
        { "c": [0, 0, 100, 0], "door": 1, "ds": 2 },
        { "c": [0, 0, 100, 0], "door": 0, "ds": 1 },
        { "c": [0, 0, 100, 0], "door": 2 },
    ])));
    let doc = convert_str(&text, &ConvertOptions::default())
        .unwrap()
        .document;

    let closed: Vec<bool> = doc.portals.iter().map(|p| p.closed).collect();
    assert_eq!(closed, vec![true, false, false]);
    assert_eq!(doc.line_of_sight.len(), 2);
}

#[test]
fn segments_follow_source_order() {
    let walls = json!([
        { "c": [0, 0, 100, 0] },
        { "c": [100, 0, 100, 100], "door": 1 },
        { "c": [100, 100, 0, 100] },
        { "c": [0, 100, 0, 0] },
    ]);
    let text = container(base_scene(walls));
    let doc = convert_str(&text, &ConvertOptions::default())
        .unwrap()
        .document;

    let starts: Vec<GridPoint> = doc.line_of_sight.iter().map(|s| s[0]).collect();
    assert_eq!(
        starts,
        vec![
            GridPoint { x: 0.0, y: 0.0 },
            GridPoint { x: 1.0, y: 1.0 },
            GridPoint { x: 0.0, y: 1.0 },
        ]
    );
}

#[test]
fn malformed_wall_is_skipped_and_counted() {
    init_logging();
    let text = container(base_scene(json!([
        { "c": [0, 0, 1400, 0] },
        { "_id": "short", "c": [1, 2, 3] },
        { "c": [0, 0, 0, 1000] },
        "not a wall",
    ])));
    let conv = convert_str(&text, &ConvertOptions::default()).unwrap();

    assert_eq!(conv.document.line_of_sight.len(), 2);
    assert_eq!(conv.summary.line_of_sight, 2);
    assert_eq!(conv.summary.skipped, 2);
    assert!(conv.summary.warnings.contains(&Warning::MalformedWall {
        index: 1,
        id: Some("short".into()),
        reason: "expected 4 coordinates, found 3".into(),
    }));
}

#[test]
fn non_finite_wall_is_dropped_and_counted() {
    let text = container(base_scene(json!([
        { "c": [0, 0, 1400, 0] },
        { "_id": "nan", "c": ["NaN", 0, 1, 1] },
        { "c": [0, 0, 0, 1000], "door": 1 },
    ])));
    let conv = convert_str(&text, &ConvertOptions::default()).unwrap();

    assert_eq!(conv.summary.line_of_sight, 1);
    assert_eq!(conv.summary.portals, 1);
    assert_eq!(conv.summary.skipped, 1);
    assert_eq!(
        conv.summary.warnings,
        vec![Warning::NonFiniteWall {
            index: 1,
            id: Some("nan".into()),
        }]
    );
}

#[test]
fn overflowing_coordinate_drops_only_its_wall() {
    let text = concat!(
        r#"{"_id":"actor01","name":"Goblin"}"#,
        "\n",
        r#"{"width":1400,"height":1000,"grid":{"size":100},"walls":[{"c":[0,0,1400,0]},{"c":[1e999,0,10,0]}]}"#,
        "\n",
    );
    let conv = convert_str(text, &ConvertOptions::default()).unwrap();

    assert_eq!(conv.summary.scene_line, Some(2));
    assert_eq!(conv.document.line_of_sight.len(), 1);
    assert_close(conv.document.line_of_sight[0][1], (14.0, 0.0));
    assert_eq!(conv.summary.skipped, 1);
    assert!(matches!(
        conv.summary.warnings.as_slice(),
        [Warning::NonFiniteWall { index: 1, .. }]
    ));
    assert_eq!(conv.document.resolution.map_size, GridPoint { x: 14.0, y: 10.0 });
}

#[test]
fn zero_cell_size_is_fatal() {
    let mut scene = base_scene(json!([{ "c": [0, 0, 1, 1] }]));
    scene["grid"] = json!({ "size": 0 });
    let err = convert_str(&container(scene), &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidGridConfiguration { .. }));
}

#[test]
fn invalid_dimensions_abort() {
    let mut scene = base_scene(json!([]));
    scene["width"] = json!(0);
    let err = convert_str(&container(scene), &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::InvalidScene { .. }));
    assert_eq!(err.to_string(), "invalid scene: `width` must be greater than zero");
}

#[test]
fn container_without_scene_aborts() {
    let text = "{\"name\":\"journal\"}\n{broken\n\n";
    let err = convert_str(text, &ConvertOptions::default()).unwrap_err();
    assert!(matches!(err, ConvertError::NoSceneFound { .. }));
}

#[test]
fn strict_predicate_skips_partial_records() {
    let partial = json!({ "walls": [{ "c": [0, 0, 1, 1] }] });
    let full = json!({
        "width": 700,
        "height": 700,
        "grid": { "size": 70 },
        "background": { "src": "maps/keep.webp" },
        "walls": [],
    });
    let text = format!("{partial}\n{full}\n");

    let loose = ConvertOptions::default();
    assert!(matches!(
        convert_str(&text, &loose),
        Err(ConvertError::InvalidScene { .. })
    ));

    let strict = ConvertOptions::default().with_scene_predicate(ScenePredicate::Strict);
    let conv = convert_str(&text, &strict).unwrap();
    assert_eq!(conv.summary.scene_line, Some(2));
    assert_eq!(conv.document.image, "maps/keep.webp");
}

#[test]
fn degenerate_padding_resolves_to_zero() {
    let mut scene = base_scene(json!([{ "c": [0, 0, 1400, 0] }]));
    scene["padding"] = json!(0.5);
    let conv = convert_str(&container(scene), &ConvertOptions::default()).unwrap();

    let offsets = conv.summary.offsets.unwrap();
    assert_eq!(offsets.padding, dvec2(0.0, 0.0));
    assert_eq!(conv.summary.warnings, vec![Warning::DegeneratePadding { value: 0.5 }]);
    assert_eq!(conv.document.resolution.map_size, GridPoint { x: 14.0, y: 10.0 });
    assert_close(conv.document.line_of_sight[0][1], (14.0, 0.0));
}

#[test]
fn each_offset_term_matches_the_naive_formula() {
    let wall = json!([{ "c": [700, 500, 900, 500] }]);
    let convert = |scene: Value| {
        convert_str(&container(scene), &ConvertOptions::default())
            .unwrap()
            .document
            .line_of_sight[0][0]
    };

    let mut padded = base_scene(wall.clone());
    padded["padding"] = json!(0.25);
    assert_close(convert(padded), ((700.0 - 350.0) / 100.0, (500.0 - 250.0) / 100.0));

    let mut shifted_bg = base_scene(wall.clone());
    shifted_bg["background"] = json!({ "src": "bg.png", "x": 760, "y": 470 });
    assert_close(convert(shifted_bg), ((700.0 - 60.0) / 100.0, (500.0 + 30.0) / 100.0));

    let mut shifted_grid = base_scene(wall);
    shifted_grid["grid"] = json!({ "size": 100, "shiftX": 25, "shiftY": -40 });
    assert_close(convert(shifted_grid), ((700.0 - 25.0) / 100.0, (500.0 + 40.0) / 100.0));
}

#[test]
fn combined_offsets_are_summed_before_scaling() {
    let scene = json!({
        "width": 2000,
        "height": 1000,
        "grid": { "size": 50, "shiftX": 10, "shiftY": 5 },
        "padding": 0.1,
        "background": { "src": "bg.png", "x": 1100, "y": 450 },
        "walls": [{ "c": [400, 200, 800, 200] }],
    });
    let conv = convert_str(&container(scene), &ConvertOptions::default()).unwrap();

    let offsets = conv.summary.offsets.unwrap();
    assert_eq!(offsets.total, dvec2(200.0 + 100.0 + 10.0, 100.0 - 50.0 + 5.0));
    let seg = conv.document.line_of_sight[0];
    assert_close(seg[0], ((400.0 - 310.0) / 50.0, (200.0 - 55.0) / 50.0));
    assert_close(seg[1], ((800.0 - 310.0) / 50.0, (200.0 - 55.0) / 50.0));
}

#[test]
fn output_is_invariant_under_uniform_scaling() {
    let scene = |k: f64| {
        json!({
            "width": 1400.0 * k,
            "height": 1000.0 * k,
            "grid": { "size": 100.0 * k },
            "padding": 0.2,
            "walls": [
                { "c": [310.0 * k, 220.0 * k, 1180.0 * k, 220.0 * k] },
                { "c": [450.0 * k, 90.0 * k, 450.0 * k, 870.0 * k], "door": 1, "ds": 1 },
            ],
        })
    };
    let base = convert_str(&container(scene(1.0)), &ConvertOptions::default())
        .unwrap()
        .document;

    for k in [0.5, 2.0, 3.7] {
        let scaled = convert_str(&container(scene(k)), &ConvertOptions::default())
            .unwrap()
            .document;
        for (a, b) in base.line_of_sight.iter().zip(&scaled.line_of_sight) {
            assert_close(b[0], (a[0].x, a[0].y));
            assert_close(b[1], (a[1].x, a[1].y));
        }
        let (pos, size) = (base.portals[0].position, base.resolution.map_size);
        assert_close(scaled.portals[0].position, (pos.x, pos.y));
        assert_close(scaled.resolution.map_size, (size.x, size.y));
    }
}

#[test]
fn map_size_expands_to_cover_overrunning_walls() {
    let scene = base_scene(json!([{ "c": [0, 0, 1550, 1020] }]));
    let text = container(scene);

    let conv = convert_str(&text, &ConvertOptions::default()).unwrap();
    assert_eq!(conv.document.resolution.map_size, GridPoint { x: 16.0, y: 11.0 });
    assert_eq!(conv.summary.nominal_map_size, dvec2(14.0, 10.0));

    let fixed = ConvertOptions::default().with_expand_map_size(false);
    let conv = convert_str(&text, &fixed).unwrap();
    assert_eq!(conv.document.resolution.map_size, GridPoint { x: 14.0, y: 10.0 });
}

#[test]
fn missing_grid_uses_the_configured_default() {
    let scene = json!({
        "width": 1400,
        "height": 700,
        "walls": [{ "c": [0, 0, 1400, 0] }],
    });
    let opts = ConvertOptions::default().with_default_pixels_per_grid(70.0);
    let doc = convert_str(&container(scene), &opts).unwrap().document;
    assert_eq!(doc.resolution.pixels_per_grid, 70.0);
    assert_eq!(doc.line_of_sight[0][1], GridPoint { x: 20.0, y: 0.0 });
}

#[test]
fn correction_offset_is_applied_after_the_transform() {
    let text = container(base_scene(json!([{ "c": [0, 0, 1400, 0], "door": 1 }])));
    let opts = ConvertOptions::default().with_correction_offset(dvec2(-0.75, -0.5));
    let conv = convert_str(&text, &opts).unwrap();

    let portal = &conv.document.portals[0];
    assert_eq!(portal.bounds[0], GridPoint { x: -0.75, y: -0.5 });
    assert_eq!(portal.bounds[1], GridPoint { x: 13.25, y: -0.5 });
    assert_eq!(portal.position, GridPoint { x: 6.25, y: -0.5 });
    assert_eq!(conv.summary.correction, dvec2(-0.75, -0.5));
}

// ============================================================================
// Bounding-box fit
// ============================================================================

fn fit_options() -> ConvertOptions {
    ConvertOptions::default().with_strategy(Strategy::BoundingBoxFit)
}

#[test]
fn fit_maps_the_x_span_onto_the_target_width() {
    let scene = json!({
        "width": 1400,
        "height": 1000,
        "grid": { "size": 100 },
        "padding": 0.25,
        "walls": [
            { "c": [200, 300, 1600, 300] },
            { "c": [200, 300, 200, 1300] },
        ],
    });
    let opts = fit_options().with_target_image_size(Some(2800), Some(2000));
    let conv = convert_str(&container(scene), &opts).unwrap();

    let fit = conv.summary.fit.unwrap();
    assert_eq!(fit.gain, 2.0);
    assert!(fit.within_tolerance);
    assert!(conv.summary.offsets.is_none());
    assert!(conv.summary.warnings.is_empty());

    let top = conv.document.line_of_sight[0];
    assert_close(top[0], (0.0, 0.0));
    assert_close(top[1], (2800.0 / 100.0, 0.0));
    let left = conv.document.line_of_sight[1];
    assert_close(left[1], (0.0, 2000.0 / 100.0));
    assert_eq!(conv.document.resolution.map_size, GridPoint { x: 28.0, y: 20.0 });
}

#[test]
fn fit_defaults_to_the_scene_size_and_warns_on_aspect_mismatch() {
    let scene = base_scene(json!([{ "c": [100, 100, 800, 300], "door": 1, "ds": 1 }]));
    let conv = convert_str(&container(scene), &fit_options()).unwrap();

    let fit = conv.summary.fit.unwrap();
    assert_eq!(fit.target, dvec2(1400.0, 1000.0));
    assert_eq!(fit.gain, 2.0);
    assert_eq!(fit.implied_height, 400.0);
    assert!(!fit.within_tolerance);
    assert!(matches!(
        conv.summary.warnings.as_slice(),
        [Warning::AspectRatioMismatch { .. }]
    ));

    // Doors are classified the same way under both strategies.
    let portal = &conv.document.portals[0];
    assert!(!portal.closed);
    assert_close(portal.bounds[0], (0.0, 6.0));
    assert_close(portal.bounds[1], (14.0, 10.0));
    assert_close(portal.position, (7.0, 8.0));
}

#[test]
fn fit_tolerance_is_configurable() {
    let scene = base_scene(json!([{ "c": [0, 0, 1400, 999] }]));
    let default = convert_str(&container(scene.clone()), &fit_options()).unwrap();
    assert!(default.summary.fit.unwrap().within_tolerance);

    let tight = fit_options().with_aspect_ratio_tolerance(1e-6);
    let conv = convert_str(&container(scene), &tight).unwrap();
    assert!(!conv.summary.fit.unwrap().within_tolerance);
}

#[test]
fn fit_rejects_a_zero_width_box() {
    let scene = base_scene(json!([{ "c": [500, 0, 500, 1000] }]));
    let err = convert_str(&container(scene), &fit_options()).unwrap_err();
    assert!(matches!(err, ConvertError::DegenerateBoundingBox { .. }));
}

#[test]
fn fit_with_no_walls_emits_an_empty_document() {
    let scene = base_scene(json!([{ "c": [1, 2, 3] }]));
    let conv = convert_str(&container(scene), &fit_options()).unwrap();
    assert!(conv.document.line_of_sight.is_empty());
    assert!(conv.summary.fit.is_none());
    assert_eq!(conv.summary.skipped, 1);
    assert!(conv.summary.warnings.contains(&Warning::EmptyWallSet));
}
