//! End-to-end layout scenarios

use layout_solver::layout::{ElementSpec, Rect, Side, SizeSpec, CONTAINER_ID};
use layout_solver::{
    resolve_json, solve, solve_json, Error, LayoutConfig, LayoutError, LayoutRequest, LayoutTree,
};
use pretty_assertions::assert_eq;

fn listing(tree: &LayoutTree) -> String {
    tree.components
        .iter()
        .map(|c| {
            let r = c.location;
            format!("{} [{}, {}, {}, {}]", c.id, r.x, r.y, r.width, r.height)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

const SCREEN: &str = r#"{
  "layout": [
    {"android:id": "parent", "android:layout_width": "720px", "android:layout_height": "1280px",
     "android:paddingLeft": "8dp", "android:paddingRight": "8dp"},
    {"android:id": "title", "android:layout_width": "0dp", "android:layout_height": "48dp",
     "android:layout_marginTop": "24dp",
     "app:layout_constraintLeft_toLeftOf": "parent",
     "app:layout_constraintRight_toRightOf": "parent",
     "app:layout_constraintTop_toTopOf": "parent"},
    {"android:id": "ok", "android:layout_width": "100px", "android:layout_height": "40px",
     "android:layout_marginTop": "16px",
     "app:layout_constraintHorizontal_chainStyle": "spread",
     "app:layout_constraintLeft_toLeftOf": "parent",
     "app:layout_constraintRight_toLeftOf": "cancel",
     "app:layout_constraintTop_toBottomOf": "title"},
    {"android:id": "cancel", "android:layout_width": "100px", "android:layout_height": "40px",
     "android:layout_marginTop": "16px",
     "app:layout_constraintLeft_toRightOf": "ok",
     "app:layout_constraintRight_toRightOf": "parent",
     "app:layout_constraintTop_toBottomOf": "title"},
    {"android:id": "footer", "android:layout_width": "200px", "android:layout_height": "50px",
     "android:layout_marginBottom": "10px",
     "app:layout_constraintHorizontal_bias": 0,
     "app:layout_constraintLeft_toLeftOf": "parent",
     "app:layout_constraintRight_toRightOf": "parent",
     "app:layout_constraintBottom_toBottomOf": "parent"}
  ]
}"#;

#[test]
fn test_screen_layout() {
    let tree = solve_json(SCREEN, &LayoutConfig::default()).unwrap();

    assert_eq!(tree.content_frame.location, Rect::new(0, 0, 720, 1280));
    assert!(tree.warnings.is_empty());
    insta::assert_snapshot!(listing(&tree), @r"
    title [16, 48, 688, 96]
    ok [179, 160, 100, 40]
    cancel [441, 160, 100, 40]
    footer [16, 1220, 200, 50]
    ");
}

#[test]
fn test_screen_layout_with_offset() {
    let source = SCREEN.replacen("\"layout\"", "\"x_offset\": 5, \"y_offset\": 7, \"layout\"", 1);
    let tree = solve_json(&source, &LayoutConfig::default()).unwrap();

    assert_eq!(tree.content_frame.location, Rect::new(5, 7, 720, 1280));
    assert_eq!(
        tree.component("title").unwrap().location,
        Rect::new(21, 55, 688, 96)
    );
}

#[test]
fn test_resolution_is_deterministic() {
    let first = resolve_json(SCREEN, &LayoutConfig::default());
    let second = resolve_json(SCREEN, &LayoutConfig::default());
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn test_density_scale_from_config() {
    let tree = solve_json(SCREEN, &LayoutConfig::default().with_density_scale(1.0)).unwrap();
    // 8dp padding and 24dp margin at scale 1
    assert_eq!(
        tree.component("title").unwrap().location,
        Rect::new(8, 24, 704, 48)
    );
}

#[test]
fn test_box_examples() {
    let request = LayoutRequest::new(vec![
        ElementSpec::new(CONTAINER_ID, SizeSpec::Fixed(1000), SizeSpec::Fixed(1000)),
        ElementSpec::new("box", SizeSpec::Fixed(200), SizeSpec::Fixed(100))
            .with_margin(Side::Left, 10)
            .with_margin(Side::Top, 20)
            .constrain(Side::Left, CONTAINER_ID, Side::Left)
            .constrain(Side::Top, CONTAINER_ID, Side::Top),
        ElementSpec::new("wide", SizeSpec::MatchConstraint, SizeSpec::Fixed(10))
            .constrain(Side::Left, CONTAINER_ID, Side::Left)
            .constrain(Side::Right, CONTAINER_ID, Side::Right),
    ]);
    let tree = solve(&request, &LayoutConfig::default()).unwrap();

    assert_eq!(
        tree.component("box").unwrap().location,
        Rect::new(10, 20, 200, 100)
    );
    assert_eq!(
        tree.component("wide").unwrap().location,
        Rect::new(0, 0, 1000, 10)
    );
}

#[test]
fn test_chain_waiting_on_its_own_anchor_is_solved() {
    // The chain ends at "c", which is itself positioned from the chain head
    let request = LayoutRequest::new(vec![
        ElementSpec::new(CONTAINER_ID, SizeSpec::Fixed(1000), SizeSpec::Fixed(100)),
        ElementSpec::new("a", SizeSpec::Fixed(50), SizeSpec::Fixed(10))
            .constrain(Side::Left, CONTAINER_ID, Side::Left)
            .constrain(Side::Right, "b", Side::Left),
        ElementSpec::new("b", SizeSpec::Fixed(50), SizeSpec::Fixed(10))
            .constrain(Side::Left, "a", Side::Right)
            .constrain(Side::Right, "c", Side::Right),
        ElementSpec::new("c", SizeSpec::Fixed(300), SizeSpec::Fixed(10))
            .constrain(Side::Left, "a", Side::Left),
    ]);
    let tree = solve(&request, &LayoutConfig::default()).unwrap();

    assert_eq!(tree.component("a").unwrap().location.x, 200);
    assert_eq!(tree.component("b").unwrap().location.x, 250);
    assert_eq!(tree.component("c").unwrap().location, Rect::new(200, 0, 300, 10));
}

#[test]
fn test_mutual_cycle_reports_unsatisfiable() {
    let response = resolve_json(
        r#"{"layout": [
            {"android:id": "parent", "android:layout_width": "100px", "android:layout_height": "100px"},
            {"android:id": "a", "android:layout_width": "10px", "android:layout_height": "10px",
             "app:layout_constraintLeft_toRightOf": "b"},
            {"android:id": "b", "android:layout_width": "10px", "android:layout_height": "10px",
             "app:layout_constraintLeft_toRightOf": "a"}
        ]}"#,
        &LayoutConfig::default(),
    );

    assert!(response.tree.is_none());
    assert!(response
        .error
        .unwrap()
        .contains("unsatisfiable horizontal constraints between a, b"));
}

#[test]
fn test_axis_mismatch_aborts_request() {
    let request = LayoutRequest::new(vec![
        ElementSpec::new(CONTAINER_ID, SizeSpec::Fixed(100), SizeSpec::Fixed(100)),
        ElementSpec::new("a", SizeSpec::Fixed(10), SizeSpec::Fixed(10)).constrain(
            Side::Left,
            CONTAINER_ID,
            Side::Top,
        ),
    ]);
    let err = solve(&request, &LayoutConfig::default()).unwrap_err();
    assert!(matches!(err, Error::Layout(LayoutError::AxisMismatch { .. })));
}

#[test]
fn test_malformed_value_is_reported() {
    let source = r#"{"layout": [
        {"android:id": "parent", "android:layout_width": "100px", "android:layout_height": "1.5px"}
    ]}"#;
    match solve_json(source, &LayoutConfig::default()).unwrap_err() {
        Error::Parse(e) => {
            let report = e.format(source, "screen.json");
            assert!(report.contains("pixel values must be integers"));
        }
        other => panic!("Expected parse error, got: {:?}", other),
    }
}

#[test]
fn test_container_size_beyond_pixel_range_is_rejected() {
    let response = resolve_json(
        r#"{"layout": [
            {"android:id": "parent", "android:layout_width": "99999999999px",
             "android:layout_height": "100px"}
        ]}"#,
        &LayoutConfig::default(),
    );
    assert!(response.tree.is_none());
    let error = response.error.unwrap();
    assert!(error.starts_with("parse error"));
    assert!(error.contains("android:layout_width"));
}

#[test]
fn test_offset_beyond_pixel_range_is_rejected() {
    let source = SCREEN.replacen("\"layout\"", "\"x_offset\": 2147483000, \"layout\"", 1);
    match solve_json(&source, &LayoutConfig::default()).unwrap_err() {
        Error::Layout(LayoutError::OutOfRange { what, .. }) => assert_eq!(what, "x_offset"),
        other => panic!("Expected OutOfRange, got: {:?}", other),
    }
}

#[test]
fn test_negative_padding_is_reported() {
    let source = SCREEN.replacen("\"8dp\"", "\"-8dp\"", 1);
    match solve_json(&source, &LayoutConfig::default()).unwrap_err() {
        Error::Parse(e) => {
            let report = e.format(&source, "screen.json");
            assert!(report.contains("padding cannot be negative"));
        }
        other => panic!("Expected parse error, got: {:?}", other),
    }
}
