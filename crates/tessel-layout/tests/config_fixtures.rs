//! Panel layouts declared in JSON config.

use serde_json::json;
use tessel_layout::{Constraint, Direction, Layout, LayoutError, Rect};

#[test]
fn parses_full_panel_config() {
    let config = json!({
        "direction": "horizontal",
        "constraints": [
            {"length": 20},
            {"fill": 1},
            {"percentage": 30.0}
        ],
        "margin": 0,
        "spacing": 0
    });
    let layout: Layout = serde_json::from_value(config).unwrap();

    assert_eq!(
        layout,
        Layout::horizontal([
            Constraint::Length(20),
            Constraint::Fill(1),
            Constraint::Percentage(30.0),
        ])
    );
    let rects = layout.split(Rect::new(0, 0, 100, 50)).unwrap();
    assert_eq!(rects[1], Rect::new(20, 0, 50, 50));
}

#[test]
fn missing_fields_take_defaults() {
    let layout: Layout = serde_json::from_str(r#"{"constraints": [{"ratio": [1, 3]}]}"#).unwrap();
    assert_eq!(layout.direction(), Direction::Vertical);
    assert_eq!(layout.margin(), 0);
    assert_eq!(layout.spacing(), 0);
    assert_eq!(layout.constraints(), &[Constraint::Ratio(1, 3)]);

    let empty: Layout = serde_json::from_str("{}").unwrap();
    assert_eq!(empty, Layout::default());
}

#[test]
fn margin_and_spacing_clamp_like_the_builders() {
    let layout: Layout = serde_json::from_value(json!({
        "direction": "vertical",
        "constraints": [{"fill": 1}, {"fill": 1}],
        "margin": -4,
        "spacing": 70000
    }))
    .unwrap();

    let built = Layout::vertical([Constraint::Fill(1), Constraint::Fill(1)])
        .with_margin(-4)
        .with_spacing(70000);
    assert_eq!(layout, built);
    assert_eq!(layout.margin(), 0);
    assert_eq!(layout.spacing(), u16::MAX);
}

#[test]
fn zero_denominator_parses_but_fails_validation() {
    let layout: Layout =
        serde_json::from_str(r#"{"constraints": [{"fill": 2}, {"ratio": [1, 0]}]}"#).unwrap();
    assert_eq!(
        layout.validate(),
        Err(LayoutError::ZeroDenominator { index: 1 })
    );
}

#[test]
fn rejects_unknown_constraint_kinds() {
    let err = serde_json::from_str::<Layout>(r#"{"constraints": [{"min": 3}]}"#);
    assert!(err.is_err());

    let err = serde_json::from_str::<Layout>(r#"{"constraints": [{"length": -1}]}"#);
    assert!(err.is_err());
}

#[test]
fn serializes_back_to_snake_case() {
    let layout = Layout::horizontal([Constraint::Length(3), Constraint::Ratio(2, 5)])
        .with_margin(1)
        .with_spacing(2);
    let value = serde_json::to_value(&layout).unwrap();

    assert_eq!(
        value,
        json!({
            "direction": "horizontal",
            "constraints": [{"length": 3}, {"ratio": [2, 5]}],
            "margin": 1,
            "spacing": 2
        })
    );
    let back: Layout = serde_json::from_value(value).unwrap();
    assert_eq!(back, layout);
}

#[test]
fn rect_round_trips_through_json() {
    let rect: Rect = serde_json::from_value(json!({"x": 2, "y": 3, "width": 40, "height": 10})).unwrap();
    assert_eq!(rect, Rect::new(2, 3, 40, 10));
}
