#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;
use tessel_core::geometry::Rect;
use tessel_layout::{Constraint, Direction, Layout, LayoutError};

#[derive(Debug, Arbitrary)]
enum FuzzConstraint {
    Length(u16),
    Percentage(f32),
    Ratio(u32, u32),
    Fill(u32),
}

impl From<FuzzConstraint> for Constraint {
    fn from(c: FuzzConstraint) -> Self {
        match c {
            FuzzConstraint::Length(v) => Constraint::Length(v),
            FuzzConstraint::Percentage(p) => Constraint::Percentage(p),
            FuzzConstraint::Ratio(n, d) => Constraint::Ratio(n, d),
            FuzzConstraint::Fill(w) => Constraint::Fill(w),
        }
    }
}

#[derive(Debug, Arbitrary)]
struct Input {
    horizontal: bool,
    constraints: Vec<FuzzConstraint>,
    margin: i32,
    spacing: i32,
    x: u16,
    y: u16,
    width: u16,
    height: u16,
}

fuzz_target!(|input: Input| {
    let direction = if input.horizontal {
        Direction::Horizontal
    } else {
        Direction::Vertical
    };
    let constraints: Vec<Constraint> = input
        .constraints
        .into_iter()
        .take(64)
        .map(Constraint::from)
        .collect();
    let zero_denominator = constraints
        .iter()
        .position(|c| matches!(c, Constraint::Ratio(_, 0)));

    let layout = Layout::new(direction, constraints)
        .with_margin(input.margin)
        .with_spacing(input.spacing);
    let area = Rect::new(input.x, input.y, input.width, input.height);

    let rects = match layout.split(area) {
        Ok(rects) => rects,
        Err(LayoutError::ZeroDenominator { index }) => {
            assert_eq!(Some(index), zero_denominator, "wrong error index");
            return;
        }
    };
    assert!(zero_denominator.is_none(), "zero denominator accepted");

    // Post-conditions that must always hold:
    assert_eq!(rects.len(), layout.constraint_count(), "rect count");
    let inner = area.inset(layout.margin());
    let origin = Rect::new(inner.x, inner.y, 0, 0);
    if area.is_empty() || layout.direction().primary_len(inner) == 0 {
        assert!(rects.iter().all(|r| *r == origin), "sized rect in empty area");
        return;
    }
    if let Some(first) = rects.first() {
        assert_eq!(
            layout.direction().primary_origin(*first),
            layout.direction().primary_origin(inner),
            "first rect off the inset origin"
        );
    }
    for pair in rects.windows(2) {
        let d = layout.direction();
        let expected = d
            .primary_origin(pair[0])
            .saturating_add(d.primary_len(pair[0]))
            .saturating_add(layout.spacing());
        assert_eq!(d.primary_origin(pair[1]), expected, "rects not spacing apart");
    }
    for rect in &rects {
        match direction {
            Direction::Horizontal => {
                assert_eq!(rect.y, inner.y);
                assert_eq!(rect.height, inner.height);
            }
            Direction::Vertical => {
                assert_eq!(rect.x, inner.x);
                assert_eq!(rect.width, inner.width);
            }
        }
    }
    assert_eq!(layout.split(area).ok(), Some(rects), "split not deterministic");
});
