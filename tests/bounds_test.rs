//! Integration tests for the workspace bounds calculator.

use rstest::rstest;

use canvas_arrange::domain::bounds::{DEGENERATE_SPAN, MIN_WORKSPACE_SIZE};
use canvas_arrange::domain::{Frame, Point, Rect, Size, WorkspaceBounds};
use canvas_arrange::util::testing::frame;

#[test]
fn given_no_frames_when_computing_bounds_then_default_square_at_origin() {
    let bounds = WorkspaceBounds::from_frames::<Frame>(&[]);

    assert_eq!(bounds.min_x, -5000.0);
    assert_eq!(bounds.min_y, -5000.0);
    assert_eq!(bounds.max_x, 5000.0);
    assert_eq!(bounds.max_y, 5000.0);
}

#[test]
fn given_small_content_when_computing_bounds_then_minimum_size_centred_on_content() {
    let frames = vec![
        frame("a", "a", 0.0, 0.0, 800.0, 600.0),
        frame("b", "b", 2000.0, 0.0, 800.0, 600.0),
    ];

    let bounds = WorkspaceBounds::from_frames(&frames);

    // x span 2800 * 10 = 28000, y span 600 * 10 < 10000
    assert_eq!(bounds.width(), 28_000.0);
    assert_eq!(bounds.height(), MIN_WORKSPACE_SIZE);
    assert_eq!((bounds.min_x + bounds.max_x) / 2.0, 1400.0);
    assert_eq!((bounds.min_y + bounds.max_y) / 2.0, 300.0);
}

#[test]
fn given_zero_size_frames_on_a_line_when_computing_bounds_then_degenerate_span_is_used() {
    let frames = vec![
        frame("a", "a", 0.0, 0.0, 0.0, 0.0),
        frame("b", "b", 0.0, 5000.0, 0.0, 0.0),
    ];

    let bounds = WorkspaceBounds::from_frames(&frames);

    assert_eq!(bounds.width(), (DEGENERATE_SPAN * 10.0).max(MIN_WORKSPACE_SIZE));
    assert_eq!(bounds.height(), 50_000.0);
}

#[test]
fn given_any_frames_when_computing_bounds_then_every_frame_is_contained() {
    let frames = vec![
        frame("a", "a", -300.0, 40.0, 120.0, 80.0),
        frame("b", "b", 7000.0, -2500.0, 640.0, 480.0),
        frame("c", "c", 10.0, 9000.0, 50.0, 50.0),
    ];

    let bounds = WorkspaceBounds::from_frames(&frames);

    for f in &frames {
        assert!(bounds.contains(&Rect::new(f.position, f.dimension)), "{}", f.id);
    }
}

#[rstest]
#[case::inside(Point::new(0.0, 0.0), Point::new(0.0, 0.0))]
#[case::left_of_min(Point::new(-6000.0, 0.0), Point::new(-5000.0, 0.0))]
#[case::past_max(Point::new(4950.0, 4990.0), Point::new(4900.0, 4900.0))]
#[case::both_axes(Point::new(-9000.0, 9000.0), Point::new(-5000.0, 4900.0))]
fn given_position_when_clamping_then_rect_stays_inside(
    #[case] position: Point,
    #[case] expected: Point,
) {
    let bounds = WorkspaceBounds::from_frames::<Frame>(&[]);
    let size = Size::new(100.0, 100.0);

    let clamped = bounds.clamp(position, size);

    assert_eq!(clamped, expected);
    assert!(bounds.contains(&Rect::new(clamped, size)));
}
