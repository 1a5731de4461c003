use std::f64::consts::FRAC_PI_2;

use crate::geom::{
    CubicBezier2, Curve2, DEFAULT_STEP, LengthBudget, Point2, Spline, spline_length,
    walk_from_end,
};

/// Straight segment with handles at the thirds, so `t` is proportional to
/// arc length.
fn uniform_line(a: Point2, b: Point2) -> CubicBezier2 {
    CubicBezier2::new(a, a.lerp(b, 1.0 / 3.0), a.lerp(b, 2.0 / 3.0), b)
}

fn quarter_circle(radius: f64) -> Spline {
    let k = 0.552_284_749_8 * radius;
    Spline::new(vec![
        Point2::new(radius, 0.0),
        Point2::new(radius, k),
        Point2::new(k, radius),
        Point2::new(0.0, radius),
    ])
    .unwrap()
}

#[test]
fn zero_target_returns_spline_end() {
    let spline = Spline::from_segments(&[
        uniform_line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
        uniform_line(Point2::new(10.0, 0.0), Point2::new(10.0, 10.0)),
    ])
    .unwrap();

    let walk = walk_from_end(&spline, 0.0, DEFAULT_STEP);
    assert_eq!(walk.parameter, 2.0);
    assert_eq!(walk.steps, 0);
    assert_eq!(walk.length, 0.0);
    assert!(!walk.reached_start);
}

#[test]
fn walk_locates_length_on_straight_line() {
    let spline =
        Spline::from_segments(&[uniform_line(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0))])
            .unwrap();

    let walk = walk_from_end(&spline, 40.0, DEFAULT_STEP);
    assert!(!walk.reached_start);
    assert!((walk.parameter - 0.6).abs() < 1e-6, "u = {}", walk.parameter);
    assert!(walk.overshoot >= 0.0);
    assert!((walk.available() - 40.0).abs() < 1e-9);

    let point = spline.point_at(walk.parameter);
    assert!((point.x - 60.0).abs() < 1e-4);
}

#[test]
fn walk_crosses_segment_boundaries() {
    let spline = Spline::from_segments(&[
        uniform_line(Point2::new(0.0, 0.0), Point2::new(10.0, 0.0)),
        uniform_line(Point2::new(10.0, 0.0), Point2::new(20.0, 0.0)),
        uniform_line(Point2::new(20.0, 0.0), Point2::new(20.0, 5.0)),
    ])
    .unwrap();

    let walk = walk_from_end(&spline, 20.0, DEFAULT_STEP);
    assert!((walk.parameter - 0.5).abs() < 1e-6, "u = {}", walk.parameter);
    let point = spline.point_at(walk.parameter);
    assert!((point.x - 5.0).abs() < 1e-4 && point.y.abs() < 1e-9);
}

#[test]
fn target_longer_than_spline_stops_at_start() {
    let spline = Spline::line(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0));

    let walk = walk_from_end(&spline, 150.0, DEFAULT_STEP);
    assert!(walk.reached_start);
    assert_eq!(walk.parameter, 0.0);
    assert_eq!(walk.overshoot, 0.0);
    assert!((walk.length - 100.0).abs() < 1e-9);
    assert!((walk.available() - 100.0).abs() < 1e-9);
}

#[test]
fn degenerate_spline_has_zero_length() {
    let p = Point2::new(4.0, 4.0);
    let spline = Spline::new(vec![p; 7]).unwrap();

    let walk = walk_from_end(&spline, 10.0, 0.01);
    assert!(walk.reached_start);
    assert_eq!(walk.length, 0.0);
    assert_eq!(walk.parameter, 0.0);
}

#[test]
fn spline_length_of_quarter_circle() {
    let spline = quarter_circle(100.0);
    let length = spline_length(&spline, DEFAULT_STEP);
    assert!((length - 100.0 * FRAC_PI_2).abs() < 0.2, "length {length}");
}

#[test]
fn coarse_step_stays_within_one_chord() {
    let spline = quarter_circle(100.0);
    let fine = spline_length(&spline, 1e-4);
    let step = 0.05;

    let walk = walk_from_end(&spline, 60.0, step);
    let kept = crate::geom::truncate(&spline, walk.parameter).spline;
    let measured = fine - spline_length(&kept, 1e-4);
    // one step covers at most ~1.5 * radius * step of arc on this curve
    assert!((measured - 60.0).abs() < 1.5 * 100.0 * step, "measured {measured}");
}

#[test]
fn invalid_step_falls_back_to_default() {
    let spline =
        Spline::from_segments(&[uniform_line(Point2::new(0.0, 0.0), Point2::new(100.0, 0.0))])
            .unwrap();
    let walk = walk_from_end(&spline, 25.0, f64::NAN);
    assert!((walk.parameter - 0.75).abs() < 1e-6);
}

#[test]
fn budget_gives_up_secondary_distance_first() {
    let budget = LengthBudget::new(30.0, 5.0);
    assert_eq!(budget.total(), 35.0);

    assert_eq!(budget.fit(50.0, 2.0), Some(budget));
    assert_eq!(budget.fit(32.0, 2.0), Some(LengthBudget::new(30.0, 2.0)));
    assert_eq!(budget.fit(20.0, 2.0), Some(LengthBudget::new(20.0, 0.0)));
    assert_eq!(budget.fit(1.0, 2.0), None);
    assert_eq!(budget.fit(f64::NAN, 2.0), None);
}
