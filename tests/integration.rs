use std::collections::BTreeMap;

use stroke_arrows::arrows::{
    ArrowError, ArrowOptions, ArrowStyle, DrawStyle, DrawingHost, HostError, LineCap, LineJoin,
    PathLayout, RenderError, TailKind, TailStyle, plan_arrow, render_batch,
};
use stroke_arrows::geom::{Point2, Spline, Tolerance, points_from_flat};

#[derive(Debug, Clone, PartialEq)]
enum Event {
    Push,
    Pop,
    Insert { id: usize, name: String, closed: bool },
    Stroke { id: usize, style: DrawStyle },
    Fill { id: usize },
    Remove { id: usize },
}

/// Host that records every call and keeps the paths it was given.
#[derive(Debug, Default)]
struct RecordingHost {
    events: Vec<Event>,
    paths: BTreeMap<usize, Vec<f64>>,
    next_id: usize,
    depth: usize,
    fail_strokes: bool,
}

impl RecordingHost {
    fn failing() -> Self {
        Self {
            fail_strokes: true,
            ..Self::default()
        }
    }

    fn count(&self, pred: impl Fn(&Event) -> bool) -> usize {
        self.events.iter().filter(|e| pred(e)).count()
    }
}

impl DrawingHost for RecordingHost {
    type PathId = usize;

    fn insert_path(
        &mut self,
        name: &str,
        coords: &[f64],
        closed: bool,
    ) -> Result<usize, HostError> {
        let id = self.next_id;
        self.next_id += 1;
        self.paths.insert(id, coords.to_vec());
        self.events.push(Event::Insert {
            id,
            name: name.to_string(),
            closed,
        });
        Ok(id)
    }

    fn remove_path(&mut self, path: usize) -> Result<(), HostError> {
        self.paths
            .remove(&path)
            .ok_or_else(|| HostError::UnknownPath(path.to_string()))?;
        self.events.push(Event::Remove { id: path });
        Ok(())
    }

    fn stroke_path(&mut self, path: usize, style: &DrawStyle) -> Result<(), HostError> {
        if self.fail_strokes {
            return Err(HostError::Failed("brush unavailable".to_string()));
        }
        self.events.push(Event::Stroke { id: path, style: *style });
        Ok(())
    }

    fn fill_path(&mut self, path: usize) -> Result<(), HostError> {
        self.events.push(Event::Fill { id: path });
        Ok(())
    }

    fn push_context(&mut self) {
        self.depth += 1;
        self.events.push(Event::Push);
    }

    fn pop_context(&mut self) {
        self.depth -= 1;
        self.events.push(Event::Pop);
    }
}

fn host_line(from: Point2, to: Point2) -> Vec<f64> {
    Spline::line(from, to).to_host_stroke()
}

#[test]
fn straight_line_gets_filled_head() {
    let spline = Spline::line(Point2::ORIGIN, Point2::new(100.0, 0.0));
    let options = ArrowOptions::new()
        .with_arrow_length(40.0)
        .with_tip_angle_deg(35.0);
    let plan = plan_arrow(&spline, &options).expect("plan");

    assert!(Tolerance::new(0.05).approx_eq_point2(plan.cut_point, Point2::new(60.0, 0.0)));
    assert!(Tolerance::ANGLE.approx_eq_angle(plan.tangent_angle, 0.0));

    let head = plan.head.anchor_points();
    assert_eq!(head.len(), 4);
    assert!(plan.head.closed);
    let tip = plan.cut_point.polar_offset(plan.tangent_angle, plan.axis_length);
    assert!(Tolerance::LOOSE.approx_eq_point2(head[0], tip));
    assert!((plan.axis_length - 40.0).abs() < 1e-12);
}

#[test]
fn renders_and_cleans_up() {
    let mut host = RecordingHost::default();
    let paths = [host_line(Point2::ORIGIN, Point2::new(100.0, 0.0))];
    let summary = render_batch(&mut host, &paths, PathLayout::HostStroke, &ArrowOptions::new())
        .expect("render");

    assert_eq!(summary.drawn, 1);
    assert_eq!(summary.skipped, 0);
    assert_eq!(host.depth, 0);
    assert!(host.paths.is_empty());
    assert_eq!(host.events.first(), Some(&Event::Push));
    assert_eq!(host.events.last(), Some(&Event::Pop));

    // Body stroked with the arrow style, head filled.
    let expected = DrawStyle::for_arrows(4.0);
    assert!(host.events.contains(&Event::Stroke { id: 0, style: expected }));
    assert!(host.events.contains(&Event::Fill { id: 1 }));
    assert_eq!(expected.join, LineJoin::Miter);
    assert_eq!(expected.cap, LineCap::Butt);
    assert_eq!(expected.miter_limit, 100.0);
    assert_eq!(host.count(|e| matches!(e, Event::Remove { .. })), 2);
}

#[test]
fn body_path_is_exported_in_host_layout() {
    let mut host = RecordingHost::default();
    let paths = [host_line(Point2::ORIGIN, Point2::new(100.0, 0.0))];
    let options = ArrowOptions::new().with_keep_paths(true);
    render_batch(&mut host, &paths, PathLayout::HostStroke, &options).expect("render");

    let body = points_from_flat(&host.paths[&0]).expect("pairs");
    // Outer handles repeat the end anchors.
    assert_eq!(body[0], body[1]);
    assert_eq!(body[body.len() - 1], body[body.len() - 2]);
    assert_eq!(body.len() % 3, 0);

    let reparsed = Spline::from_host_stroke(&host.paths[&0]).expect("valid stroke");
    assert_eq!(reparsed.start(), Point2::ORIGIN);
}

#[test]
fn head_only_and_keep_paths() {
    let mut host = RecordingHost::default();
    let paths = [host_line(Point2::ORIGIN, Point2::new(0.0, 120.0))];
    let options = ArrowOptions::new()
        .with_head_style(ArrowStyle::Empty)
        .with_head_only(true)
        .with_keep_paths(true);
    render_batch(&mut host, &paths, PathLayout::HostStroke, &options).expect("render");

    // Only the outlined head is stroked; nothing is removed.
    assert_eq!(host.count(|e| matches!(e, Event::Stroke { id: 0, .. })), 0);
    assert_eq!(host.count(|e| matches!(e, Event::Stroke { id: 1, .. })), 1);
    assert_eq!(host.count(|e| matches!(e, Event::Remove { .. })), 0);
    assert_eq!(host.paths.len(), 2);
}

#[test]
fn tails_are_drawn_after_the_head() {
    let mut host = RecordingHost::default();
    let paths = [host_line(Point2::ORIGIN, Point2::new(150.0, 50.0))];
    let options = ArrowOptions::new().with_tail(TailKind::Feather { wings: 2 }, TailStyle::Simple);
    render_batch(&mut host, &paths, PathLayout::HostStroke, &options).expect("render");

    let names: Vec<&str> = host
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Insert { name, .. } => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(
        names,
        ["arrow 0 body", "arrow 0 head", "arrow 0 tail 0", "arrow 0 tail 1"]
    );
}

#[test]
fn short_paths_are_skipped() {
    let mut host = RecordingHost::default();
    let paths = [
        host_line(Point2::ORIGIN, Point2::new(100.0, 0.0)),
        host_line(Point2::ORIGIN, Point2::new(1.0, 0.0)),
        host_line(Point2::ORIGIN, Point2::new(0.0, -80.0)),
    ];
    let summary = render_batch(&mut host, &paths, PathLayout::HostStroke, &ArrowOptions::new())
        .expect("render");

    assert_eq!(summary.drawn, 2);
    assert_eq!(summary.skipped, 1);
    let bodies: Vec<&str> = host
        .events
        .iter()
        .filter_map(|e| match e {
            Event::Insert { name, .. } if name.ends_with("body") => Some(name.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(bodies, ["arrow 0 body", "arrow 2 body"]);
}

#[test]
fn malformed_path_fails_before_drawing() {
    let mut host = RecordingHost::default();
    let paths = [
        host_line(Point2::ORIGIN, Point2::new(100.0, 0.0)),
        vec![0.0, 0.0, 1.0, 1.0, 2.0, 2.0, 3.0, 3.0],
    ];
    let err = render_batch(&mut host, &paths, PathLayout::HostStroke, &ArrowOptions::new())
        .expect_err("malformed");

    assert!(matches!(
        err,
        RenderError::Plan(ArrowError::Malformed { index: 1, .. })
    ));
    assert!(host.events.is_empty());
}

#[test]
fn host_failure_restores_context() {
    let mut host = RecordingHost::failing();
    let paths = [host_line(Point2::ORIGIN, Point2::new(100.0, 0.0))];
    let err = render_batch(&mut host, &paths, PathLayout::HostStroke, &ArrowOptions::new())
        .expect_err("stroke fails");

    assert!(matches!(err, RenderError::Host(HostError::Failed(_))));
    assert_eq!(host.depth, 0);
    assert_eq!(host.events.last(), Some(&Event::Pop));
}
