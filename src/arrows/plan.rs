//! Arrow planning: where to cut a path, how to orient the head and what to
//! draw.
//!
//! A plan is computed without touching the host. The steps are:
//!
//! 1. Compensate the head length for the stroke width of outlined heads.
//! 2. Find the head anchor a fixed arc length before the path end, either by
//!    walking back from the end or by measuring from the start and searching
//!    the segment that holds the point.
//! 3. Cut the path there and read the tangent at the cut.
//! 4. Append the contact patch and build the head and tail outlines.

use serde::Serialize;

use super::options::{AnchorStrategy, ArrowOptions, ArrowStyle, OptionsError, TailKind};
use super::shapes::{HeadGeometry, Shape, TailGeometry, bullet, crossbar, feather, head_shape};
use crate::geom::{
    CubicBezier2, LengthBudget, Point2, SearchOptions, Spline, SplineError, SplineParameter,
    Tolerance, locate, truncate, walk_from_end,
};

/// Shortest head side kept after stroke-width compensation or shrinking to
/// fit a short path.
pub const MIN_ARROW_LENGTH: f64 = 2.0;

/// Samples per segment when flattening for [`AnchorStrategy::PointSearch`].
const FLATTEN_SAMPLES: usize = 64;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ArrowError {
    #[error("path {index} is malformed: {source}")]
    Malformed {
        index: usize,
        #[source]
        source: SplineError,
    },
    #[error("path is too short for the arrow: {available:.3} available, {required:.3} required")]
    InputTooShort { available: f64, required: f64 },
    #[error("head anchor not found after {attempts} attempts (closest sample {distance:.3} away)")]
    SearchExhausted { attempts: usize, distance: f64 },
    #[error("invalid options: {0}")]
    InvalidOptions(#[from] OptionsError),
}

impl ArrowError {
    /// `true` for failures that only affect one path of a batch.
    #[must_use]
    pub const fn is_skippable(&self) -> bool {
        matches!(self, Self::InputTooShort { .. } | Self::SearchExhausted { .. })
    }
}

/// How a flat coordinate list lays out its control points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PathLayout {
    /// `3n + 1` points, starting and ending on an anchor.
    Bare,
    /// `3n + 3` points with an outer handle before the first anchor and
    /// after the last one.
    #[default]
    HostStroke,
}

impl PathLayout {
    /// # Errors
    /// Fails on structurally invalid input; see [`Spline::new`].
    pub fn parse(self, coords: &[f64]) -> Result<Spline, SplineError> {
        match self {
            Self::Bare => Spline::from_flat_coords(coords),
            Self::HostStroke => Spline::from_host_stroke(coords),
        }
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ArrowDiagnostics {
    /// Steps taken by the arc-length walker.
    pub walk_steps: usize,
    /// Scan + refine attempts used by the point search.
    pub search_attempts: usize,
    /// Arrow length as configured.
    pub requested_length: f64,
    /// Arrow length after stroke-width compensation.
    pub compensated_length: f64,
    /// Arrow length actually drawn.
    pub fitted_length: f64,
    /// Whether the head had to shrink to fit the path.
    pub budget_shrunk: bool,
    pub warnings: Vec<String>,
}

/// Everything needed to draw one arrow.
#[derive(Debug, Clone, PartialEq)]
pub struct ArrowPlan {
    /// The path cut at the head anchor, without the contact patch.
    pub truncated: Spline,
    /// The path to stroke: `truncated` plus the contact patch, if any.
    pub body: Spline,
    pub cut_point: Point2,
    pub parameter: SplineParameter,
    /// Direction from the head anchor towards the tip, in radians.
    pub tangent_angle: f64,
    pub axis_length: f64,
    pub arrow_length: f64,
    pub head: Shape,
    pub tail: Vec<Shape>,
    pub diagnostics: ArrowDiagnostics,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlannedArrow {
    pub index: usize,
    pub plan: ArrowPlan,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SkippedPath {
    pub index: usize,
    pub reason: ArrowError,
}

/// Outcome of planning a batch: one entry per input path, in input order,
/// split between planned and skipped.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchReport {
    pub planned: Vec<PlannedArrow>,
    pub skipped: Vec<SkippedPath>,
}

/// Plans the arrow for a single path.
///
/// # Errors
/// [`ArrowError::InvalidOptions`] for out-of-range options,
/// [`ArrowError::InputTooShort`] when the head cannot fit on the path and
/// [`ArrowError::SearchExhausted`] when the point search misses.
pub fn plan_arrow(spline: &Spline, options: &ArrowOptions) -> Result<ArrowPlan, ArrowError> {
    options.validate()?;
    plan_validated(spline, options)
}

/// Plans arrows for every path of a batch.
///
/// All paths are parsed before any is planned, so one malformed path fails
/// the whole batch. Paths that are too short or whose anchor search misses
/// are logged and reported as skipped.
///
/// # Errors
/// [`ArrowError::Malformed`] or [`ArrowError::InvalidOptions`].
pub fn plan_batch<C: AsRef<[f64]>>(
    paths: &[C],
    layout: PathLayout,
    options: &ArrowOptions,
) -> Result<BatchReport, ArrowError> {
    options.validate()?;

    let splines = paths
        .iter()
        .enumerate()
        .map(|(index, coords)| {
            layout
                .parse(coords.as_ref())
                .map_err(|source| ArrowError::Malformed { index, source })
        })
        .collect::<Result<Vec<_>, _>>()?;

    let mut report = BatchReport::default();
    for (index, spline) in splines.iter().enumerate() {
        match plan_validated(spline, options) {
            Ok(plan) => report.planned.push(PlannedArrow { index, plan }),
            Err(reason) if reason.is_skippable() => {
                log::warn!("skipping path {index}: {reason}");
                report.skipped.push(SkippedPath { index, reason });
            }
            Err(err) => return Err(err),
        }
    }
    Ok(report)
}

/// Where the head goes and how long it ended up.
#[derive(Debug, Clone, Copy)]
struct HeadAnchor {
    parameter: f64,
    budget: LengthBudget,
}

fn plan_validated(spline: &Spline, options: &ArrowOptions) -> Result<ArrowPlan, ArrowError> {
    let style = options.head_style;
    let harpoon = options.harpoon_factor();
    let tip_angle = options.tip_angle();

    let (arrow_length, cut_distance) = if style.is_stroked() {
        let protrusion = options.tip_protrusion();
        (
            (options.arrow_length - protrusion).max(MIN_ARROW_LENGTH),
            protrusion,
        )
    } else {
        (options.arrow_length, 0.0)
    };

    let mut diagnostics = ArrowDiagnostics {
        requested_length: options.arrow_length,
        compensated_length: arrow_length,
        ..ArrowDiagnostics::default()
    };

    let budget = LengthBudget::new(harpoon * arrow_length, cut_distance);
    let min_axis = harpoon * MIN_ARROW_LENGTH;
    let anchor = match options.anchor_strategy {
        AnchorStrategy::ArcLengthWalk => {
            anchor_by_walk(spline, budget, min_axis, options.step, &mut diagnostics)?
        }
        AnchorStrategy::PointSearch => {
            anchor_by_search(spline, budget, min_axis, options.search, &mut diagnostics)?
        }
    };

    let axis_length = anchor.budget.primary;
    let arrow_length = axis_length / harpoon;
    diagnostics.fitted_length = arrow_length;
    diagnostics.budget_shrunk = anchor.budget != budget;

    let truncation = truncate(spline, anchor.parameter);
    let cut_point = truncation.cut_point;
    let angle = truncation.tangent_angle;

    let body = match contact_patch(style, harpoon, arrow_length, options.stroke_width) {
        Some(length) => truncation
            .spline
            .with_segment(CubicBezier2::line(cut_point, cut_point.polar_offset(angle, length))),
        None => truncation.spline.clone(),
    };

    let head_geometry = HeadGeometry {
        anchor: cut_point,
        angle,
        axis_length,
        arrow_length,
        tip_angle,
    };
    let head = head_shape(style, &head_geometry);
    let tail = tail_shapes(spline, options, head_geometry.wing_span(), angle);

    Ok(ArrowPlan {
        truncated: truncation.spline,
        body,
        cut_point,
        parameter: truncation.parameter,
        tangent_angle: angle,
        axis_length,
        arrow_length,
        head,
        tail,
        diagnostics,
    })
}

fn anchor_by_walk(
    spline: &Spline,
    budget: LengthBudget,
    min_axis: f64,
    step: f64,
    diagnostics: &mut ArrowDiagnostics,
) -> Result<HeadAnchor, ArrowError> {
    let walk = walk_from_end(spline, budget.total(), step);
    diagnostics.walk_steps = walk.steps;
    if !walk.reached_start {
        return Ok(HeadAnchor {
            parameter: walk.parameter,
            budget,
        });
    }

    let budget = fit_budget(budget, walk.available(), min_axis, diagnostics)?;
    Ok(HeadAnchor {
        parameter: 0.0,
        budget,
    })
}

fn anchor_by_search(
    spline: &Spline,
    budget: LengthBudget,
    min_axis: f64,
    search: SearchOptions,
    diagnostics: &mut ArrowDiagnostics,
) -> Result<HeadAnchor, ArrowError> {
    let polyline = flatten(spline);
    let total = polyline_length(&polyline);
    let budget = fit_budget(budget, total, min_axis, diagnostics)?;

    let target = point_at_distance(&polyline, total - budget.total());
    let index = segment_holding(&polyline, budget.total());
    let located = locate(&spline.segment(index), target, search);
    diagnostics.search_attempts = located.attempts;

    if !located.found {
        return Err(ArrowError::SearchExhausted {
            attempts: located.attempts,
            distance: located.distance,
        });
    }
    Ok(HeadAnchor {
        parameter: index as f64 + located.t,
        budget,
    })
}

fn fit_budget(
    budget: LengthBudget,
    available: f64,
    min_axis: f64,
    diagnostics: &mut ArrowDiagnostics,
) -> Result<LengthBudget, ArrowError> {
    let Some(fitted) = budget.fit(available, min_axis) else {
        return Err(ArrowError::InputTooShort {
            available,
            required: budget.total(),
        });
    };
    if fitted != budget {
        let message = format!(
            "path length {available:.3} is shorter than {:.3}; head axis shrunk to {:.3}",
            budget.total(),
            fitted.primary
        );
        log::warn!("{message}");
        diagnostics.warnings.push(message);
    }
    Ok(fitted)
}

/// Length of the straight run appended past the cut so the stroked body
/// reaches into the head.
fn contact_patch(
    style: ArrowStyle,
    harpoon: f64,
    arrow_length: f64,
    stroke_width: f64,
) -> Option<f64> {
    let length = match style {
        ArrowStyle::Filled => harpoon * harpoon * stroke_width,
        ArrowStyle::Simple => arrow_length / 2.0 - stroke_width,
        ArrowStyle::Empty => return None,
    };
    (length > 0.0).then_some(length)
}

fn tail_shapes(
    spline: &Spline,
    options: &ArrowOptions,
    head_span: f64,
    fallback_angle: f64,
) -> Vec<Shape> {
    if options.tail_kind == TailKind::None {
        return Vec::new();
    }

    let geometry = TailGeometry {
        anchor: spline.start(),
        angle: spline
            .start_angle(Tolerance::ZERO_LENGTH)
            .unwrap_or(fallback_angle),
        width: options.tail_width.unwrap_or(head_span),
        thickness: options.stroke_width,
        tip_angle: options.tip_angle(),
    };
    let style = options.tail_style.resolve(options.head_style);

    match options.tail_kind {
        TailKind::None => Vec::new(),
        TailKind::Crossbar => vec![crossbar(&geometry, style)],
        TailKind::Bullet => vec![bullet(&geometry, style)],
        TailKind::Feather { wings } => feather(&geometry, wings, style),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Flattening for the point-search strategy
// ─────────────────────────────────────────────────────────────────────────────

/// Samples every segment at `FLATTEN_SAMPLES` equal parameter steps. Segment
/// `i` covers polyline points `i * FLATTEN_SAMPLES ..= (i + 1) * FLATTEN_SAMPLES`.
fn flatten(spline: &Spline) -> Vec<Point2> {
    let mut points = Vec::with_capacity(spline.segment_count() * FLATTEN_SAMPLES + 1);
    points.push(spline.start());
    for segment in spline.segments() {
        points.extend(
            (1..=FLATTEN_SAMPLES).map(|k| segment.eval(k as f64 / FLATTEN_SAMPLES as f64)),
        );
    }
    points
}

fn polyline_length(points: &[Point2]) -> f64 {
    points.windows(2).map(|w| w[0].distance_to(w[1])).sum()
}

fn point_at_distance(points: &[Point2], distance: f64) -> Point2 {
    let mut covered = 0.0;
    for w in points.windows(2) {
        let length = w[0].distance_to(w[1]);
        if length > 0.0 && covered + length >= distance {
            let t = ((distance - covered) / length).clamp(0.0, 1.0);
            return w[0].lerp(w[1], t);
        }
        covered += length;
    }
    if distance <= 0.0 {
        points[0]
    } else {
        points[points.len() - 1]
    }
}

/// Index of the segment that contains the point `from_end` before the end of
/// the flattened path.
fn segment_holding(points: &[Point2], from_end: f64) -> usize {
    let segments = (points.len() - 1) / FLATTEN_SAMPLES;
    let mut remaining = from_end;
    for index in (0..segments).rev() {
        let start = index * FLATTEN_SAMPLES;
        let length = polyline_length(&points[start..=start + FLATTEN_SAMPLES]);
        if remaining <= length {
            return index;
        }
        remaining -= length;
    }
    0
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arrows::options::TailStyle;
    use crate::arrows::shapes::Paint;
    use crate::geom::spline_length;
    use std::f64::consts::FRAC_PI_2;

    fn straight(length: f64) -> Spline {
        Spline::line(Point2::ORIGIN, Point2::new(length, 0.0))
    }

    /// Straight line with handles at the thirds, so `u` maps linearly to
    /// arc length.
    fn uniform(length: f64) -> Spline {
        Spline::from_segments(&[CubicBezier2::new(
            Point2::ORIGIN,
            Point2::new(length / 3.0, 0.0),
            Point2::new(2.0 * length / 3.0, 0.0),
            Point2::new(length, 0.0),
        )])
        .expect("one segment")
    }

    #[test]
    fn filled_head_on_straight_line() {
        let plan = plan_arrow(&straight(100.0), &ArrowOptions::new()).expect("plan");

        assert!((plan.cut_point.x - 60.0).abs() < 0.05);
        assert!(plan.cut_point.y.abs() < 1e-9);
        assert!(Tolerance::ANGLE.approx_eq_angle(plan.tangent_angle, 0.0));
        assert!((spline_length(&plan.truncated, 0.001) - 60.0).abs() < 0.05);
        assert_eq!(plan.axis_length, 40.0);
        assert!(!plan.diagnostics.budget_shrunk);

        let points = plan.head.anchor_points();
        assert_eq!(points.len(), 4);
        assert!(plan.head.closed);
        assert!((points[0].distance_to(plan.cut_point) - 40.0).abs() < 1e-9);
        assert!(plan.tail.is_empty());
    }

    #[test]
    fn filled_patch_extends_body_by_stroke_width() {
        let plan = plan_arrow(&straight(100.0), &ArrowOptions::new()).expect("plan");
        assert_eq!(plan.body.segment_count(), plan.truncated.segment_count() + 1);
        assert!((plan.body.end().x - plan.cut_point.x - 4.0).abs() < 1e-9);
    }

    #[test]
    fn outlined_heads_are_compensated_for_stroke_width() {
        let options = ArrowOptions::new()
            .with_head_style(ArrowStyle::Empty)
            .with_tip_angle_deg(90.0);
        let protrusion = options.tip_protrusion();
        let plan = plan_arrow(&uniform(100.0), &options).expect("plan");

        assert!((plan.arrow_length - (40.0 - protrusion)).abs() < 1e-9);
        // Anchor sits one compensated axis plus the protrusion before the end.
        assert!((plan.cut_point.x - (100.0 - 40.0)).abs() < 0.05);
        // Empty heads get no patch.
        assert_eq!(plan.body, plan.truncated);
        assert_eq!(plan.head.paint, Paint::Stroke);
    }

    #[test]
    fn simple_head_patch_is_half_the_length_minus_width() {
        let options = ArrowOptions::new().with_head_style(ArrowStyle::Simple);
        let plan = plan_arrow(&uniform(100.0), &options).expect("plan");
        let patch = plan.body.end().x - plan.cut_point.x;
        assert!((patch - (plan.arrow_length / 2.0 - 4.0)).abs() < 1e-9);
        assert!(!plan.head.closed);
    }

    #[test]
    fn harpoon_shortens_the_axis() {
        let options = ArrowOptions::new().with_anchor_offset(2.0);
        let plan = plan_arrow(&uniform(100.0), &options).expect("plan");
        assert!((plan.axis_length - 32.0).abs() < 1e-9);
        assert!((plan.cut_point.x - 68.0).abs() < 0.05);
    }

    #[test]
    fn short_path_shrinks_the_head() {
        let plan = plan_arrow(&uniform(30.0), &ArrowOptions::new()).expect("plan");
        assert!(plan.diagnostics.budget_shrunk);
        assert!(plan.axis_length < 40.0);
        assert!((plan.axis_length - 30.0).abs() < 0.05);
        assert_eq!(plan.diagnostics.warnings.len(), 1);
    }

    #[test]
    fn shrunk_head_follows_path_after_collapsed_start() {
        let p = Point2::new(5.0, 5.0);
        let spline = Spline::new(vec![
            p,
            p,
            p,
            p,
            Point2::new(5.0, 40.0),
            Point2::new(5.0, 70.0),
            Point2::new(5.0, 105.0),
        ])
        .expect("valid");
        let options = ArrowOptions::new().with_arrow_length(150.0);
        let plan = plan_arrow(&spline, &options).expect("plan");

        assert!(plan.diagnostics.budget_shrunk);
        assert_eq!(plan.cut_point, p);
        assert!(Tolerance::ANGLE.approx_eq_angle(plan.tangent_angle, FRAC_PI_2));
        let tip = plan.head.anchor_points()[0];
        assert!((tip.x - 5.0).abs() < 1e-9 && tip.y > 100.0);
    }

    #[test]
    fn tiny_path_is_too_short() {
        let err = plan_arrow(&uniform(1.0), &ArrowOptions::new()).expect_err("too short");
        assert!(matches!(err, ArrowError::InputTooShort { .. }));
        assert!(err.is_skippable());
    }

    #[test]
    fn invalid_options_are_rejected() {
        let options = ArrowOptions::new().with_tip_angle_deg(0.0);
        let err = plan_arrow(&straight(100.0), &options).expect_err("invalid");
        assert!(matches!(err, ArrowError::InvalidOptions(_)));
        assert!(!err.is_skippable());
    }

    #[test]
    fn point_search_agrees_with_walk() {
        let spline = Spline::from_segments(&[
            CubicBezier2::new(
                Point2::ORIGIN,
                Point2::new(30.0, 40.0),
                Point2::new(60.0, 40.0),
                Point2::new(90.0, 0.0),
            ),
            CubicBezier2::new(
                Point2::new(90.0, 0.0),
                Point2::new(100.0, -15.0),
                Point2::new(110.0, -15.0),
                Point2::new(120.0, 0.0),
            ),
        ])
        .expect("connected");

        let walk = plan_arrow(&spline, &ArrowOptions::new()).expect("walk");
        let search = plan_arrow(
            &spline,
            &ArrowOptions::new().with_anchor_strategy(AnchorStrategy::PointSearch),
        )
        .expect("search");

        assert!(search.diagnostics.search_attempts >= 1);
        assert!(walk.cut_point.distance_to(search.cut_point) < 0.5);
        assert!(walk.parameter.segment == search.parameter.segment);
    }

    #[test]
    fn point_search_can_exhaust() {
        let options = ArrowOptions::new()
            .with_anchor_strategy(AnchorStrategy::PointSearch)
            .with_search(
                SearchOptions::new()
                    .with_tolerance(1e-12)
                    .with_max_depth(1)
                    .with_max_attempts(2),
            );
        let err = plan_arrow(&uniform(100.0), &options).expect_err("exhausted");
        assert!(matches!(err, ArrowError::SearchExhausted { attempts: 2, .. }));
    }

    #[test]
    fn tails_sit_on_the_start() {
        let options = ArrowOptions::new().with_tail(TailKind::Crossbar, TailStyle::SameAsHead);
        let plan = plan_arrow(&uniform(100.0), &options).expect("plan");
        assert_eq!(plan.tail.len(), 1);
        let bar = plan.tail[0].anchor_points();
        let span = HeadGeometry {
            anchor: plan.cut_point,
            angle: plan.tangent_angle,
            axis_length: plan.axis_length,
            arrow_length: plan.arrow_length,
            tip_angle: options.tip_angle(),
        }
        .wing_span();
        // A filled head gives a filled bar one stroke width thick.
        assert!(plan.tail[0].closed);
        assert_eq!(plan.tail[0].paint, Paint::Fill);
        assert!((bar[1].distance_to(bar[2]) - span).abs() < 1e-9);
        assert!(bar.iter().all(|p| (p.x.abs() - 2.0).abs() < 1e-9));

        let options = ArrowOptions::new()
            .with_tail(TailKind::Feather { wings: 3 }, TailStyle::Simple)
            .with_tail_width(Some(8.0));
        let plan = plan_arrow(&uniform(100.0), &options).expect("plan");
        assert_eq!(plan.tail.len(), 3);
    }

    #[test]
    fn batch_skips_short_paths_and_keeps_order() {
        let paths = vec![
            uniform(100.0).to_host_stroke(),
            uniform(1.0).to_host_stroke(),
            uniform(80.0).to_host_stroke(),
        ];
        let report =
            plan_batch(&paths, PathLayout::HostStroke, &ArrowOptions::new()).expect("batch");
        let planned: Vec<usize> = report.planned.iter().map(|p| p.index).collect();
        assert_eq!(planned, vec![0, 2]);
        assert_eq!(report.skipped.len(), 1);
        assert_eq!(report.skipped[0].index, 1);
    }

    #[test]
    fn malformed_path_fails_the_batch() {
        let paths = vec![uniform(100.0).to_flat_coords(), vec![0.0, 0.0, 1.0, 1.0, 2.0]];
        let err =
            plan_batch(&paths, PathLayout::Bare, &ArrowOptions::new()).expect_err("malformed");
        assert!(matches!(
            err,
            ArrowError::Malformed {
                index: 1,
                source: SplineError::OddCoordinateCount { count: 5 }
            }
        ));
    }

    #[test]
    fn flattened_distance_lookup() {
        let polyline = flatten(&uniform(90.0));
        assert!((polyline_length(&polyline) - 90.0).abs() < 1e-9);
        let p = point_at_distance(&polyline, 30.0);
        assert!((p.x - 30.0).abs() < 1e-9);
        assert_eq!(segment_holding(&polyline, 10.0), 0);
    }
}
