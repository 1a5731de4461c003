//! Piecewise cubic Bezier splines stored as flat control-point lists.
//!
//! A spline of `n` segments holds `3n + 1` points laid out as
//! `anchor, handle, handle, anchor, handle, handle, anchor, ...`; segment `i`
//! owns points `3i..=3i + 3` and shares its end anchor with segment `i + 1`.
//!
//! Hosts export strokes with one extra handle before the first anchor and one
//! after the last anchor (`3n + 3` points). [`Spline::from_host_stroke`] and
//! [`Spline::to_host_stroke`] convert between the two layouts.

use super::core::{Point2, Tolerance, direction_angle};
use super::curve::{CubicBezier2, Curve2};

/// Errors raised for structurally invalid spline input.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SplineError {
    /// Fewer points than a single segment needs.
    #[error("spline needs at least 4 points, got {count}")]
    TooFewPoints { count: usize },

    /// Point count is not `3n + 1`, leaving an unconnected endpoint.
    #[error("spline point count must be 3n + 1, got {count} (dangling endpoint)")]
    DanglingPoints { count: usize },

    /// A flat coordinate list with an unpaired value.
    #[error("coordinate list must hold x/y pairs, got {count} values")]
    OddCoordinateCount { count: usize },

    /// A coordinate is NaN or infinite.
    #[error("point {index} has a non-finite coordinate")]
    NonFinite { index: usize },

    /// Consecutive segments do not share their endpoint.
    #[error("segment {index} does not start on the previous end anchor")]
    Disconnected { index: usize },
}

/// Position on a spline split into segment index and local parameter.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SplineParameter {
    pub segment: usize,
    pub t: f64,
}

impl SplineParameter {
    /// Global parameter `u = segment + t`.
    #[must_use]
    pub fn global(self) -> f64 {
        self.segment as f64 + self.t
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Spline {
    points: Vec<Point2>,
}

impl Spline {
    /// Builds a spline from its control points.
    ///
    /// # Errors
    /// Returns an error when the point count is not `3n + 1` with `n >= 1`, or
    /// when a coordinate is not finite.
    pub fn new(points: Vec<Point2>) -> Result<Self, SplineError> {
        if points.len() < 4 {
            return Err(SplineError::TooFewPoints {
                count: points.len(),
            });
        }
        if points.len() % 3 != 1 {
            return Err(SplineError::DanglingPoints {
                count: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(SplineError::NonFinite { index });
        }
        Ok(Self { points })
    }

    /// Builds a spline from connected segments.
    ///
    /// # Errors
    /// Returns an error when no segment is given or when a segment does not
    /// start on the end anchor of its predecessor.
    pub fn from_segments(segments: &[CubicBezier2]) -> Result<Self, SplineError> {
        let Some(first) = segments.first() else {
            return Err(SplineError::TooFewPoints { count: 0 });
        };

        let mut points = Vec::with_capacity(segments.len() * 3 + 1);
        points.push(first.p0);
        for (index, segment) in segments.iter().enumerate() {
            if points.last() != Some(&segment.p0) {
                return Err(SplineError::Disconnected { index });
            }
            points.extend([segment.p1, segment.p2, segment.p3]);
        }
        Self::new(points)
    }

    /// Single straight segment between two anchors.
    #[must_use]
    pub fn line(start: Point2, end: Point2) -> Self {
        Self {
            points: CubicBezier2::line(start, end).to_array().to_vec(),
        }
    }

    /// Builds a spline from `x0, y0, x1, y1, ...` in the bare `3n + 1` layout.
    ///
    /// # Errors
    /// See [`Spline::new`]; also fails on an odd number of values.
    pub fn from_flat_coords(coords: &[f64]) -> Result<Self, SplineError> {
        Self::new(points_from_flat(coords)?)
    }

    /// Builds a spline from a host stroke export (`3n + 3` points), dropping
    /// the leading and trailing handles.
    ///
    /// # Errors
    /// See [`Spline::from_flat_coords`].
    pub fn from_host_stroke(coords: &[f64]) -> Result<Self, SplineError> {
        let points = points_from_flat(coords)?;
        if points.len() < 6 {
            return Err(SplineError::TooFewPoints {
                count: points.len().saturating_sub(2),
            });
        }
        Self::new(points[1..points.len() - 1].to_vec())
    }

    #[must_use]
    pub fn points(&self) -> &[Point2] {
        &self.points
    }

    #[must_use]
    pub fn segment_count(&self) -> usize {
        (self.points.len() - 1) / 3
    }

    /// Segment `index`.
    ///
    /// # Panics
    /// Panics when `index >= segment_count()`.
    #[must_use]
    pub fn segment(&self, index: usize) -> CubicBezier2 {
        let i = index * 3;
        CubicBezier2::new(
            self.points[i],
            self.points[i + 1],
            self.points[i + 2],
            self.points[i + 3],
        )
    }

    pub fn segments(&self) -> impl Iterator<Item = CubicBezier2> + '_ {
        self.points
            .windows(4)
            .step_by(3)
            .map(|w| CubicBezier2::new(w[0], w[1], w[2], w[3]))
    }

    #[must_use]
    pub fn start(&self) -> Point2 {
        self.points[0]
    }

    #[must_use]
    pub fn end(&self) -> Point2 {
        self.points[self.points.len() - 1]
    }

    /// Splits a global parameter into segment index and local `t`.
    ///
    /// `u` is clamped to `[0, n]`; `u = n` maps to the last segment at `t = 1`.
    #[must_use]
    pub fn parameter(&self, u: f64) -> SplineParameter {
        let n = self.segment_count();
        let u = u.clamp(0.0, n as f64);
        let segment = (u.floor() as usize).min(n - 1);
        SplineParameter {
            segment,
            t: u - segment as f64,
        }
    }

    /// Returns a new spline made of the whole segments before `index`
    /// followed by `tail`, which takes the place of segment `index`.
    ///
    /// # Panics
    /// Panics when `index >= segment_count()`.
    #[must_use]
    pub fn replace_tail(&self, index: usize, tail: CubicBezier2) -> Self {
        assert!(index < self.segment_count(), "segment index out of range");
        let points = self.points[..index * 3]
            .iter()
            .copied()
            .chain(tail.to_array())
            .collect();
        Self { points }
    }

    /// Returns a new spline with `segment` appended at the end.
    ///
    /// The segment's start anchor replaces nothing: it is expected to equal
    /// the current end anchor and is not stored twice.
    #[must_use]
    pub fn with_segment(&self, segment: CubicBezier2) -> Self {
        let points = self
            .points
            .iter()
            .copied()
            .chain([segment.p1, segment.p2, segment.p3])
            .collect();
        Self { points }
    }

    /// The same curve travelled from end to start.
    #[must_use]
    pub fn reversed(&self) -> Self {
        Self {
            points: self.points.iter().rev().copied().collect(),
        }
    }

    /// Direction of travel where the spline leaves its start anchor.
    ///
    /// Uses the first control point distinct from the start anchor, so a
    /// handle collapsed onto its anchor still yields a direction. `None` when
    /// every control point coincides.
    #[must_use]
    pub fn start_angle(&self, tol: Tolerance) -> Option<f64> {
        let start = self.start();
        self.points[1..]
            .iter()
            .find_map(|&p| direction_angle(start, p, tol))
    }

    #[must_use]
    pub fn to_flat_coords(&self) -> Vec<f64> {
        flatten_points(&self.points)
    }

    /// Flat coordinates in the host stroke layout: the first and last anchors
    /// are repeated as the outer handles.
    #[must_use]
    pub fn to_host_stroke(&self) -> Vec<f64> {
        let start = self.start();
        let end = self.end();
        let points: Vec<Point2> = std::iter::once(start)
            .chain(self.points.iter().copied())
            .chain(std::iter::once(end))
            .collect();
        flatten_points(&points)
    }
}

impl Curve2 for Spline {
    fn point_at(&self, u: f64) -> Point2 {
        let param = self.parameter(u);
        self.segment(param.segment).split(param.t).point()
    }

    fn domain(&self) -> (f64, f64) {
        (0.0, self.segment_count() as f64)
    }
}

/// Pairs up `x0, y0, x1, y1, ...` into points.
///
/// # Errors
/// Fails when the value count is odd.
pub fn points_from_flat(coords: &[f64]) -> Result<Vec<Point2>, SplineError> {
    if coords.len() % 2 != 0 {
        return Err(SplineError::OddCoordinateCount {
            count: coords.len(),
        });
    }
    Ok(coords
        .chunks_exact(2)
        .map(|pair| Point2::new(pair[0], pair[1]))
        .collect())
}

/// Flattens points into `x0, y0, x1, y1, ...`.
#[must_use]
pub fn flatten_points(points: &[Point2]) -> Vec<f64> {
    points.iter().flat_map(|p| [p.x, p.y]).collect()
}
