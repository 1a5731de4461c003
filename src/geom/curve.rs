use super::core::{Point2, Tolerance};

pub trait Curve2 {
    fn point_at(&self, t: f64) -> Point2;

    #[must_use]
    fn domain(&self) -> (f64, f64) {
        (0.0, 1.0)
    }
}

/// One cubic Bezier segment: start anchor, start handle, end handle, end anchor.
///
/// Handles may coincide with their anchors; a segment whose four points are
/// collinear (or all equal) is a valid, degenerate segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicBezier2 {
    pub p0: Point2,
    pub p1: Point2,
    pub p2: Point2,
    pub p3: Point2,
}

impl CubicBezier2 {
    #[must_use]
    pub const fn new(p0: Point2, p1: Point2, p2: Point2, p3: Point2) -> Self {
        Self { p0, p1, p2, p3 }
    }

    /// Straight segment whose handles sit on the anchors.
    #[must_use]
    pub const fn line(start: Point2, end: Point2) -> Self {
        Self::new(start, start, end, end)
    }

    #[must_use]
    pub const fn from_array(points: [Point2; 4]) -> Self {
        Self::new(points[0], points[1], points[2], points[3])
    }

    #[must_use]
    pub const fn to_array(self) -> [Point2; 4] {
        [self.p0, self.p1, self.p2, self.p3]
    }

    /// Distance between the two anchors.
    #[must_use]
    pub fn chord_length(&self) -> f64 {
        self.p0.distance_to(self.p3)
    }

    /// Length of the control polygon, an upper bound of the arc length.
    #[must_use]
    pub fn control_polygon_length(&self) -> f64 {
        self.p0.distance_to(self.p1) + self.p1.distance_to(self.p2) + self.p2.distance_to(self.p3)
    }

    #[must_use]
    pub fn is_degenerate(&self, tol: Tolerance) -> bool {
        tol.is_zero_length(self.control_polygon_length())
    }

    /// De Casteljau subdivision at `t`.
    ///
    /// Values of `t` outside `[0, 1]` extrapolate the curve; callers that need
    /// a point on the segment itself must clamp first.
    #[must_use]
    pub fn split(&self, t: f64) -> Subdivision {
        let p12 = self.p0.lerp(self.p1, t);
        let p23 = self.p1.lerp(self.p2, t);
        let p34 = self.p2.lerp(self.p3, t);

        let p123 = p12.lerp(p23, t);
        let p234 = p23.lerp(p34, t);

        let p1234 = p123.lerp(p234, t);

        Subdivision {
            p1: self.p0,
            p2: self.p1,
            p3: self.p2,
            p4: self.p3,
            p12,
            p23,
            p34,
            p123,
            p234,
            p1234,
        }
    }

    /// Evaluates the curve through the Bernstein form.
    #[must_use]
    pub fn eval(&self, t: f64) -> Point2 {
        let mt = 1.0 - t;
        let b0 = mt * mt * mt;
        let b1 = 3.0 * mt * mt * t;
        let b2 = 3.0 * mt * t * t;
        let b3 = t * t * t;
        Point2::new(
            b0 * self.p0.x + b1 * self.p1.x + b2 * self.p2.x + b3 * self.p3.x,
            b0 * self.p0.y + b1 * self.p1.y + b2 * self.p2.y + b3 * self.p3.y,
        )
    }

    /// Reverses the direction of travel.
    #[must_use]
    pub const fn reversed(&self) -> Self {
        Self::new(self.p3, self.p2, self.p1, self.p0)
    }
}

impl Curve2 for CubicBezier2 {
    fn point_at(&self, t: f64) -> Point2 {
        self.split(t).p1234
    }
}

/// Every point produced by one de Casteljau subdivision of a cubic segment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Subdivision {
    /// Original start anchor.
    pub p1: Point2,
    /// Original start handle.
    pub p2: Point2,
    /// Original end handle.
    pub p3: Point2,
    /// Original end anchor.
    pub p4: Point2,
    pub p12: Point2,
    pub p23: Point2,
    pub p34: Point2,
    pub p123: Point2,
    pub p234: Point2,
    /// The split point, on the curve.
    pub p1234: Point2,
}

impl Subdivision {
    /// The split point.
    #[must_use]
    pub const fn point(&self) -> Point2 {
        self.p1234
    }

    /// Sub-segment from the original start to the split point.
    #[must_use]
    pub const fn left(&self) -> CubicBezier2 {
        CubicBezier2::new(self.p1, self.p12, self.p123, self.p1234)
    }

    /// Sub-segment from the split point to the original end.
    #[must_use]
    pub const fn right(&self) -> CubicBezier2 {
        CubicBezier2::new(self.p1234, self.p234, self.p34, self.p4)
    }

    /// The seven points of both halves in path order, the split point shared.
    #[must_use]
    pub const fn to_array(&self) -> [Point2; 7] {
        [
            self.p1, self.p12, self.p123, self.p1234, self.p234, self.p34, self.p4,
        ]
    }
}

/// Approximate arc length of a curve by chord sampling over its domain.
#[must_use]
pub fn sampled_length<C: Curve2>(curve: &C, samples: usize) -> f64 {
    let samples = samples.max(1);
    let (t0, t1) = curve.domain();
    let span = t1 - t0;
    if !span.is_finite() || span == 0.0 {
        return 0.0;
    }

    let mut length = 0.0;
    let mut prev = curve.point_at(t0);
    for i in 1..=samples {
        let t = t0 + span * (i as f64 / samples as f64);
        let curr = curve.point_at(t);
        length += curr.distance_to(prev);
        prev = curr;
    }
    length
}
