//! Locating the parameter of a known point on a cubic segment.
//!
//! Used when the target point is known rather than the target length. The
//! search runs in two phases:
//!
//! 1. A coarse scan evaluates the segment at `segments` equal steps and
//!    brackets the knot closest to the target with its two neighbours.
//! 2. A bisection refinement inserts the midpoints of both halves of the
//!    bracket and re-centres it on the closest of the three inner samples,
//!    until the distance drops below the tolerance or the depth limit hits.
//!
//! A failed refinement restarts the scan with more segments, so a bracket
//! that straddled the wrong local minimum on a tightly curved segment gets a
//! second chance.

use serde::{Deserialize, Serialize};

use super::core::Point2;
use super::curve::CubicBezier2;

/// Tuning of [`locate`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SearchOptions {
    /// Subintervals of the first coarse scan.
    pub initial_segments: usize,
    /// Subintervals added for every retry.
    pub segment_increment: usize,
    /// Total number of scan + refine attempts.
    pub max_attempts: usize,
    /// Refinement rounds per attempt before giving up.
    pub max_depth: usize,
    /// Distance below which the target counts as found.
    pub tolerance: f64,
}

impl SearchOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            initial_segments: 8,
            segment_increment: 3,
            max_attempts: 6,
            max_depth: 16,
            tolerance: 0.2,
        }
    }

    #[must_use]
    pub const fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[must_use]
    pub const fn with_max_attempts(mut self, max_attempts: usize) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    #[must_use]
    pub const fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self::new()
    }
}

/// Outcome of [`locate`]. When `found` is false, `t` and `point` are the
/// closest sample seen across all attempts.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Located {
    pub t: f64,
    pub point: Point2,
    pub distance: f64,
    pub found: bool,
    pub attempts: usize,
}

#[derive(Debug, Clone, Copy)]
struct Bracket {
    t: [f64; 3],
    p: [Point2; 3],
    mid_distance: f64,
}

/// Finds the parameter on `segment` whose point is closest to `target`.
#[must_use]
pub fn locate(segment: &CubicBezier2, target: Point2, options: SearchOptions) -> Located {
    let mut best: Option<Located> = None;
    let attempts = options.max_attempts.max(1);

    for attempt in 0..attempts {
        let segments = options.initial_segments + attempt * options.segment_increment;
        let bracket = coarse_scan(segment, target, segments);
        let mut result = refine(segment, target, bracket, options);
        result.attempts = attempt + 1;

        if result.found {
            log::debug!(
                "located target at t = {} (distance {}) on attempt {}",
                result.t,
                result.distance,
                result.attempts
            );
            return result;
        }

        log::debug!(
            "search attempt {} with {segments} segments missed the target by {}",
            result.attempts,
            result.distance
        );
        if best.is_none_or(|b| result.distance < b.distance) {
            best = Some(result);
        }
    }

    let mut best = best.unwrap_or(Located {
        t: 0.0,
        point: segment.p0,
        distance: segment.p0.distance_to(target),
        found: false,
        attempts,
    });
    best.attempts = attempts;
    best
}

/// Brackets the interior knot closest to `target` among `segments` equal
/// subdivisions of the parameter range.
fn coarse_scan(segment: &CubicBezier2, target: Point2, segments: usize) -> Bracket {
    let segments = segments.max(2);
    let interval = 1.0 / segments as f64;

    let knot = |i: usize| -> (f64, Point2) {
        if i == 0 {
            (0.0, segment.p0)
        } else if i == segments {
            (1.0, segment.p3)
        } else {
            let t = i as f64 * interval;
            (t, segment.split(t).point())
        }
    };

    let mut best_i = 1;
    let mut best_d = f64::INFINITY;
    for i in 1..segments {
        let (_, p) = knot(i);
        let d = p.distance_to(target);
        if d < best_d {
            best_d = d;
            best_i = i;
        }
    }

    let (t1, p1) = knot(best_i - 1);
    let (t3, p3) = knot(best_i);
    let (t5, p5) = knot(best_i + 1);
    Bracket {
        t: [t1, t3, t5],
        p: [p1, p3, p5],
        mid_distance: p3.distance_to(target),
    }
}

/// Narrows `bracket` around the closest sample until it is within tolerance
/// or the depth limit is reached.
fn refine(
    segment: &CubicBezier2,
    target: Point2,
    mut bracket: Bracket,
    options: SearchOptions,
) -> Located {
    let mut depth = 0;
    loop {
        let [t1, t3, t5] = bracket.t;
        let [p1, p3, p5] = bracket.p;
        let t2 = (t1 + t3) / 2.0;
        let t4 = (t3 + t5) / 2.0;
        let p2 = segment.split(t2).point();
        let p4 = segment.split(t4).point();

        let ts = [t1, t2, t3, t4, t5];
        let ps = [p1, p2, p3, p4, p5];
        let inner = [p2.distance_to(target), bracket.mid_distance, p4.distance_to(target)];

        let mut best = 0;
        for (i, d) in inner.iter().enumerate() {
            if *d < inner[best] {
                best = i;
            }
        }
        let j = best + 1;
        let d_min = inner[best];

        if d_min < options.tolerance || depth >= options.max_depth {
            return Located {
                t: ts[j],
                point: ps[j],
                distance: d_min,
                found: d_min < options.tolerance,
                attempts: 0,
            };
        }

        bracket = Bracket {
            t: [ts[j - 1], ts[j], ts[j + 1]],
            p: [ps[j - 1], ps[j], ps[j + 1]],
            mid_distance: d_min,
        };
        depth += 1;
    }
}
