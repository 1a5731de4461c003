//! Arc-length walking from the end of a spline.
//!
//! The walker steps the global parameter `u` backward from `n` in fixed
//! increments, summing chord lengths between successive curve points until a
//! target length is covered. The last step usually overshoots; the overshoot
//! is removed by a linear correction inside that step, so the residual error
//! is bounded by the curvature within a single step. `step` trades precision
//! for cost: a walk costs `O(n / step)` point evaluations.

use super::core::Point2;
use super::spline::Spline;

/// Default walker step in global parameter units.
pub const DEFAULT_STEP: f64 = 0.001;

/// Result of walking backward along a spline.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ArcLengthWalk {
    /// Global parameter of the located point, in `[0, n]`.
    pub parameter: f64,
    /// Chord length accumulated by the walk, before overshoot correction.
    pub length: f64,
    /// How far the last step went past the target (zero when the start was
    /// reached first).
    pub overshoot: f64,
    /// Number of steps taken.
    pub steps: usize,
    /// `true` when the spline start was reached before the target length.
    pub reached_start: bool,
}

impl ArcLengthWalk {
    /// Length the walk managed to measure; the whole spline when the start
    /// was reached.
    #[must_use]
    pub fn available(&self) -> f64 {
        if self.reached_start {
            self.length
        } else {
            self.length - self.overshoot
        }
    }
}

/// One point visited by the walker.
#[derive(Debug, Clone, Copy, PartialEq)]
struct ArcLengthSample {
    parameter: f64,
    point: Point2,
    length: f64,
}

/// Walks backward from the end of `spline` until `target` arc length is
/// covered.
///
/// A non-positive target returns `u = n` without stepping. When the spline
/// is shorter than `target` the walk stops exactly at `u = 0` with
/// `reached_start` set; [`LengthBudget::fit`] decides what to do with the
/// shortfall.
#[must_use]
pub fn walk_from_end(spline: &Spline, target: f64, step: f64) -> ArcLengthWalk {
    let n = spline.segment_count() as f64;
    let step = if step.is_finite() && step > 0.0 {
        step
    } else {
        log::warn!("invalid walker step {step}, using {DEFAULT_STEP}");
        DEFAULT_STEP
    };

    if target.is_nan() || target <= 0.0 {
        return ArcLengthWalk {
            parameter: n,
            length: 0.0,
            overshoot: 0.0,
            steps: 0,
            reached_start: false,
        };
    }

    let mut prev = ArcLengthSample {
        parameter: n,
        point: spline.end(),
        length: 0.0,
    };
    let mut steps = 0;

    loop {
        let u = (prev.parameter - step).max(0.0);
        let param = spline.parameter(u);
        let point = spline.segment(param.segment).split(param.t).point();
        let delta = point.distance_to(prev.point);
        let current = ArcLengthSample {
            parameter: u,
            point,
            length: prev.length + delta,
        };
        steps += 1;

        if current.length >= target {
            let overshoot = current.length - target;
            let covered = prev.parameter - current.parameter;
            let correction = if delta > 0.0 {
                covered * overshoot / delta
            } else {
                0.0
            };
            let parameter = (current.parameter + correction).min(prev.parameter);
            log::debug!(
                "walk reached {target} after {steps} steps at u = {parameter} \
                 (overshoot {overshoot})"
            );
            return ArcLengthWalk {
                parameter,
                length: current.length,
                overshoot,
                steps,
                reached_start: false,
            };
        }

        if current.parameter <= 0.0 {
            log::debug!(
                "walk reached spline start after {steps} steps, {} of {target} covered",
                current.length
            );
            return ArcLengthWalk {
                parameter: 0.0,
                length: current.length,
                overshoot: 0.0,
                steps,
                reached_start: true,
            };
        }

        prev = current;
    }
}

/// Total arc length of `spline` as measured by the walker with `step`.
#[must_use]
pub fn spline_length(spline: &Spline, step: f64) -> f64 {
    walk_from_end(spline, f64::INFINITY, step).length
}

/// A length requirement split into a primary length and a secondary cut
/// distance that may be given up first when the spline is too short.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LengthBudget {
    pub primary: f64,
    pub secondary: f64,
}

impl LengthBudget {
    #[must_use]
    pub const fn new(primary: f64, secondary: f64) -> Self {
        Self { primary, secondary }
    }

    #[must_use]
    pub fn total(&self) -> f64 {
        self.primary + self.secondary
    }

    /// Shrinks the budget so its total fits in `available`.
    ///
    /// The secondary distance is reduced first, down to zero; the rest of the
    /// shortfall comes off the primary length. Returns `None` when the primary
    /// length would drop below `min_primary`.
    #[must_use]
    pub fn fit(self, available: f64, min_primary: f64) -> Option<Self> {
        let total = self.total();
        if available >= total {
            return Some(self);
        }

        let shortfall = total - available;
        let secondary = (self.secondary - shortfall).max(0.0);
        let remaining = shortfall - (self.secondary - secondary);
        let primary = self.primary - remaining;

        if primary.is_nan() || primary < min_primary {
            return None;
        }
        Some(Self { primary, secondary })
    }
}
