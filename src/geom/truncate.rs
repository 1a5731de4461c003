use super::core::{Point2, Tolerance, direction_angle};
use super::curve::Subdivision;
use super::spline::{Spline, SplineParameter};

/// A spline cut short at a parameter, with the direction of travel there.
#[derive(Debug, Clone, PartialEq)]
pub struct Truncation {
    /// The spline from its start up to the cut point.
    pub spline: Spline,
    /// Where the spline was cut; the new end anchor.
    pub cut_point: Point2,
    /// Direction of travel at the cut point, in radians.
    pub tangent_angle: f64,
    /// The parameter the cut was made at, after boundary normalization.
    pub parameter: SplineParameter,
}

/// Cuts `spline` at global parameter `u`, keeping the part before it.
///
/// Whole segments before `floor(u)` are kept unchanged and segment
/// `floor(u)` is replaced by the left half of its subdivision at `frac(u)`.
/// A cut that lands exactly on an inner anchor is taken at the end of the
/// previous segment rather than at the start of the next one, so no
/// zero-length tail segment is produced. A collapsed previous segment is
/// left alone; the cut then stays at the start of the next one.
///
/// When the cut segment has no direction of its own, the tangent comes from
/// the nearest distinct control point elsewhere on the spline, looking back
/// first. Only a spline whose points all coincide yields `0.0`.
#[must_use]
pub fn truncate(spline: &Spline, u: f64) -> Truncation {
    let tol = Tolerance::ZERO_LENGTH;
    let mut parameter = spline.parameter(u);
    if parameter.segment > 0
        && tol.approx_zero_f64(parameter.t)
        && !spline.segment(parameter.segment - 1).is_degenerate(tol)
    {
        parameter = SplineParameter {
            segment: parameter.segment - 1,
            t: 1.0,
        };
    }

    let sub = spline.segment(parameter.segment).split(parameter.t);
    let tangent_angle = tangent_angle(&sub, tol)
        .or_else(|| neighbour_angle(spline, parameter.segment, sub.point(), tol))
        .unwrap_or_else(|| {
            log::warn!("spline has no direction at all, using 0 for the tangent");
            0.0
        });

    Truncation {
        spline: spline.replace_tail(parameter.segment, sub.left()),
        cut_point: sub.point(),
        tangent_angle,
        parameter,
    }
}

/// Direction of travel at the split point of `sub`.
///
/// Taken from the incoming handle `P123 → P1234`. When that vector vanishes
/// (handles collapsed onto anchors, cut at a segment end) the nearest distinct
/// control point behind the cut is used, then the nearest one ahead of it.
/// `None` for a fully collapsed segment.
#[must_use]
pub fn tangent_angle(sub: &Subdivision, tol: Tolerance) -> Option<f64> {
    let cut = sub.p1234;
    [sub.p123, sub.p12, sub.p1]
        .into_iter()
        .find_map(|behind| direction_angle(behind, cut, tol))
        .or_else(|| {
            [sub.p234, sub.p34, sub.p4]
                .into_iter()
                .find_map(|ahead| direction_angle(cut, ahead, tol))
        })
}

/// Direction at `cut` taken from the control points of the segments around
/// `segment`: the nearest distinct point before it, else the nearest after.
fn neighbour_angle(spline: &Spline, segment: usize, cut: Point2, tol: Tolerance) -> Option<f64> {
    let points = spline.points();
    let first = segment * 3;
    points[..first]
        .iter()
        .rev()
        .find_map(|&behind| direction_angle(behind, cut, tol))
        .or_else(|| {
            points[first + 4..]
                .iter()
                .find_map(|&ahead| direction_angle(cut, ahead, tol))
        })
}
