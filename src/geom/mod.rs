mod arc_length;
mod core;
mod curve;
mod search;
mod spline;
mod truncate;

pub use arc_length::{ArcLengthWalk, DEFAULT_STEP, LengthBudget, spline_length, walk_from_end};
pub use core::{Point2, Tolerance, Vec2, direction_angle, normalize_angle};
pub use curve::{CubicBezier2, Curve2, Subdivision, sampled_length};
pub use search::{Located, SearchOptions, locate};
pub use spline::{Spline, SplineError, SplineParameter, flatten_points, points_from_flat};
pub use truncate::{Truncation, tangent_angle, truncate};

#[cfg(test)]
mod tests;
