//! Head and tail outlines.
//!
//! Every builder is a pure function of an anchor point, a direction and a few
//! lengths. Shapes come out as anchor triples in the host's path convention,
//! so polygon corners carry handles that sit on the corner itself.

use std::f64::consts::FRAC_PI_2;

use serde::Serialize;

use super::options::ArrowStyle;
use crate::geom::{Point2, Vec2, flatten_points};

/// Handle length of a quarter circle drawn as one cubic, per unit radius.
const CIRCLE_KAPPA: f64 = 0.552_284_749_830_793_4;

/// How the host should paint a shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Paint {
    /// Filled as a selection mask.
    Fill,
    /// Stroked with the body's line width.
    Stroke,
}

impl Paint {
    const fn for_style(style: ArrowStyle) -> Self {
        match style {
            ArrowStyle::Filled => Self::Fill,
            ArrowStyle::Empty | ArrowStyle::Simple => Self::Stroke,
        }
    }
}

/// An anchor with its incoming and outgoing handles.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct ShapeAnchor {
    pub before: Point2,
    pub anchor: Point2,
    pub after: Point2,
}

impl ShapeAnchor {
    /// A sharp corner: both handles on the anchor.
    #[must_use]
    pub const fn corner(point: Point2) -> Self {
        Self {
            before: point,
            anchor: point,
            after: point,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Shape {
    pub anchors: Vec<ShapeAnchor>,
    pub closed: bool,
    pub paint: Paint,
}

impl Shape {
    /// Straight-edged shape through `points`.
    #[must_use]
    pub fn polygon(points: &[Point2], closed: bool, paint: Paint) -> Self {
        Self {
            anchors: points.iter().copied().map(ShapeAnchor::corner).collect(),
            closed,
            paint,
        }
    }

    #[must_use]
    pub fn anchor_points(&self) -> Vec<Point2> {
        self.anchors.iter().map(|a| a.anchor).collect()
    }

    /// Flat `x, y` list of `before, anchor, after` per anchor.
    #[must_use]
    pub fn to_host_coords(&self) -> Vec<f64> {
        let points: Vec<Point2> = self
            .anchors
            .iter()
            .flat_map(|a| [a.before, a.anchor, a.after])
            .collect();
        flatten_points(&points)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Heads
// ─────────────────────────────────────────────────────────────────────────────

/// Placement of an arrow head.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HeadGeometry {
    /// Where the head meets the body.
    pub anchor: Point2,
    /// Direction from the anchor towards the tip, in radians.
    pub angle: f64,
    /// Anchor-to-tip distance.
    pub axis_length: f64,
    /// Length of each tip-to-wing side.
    pub arrow_length: f64,
    /// Full opening angle at the tip, in radians.
    pub tip_angle: f64,
}

impl HeadGeometry {
    #[must_use]
    pub fn tip(&self) -> Point2 {
        self.anchor.polar_offset(self.angle, self.axis_length)
    }

    /// Wing ends on either side of the axis.
    ///
    /// The sides are lengthened by `1 / cos(tip / 2)` so the wings span the
    /// full arrow length measured along the axis.
    #[must_use]
    pub fn wings(&self) -> (Point2, Point2) {
        let half = self.tip_angle / 2.0;
        let side = self.arrow_length / half.cos();
        let tip = self.tip();
        (
            tip.polar_offset(self.angle + half, -side),
            tip.polar_offset(self.angle - half, -side),
        )
    }

    /// Distance between the two wing ends.
    #[must_use]
    pub fn wing_span(&self) -> f64 {
        let (left, right) = self.wings();
        left.distance_to(right)
    }
}

/// Closed `tip, wing, anchor, wing` outline. With the anchor on the wing
/// line this is a triangle; an anchor moved forward gives a harpoon and one
/// moved back a diamond.
#[must_use]
pub fn closed_head(geometry: &HeadGeometry, paint: Paint) -> Shape {
    let (left, right) = geometry.wings();
    Shape::polygon(&[geometry.tip(), left, geometry.anchor, right], true, paint)
}

/// Open `wing, tip, wing` chevron.
#[must_use]
pub fn open_head(geometry: &HeadGeometry) -> Shape {
    let (left, right) = geometry.wings();
    Shape::polygon(&[left, geometry.tip(), right], false, Paint::Stroke)
}

#[must_use]
pub fn head_shape(style: ArrowStyle, geometry: &HeadGeometry) -> Shape {
    match style {
        ArrowStyle::Filled => closed_head(geometry, Paint::Fill),
        ArrowStyle::Empty => closed_head(geometry, Paint::Stroke),
        ArrowStyle::Simple => open_head(geometry),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tails
// ─────────────────────────────────────────────────────────────────────────────

/// Placement of a tail decoration at the start of a path.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TailGeometry {
    /// The path's start anchor.
    pub anchor: Point2,
    /// Direction the path leaves its start in, in radians.
    pub angle: f64,
    /// Extent across the path.
    pub width: f64,
    /// Extent along the path of a closed crossbar; the body's stroke width.
    pub thickness: f64,
    /// Opening angle used for feather wings, in radians.
    pub tip_angle: f64,
}

/// Bar across the path at its start.
///
/// Simple crossbars are a single stroked line. Filled and empty ones are a
/// closed `width` by `thickness` rectangle centered on the anchor, filled or
/// outlined.
#[must_use]
pub fn crossbar(geometry: &TailGeometry, style: ArrowStyle) -> Shape {
    let along = Vec2::from_angle(geometry.angle);
    let across = along.perp().mul_scalar(geometry.width / 2.0);
    let anchor = geometry.anchor;

    match style {
        ArrowStyle::Simple => {
            Shape::polygon(&[anchor.add_vec(across), anchor.sub_vec(across)], false, Paint::Stroke)
        }
        ArrowStyle::Filled | ArrowStyle::Empty => {
            let half = along.mul_scalar(geometry.thickness / 2.0);
            let corners = [
                anchor.add_vec(across).sub_vec(half),
                anchor.add_vec(across).add_vec(half),
                anchor.sub_vec(across).add_vec(half),
                anchor.sub_vec(across).sub_vec(half),
            ];
            Shape::polygon(&corners, true, Paint::for_style(style))
        }
    }
}

/// Circle of diameter `width` centered on the start anchor, drawn as four
/// cubic quarter arcs.
#[must_use]
pub fn bullet(geometry: &TailGeometry, style: ArrowStyle) -> Shape {
    let radius = geometry.width / 2.0;
    let handle = radius * CIRCLE_KAPPA;
    let anchors = (0..4)
        .map(|quarter| {
            let theta = geometry.angle + f64::from(quarter) * FRAC_PI_2;
            let anchor = geometry.anchor.polar_offset(theta, radius);
            let tangent = Vec2::from_angle(theta + FRAC_PI_2).mul_scalar(handle);
            ShapeAnchor {
                before: anchor.sub_vec(tangent),
                anchor,
                after: anchor.add_vec(tangent),
            }
        })
        .collect();
    Shape {
        anchors,
        closed: true,
        paint: Paint::for_style(style),
    }
}

/// `wings` chevrons pointing along the path, the first one on the start
/// anchor and the rest spaced by half a wing length.
///
/// Filled feathers are closed barbs; the other styles are open strokes.
#[must_use]
pub fn feather(geometry: &TailGeometry, wings: u32, style: ArrowStyle) -> Vec<Shape> {
    let half = geometry.tip_angle / 2.0;
    let side = geometry.width / 2.0 / half.sin();
    let spacing = side / 2.0;

    (0..wings)
        .map(|k| {
            let base = geometry.anchor.polar_offset(geometry.angle, f64::from(k) * spacing);
            let left = base.polar_offset(geometry.angle + half, -side);
            let right = base.polar_offset(geometry.angle - half, -side);
            match style {
                ArrowStyle::Filled => Shape::polygon(&[base, left, right], true, Paint::Fill),
                ArrowStyle::Empty | ArrowStyle::Simple => {
                    Shape::polygon(&[left, base, right], false, Paint::Stroke)
                }
            }
        })
        .collect()
}
