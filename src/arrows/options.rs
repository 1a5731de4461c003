use serde::{Deserialize, Serialize};

use crate::geom::{DEFAULT_STEP, SearchOptions};

/// How a head or tail shape is drawn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ArrowStyle {
    /// Closed outline, filled.
    #[default]
    Filled,
    /// Closed outline, stroked only.
    Empty,
    /// Open chevron, stroked.
    Simple,
}

impl ArrowStyle {
    /// Outlined styles are stroked with the path's line width and need the
    /// tip protrusion compensated for.
    #[must_use]
    pub const fn is_stroked(self) -> bool {
        matches!(self, Self::Empty | Self::Simple)
    }
}

/// Decoration drawn at the start of the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", tag = "kind")]
pub enum TailKind {
    #[default]
    None,
    /// A bar across the path.
    Crossbar,
    /// A circle centered on the start anchor.
    Bullet,
    /// Chevron wings set back along the path.
    Feather { wings: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TailStyle {
    #[default]
    SameAsHead,
    Filled,
    Empty,
    Simple,
}

impl TailStyle {
    /// Concrete style for a tail drawn next to a head of style `head`.
    #[must_use]
    pub const fn resolve(self, head: ArrowStyle) -> ArrowStyle {
        match self {
            Self::SameAsHead => head,
            Self::Filled => ArrowStyle::Filled,
            Self::Empty => ArrowStyle::Empty,
            Self::Simple => ArrowStyle::Simple,
        }
    }
}

/// Where the head anchor is located on the path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum AnchorStrategy {
    /// Walk the arc length backward from the end.
    #[default]
    ArcLengthWalk,
    /// Measure from the start on a flattened copy, then search the segment
    /// holding that point for its parameter.
    PointSearch,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum OptionsError {
    #[error("{field} must be a finite number, got {value}")]
    NonFinite { field: &'static str, value: f64 },
    #[error("{field} must be positive, got {value}")]
    NotPositive { field: &'static str, value: f64 },
    #[error("{field} must not be negative, got {value}")]
    Negative { field: &'static str, value: f64 },
    #[error("tip angle must lie strictly between 0 and 180 degrees, got {degrees}")]
    TipAngleOutOfRange { degrees: f64 },
    #[error("anchor offset {offset} leaves no head axis (must be below 10)")]
    AnchorOffsetTooLarge { offset: f64 },
    #[error("a feather tail needs at least one wing")]
    NoFeatherWings,
}

/// Options for planning arrows on a batch of paths.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ArrowOptions {
    pub head_style: ArrowStyle,
    /// Line width the body path is stroked with.
    pub stroke_width: f64,
    /// Length of the head sides, before stroke-width compensation.
    pub arrow_length: f64,
    /// Full opening angle of the head, in degrees.
    pub tip_angle_deg: f64,
    /// Moves the head anchor along the axis: positive values give a harpoon,
    /// negative values a diamond.
    pub anchor_offset: f64,
    /// Draw the decorations only, not the body stroke.
    pub head_only: bool,
    /// Leave the helper paths in the host after drawing.
    pub keep_paths: bool,
    pub tail_kind: TailKind,
    pub tail_style: TailStyle,
    /// Width across the tail; derived from the head's wing span when unset.
    pub tail_width: Option<f64>,
    /// Walker step in global parameter units.
    pub step: f64,
    pub anchor_strategy: AnchorStrategy,
    pub search: SearchOptions,
}

impl ArrowOptions {
    #[must_use]
    pub const fn new() -> Self {
        Self {
            head_style: ArrowStyle::Filled,
            stroke_width: 4.0,
            arrow_length: 40.0,
            tip_angle_deg: 35.0,
            anchor_offset: 0.0,
            head_only: false,
            keep_paths: false,
            tail_kind: TailKind::None,
            tail_style: TailStyle::SameAsHead,
            tail_width: None,
            step: DEFAULT_STEP,
            anchor_strategy: AnchorStrategy::ArcLengthWalk,
            search: SearchOptions::new(),
        }
    }

    #[must_use]
    pub const fn with_head_style(mut self, style: ArrowStyle) -> Self {
        self.head_style = style;
        self
    }

    #[must_use]
    pub const fn with_stroke_width(mut self, width: f64) -> Self {
        self.stroke_width = width;
        self
    }

    #[must_use]
    pub const fn with_arrow_length(mut self, length: f64) -> Self {
        self.arrow_length = length;
        self
    }

    #[must_use]
    pub const fn with_tip_angle_deg(mut self, degrees: f64) -> Self {
        self.tip_angle_deg = degrees;
        self
    }

    #[must_use]
    pub const fn with_anchor_offset(mut self, offset: f64) -> Self {
        self.anchor_offset = offset;
        self
    }

    #[must_use]
    pub const fn with_head_only(mut self, head_only: bool) -> Self {
        self.head_only = head_only;
        self
    }

    #[must_use]
    pub const fn with_keep_paths(mut self, keep_paths: bool) -> Self {
        self.keep_paths = keep_paths;
        self
    }

    #[must_use]
    pub const fn with_tail(mut self, kind: TailKind, style: TailStyle) -> Self {
        self.tail_kind = kind;
        self.tail_style = style;
        self
    }

    #[must_use]
    pub const fn with_tail_width(mut self, width: Option<f64>) -> Self {
        self.tail_width = width;
        self
    }

    #[must_use]
    pub const fn with_step(mut self, step: f64) -> Self {
        self.step = step;
        self
    }

    #[must_use]
    pub const fn with_anchor_strategy(mut self, strategy: AnchorStrategy) -> Self {
        self.anchor_strategy = strategy;
        self
    }

    #[must_use]
    pub const fn with_search(mut self, search: SearchOptions) -> Self {
        self.search = search;
        self
    }

    /// Head opening angle in radians.
    #[must_use]
    pub fn tip_angle(&self) -> f64 {
        self.tip_angle_deg.to_radians()
    }

    /// Ratio of the head axis to the arrow length.
    #[must_use]
    pub fn harpoon_factor(&self) -> f64 {
        1.0 - self.anchor_offset / 10.0
    }

    /// How far the outer corner of a stroked tip sticks out past the tip
    /// point: `w / 2 / sin(tip / 2)`.
    #[must_use]
    pub fn tip_protrusion(&self) -> f64 {
        self.stroke_width / 2.0 / (self.tip_angle() / 2.0).sin()
    }

    /// Checks every numeric field against its domain.
    ///
    /// # Errors
    /// Returns the first field found out of range.
    pub fn validate(&self) -> Result<(), OptionsError> {
        let finite = [
            ("strokeWidth", self.stroke_width),
            ("arrowLength", self.arrow_length),
            ("tipAngleDeg", self.tip_angle_deg),
            ("anchorOffset", self.anchor_offset),
            ("step", self.step),
            ("search.tolerance", self.search.tolerance),
        ];
        if let Some(&(field, value)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(OptionsError::NonFinite { field, value });
        }

        if self.stroke_width < 0.0 {
            return Err(OptionsError::Negative {
                field: "strokeWidth",
                value: self.stroke_width,
            });
        }
        let positive = [
            ("arrowLength", self.arrow_length),
            ("step", self.step),
            ("search.tolerance", self.search.tolerance),
        ];
        if let Some(&(field, value)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(OptionsError::NotPositive { field, value });
        }

        if self.tip_angle_deg <= 0.0 || self.tip_angle_deg >= 180.0 {
            return Err(OptionsError::TipAngleOutOfRange {
                degrees: self.tip_angle_deg,
            });
        }
        if self.harpoon_factor() <= 0.0 {
            return Err(OptionsError::AnchorOffsetTooLarge {
                offset: self.anchor_offset,
            });
        }

        if let Some(width) = self.tail_width {
            if !width.is_finite() {
                return Err(OptionsError::NonFinite {
                    field: "tailWidth",
                    value: width,
                });
            }
            if width <= 0.0 {
                return Err(OptionsError::NotPositive {
                    field: "tailWidth",
                    value: width,
                });
            }
        }
        if self.tail_kind == (TailKind::Feather { wings: 0 }) {
            return Err(OptionsError::NoFeatherWings);
        }
        Ok(())
    }
}

impl Default for ArrowOptions {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_validate() {
        let options = ArrowOptions::default();
        assert_eq!(options.head_style, ArrowStyle::Filled);
        assert_eq!(options.arrow_length, 40.0);
        assert!(options.validate().is_ok());
        assert!((options.harpoon_factor() - 1.0).abs() < 1e-12);
    }

    #[test]
    fn tip_angle_must_be_open() {
        for degrees in [0.0, 180.0, -10.0, 200.0] {
            let options = ArrowOptions::new().with_tip_angle_deg(degrees);
            assert!(matches!(
                options.validate(),
                Err(OptionsError::TipAngleOutOfRange { .. })
            ));
        }
    }

    #[test]
    fn rejects_non_finite_and_non_positive() {
        let options = ArrowOptions::new().with_arrow_length(f64::NAN);
        assert!(matches!(
            options.validate(),
            Err(OptionsError::NonFinite { field: "arrowLength", .. })
        ));

        let options = ArrowOptions::new().with_step(0.0);
        assert!(matches!(
            options.validate(),
            Err(OptionsError::NotPositive { field: "step", .. })
        ));

        let options = ArrowOptions::new().with_stroke_width(-1.0);
        assert!(matches!(options.validate(), Err(OptionsError::Negative { .. })));

        let options = ArrowOptions::new().with_tail_width(Some(0.0));
        assert!(matches!(
            options.validate(),
            Err(OptionsError::NotPositive { field: "tailWidth", .. })
        ));
    }

    #[test]
    fn anchor_offset_of_ten_collapses_the_axis() {
        let options = ArrowOptions::new().with_anchor_offset(10.0);
        assert!(matches!(
            options.validate(),
            Err(OptionsError::AnchorOffsetTooLarge { .. })
        ));
        assert!(ArrowOptions::new().with_anchor_offset(-5.0).validate().is_ok());
    }

    #[test]
    fn feather_needs_wings() {
        let options =
            ArrowOptions::new().with_tail(TailKind::Feather { wings: 0 }, TailStyle::SameAsHead);
        assert_eq!(options.validate(), Err(OptionsError::NoFeatherWings));
    }

    #[test]
    fn tail_style_follows_head() {
        assert_eq!(TailStyle::SameAsHead.resolve(ArrowStyle::Empty), ArrowStyle::Empty);
        assert_eq!(TailStyle::Simple.resolve(ArrowStyle::Filled), ArrowStyle::Simple);
    }

    #[test]
    fn protrusion_grows_as_the_tip_narrows() {
        let wide = ArrowOptions::new().with_tip_angle_deg(90.0);
        let narrow = ArrowOptions::new().with_tip_angle_deg(20.0);
        assert!((wide.tip_protrusion() - 2.0 * std::f64::consts::SQRT_2).abs() < 1e-9);
        assert!(narrow.tip_protrusion() > wide.tip_protrusion());
    }

    #[test]
    fn deserializes_camel_case_with_defaults() {
        let options: ArrowOptions = serde_json::from_str(
            r#"{"headStyle":"simple","arrowLength":25,"tailKind":{"kind":"feather","wings":2}}"#,
        )
        .expect("valid options");
        assert_eq!(options.head_style, ArrowStyle::Simple);
        assert_eq!(options.arrow_length, 25.0);
        assert_eq!(options.tail_kind, TailKind::Feather { wings: 2 });
        assert_eq!(options.stroke_width, 4.0);
    }
}
