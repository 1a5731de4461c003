//! Arrow heads and tails for stroked paths.

mod host;
mod options;
mod plan;
mod shapes;

pub use host::{
    ContextGuard, DrawStyle, DrawingHost, HostError, LineCap, LineJoin, RenderError, RenderSummary,
    render_batch, render_plan,
};
pub use options::{AnchorStrategy, ArrowOptions, ArrowStyle, OptionsError, TailKind, TailStyle};
pub use plan::{
    ArrowDiagnostics, ArrowError, ArrowPlan, BatchReport, MIN_ARROW_LENGTH, PathLayout,
    PlannedArrow, SkippedPath, plan_arrow, plan_batch,
};
pub use shapes::{
    HeadGeometry, Paint, Shape, ShapeAnchor, TailGeometry, bullet, closed_head, crossbar, feather,
    head_shape, open_head,
};
