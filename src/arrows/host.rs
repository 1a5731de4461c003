//! Boundary with the drawing application.
//!
//! The planner never talks to the host. [`render_batch`] takes a finished
//! [`BatchReport`](super::plan::BatchReport) and turns each plan into host
//! calls: insert the helper paths, stroke or fill them, and remove them again
//! unless they are to be kept. Drawing state is pushed before the batch and
//! popped afterwards by a guard, also on early return.

use std::ops::{Deref, DerefMut};

use serde::{Deserialize, Serialize};

use super::options::ArrowOptions;
use super::plan::{ArrowError, ArrowPlan, PathLayout, plan_batch};
use super::shapes::{Paint, Shape};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineJoin {
    Miter,
    Round,
    Bevel,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum LineCap {
    Butt,
    Round,
    Square,
}

/// Stroke settings passed to every host stroke call.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DrawStyle {
    pub line_width: f64,
    pub join: LineJoin,
    pub cap: LineCap,
    pub miter_limit: f64,
    pub antialias: bool,
}

impl DrawStyle {
    /// Sharp mitred corners and butt caps, so outlined heads keep their
    /// points and the body ends flush at the cut.
    #[must_use]
    pub const fn for_arrows(line_width: f64) -> Self {
        Self {
            line_width,
            join: LineJoin::Miter,
            cap: LineCap::Butt,
            miter_limit: 100.0,
            antialias: true,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum HostError {
    #[error("unknown path handle {0}")]
    UnknownPath(String),
    #[error("host call failed: {0}")]
    Failed(String),
}

#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Plan(#[from] ArrowError),
    #[error(transparent)]
    Host(#[from] HostError),
}

/// Operations the renderer needs from a drawing application.
pub trait DrawingHost {
    type PathId: Copy + std::fmt::Debug;

    /// Adds a path made of anchor triples (`before, anchor, after`, as flat
    /// `x, y` pairs).
    fn insert_path(
        &mut self,
        name: &str,
        coords: &[f64],
        closed: bool,
    ) -> Result<Self::PathId, HostError>;

    fn remove_path(&mut self, path: Self::PathId) -> Result<(), HostError>;

    fn stroke_path(&mut self, path: Self::PathId, style: &DrawStyle) -> Result<(), HostError>;

    /// Fills the inside of `path` through the selection: the path replaces an
    /// empty selection or is intersected with an existing one, the result is
    /// filled and the previous selection is restored.
    fn fill_path(&mut self, path: Self::PathId) -> Result<(), HostError>;

    /// Saves colours, brush and selection.
    fn push_context(&mut self);

    /// Restores what the matching [`push_context`](Self::push_context) saved.
    fn pop_context(&mut self);
}

/// Holds a pushed host context and pops it when dropped.
pub struct ContextGuard<'a, H: DrawingHost> {
    host: &'a mut H,
}

impl<'a, H: DrawingHost> ContextGuard<'a, H> {
    pub fn new(host: &'a mut H) -> Self {
        host.push_context();
        Self { host }
    }
}

impl<H: DrawingHost> Deref for ContextGuard<'_, H> {
    type Target = H;

    fn deref(&self) -> &H {
        self.host
    }
}

impl<H: DrawingHost> DerefMut for ContextGuard<'_, H> {
    fn deref_mut(&mut self) -> &mut H {
        self.host
    }
}

impl<H: DrawingHost> Drop for ContextGuard<'_, H> {
    fn drop(&mut self) {
        self.host.pop_context();
    }
}

/// Counts of what was drawn.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RenderSummary {
    pub drawn: usize,
    pub skipped: usize,
}

/// Plans and draws arrows for every path in `paths`.
///
/// # Errors
/// Fails without drawing anything when the batch cannot be planned, and
/// stops at the first host error otherwise. The host context is restored in
/// both cases.
pub fn render_batch<H, C>(
    host: &mut H,
    paths: &[C],
    layout: PathLayout,
    options: &ArrowOptions,
) -> Result<RenderSummary, RenderError>
where
    H: DrawingHost,
    C: AsRef<[f64]>,
{
    let report = plan_batch(paths, layout, options)?;
    let style = DrawStyle::for_arrows(options.stroke_width);

    let mut host = ContextGuard::new(host);
    for planned in &report.planned {
        render_plan(&mut *host, planned.index, &planned.plan, &style, options)?;
    }

    Ok(RenderSummary {
        drawn: report.planned.len(),
        skipped: report.skipped.len(),
    })
}

/// Draws one planned arrow.
///
/// # Errors
/// Propagates the first host failure.
pub fn render_plan<H: DrawingHost>(
    host: &mut H,
    index: usize,
    plan: &ArrowPlan,
    style: &DrawStyle,
    options: &ArrowOptions,
) -> Result<(), HostError> {
    let mut inserted = Vec::new();

    let body_name = format!("arrow {index} body");
    let body = host.insert_path(&body_name, &plan.body.to_host_stroke(), false)?;
    inserted.push(body);
    if !options.head_only {
        host.stroke_path(body, style)?;
    }

    let head = draw_shape(host, &format!("arrow {index} head"), &plan.head, style)?;
    inserted.push(head);
    for (i, shape) in plan.tail.iter().enumerate() {
        let tail = draw_shape(host, &format!("arrow {index} tail {i}"), shape, style)?;
        inserted.push(tail);
    }

    if !options.keep_paths {
        for path in inserted {
            host.remove_path(path)?;
        }
    }
    log::debug!("drew arrow {index} at ({}, {})", plan.cut_point.x, plan.cut_point.y);
    Ok(())
}

fn draw_shape<H: DrawingHost>(
    host: &mut H,
    name: &str,
    shape: &Shape,
    style: &DrawStyle,
) -> Result<H::PathId, HostError> {
    let path = host.insert_path(name, &shape.to_host_coords(), shape.closed)?;
    match shape.paint {
        Paint::Fill => host.fill_path(path)?,
        Paint::Stroke => host.stroke_path(path, style)?,
    }
    Ok(path)
}
