#![warn(clippy::all, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod arrows;
pub mod geom;

use std::fmt;

use arrows::{ArrowDiagnostics, ArrowOptions, ArrowPlan, BatchReport, Paint, PathLayout, Shape};
use geom::Spline;
use serde::Serialize;
use wasm_bindgen::JsError;
use wasm_bindgen::prelude::*;

cfg_if::cfg_if! {
    if #[cfg(all(feature = "console_error_panic_hook", target_arch = "wasm32"))] {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            console_error_panic_hook::set_once();
            init_logger();
        }
    } else {
        #[wasm_bindgen(start)]
        pub fn initialize() {
            // no-op fallback when panic hook is disabled
            init_logger();
        }
    }
}

#[cfg(feature = "debug_logs")]
fn init_logger() {
    use log::LevelFilter;
    use wasm_bindgen_console_logger::DEFAULT_LOGGER;
    if log::set_logger(&DEFAULT_LOGGER).is_ok() {
        log::set_max_level(LevelFilter::Debug);
    }
}

#[cfg(not(feature = "debug_logs"))]
fn init_logger() {
    // no-op fallback when debug logs are disabled
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct ShapeExport {
    coords: Vec<f64>,
    closed: bool,
    paint: Paint,
}

impl From<&Shape> for ShapeExport {
    fn from(shape: &Shape) -> Self {
        Self {
            coords: shape.to_host_coords(),
            closed: shape.closed,
            paint: shape.paint,
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PlanExport<'a> {
    index: usize,
    /// Body path in the host stroke layout.
    body: Vec<f64>,
    cut_point: [f64; 2],
    tangent_angle: f64,
    axis_length: f64,
    arrow_length: f64,
    head: ShapeExport,
    tail: Vec<ShapeExport>,
    diagnostics: &'a ArrowDiagnostics,
}

impl<'a> PlanExport<'a> {
    fn new(index: usize, plan: &'a ArrowPlan) -> Self {
        Self {
            index,
            body: plan.body.to_host_stroke(),
            cut_point: plan.cut_point.to_array(),
            tangent_angle: plan.tangent_angle,
            axis_length: plan.axis_length,
            arrow_length: plan.arrow_length,
            head: ShapeExport::from(&plan.head),
            tail: plan.tail.iter().map(ShapeExport::from).collect(),
            diagnostics: &plan.diagnostics,
        }
    }
}

#[derive(Debug, Serialize)]
struct SkippedExport {
    index: usize,
    reason: String,
}

#[derive(Debug, Serialize)]
struct BatchExport<'a> {
    planned: Vec<PlanExport<'a>>,
    skipped: Vec<SkippedExport>,
}

impl<'a> From<&'a BatchReport> for BatchExport<'a> {
    fn from(report: &'a BatchReport) -> Self {
        Self {
            planned: report
                .planned
                .iter()
                .map(|p| PlanExport::new(p.index, &p.plan))
                .collect(),
            skipped: report
                .skipped
                .iter()
                .map(|s| SkippedExport {
                    index: s.index,
                    reason: s.reason.to_string(),
                })
                .collect(),
        }
    }
}

/// Public entry point for JavaScript hosts. Paths are exchanged in the host
/// stroke layout.
#[wasm_bindgen]
pub struct ArrowEngine {
    options: ArrowOptions,
}

#[wasm_bindgen]
impl ArrowEngine {
    #[wasm_bindgen(constructor)]
    pub fn new() -> ArrowEngine {
        ArrowEngine {
            options: ArrowOptions::default(),
        }
    }

    /// Replaces the options. Missing fields take their defaults.
    #[wasm_bindgen(js_name = setOptions)]
    pub fn set_options(&mut self, options: JsValue) -> Result<(), JsValue> {
        let options: ArrowOptions = serde_wasm_bindgen::from_value(options).map_err(to_js_error)?;
        options.validate().map_err(to_js_error)?;
        self.options = options;
        Ok(())
    }

    #[wasm_bindgen(js_name = getOptions)]
    pub fn options(&self) -> Result<JsValue, JsValue> {
        serde_wasm_bindgen::to_value(&self.options)
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Plans the arrow for one path.
    #[wasm_bindgen(js_name = planArrow)]
    pub fn plan_arrow(&self, coords: Vec<f64>) -> Result<JsValue, JsValue> {
        let spline = Spline::from_host_stroke(&coords).map_err(to_js_error)?;
        let plan = arrows::plan_arrow(&spline, &self.options).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&PlanExport::new(0, &plan))
            .map_err(|err| JsError::new(&err.to_string()).into())
    }

    /// Plans arrows for an array of paths. Short paths are reported under
    /// `skipped`; a malformed path fails the call.
    #[wasm_bindgen(js_name = planBatch)]
    pub fn plan_batch(&self, paths: JsValue) -> Result<JsValue, JsValue> {
        let paths: Vec<Vec<f64>> = serde_wasm_bindgen::from_value(paths).map_err(to_js_error)?;
        let report =
            arrows::plan_batch(&paths, PathLayout::HostStroke, &self.options).map_err(to_js_error)?;
        serde_wasm_bindgen::to_value(&BatchExport::from(&report))
            .map_err(|err| JsError::new(&err.to_string()).into())
    }
}

impl Default for ArrowEngine {
    fn default() -> Self {
        Self::new()
    }
}

fn to_js_error<E: fmt::Display>(error: E) -> JsValue {
    js_error(&error.to_string())
}

fn js_error(message: &str) -> JsValue {
    #[cfg(target_arch = "wasm32")]
    {
        JsError::new(message).into()
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        let _ = message;
        JsValue::NULL
    }
}
