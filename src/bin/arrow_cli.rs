#[cfg(target_arch = "wasm32")]
fn main() {}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    native::init_logging();
    if let Err(err) = native::run() {
        eprintln!("arrow_cli error: {err}");
        std::process::exit(1);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::fmt::Write as _;

    use stroke_arrows::arrows::{
        AnchorStrategy, ArrowOptions, ArrowPlan, ArrowStyle, Shape, TailKind, TailStyle, plan_arrow,
    };
    use stroke_arrows::geom::{Point2, Spline};

    const USAGE: &str = r#"arrow_cli (stroke-arrows)

USAGE:
  arrow_cli plan --points "<x,y x,y ...>" [options]

The points are the bare control list of a cubic spline: anchor, handle,
handle, anchor, ... (3n + 1 points).

OPTIONS (plan):
  --points <list>    Control points, space separated `x,y` pairs (required)
  --host             Points use the host stroke layout (3n + 3 points)
  --style <style>    filled | empty | simple (default: filled)
  --length <L>       Arrow length (default: 40)
  --width <W>        Stroke width (default: 4)
  --tip <DEG>        Tip angle in degrees (default: 35)
  --offset <K>       Anchor offset; positive gives a harpoon (default: 0)
  --tail <kind>      none | crossbar | bullet | feather[:wings] (default: none)
  --step <S>         Walker step in parameter units (default: 0.001)
  --search           Locate the anchor with the point search
  -h, --help         Show this help
"#;

    /// Installs the stderr logger. `RUST_LOG` overrides the default `warn`
    /// filter. Returns `false` when a logger was already installed.
    pub fn init_logging() -> bool {
        env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn"))
            .format_timestamp(None)
            .try_init()
            .is_ok()
    }

    pub fn run() -> Result<(), String> {
        let args: Vec<String> = std::env::args().skip(1).collect();
        let mut args = Args::new(args);

        let Some(command) = args.next() else {
            print_usage();
            return Ok(());
        };

        match command.as_str() {
            "plan" => cmd_plan(&mut args),
            "-h" | "--help" | "help" => {
                print_usage();
                Ok(())
            }
            other => Err(format!("unknown command `{other}`\n\n{USAGE}")),
        }
    }

    fn print_usage() {
        println!("{USAGE}");
    }

    fn cmd_plan(args: &mut Args) -> Result<(), String> {
        let mut points: Option<String> = None;
        let mut host_layout = false;
        let mut options = ArrowOptions::new();

        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--points" => points = Some(args.value("--points")?),
                "--host" => host_layout = true,
                "--style" => options.head_style = parse_style(&args.value("--style")?)?,
                "--length" => options.arrow_length = args.number("--length")?,
                "--width" => options.stroke_width = args.number("--width")?,
                "--tip" => options.tip_angle_deg = args.number("--tip")?,
                "--offset" => options.anchor_offset = args.number("--offset")?,
                "--tail" => {
                    let tail = parse_tail(&args.value("--tail")?)?;
                    options = options.with_tail(tail, TailStyle::SameAsHead);
                }
                "--step" => options.step = args.number("--step")?,
                "--search" => options.anchor_strategy = AnchorStrategy::PointSearch,
                "-h" | "--help" => {
                    print_usage();
                    return Ok(());
                }
                other => return Err(format!("unknown option `{other}`\n\n{USAGE}")),
            }
        }

        let points = points.ok_or("missing --points")?;
        let coords = parse_points(&points)?;
        let spline = if host_layout {
            Spline::from_host_stroke(&coords)
        } else {
            Spline::from_flat_coords(&coords)
        }
        .map_err(|e| format!("invalid path: {e}"))?;

        let plan = plan_arrow(&spline, &options).map_err(|e| e.to_string())?;
        print!("{}", describe(&plan));

        for warning in &plan.diagnostics.warnings {
            eprintln!("warning: {warning}");
        }
        eprintln!(
            "walk steps={} search attempts={} length {:.3} -> {:.3}",
            plan.diagnostics.walk_steps,
            plan.diagnostics.search_attempts,
            plan.diagnostics.requested_length,
            plan.diagnostics.fitted_length
        );
        Ok(())
    }

    fn describe(plan: &ArrowPlan) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "body: {}", format_points(plan.body.points()));
        let _ = writeln!(out, "cut: {}", format_point(plan.cut_point));
        let _ = writeln!(
            out,
            "angle: {:.6} rad ({:.3} deg)",
            plan.tangent_angle,
            plan.tangent_angle.to_degrees()
        );
        let _ = writeln!(out, "axis: {:.6} length: {:.6}", plan.axis_length, plan.arrow_length);
        let _ = writeln!(out, "head: {}", format_shape(&plan.head));
        for (i, shape) in plan.tail.iter().enumerate() {
            let _ = writeln!(out, "tail {i}: {}", format_shape(shape));
        }
        out
    }

    fn format_shape(shape: &Shape) -> String {
        format!(
            "{} {:?} {}",
            if shape.closed { "closed" } else { "open" },
            shape.paint,
            format_points(&shape.anchor_points())
        )
    }

    fn format_points(points: &[Point2]) -> String {
        points
            .iter()
            .map(|p| format_point(*p))
            .collect::<Vec<_>>()
            .join(" ")
    }

    fn format_point(p: Point2) -> String {
        format!("{:.6},{:.6}", p.x, p.y)
    }

    fn parse_points(text: &str) -> Result<Vec<f64>, String> {
        let mut coords = Vec::new();
        for pair in text.split_whitespace() {
            let (x, y) = pair
                .split_once(',')
                .ok_or_else(|| format!("point `{pair}` is not an `x,y` pair"))?;
            coords.push(parse_number("--points", x)?);
            coords.push(parse_number("--points", y)?);
        }
        Ok(coords)
    }

    fn parse_number(flag: &str, text: &str) -> Result<f64, String> {
        text.trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid number `{text}` for {flag}: {e}"))
    }

    fn parse_style(text: &str) -> Result<ArrowStyle, String> {
        match text {
            "filled" => Ok(ArrowStyle::Filled),
            "empty" => Ok(ArrowStyle::Empty),
            "simple" => Ok(ArrowStyle::Simple),
            other => Err(format!("unknown style `{other}` (expected filled, empty or simple)")),
        }
    }

    fn parse_tail(text: &str) -> Result<TailKind, String> {
        match text.split_once(':') {
            Some(("feather", wings)) => wings
                .parse::<u32>()
                .map(|wings| TailKind::Feather { wings })
                .map_err(|e| format!("invalid feather wing count `{wings}`: {e}")),
            Some((other, _)) => Err(format!("unknown tail `{other}`")),
            None => match text {
                "none" => Ok(TailKind::None),
                "crossbar" => Ok(TailKind::Crossbar),
                "bullet" => Ok(TailKind::Bullet),
                "feather" => Ok(TailKind::Feather { wings: 1 }),
                other => Err(format!("unknown tail `{other}`")),
            },
        }
    }

    struct Args {
        args: Vec<String>,
        pos: usize,
    }

    impl Args {
        fn new(args: Vec<String>) -> Self {
            Self { args, pos: 0 }
        }

        fn next(&mut self) -> Option<String> {
            let arg = self.args.get(self.pos)?.clone();
            self.pos += 1;
            Some(arg)
        }

        fn value(&mut self, flag: &str) -> Result<String, String> {
            self.next().ok_or_else(|| format!("missing value for {flag}"))
        }

        fn number(&mut self, flag: &str) -> Result<f64, String> {
            parse_number(flag, &self.value(flag)?)
        }
    }

}
