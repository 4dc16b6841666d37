use anyhow::{Context, bail};
use clap::Parser;
use log::{debug, info};
use progressive_fractal::{
    CoordValue, FractalSet, NumericType, RenderEvent, RenderOrchestrator, RenderRequest,
    RendererConfig, RendererPresenterPort, write_ppm,
};
use simplelog::{ColorChoice, Config, LevelFilter, TermLogger, TerminalMode};
use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc;

/// Renders a Mandelbrot or Julia set progressively and writes the final
/// image as a binary PPM file.
#[derive(Parser, Debug)]
#[command(name = "progressive_fractal", version)]
struct Cli {
    #[arg(long, default_value_t = 800)]
    width: u32,

    #[arg(long, default_value_t = 600)]
    height: u32,

    /// Real part of the image centre; accepts arbitrary precision decimals.
    #[arg(long, default_value = "-0.5", allow_hyphen_values = true)]
    center_x: String,

    /// Imaginary part of the image centre.
    #[arg(long, default_value = "0", allow_hyphen_values = true)]
    center_y: String,

    /// Distance between neighbouring pixels in the complex plane.
    #[arg(long, default_value_t = 0.004)]
    scale: f64,

    /// Julia seed as two decimals, renders the Mandelbrot set when absent.
    #[arg(
        long,
        num_args = 2,
        value_names = ["X", "Y"],
        allow_hyphen_values = true
    )]
    julia: Option<Vec<String>>,

    /// Number of passes: 4, 6, 7 or 8.
    #[arg(long)]
    passes: Option<u32>,

    /// Worker threads; defaults to the hardware threads minus two.
    #[arg(long)]
    threads: Option<usize>,

    /// Numeric type by short name: f32, f64, custom, dec20, dec30, dec50,
    /// f80, f128, i32, i64 or i128.
    #[arg(long, default_value = "f64")]
    numeric: NumericType,

    #[arg(long)]
    colour_map_size: Option<usize>,

    /// Keep each strip with its first worker.
    #[arg(long)]
    no_dynamic: bool,

    #[arg(long, short, default_value = "output/fractal.ppm")]
    output: PathBuf,

    /// More log output; repeat for trace.
    #[arg(long, short, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Only log warnings and errors.
    #[arg(long, short)]
    quiet: bool,
}

impl Cli {
    fn log_level(&self) -> LevelFilter {
        if self.quiet {
            return LevelFilter::Warn;
        }

        match self.verbose {
            0 => LevelFilter::Info,
            1 => LevelFilter::Debug,
            _ => LevelFilter::Trace,
        }
    }

    fn config(&self) -> RendererConfig {
        let mut config = RendererConfig::default();

        if let Some(threads) = self.threads {
            config.worker_threads = threads;
        }
        if let Some(passes) = self.passes {
            config.passes = passes;
        }
        if let Some(size) = self.colour_map_size {
            config.colour_map_size = size;
        }
        config.numeric_type = self.numeric;
        config.dynamic_allocation = !self.no_dynamic;

        config
    }

    fn request(&self) -> anyhow::Result<RenderRequest> {
        let origin_x = CoordValue::parse(&self.center_x).context("invalid --center-x")?;
        let origin_y = CoordValue::parse(&self.center_y).context("invalid --center-y")?;

        let set = match self.julia.as_deref() {
            Some([seed_x, seed_y]) => FractalSet::Julia {
                seed_x: CoordValue::parse(seed_x).context("invalid Julia seed")?,
                seed_y: CoordValue::parse(seed_y).context("invalid Julia seed")?,
            },
            Some(_) => bail!("--julia takes exactly two values"),
            None => FractalSet::Mandelbrot,
        };

        let request =
            RenderRequest::mandelbrot(self.width, self.height, origin_x, origin_y, self.scale);

        Ok(request.with_set(set))
    }
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    TermLogger::init(
        cli.log_level(),
        Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    )?;

    let request = cli.request()?;
    let (sender, receiver) = mpsc::channel();
    let port: Arc<dyn RendererPresenterPort> = Arc::new(sender);
    let mut orchestrator = RenderOrchestrator::new(cli.config(), port)?;

    orchestrator.submit_request(request)?;

    let report = loop {
        let event = receiver
            .recv()
            .context("renderer stopped without a result")?;

        match event {
            RenderEvent::PassCompleted(frame) => info!(
                "pass {} done, max iterations {}, {:?}",
                frame.pass, frame.max_iterations, frame.elapsed
            ),
            RenderEvent::ChunkDone { chunks_done } => debug!("{} chunks done", chunks_done),
            RenderEvent::AllDone(report) => break report,
            RenderEvent::Error(failure) => bail!("render failed: {}", failure.message),
            RenderEvent::RenderStarting { .. } | RenderEvent::ThreadState { .. } => {}
        }
    };

    orchestrator.shutdown();

    if let Some(parent) = cli.output.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("cannot create {}", parent.display()))?;
    }

    write_ppm(&report.image, &cli.output)
        .with_context(|| format!("cannot write {}", cli.output.display()))?;

    info!(
        "saved {} ({} passes, checksum {}, {:?})",
        cli.output.display(),
        report.passes_done,
        report.checksum,
        report.elapsed
    );

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_builds_config_and_request() {
        let cli = Cli::parse_from([
            "progressive_fractal",
            "--width",
            "64",
            "--height",
            "48",
            "--center-x",
            "-0.637011",
            "--passes",
            "4",
            "--numeric",
            "dec30",
            "--no-dynamic",
        ]);

        let config = cli.config();
        assert_eq!(config.passes, 4);
        assert_eq!(config.numeric_type, NumericType::Decimal30);
        assert!(!config.dynamic_allocation);

        let request = cli.request().unwrap();
        assert_eq!(request.width, 64);
        assert_eq!(request.origin_x.precise(), Some("-0.637011"));
        assert_eq!(request.set, FractalSet::Mandelbrot);
    }

    #[test]
    fn test_cli_julia_seed() {
        let cli = Cli::parse_from(["progressive_fractal", "--julia", "-0.8", "0.156"]);

        assert!(matches!(
            cli.request().unwrap().set,
            FractalSet::Julia { .. }
        ));
    }

    #[test]
    fn test_cli_rejects_bad_coordinate() {
        let cli = Cli::parse_from(["progressive_fractal", "--center-x", "1.2.3"]);

        assert!(cli.request().is_err());
    }
}
