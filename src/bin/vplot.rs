use std::fs::File;
use std::io::BufReader;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use vpcore::convert::{ConvertOptions, convert_elements, convert_files, prepare_path};
use vpcore::hardware::CalibrationParams;
use vpcore::instruction::writer::StepMode;
use vpcore::preview::generate_preview;

#[derive(Parser)]
#[command(name = "vplot", about = "Convert drawing paths into plotter motor steps")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Convert a path file into a step file.
    Convert(ConvertArgs),
    /// Render the steps a path would produce to a PNG.
    Preview(PreviewArgs),
}

#[derive(Args)]
struct PathArgs {
    /// Machine settings JSON file
    #[arg(long, default_value = "settings.json")]
    settings: PathBuf,

    /// Path file, one `x y` pair or PAUSE/PENUP/PENDOWN per line
    #[arg(long)]
    input: PathBuf,

    /// Scale the path onto the paper
    #[arg(long)]
    fit: bool,

    /// Drop redundant pen lifts and keep the pen down over short hops
    #[arg(long)]
    min_pen_pickup: bool,

    /// Shortest pen-up travel kept with --min-pen-pickup, in path units
    #[arg(long, default_value_t = 2.0)]
    pickup_threshold: f64,
}

impl PathArgs {
    fn options(&self, mode: StepMode) -> ConvertOptions {
        ConvertOptions {
            fit: self.fit,
            min_pen_pickup: self.min_pen_pickup,
            pen_pickup_threshold: self.pickup_threshold,
            mode,
        }
    }
}

#[derive(Args)]
struct ConvertArgs {
    #[command(flatten)]
    path: PathArgs,

    /// Step file to write
    #[arg(long)]
    output: PathBuf,

    /// Write total motor offsets from the start position instead of per-move deltas
    #[arg(long)]
    absolute: bool,
}

impl ConvertArgs {
    fn run(self) -> Result<()> {
        let mode = if self.absolute { StepMode::Absolute } else { StepMode::Relative };
        let options = self.path.options(mode);

        let summary = convert_files(&self.path.settings, &self.path.input, &self.output, &options).map_err(|err| match err.line() {
            Some(line) => anyhow::Error::new(err).context(format!("conversion stopped at line {}", line)),
            None => anyhow::Error::new(err),
        })?;

        tracing::info!(
            output = %self.output.display(),
            points = summary.points,
            markers = summary.markers,
            "wrote step file"
        );
        Ok(())
    }
}

#[derive(Args)]
struct PreviewArgs {
    #[command(flatten)]
    path: PathArgs,

    /// PNG file to write
    #[arg(long)]
    output: PathBuf,

    /// Pixels per millimetre
    #[arg(long, default_value_t = 4)]
    scale: u32,
}

impl PreviewArgs {
    fn run(self) -> Result<()> {
        let params = CalibrationParams::load(&self.path.settings)?;
        let geometry = params.derive()?;

        let input = File::open(&self.path.input).with_context(|| format!("could not open {}", self.path.input.display()))?;
        let elements = prepare_path(BufReader::new(input), &geometry, &self.path.options(StepMode::Relative))?;
        let output = convert_elements(&geometry, &elements)?;

        generate_preview(&geometry, &output, &self.output, self.scale)?;
        Ok(())
    }
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let cli = Cli::parse();
    match cli.command {
        Command::Convert(args) => args.run(),
        Command::Preview(args) => args.run(),
    }
}
