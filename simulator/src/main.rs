//! # Simulator
//!
//! Generates synthetic gaze recordings from a JSON configuration, for exercising the event
//! detectors of `gaze-to-events` end to end. Each trial is a step function of positions, with
//! optional smoothed noise and intervals of missing samples.
mod simulation;
mod simulation_elements;

use chrono::Utc;
use clap::Parser;
use gaze_events_common::tracer::{TracerOptions, init_tracer};
use miette::{IntoDiagnostic, WrapErr};
use rand::{SeedableRng, rngs::StdRng};
use simulation::Simulation;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::PathBuf,
};
use tracing::info;

#[derive(Debug, Parser)]
#[clap(author, version = gaze_events_common::version!(), about)]
struct Cli {
    /// Path to the json settings file
    #[clap(long)]
    config: PathBuf,

    /// File to write the recording to. If omitted, it is written to stdout.
    #[clap(long)]
    output: Option<PathBuf>,

    /// Seed of the random number generator. If omitted, the current time is used.
    #[clap(long)]
    seed: Option<u64>,

    /// Log filter, e.g. "info" or "simulator=debug". Defaults to the RUST_LOG environment variable.
    #[clap(long)]
    log_filter: Option<String>,
}

fn main() -> miette::Result<()> {
    let cli = Cli::parse();

    init_tracer(&TracerOptions::new(cli.log_filter.as_deref())).into_diagnostic()?;

    let file = File::open(&cli.config)
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot open config {}", cli.config.display()))?;
    let simulation: Simulation = serde_json::from_reader(BufReader::new(file))
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot parse config {}", cli.config.display()))?;

    let seed = cli
        .seed
        .unwrap_or_else(|| Utc::now().timestamp_subsec_nanos() as u64);
    info!("Simulating with seed {seed}");
    let recording = simulation
        .generate(&mut StdRng::seed_from_u64(seed))
        .into_diagnostic()?;
    info!("Simulated {} trials", recording.trials.len());

    let mut writer: Box<dyn Write> = match &cli.output {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, &recording).into_diagnostic()?;
    writeln!(writer).into_diagnostic()?;
    writer.flush().into_diagnostic()
}
