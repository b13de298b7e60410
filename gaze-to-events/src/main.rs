//! # Gaze to Events
//!
//! The Gaze to Events component performs the following functions:
//! * Reads a gaze recording, split into trials, from a JSON file.
//! * Optionally converts pixel positions to degrees of visual angle and smooths them.
//! * Applies the user specified event detection algorithm to each trial, deriving velocities
//!   from positions where the algorithm requires them.
//! * Writes the detected events, or the requested properties of each event, as JSON.
//!
mod parameters;
mod processing;

use clap::Parser;
use gaze_events_common::{
    recording::Recording,
    tracer::{TracerOptions, init_tracer},
};
use gaze_to_events::{
    event_detection::{Time, TrialEvent},
    properties::{EventGazeProcessor, EventProperty, EventSummary},
};
use miette::{IntoDiagnostic, WrapErr};
use parameters::{DetectorSettings, Mode, PositionOptions, VelocityOptions};
use serde::Serialize;
use std::{
    fs::File,
    io::{BufReader, BufWriter, Write},
    path::{Path, PathBuf},
};
use tracing::{info, instrument};

/// [clap] derived struct to handle command line parameters.
#[derive(Debug, Parser)]
#[clap(author, version = gaze_events_common::version!(), about)]
struct Cli {
    /// The recording to detect events in.
    #[clap(long)]
    input: PathBuf,

    /// File to write the events to. If omitted, they are written to stdout.
    #[clap(long)]
    output: Option<PathBuf>,

    /// Trial identifier on which events are matched with their samples when computing
    /// properties. May be given multiple times. Defaults to the identifiers shared by all trials.
    #[clap(long)]
    identifier: Vec<String>,

    /// Property to compute for each event instead of writing the events themselves: amplitude,
    /// dispersion, disposition, duration, location, location:median or peak_velocity.
    /// May be given multiple times.
    #[clap(long)]
    property: Vec<EventProperty>,

    /// If set, only events with this name are written.
    #[clap(long)]
    event_name: Option<String>,

    /// If set, the samples outside all detected events are reported as unclassified events
    /// spanning at least this many timesteps.
    #[clap(long)]
    fill: Option<Time>,

    #[clap(flatten)]
    positions: PositionOptions,

    #[clap(flatten)]
    velocity: VelocityOptions,

    /// Log filter, e.g. "info" or "gaze_to_events=trace". Defaults to the RUST_LOG environment variable.
    #[clap(long)]
    log_filter: Option<String>,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Serialize)]
struct EventTable {
    events: Vec<TrialEvent>,
}

#[derive(Serialize)]
struct SummaryTable {
    summaries: Vec<EventSummary>,
}

fn main() -> miette::Result<()> {
    let args = Cli::parse();

    init_tracer(&TracerOptions::new(args.log_filter.as_deref())).into_diagnostic()?;

    let recording = read_recording(&args.input)?;

    let detector = args.mode.parameters().into_diagnostic()?;
    let requires_velocities = detector.requires_velocities()
        || args.property.contains(&EventProperty::PeakVelocity);
    let settings = DetectorSettings {
        velocities: requires_velocities
            .then(|| args.velocity.settings(recording.sampling_rate))
            .transpose()
            .into_diagnostic()?,
        detector,
        positions: args.positions.settings().into_diagnostic()?,
        fill: args.fill,
    };
    info!("Detecting events with {settings:?}");

    let detections = processing::process(&recording, &settings).into_diagnostic()?;
    let events: Vec<TrialEvent> = detections
        .iter()
        .flat_map(|detection| detection.trial_events())
        .collect();
    info!(
        "Detected {} events in {} of {} trials",
        events.len(),
        detections.len(),
        recording.trials.len()
    );

    if args.property.is_empty() {
        let events = events
            .into_iter()
            .filter(|trial_event| {
                args.event_name
                    .as_deref()
                    .is_none_or(|name| trial_event.event.name == name)
            })
            .collect();
        write_output(args.output.as_deref(), &EventTable { events })
    } else {
        let identifiers = if args.identifier.is_empty() {
            processing::shared_identifiers(&detections)
        } else {
            args.identifier.clone()
        };
        let gaze: Vec<_> = detections
            .into_iter()
            .map(|detection| detection.gaze)
            .collect();
        let summaries = EventGazeProcessor::from_properties(args.property.clone())
            .process(&events, &gaze, &identifiers, args.event_name.as_deref())
            .into_diagnostic()?;
        info!("Computed properties of {} events", summaries.len());
        write_output(args.output.as_deref(), &SummaryTable { summaries })
    }
}

#[instrument(skip_all, fields(path = ?path))]
fn read_recording(path: &Path) -> miette::Result<Recording> {
    let file = File::open(path)
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot open recording {}", path.display()))?;
    serde_json::from_reader(BufReader::new(file))
        .into_diagnostic()
        .wrap_err_with(|| format!("Cannot parse recording {}", path.display()))
}

/// Writes the value as JSON to the given file, or to stdout.
fn write_output<T: Serialize>(path: Option<&Path>, value: &T) -> miette::Result<()> {
    let mut writer: Box<dyn Write> = match path {
        Some(path) => Box::new(BufWriter::new(
            File::create(path)
                .into_diagnostic()
                .wrap_err_with(|| format!("Cannot create {}", path.display()))?,
        )),
        None => Box::new(std::io::stdout().lock()),
    };
    serde_json::to_writer_pretty(&mut writer, value).into_diagnostic()?;
    writeln!(writer).into_diagnostic()?;
    writer.flush().into_diagnostic()
}
