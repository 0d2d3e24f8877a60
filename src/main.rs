//! Strum capture runner
//!
//! Watches an accelerometer for strum gestures and, for every capture, either
//! dumps the raw buffer to stdout or feeds it through learn-then-infer
//! scoring. Data lines go to stdout; banner, summary and logs go to stderr.
//!
//! Usage:
//!   strum-capture --replay strums.txt --mode data-capture > captures.txt
//!   strum-capture --replay strums.txt --mode learn-and-infer --learning-target 10

use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use strum_capture::{
    AccelSensor, AcquisitionConfig, AcquisitionLoop, CaptureBuffer, CaptureError, DataLogger,
    DuplicatePolicy, LearnDetectController, LogIndicator, Mode, ReplaySensor, SampleSource,
    TemplateModel, TriggerConfig, TriggerConsumer, TriggerDetector, WriterTransport,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ModeArg {
    /// Print every captured buffer
    DataCapture,
    /// Learn a number of captures, then score the rest
    LearnAndInfer,
}

impl From<ModeArg> for Mode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::DataCapture => Mode::DataCapture,
            ModeArg::LearnAndInfer => Mode::LearnAndInfer,
        }
    }
}

#[derive(Parser, Debug)]
#[command(name = "strum-capture")]
#[command(about = "Capture accelerometer buffers on strum gestures", long_about = None)]
struct Args {
    /// What to do with each capture
    #[arg(short, long, value_enum, default_value = "data-capture")]
    mode: ModeArg,

    /// Replay raw "x y z" readings from a text file
    #[arg(short, long, conflicts_with = "mpu6050")]
    replay: Option<PathBuf>,

    /// Read a live MPU6050 on this FT232H channel
    #[arg(long)]
    mpu6050: Option<u32>,

    /// Samples per trigger window
    #[arg(long, default_value_t = strum_capture::config::MINI)]
    mini: usize,

    /// Ratio the new window must exceed over the reference window
    #[arg(long, default_value_t = strum_capture::config::THRESH)]
    thresh: f32,

    /// Window average at or below this is treated as rest
    #[arg(long, default_value_t = strum_capture::config::NOISE)]
    noise: f32,

    /// Samples per capture buffer
    #[arg(long, default_value_t = strum_capture::config::CAPTURE_LEN)]
    capture_len: usize,

    /// Captures used for learning before inference starts
    #[arg(long, default_value_t = strum_capture::config::LEARNING_TARGET)]
    learning_target: u32,

    /// Similarity below this is reported as an anomaly (0-100)
    #[arg(long, default_value_t = strum_capture::config::THRESH_SIMILARITY)]
    thresh_similarity: u8,

    /// Raw counts per physical unit
    #[arg(long, default_value_t = strum_capture::config::SCALE_DIVISOR)]
    scale: f32,

    /// Give up after this many repeated readings instead of waiting forever
    #[arg(long)]
    stall_retries: Option<u64>,

    /// Accept a reading when any axis changed (default: all axes must change)
    #[arg(long)]
    any_axis_dedup: bool,

    /// Pause for the LED blink cadence after each status signal
    #[arg(long)]
    blink_delays: bool,

    /// Stop after this many captures
    #[arg(long)]
    max_triggers: Option<u64>,

    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

impl Args {
    fn to_config(&self) -> AcquisitionConfig {
        AcquisitionConfig {
            mode: self.mode.into(),
            trigger: TriggerConfig {
                mini: self.mini,
                thresh: self.thresh,
                noise: self.noise,
            },
            capture_len: self.capture_len,
            learning_target: self.learning_target,
            thresh_similarity: self.thresh_similarity,
            scale_divisor: self.scale,
            duplicate_policy: if self.any_axis_dedup {
                DuplicatePolicy::AnyAxisChanged
            } else {
                DuplicatePolicy::AllAxesMustChange
            },
            stall_retries: self.stall_retries,
            ..AcquisitionConfig::default()
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(format!("strum_capture={},warn", level))),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn open_sensor(args: &Args) -> Result<Box<dyn AccelSensor>, Box<dyn std::error::Error>> {
    if let Some(path) = &args.replay {
        return Ok(Box::new(ReplaySensor::open(path)?));
    }

    if let Some(channel) = args.mpu6050 {
        #[cfg(feature = "ftdi")]
        {
            return Ok(Box::new(strum_capture::Mpu6050::new(channel)?));
        }
        #[cfg(not(feature = "ftdi"))]
        {
            return Err(format!(
                "MPU6050 channel {} requested but this build has no FT232H support (rebuild with --features ftdi)",
                channel
            )
            .into());
        }
    }

    Err("no sample source given: use --replay <file> or --mpu6050 <channel>".into())
}

fn build_consumer(
    config: &AcquisitionConfig,
    blink_delays: bool,
) -> strum_capture::Result<Box<dyn TriggerConsumer>> {
    let transport = WriterTransport::new(std::io::stdout());
    let consumer: Box<dyn TriggerConsumer> = match config.mode {
        Mode::DataCapture => Box::new(DataLogger::new(transport)),
        Mode::LearnAndInfer => Box::new(LearnDetectController::new(
            TemplateModel::new(),
            transport,
            LogIndicator::new(blink_delays),
            config.learning_target,
            config.thresh_similarity,
        )?),
    };
    Ok(consumer)
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    init_logging(args.verbose);

    let config = args.to_config();
    config.validate()?;

    eprintln!("Strum Capture");
    eprintln!("=============");
    eprintln!("Mode: {:?}", config.mode);
    eprintln!(
        "Trigger: window {} samples, ratio {}, noise floor {}",
        config.trigger.mini, config.trigger.thresh, config.trigger.noise
    );
    eprintln!("Capture length: {} samples", config.capture_len);
    if config.mode == Mode::LearnAndInfer {
        eprintln!(
            "Learning target: {} captures, anomaly below {}",
            config.learning_target, config.thresh_similarity
        );
    }
    eprintln!();

    let mut sensor = open_sensor(&args)?;
    sensor.configure(config.output_rate_hz, config.full_scale_g)?;
    sensor.enable()?;

    let mut source =
        SampleSource::new(sensor, config.scale_divisor).with_policy(config.duplicate_policy);
    if let Some(limit) = config.stall_retries {
        source = source.with_retry_limit(limit);
    }

    let consumer = build_consumer(&config, args.blink_delays)?;
    let mut acquisition = AcquisitionLoop::new(
        source,
        TriggerDetector::new(config.trigger),
        CaptureBuffer::new(config.capture_len),
        consumer,
    );

    let running = Arc::new(AtomicBool::new(true));
    let r = running.clone();
    ctrlc::set_handler(move || {
        eprintln!("\nReceived Ctrl+C, stopping after the current check...");
        r.store(false, Ordering::SeqCst);
    })?;

    info!(started_at = %acquisition.stats().started_at().to_rfc3339(), "acquisition started");

    let max_triggers = args.max_triggers;
    let result = acquisition.run_while(|stats| {
        let under_limit = max_triggers.map_or(true, |max| stats.triggers() < max);
        running.load(Ordering::SeqCst) && under_limit
    });

    let stats = acquisition.stats();
    eprintln!();
    eprintln!("Session started: {}", stats.started_at().to_rfc3339());
    eprintln!("Elapsed: {:.2} s", stats.elapsed_secs());
    eprintln!("Trigger checks: {} ({:.1}/s)", stats.checks(), stats.check_rate());
    eprintln!("Captures: {}", stats.triggers());
    eprintln!(
        "Samples accepted: {}, repeated readings skipped: {}",
        acquisition.source().accepted(),
        acquisition.source().rejected()
    );

    match result {
        Ok(_) | Err(CaptureError::SourceExhausted) => Ok(()),
        Err(e) => {
            error!(error = %e, "acquisition stopped");
            Err(Box::new(e))
        }
    }
}
