use clap::ValueEnum;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::filter::Targets;
use tracing_subscriber::prelude::*;

/// Crates whose events follow `--log-level`. Everything else is held at warn.
const CODEC_TARGETS: [&str; 5] = [
    "pipecodec",
    "pipecodec_stream",
    "pipecodec_flow",
    "pipecodec_command",
    "pipecodec_writable",
];

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevel> for LevelFilter {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Error => LevelFilter::ERROR,
            LogLevel::Warn => LevelFilter::WARN,
            LogLevel::Info => LevelFilter::INFO,
            LogLevel::Debug => LevelFilter::DEBUG,
            LogLevel::Trace => LevelFilter::TRACE,
        }
    }
}

fn codec_filter(level: LogLevel) -> Targets {
    let level = LevelFilter::from(level);
    CODEC_TARGETS
        .iter()
        .fold(Targets::new().with_default(level.min(LevelFilter::WARN)), |targets, name| {
            targets.with_target(*name, level)
        })
}

/// Install the stderr subscriber. Stdout stays reserved for decoded output
/// and encoded frames, so per-command trace events never mix with it.
pub fn init_logging(format: LogFormat, level: LogLevel) {
    let filter = codec_filter(level);
    let layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_ansi(false)
        .with_target(false);

    let registry = tracing_subscriber::registry();
    let _ = match format {
        LogFormat::Text => registry.with(layer.with_filter(filter)).try_init(),
        LogFormat::Json => registry.with(layer.json().with_filter(filter)).try_init(),
    };
}
