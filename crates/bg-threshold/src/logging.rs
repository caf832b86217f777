//! Stderr logging for a single run.
//!
//! Every line carries the name of the histogram file being processed, so
//! logs from batch invocations stay attributable:
//! `[LEVEL two_humps.txt target] message`. `RUST_LOG` refines the level
//! passed in. With the `tracing` feature, [`init_tracing`] installs a
//! `tracing-subscriber` instead and [`crate::run::run`] opens an `input` span.

use log::LevelFilter;
use std::io::Write;
use std::path::Path;

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

/// Short tag for log lines: the file name of `input`, or the whole path when
/// it has none.
pub fn input_tag(input: &Path) -> String {
    input
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| input.display().to_string())
}

fn builder(level: LevelFilter, tag: String) -> env_logger::Builder {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(level)
        .parse_default_env()
        .format(move |buf, record| {
            writeln!(
                buf,
                "[{:>5} {} {}] {}",
                record.level(),
                tag,
                record.target(),
                record.args()
            )
        });
    builder
}

/// Install the stderr logger for a run over `input`.
///
/// Fails if another logger is already installed.
pub fn init_with_level(level: LevelFilter, input: &Path) -> Result<(), log::SetLoggerError> {
    builder(level, input_tag(input)).try_init()
}

/// Install a `tracing` subscriber. `RUST_LOG` wins over `level`.
#[cfg(feature = "tracing")]
pub fn init_tracing(level: LevelFilter, json: bool) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(level.as_str().to_ascii_lowercase()));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if json {
        let _ = builder.json().flatten_event(true).finish().try_init();
    } else {
        let _ = builder.finish().try_init();
    }
}
