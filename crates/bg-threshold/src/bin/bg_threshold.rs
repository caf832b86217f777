use bg_threshold::core::OutOfRangePolicy;
use bg_threshold::io::ThresholdConfig;
use bg_threshold::run::{run, RunPaths};
use clap::{Parser, ValueEnum};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;

#[derive(Parser, Debug)]
#[command(name = "bg-threshold")]
#[command(version, about = "Bimodal-Gaussian automatic threshold selection", long_about = None)]
struct Cli {
    /// Input histogram file
    #[arg(value_name = "IN_FILE")]
    in_file: PathBuf,

    /// Output histogram report
    #[arg(value_name = "HIST_FILE")]
    hist_file: PathBuf,

    /// Output Gaussian fit report
    #[arg(value_name = "GAUSS_FILE")]
    gauss_file: PathBuf,

    /// Output trace log
    #[arg(value_name = "LOG_FILE")]
    log_file: PathBuf,

    /// JSON run configuration
    #[arg(long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Also write a JSON report
    #[arg(long, value_name = "FILE")]
    report_json: Option<PathBuf>,

    /// Handling of intensities outside [0, maxVal] (overrides the config)
    #[arg(long, value_enum)]
    out_of_range: Option<OutOfRangeArg>,

    /// Stderr log level; `RUST_LOG` refines it
    #[arg(long, value_enum, value_name = "LEVEL", default_value_t = LogLevelArg::Warn)]
    log_level: LogLevelArg,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum LogLevelArg {
    Off,
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<LogLevelArg> for LevelFilter {
    fn from(arg: LogLevelArg) -> Self {
        match arg {
            LogLevelArg::Off => LevelFilter::Off,
            LogLevelArg::Error => LevelFilter::Error,
            LogLevelArg::Warn => LevelFilter::Warn,
            LogLevelArg::Info => LevelFilter::Info,
            LogLevelArg::Debug => LevelFilter::Debug,
            LogLevelArg::Trace => LevelFilter::Trace,
        }
    }
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum OutOfRangeArg {
    Drop,
    Clamp,
    Reject,
}

impl From<OutOfRangeArg> for OutOfRangePolicy {
    fn from(arg: OutOfRangeArg) -> Self {
        match arg {
            OutOfRangeArg::Drop => OutOfRangePolicy::Drop,
            OutOfRangeArg::Clamp => OutOfRangePolicy::Clamp,
            OutOfRangeArg::Reject => OutOfRangePolicy::Reject,
        }
    }
}

fn init_logging(level: LevelFilter, input: &Path) {
    #[cfg(feature = "tracing")]
    {
        let _ = input;
        bg_threshold::logging::init_tracing(level, false);
    }
    #[cfg(not(feature = "tracing"))]
    {
        if let Err(e) = bg_threshold::logging::init_with_level(level, input) {
            eprintln!("warning: logger not installed: {e}");
        }
    }
}

fn execute(cli: Cli) -> Result<usize, Box<dyn std::error::Error>> {
    let mut cfg = match &cli.config {
        Some(path) => ThresholdConfig::load_json(path)?,
        None => ThresholdConfig::default(),
    };
    if let Some(policy) = cli.out_of_range {
        cfg.out_of_range = policy.into();
    }

    let paths = RunPaths {
        input: cli.in_file,
        hist_out: cli.hist_file,
        gauss_out: cli.gauss_file,
        log_out: cli.log_file,
        report_json: cli.report_json,
    };
    let outcome = run(&paths, &cfg)?;
    Ok(outcome.result.threshold)
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.log_level.into(), &cli.in_file);

    match execute(cli) {
        Ok(threshold) => {
            println!("threshold: {threshold}");
            ExitCode::SUCCESS
        }
        Err(e) => {
            eprintln!("error: {e}");
            ExitCode::FAILURE
        }
    }
}
