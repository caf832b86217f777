//! End-to-end run: histogram file in, text reports and trace log out.

use crate::core::{Histogram, ThresholdError, ThresholdResult, ThresholdSelector, WriterSink};
use crate::io::{self, HistIoError, ThresholdConfig, ThresholdReport};
use log::info;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Errors produced by [`run`].
#[derive(thiserror::Error, Debug)]
pub enum RunError {
    #[error("failed to read histogram {}: {source}", path.display())]
    Input { path: PathBuf, source: HistIoError },

    #[error("failed to write {}: {source}", path.display())]
    Output {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("failed to write report {}: {source}", path.display())]
    Report { path: PathBuf, source: HistIoError },

    #[error(transparent)]
    Threshold(#[from] ThresholdError),
}

/// Files touched by one run.
#[derive(Clone, Debug)]
pub struct RunPaths {
    pub input: PathBuf,
    pub hist_out: PathBuf,
    pub gauss_out: PathBuf,
    pub log_out: PathBuf,
    pub report_json: Option<PathBuf>,
}

#[derive(Clone, Debug)]
pub struct RunOutcome {
    pub histogram: Histogram,
    pub result: ThresholdResult,
}

fn create(path: &Path) -> Result<BufWriter<File>, RunError> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|source| RunError::Output {
            path: path.to_path_buf(),
            source,
        })
}

fn write_to(
    path: &Path,
    f: impl FnOnce(&mut BufWriter<File>) -> std::io::Result<()>,
) -> Result<(), RunError> {
    let mut w = create(path)?;
    f(&mut w)
        .and_then(|_| w.flush())
        .map_err(|source| RunError::Output {
            path: path.to_path_buf(),
            source,
        })
}

/// Load `paths.input`, write the histogram report, select the threshold
/// (tracing into `paths.log_out`) and write the Gaussian fit report.
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(level = "info", skip_all, fields(input = %paths.input.display()))
)]
pub fn run(paths: &RunPaths, cfg: &ThresholdConfig) -> Result<RunOutcome, RunError> {
    let input_err = |source| RunError::Input {
        path: paths.input.clone(),
        source,
    };
    let input = io::load_histogram(&paths.input).map_err(input_err)?;
    let histogram = input.to_histogram(cfg.out_of_range).map_err(input_err)?;
    info!(
        "loaded {} ({} bins, max height {})",
        paths.input.display(),
        histogram.len(),
        histogram.max_height()
    );

    write_to(&paths.hist_out, |w| io::write_histogram_report(w, &histogram))?;

    let mut sink = WriterSink::new(create(&paths.log_out)?);
    sink.note(format_args!(
        "bg-threshold input={} header={:?}",
        paths.input.display(),
        histogram.header()
    ));
    let mut selector = ThresholdSelector::new(histogram, cfg.search.clone())?;
    let selected = selector.select_threshold_traced(&mut sink);
    sink.finish().map_err(|source| RunError::Output {
        path: paths.log_out.clone(),
        source,
    })?;
    let threshold = selected?;
    info!("selected threshold {threshold}");

    let result = selector.result();
    let overlays = selector.overlays()?;
    write_to(&paths.gauss_out, |w| {
        io::write_gauss_report(w, selector.histogram(), &result, &overlays)
    })?;

    if let Some(path) = &paths.report_json {
        ThresholdReport::new(&paths.input, selector.histogram(), &result)
            .write_json(path)
            .map_err(|source| RunError::Report {
                path: path.clone(),
                source,
            })?;
    }

    Ok(RunOutcome {
        histogram: selector.histogram().clone(),
        result,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn paths(dir: &Path, input: &str) -> RunPaths {
        let in_path = dir.join("in.txt");
        fs::write(&in_path, input).unwrap();
        RunPaths {
            input: in_path,
            hist_out: dir.join("hist.txt"),
            gauss_out: dir.join("gauss.txt"),
            log_out: dir.join("log.txt"),
            report_json: Some(dir.join("report.json")),
        }
    }

    #[test]
    fn writes_all_outputs() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path(), "10 10 0 9\n1 2\n2 5\n3 9\n4 4\n5 1\n6 1\n7 4\n8 9\n9 5\n");
        let outcome = run(&p, &ThresholdConfig::default()).unwrap();
        assert_eq!(6, outcome.result.threshold);

        let log = fs::read_to_string(&p.log_out).unwrap();
        assert!(log.starts_with("bg-threshold input="));
        assert!(log.trim_end().ends_with("selected threshold=6 total=14"));

        let gauss = fs::read_to_string(&p.gauss_out).unwrap();
        assert!(gauss.contains("threshold: 6\n"));
        let hist = fs::read_to_string(&p.hist_out).unwrap();
        assert!(hist.contains("3 (9):+++++++++\n"));

        let report = ThresholdReport::load_json(p.report_json.as_ref().unwrap()).unwrap();
        assert_eq!(6, report.threshold);
        assert_eq!(outcome.histogram.counts(), report.histogram.as_slice());
    }

    #[test]
    fn all_zero_histogram_fails_after_logging() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path(), "4 4 0 20\n3 0\n");
        let err = run(&p, &ThresholdConfig::default()).unwrap_err();
        assert!(matches!(
            err,
            RunError::Threshold(ThresholdError::EmptySegment { .. })
        ));
        assert!(p.log_out.exists());
        assert!(!p.gauss_out.exists());
    }

    #[test]
    fn malformed_input_names_the_file() {
        let dir = tempfile::tempdir().unwrap();
        let p = paths(dir.path(), "4 4 0 9\n1 two\n");
        let err = run(&p, &ThresholdConfig::default()).unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("in.txt"), "{msg}");
        assert!(msg.contains("line 2"), "{msg}");
    }
}
