//! Text reports: histogram tables, `+` bar graphs and overlay graphs.

use bg_threshold_core::{Histogram, ImageHeader, OverlayGrid, Overlays, ThresholdResult};
use std::io::{self, Write};

/// Mark used for the best-fit (peak overlay) graph.
pub const PEAK_MARK: char = '*';
/// Mark used for the gap overlay graph.
pub const GAP_MARK: char = '@';

fn write_header<W: Write>(w: &mut W, header: &ImageHeader) -> io::Result<()> {
    writeln!(
        w,
        "{} {} {} {}",
        header.num_rows, header.num_cols, header.min_val, header.max_val
    )
}

/// Header line, then `intensity frequency` per bin with the intensity
/// left-justified in a column one wider than the widest intensity.
pub fn write_histogram_table<W: Write>(
    w: &mut W,
    header: &ImageHeader,
    counts: &[u32],
) -> io::Result<()> {
    write_header(w, header)?;
    let width = header.max_val.to_string().len() + 1;
    for (i, c) in counts.iter().enumerate() {
        writeln!(w, "{i:<width$}{c}")?;
    }
    Ok(())
}

/// Header line, then `i (count):` followed by `count` plus signs.
pub fn write_histogram_graph<W: Write>(
    w: &mut W,
    header: &ImageHeader,
    counts: &[u32],
) -> io::Result<()> {
    write_header(w, header)?;
    for (i, &c) in counts.iter().enumerate() {
        writeln!(w, "{i} ({c}):{}", "+".repeat(c as usize))?;
    }
    Ok(())
}

fn write_run<W: Write>(w: &mut W, mark: char, count: usize) -> io::Result<()> {
    const CHUNK: usize = 1024;
    let chunk: String = std::iter::repeat(mark).take(count.min(CHUNK)).collect();
    let mut left = count;
    while left > 0 {
        let n = left.min(CHUNK);
        w.write_all(&chunk.as_bytes()[..n * mark.len_utf8()])?;
        left -= n;
    }
    Ok(())
}

/// One row per intensity with `mark` at every marked level.
pub fn write_overlay_graph<W: Write>(
    w: &mut W,
    grid: &OverlayGrid,
    labels: &[u32],
    mark: char,
) -> io::Result<()> {
    for i in 0..grid.width() {
        let label = labels.get(i).copied().unwrap_or(0);
        write!(w, "{i} ({label}):")?;
        if let Some(levels) = grid.span(i).filter(|levels| !levels.is_empty()) {
            write!(w, "{:1$}", "", levels.start)?;
            write_run(w, mark, levels.len())?;
        }
        writeln!(w)?;
    }
    Ok(())
}

/// Histogram report: table followed by the bar graph.
pub fn write_histogram_report<W: Write>(w: &mut W, hist: &Histogram) -> io::Result<()> {
    writeln!(w, "** Below is the input histogram **")?;
    write_histogram_table(w, hist.header(), hist.counts())?;
    writeln!(w)?;
    writeln!(w, "** Below is the graphic display of the histogram **")?;
    write_histogram_graph(w, hist.header(), hist.counts())
}

/// Gaussian fit report: selected threshold, best-fit table and both overlays.
pub fn write_gauss_report<W: Write>(
    w: &mut W,
    hist: &Histogram,
    result: &ThresholdResult,
    overlays: &Overlays,
) -> io::Result<()> {
    let header = hist.header();
    writeln!(w, "** Bimodal Gaussian threshold selection **")?;
    write_header(w, header)?;
    writeln!(w, "threshold: {}", result.threshold)?;
    match result.total_error {
        Some(total) => writeln!(w, "total error: {total}")?,
        None => writeln!(w, "total error: n/a")?,
    }
    writeln!(w, "offset: {}", result.offset)?;
    writeln!(w, "candidates evaluated: {}", result.candidates_evaluated)?;

    writeln!(w)?;
    writeln!(w, "** Best-fit Gaussian curves (intensity histogram fit) **")?;
    let width = header.max_val.to_string().len() + 1;
    let fit = result.best_fit.values();
    for (i, (h, g)) in hist.counts().iter().zip(fit).enumerate() {
        writeln!(w, "{i:<width$}{h:<8}{g}")?;
    }

    writeln!(w)?;
    writeln!(w, "** Graphic display of the best-fit curves **")?;
    write_overlay_graph(w, &overlays.peak, fit, PEAK_MARK)?;

    writeln!(w)?;
    writeln!(w, "** Gaps between the histogram and the best-fit curves **")?;
    write_overlay_graph(w, &overlays.gap, hist.counts(), GAP_MARK)
}
