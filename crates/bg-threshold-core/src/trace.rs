//! Trace sink for the divide-point search.
//!
//! The search reports what it does through a single [`TraceSink`] handed in
//! by the caller. The numeric code never opens files; a [`WriterSink`] owns
//! the one append-only writer when a trace log is wanted.

use log::trace;
use serde::Serialize;
use std::fmt;
use std::io::{self, Write};

/// One step of the threshold search.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum TraceEvent {
    SearchStarted {
        offset: usize,
        first: usize,
        end: usize,
    },
    SegmentFitted {
        left: usize,
        right: usize,
        mean: f64,
        variance: f64,
        peak: u32,
        error: f64,
    },
    EmptySegment {
        left: usize,
        right: usize,
    },
    CandidateSkipped {
        divide: usize,
    },
    CandidateEvaluated {
        divide: usize,
        total: f64,
    },
    NewBest {
        divide: usize,
        total: f64,
    },
    Selected {
        threshold: usize,
        total: Option<f64>,
    },
}

impl fmt::Display for TraceEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            TraceEvent::SearchStarted { offset, first, end } => {
                write!(f, "search offset={offset} candidates=[{first}, {end})")
            }
            TraceEvent::SegmentFitted {
                left,
                right,
                mean,
                variance,
                peak,
                error,
            } => write!(
                f,
                "fit [{left}, {right}] mean={mean:.4} var={variance:.4} peak={peak} error={error}"
            ),
            TraceEvent::EmptySegment { left, right } => {
                write!(f, "empty segment [{left}, {right})")
            }
            TraceEvent::CandidateSkipped { divide } => write!(f, "skip divide={divide}"),
            TraceEvent::CandidateEvaluated { divide, total } => {
                write!(f, "divide={divide} total={total}")
            }
            TraceEvent::NewBest { divide, total } => {
                write!(f, "new best divide={divide} total={total}")
            }
            TraceEvent::Selected { threshold, total } => match total {
                Some(t) => write!(f, "selected threshold={threshold} total={t}"),
                None => write!(f, "selected threshold={threshold} (no candidates)"),
            },
        }
    }
}

/// Receiver for [`TraceEvent`]s.
pub trait TraceSink {
    fn record(&mut self, event: &TraceEvent);
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl TraceSink for NullSink {
    fn record(&mut self, _event: &TraceEvent) {}
}

/// Forwards events to the `log` facade at `trace` level.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogSink;

impl TraceSink for LogSink {
    fn record(&mut self, event: &TraceEvent) {
        trace!("{event}");
    }
}

/// Collects events in memory.
#[derive(Clone, Debug, Default)]
pub struct VecSink {
    pub events: Vec<TraceEvent>,
}

impl TraceSink for VecSink {
    fn record(&mut self, event: &TraceEvent) {
        self.events.push(*event);
    }
}

/// Writes one line per event to `W`.
///
/// Write errors cannot be returned from [`TraceSink::record`]; the first one
/// is kept, later events are dropped, and [`WriterSink::finish`] reports it.
pub struct WriterSink<W: Write> {
    writer: W,
    lines: usize,
    error: Option<io::Error>,
}

impl<W: Write> WriterSink<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer,
            lines: 0,
            error: None,
        }
    }

    /// Number of lines written so far.
    pub fn lines(&self) -> usize {
        self.lines
    }

    /// Write a free-form line (e.g. a run header) to the same stream.
    pub fn note(&mut self, line: impl fmt::Display) {
        if self.error.is_some() {
            return;
        }
        match writeln!(self.writer, "{line}") {
            Ok(()) => self.lines += 1,
            Err(e) => self.error = Some(e),
        }
    }

    /// Flush and hand back the writer, or the first write error.
    pub fn finish(mut self) -> io::Result<W> {
        if let Some(e) = self.error.take() {
            return Err(e);
        }
        self.writer.flush()?;
        Ok(self.writer)
    }
}

impl<W: Write> TraceSink for WriterSink<W> {
    fn record(&mut self, event: &TraceEvent) {
        self.note(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingWriter;

    impl Write for FailingWriter {
        fn write(&mut self, _buf: &[u8]) -> io::Result<usize> {
            Err(io::Error::other("disk full"))
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    #[test]
    fn writer_sink_writes_one_line_per_event() {
        let mut sink = WriterSink::new(Vec::new());
        sink.record(&TraceEvent::CandidateEvaluated {
            divide: 4,
            total: 12.0,
        });
        sink.record(&TraceEvent::Selected {
            threshold: 4,
            total: Some(12.0),
        });
        assert_eq!(2, sink.lines());
        let out = String::from_utf8(sink.finish().unwrap()).unwrap();
        assert_eq!(
            "divide=4 total=12\nselected threshold=4 total=12\n",
            out
        );
    }

    #[test]
    fn writer_sink_keeps_first_error() {
        let mut sink = WriterSink::new(FailingWriter);
        sink.record(&TraceEvent::CandidateSkipped { divide: 1 });
        sink.record(&TraceEvent::CandidateSkipped { divide: 2 });
        assert_eq!(0, sink.lines());
        let err = sink.finish().err().expect("error kept");
        assert_eq!("disk full", err.to_string());
    }

    #[test]
    fn events_serialize_with_tag() {
        let json = serde_json::to_string(&TraceEvent::NewBest {
            divide: 3,
            total: 1.5,
        })
        .unwrap();
        assert_eq!(r#"{"event":"new_best","divide":3,"total":1.5}"#, json);
    }
}
