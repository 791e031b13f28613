use chrono::{DateTime, FixedOffset};
use serde::Serialize;
use thiserror::Error;

use super::types::EventType;

/// Declared format of a parsed log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Sun / Oracle 1.4 - 1.7 `-verbose:gc` / `-XX:+PrintGCDetails` output
    SunXLogGc,
}

/// Heap occupancy reported by a collection, in kilobytes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Memory {
    /// Used before the collection (absent for `12287K(14784K)` style reports)
    pub before: Option<u64>,
    /// Used after the collection
    pub after: u64,
    /// Committed size of the area
    pub total: Option<u64>,
}

/// Shape-specific part of an [`Event`].
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "shape", rename_all = "snake_case")]
pub enum EventBody {
    /// `[CMS-concurrent-mark-start]`
    ConcurrentMarker,
    /// `[CMS-concurrent-mark: 0.024/0.031 secs]`
    ConcurrentPhase {
        /// Time since the previous phase
        elapsed: f64,
        /// This phase's own duration
        duration: f64,
    },
    /// Stop-the-world collection, possibly with nested details
    Collection {
        memory: Option<Memory>,
        pause: Option<f64>,
        details: Vec<Event>,
    },
}

/// One parsed GC log record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    /// Wall-clock time (`-XX:+PrintGCDateStamps`)
    pub datestamp: Option<DateTime<FixedOffset>>,
    /// Seconds since runtime start
    pub timestamp: f64,
    #[serde(rename = "type")]
    pub event_type: EventType,
    #[serde(flatten)]
    pub body: EventBody,
}

impl Event {
    pub fn memory(&self) -> Option<Memory> {
        match &self.body {
            EventBody::Collection { memory, .. } => *memory,
            _ => None,
        }
    }

    /// Pause of a collection, or the duration of a concurrent phase.
    pub fn pause(&self) -> Option<f64> {
        match &self.body {
            EventBody::Collection { pause, .. } => *pause,
            EventBody::ConcurrentPhase { duration, .. } => Some(*duration),
            EventBody::ConcurrentMarker => None,
        }
    }

    pub fn details(&self) -> &[Event] {
        match &self.body {
            EventBody::Collection { details, .. } => details,
            _ => &[],
        }
    }
}

/// Counters of one read session.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ReadStats {
    /// Physical lines pulled from the source
    pub lines_read: usize,
    /// Lines dropped by the noise-prefix rule
    pub lines_excluded: usize,
    /// Lines swallowed by heap / adaptive-size block skips
    pub lines_skipped: usize,
    pub events: usize,
    /// Recovered per-line failures
    pub failures: usize,
}

/// Ordered events of one log, as handed to reporting tools.
#[derive(Debug, Clone, Serialize)]
pub struct GcModel {
    pub format: LogFormat,
    pub events: Vec<Event>,
    pub stats: ReadStats,
}

impl GcModel {
    pub fn new(format: LogFormat) -> Self {
        Self { format, events: Vec::new(), stats: ReadStats::default() }
    }

    pub fn add(&mut self, event: Event) {
        self.stats.events += 1;
        self.events.push(event);
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Failure of a single token scan.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ScanError {
    #[error("unknown gc type: '{0}'")]
    UnknownType(String),

    #[error("malformed {field}: '{text}'")]
    MalformedNumber { field: &'static str, text: String },

    #[error("expected '{expected}', found '{found}'")]
    Expected { expected: &'static str, found: String },

    #[error("unexpected end of line, expected '{expected}'")]
    UnexpectedEnd { expected: &'static str },
}

impl ScanError {
    /// Failures a nested detail can be skipped over for.
    pub fn is_detail_recoverable(&self) -> bool {
        matches!(self, ScanError::UnknownType(_) | ScanError::MalformedNumber { .. })
    }
}

/// Failure to turn one physical line into events. Always recovered by the
/// read session.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("error parsing line {line_number} at position {position}: {source} ('{line}')")]
    Line {
        #[source]
        source: ScanError,
        line: String,
        position: usize,
        line_number: usize,
    },

    #[error("structural mismatch on line {line_number}: {reason}")]
    Structural { reason: &'static str, line_number: usize },

    #[error("too many pending line fragments on line {line_number} (max: {max})")]
    PendingOverflow { max: usize, line_number: usize },

    #[error("line {line_number} too large: {len} bytes (max: {max} bytes)")]
    LineTooLarge { len: usize, max: usize, line_number: usize },
}

/// Fatal failure of the line source. Carries everything parsed up to the
/// failing line.
#[derive(Debug, Error)]
#[error("failed reading line {line_number}: {source}")]
pub struct ReadError {
    #[source]
    pub source: std::io::Error,
    pub line_number: usize,
    pub partial: Box<GcModel>,
}
