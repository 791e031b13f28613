use std::borrow::Cow;

use crate::conf::ReassemblyConfig;
use crate::parser::event::parse_line;
use crate::parser::model::{Event, ParseError};
use crate::parser::scanner::ScanCursor;
use crate::parser::tables::*;

/// One physical line and its 1-based number.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawLine {
    pub text: String,
    pub number: usize,
}

impl RawLine {
    pub fn new(text: impl Into<String>, number: usize) -> Self {
        Self { text: text.into(), number }
    }
}

/// Diagnostic blocks whose lines are dropped wholesale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlockKind {
    /// `-XX:+PrintHeapAtGC`
    HeapLayout,
    /// `-XX:+PrintAdaptiveSizePolicy`
    AdaptiveSize,
}

impl BlockKind {
    /// Trimmed-line prefixes of the lines belonging to the block.
    pub fn prefixes(&self) -> &'static [&'static str] {
        match self {
            BlockKind::HeapLayout => HEAP_PREFIXES,
            BlockKind::AdaptiveSize => ADAPTIVE_SIZE_PREFIXES,
        }
    }

    pub fn continues_with(&self, line: &str) -> bool {
        starts_with_any(line.trim(), self.prefixes())
    }
}

/// Outcome of feeding one physical line to the reassembler.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Empty line
    Ignored,
    /// Noise line
    Excluded,
    /// Kept as a prefix of a later logical line
    Buffered,
    /// A logical line was completed and parsed
    Event(Event),
    /// The following lines belong to a diagnostic block and must be skipped
    SkipBlock(BlockKind),
}

/// Rebuilds logical GC event lines from the physical lines of the log.
///
/// Depending on the logging options the runtime splits one event over several
/// lines (`-XX:+PrintTenuringDistribution`, `-XX:+TraceClassUnloading`,
/// `-XX:+PrintAdaptiveSizePolicy`) or puts two events on one line
/// (`-XX:+CMSScavengeBeforeRemark`, some 1.6 updates mixing CMS output).
/// Fragments waiting for their remainder live on a small stack.
pub struct LineReassembler {
    pending: Vec<String>,
    cursor: ScanCursor,
    max_pending: usize,
    max_line_length: usize,
}

impl LineReassembler {
    pub fn new(config: &ReassemblyConfig) -> Self {
        Self {
            pending: Vec::new(),
            cursor: ScanCursor::default(),
            max_pending: config.max_pending_fragments,
            max_line_length: config.max_line_length,
        }
    }

    /// Number of fragments waiting for their remainder.
    pub fn pending_depth(&self) -> usize {
        self.pending.len()
    }

    /// Drop all reconstruction state (after a failed line).
    pub fn reset(&mut self) {
        self.pending.clear();
        self.cursor.reset();
    }

    /// Hand out fragments that never got their remainder (end of input).
    pub fn finish(&mut self) -> Vec<String> {
        self.cursor.reset();
        std::mem::take(&mut self.pending)
    }

    /// Apply the reconstruction rules to one physical line.
    pub fn process(&mut self, raw: &RawLine) -> Result<Step, ParseError> {
        let line_number = raw.number;
        self.cursor.set_line_number(line_number);

        if raw.text.is_empty() {
            return Ok(Step::Ignored);
        }
        if raw.text.len() > self.max_line_length {
            return Err(ParseError::LineTooLarge {
                len: raw.text.len(),
                max: self.max_line_length,
                line_number,
            });
        }
        if starts_with_any(&raw.text, EXCLUDE_PREFIXES) {
            return Ok(Step::Excluded);
        }

        let mut line = Cow::Borrowed(raw.text.as_str());
        if let Some(start) = line.find(CMS_ABORT_PRECLEAN) {
            let mut cleaned = line.into_owned();
            cleaned.replace_range(start..start + CMS_ABORT_PRECLEAN.len(), "");
            line = Cow::Owned(cleaned);
        }

        if is_scavenge_before_remark(&line) {
            // "[GC[YG occupancy: ...]" is followed by the scavenge itself;
            // the remark part continues on the next line
            let occupancy = line.find(YG_OCCUPANCY).unwrap_or(0);
            let second_start = line[occupancy..]
                .find(']')
                .map(|offset| occupancy + offset + 1)
                .ok_or(ParseError::Structural {
                    reason: "no ']' after young generation occupancy",
                    line_number,
                })?;
            self.push(line[..second_start].to_string(), line_number)?;
            let second = &line[second_start..];
            if ends_with_any(&line, TENURING_OPENINGS) {
                self.push(second.to_string(), line_number)?;
                return Ok(Step::Buffered);
            }
            return self.parse(second).map(Step::Event);
        }

        if let Some(start) = line.find(UNLOADING_CLASS).filter(|&start| start > 0) {
            self.push(line[..start].to_string(), line_number)?;
            return Ok(Step::Buffered);
        }

        if ends_with_any(&line, TENURING_OPENINGS) {
            self.push(line.into_owned(), line_number)?;
            return Ok(Step::Buffered);
        }

        if let Some(caps) = MIXED_LINE.captures(&line) {
            // an earlier tenuring fragment may still be waiting in front of this one
            let head = self.pending.pop().unwrap_or_default();
            self.push(head + &caps[1], line_number)?;
            return self.parse(&caps[2]).map(Step::Event);
        }

        if line.contains(ADAPTIVE_SIZE) {
            let caps = ADAPTIVE_SIZE_LINE.captures(&line).ok_or(ParseError::Structural {
                reason: "adaptive size policy line without a gc event start",
                line_number,
            })?;
            self.push(caps[1].to_string(), line_number)?;
            return Ok(Step::SkipBlock(BlockKind::AdaptiveSize));
        }

        let logical = match self.pending.pop() {
            Some(prefix) => prefix + &line,
            None if line.contains(HEAP_SIZING_START) => {
                return Ok(Step::SkipBlock(BlockKind::HeapLayout));
            }
            None => line.into_owned(),
        };
        self.parse(&logical).map(Step::Event)
    }

    fn push(&mut self, fragment: String, line_number: usize) -> Result<(), ParseError> {
        if self.pending.len() >= self.max_pending {
            return Err(ParseError::PendingOverflow { max: self.max_pending, line_number });
        }
        self.pending.push(fragment);
        Ok(())
    }

    fn parse(&mut self, line: &str) -> Result<Event, ParseError> {
        self.cursor.reset();
        let result = parse_line(line, &mut self.cursor);
        self.cursor.reset();
        result
    }
}

fn is_scavenge_before_remark(line: &str) -> bool {
    line.contains(YG_OCCUPANCY) && (line.contains(PAR_NEW) || line.contains(DEF_NEW))
}
