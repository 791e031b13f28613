//! Scanner — cursor-based recognition of the primitive tokens of a GC log line.
//!
//! Every scan starts at the cursor and advances it past what it consumed.
//! Tag and timestamp scans leave the cursor where it was when they fail.

use chrono::{DateTime, FixedOffset};

use super::model::{Memory, ScanError};
use super::types::EventType;

const DATESTAMP_FORMATS: [&str; 2] = ["%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%dT%H:%M:%S%.f%:z"];

/// Position inside the logical line currently being parsed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCursor {
    index: usize,
    line_number: usize,
}

impl ScanCursor {
    pub fn new(line_number: usize) -> Self {
        Self { index: 0, line_number }
    }

    pub fn line_number(&self) -> usize {
        self.line_number
    }

    pub fn set_line_number(&mut self, line_number: usize) {
        self.line_number = line_number;
    }

    /// Rewind to the start of the next logical line.
    pub fn reset(&mut self) {
        self.index = 0;
    }
}

/// Token scanner over one logical line.
pub struct Scanner<'a> {
    line: &'a str,
    bytes: &'a [u8],
    cursor: &'a mut ScanCursor,
}

impl<'a> Scanner<'a> {
    pub fn new(line: &'a str, cursor: &'a mut ScanCursor) -> Self {
        Self { line, bytes: line.as_bytes(), cursor }
    }

    pub fn position(&self) -> usize {
        self.cursor.index
    }

    fn peek(&self) -> Option<u8> {
        self.bytes.get(self.cursor.index).copied()
    }

    fn rest(&self) -> &'a str {
        self.line.get(self.cursor.index..).unwrap_or("")
    }

    fn skip_spaces_from(&self, mut i: usize) -> usize {
        while self.bytes.get(i) == Some(&b' ') {
            i += 1;
        }
        i
    }

    fn skip_spaces(&mut self) {
        self.cursor.index = self.skip_spaces_from(self.cursor.index);
    }

    /// Length of the decimal number starting at `i` (`.` or `,` separated).
    fn number_len(&self, i: usize) -> usize {
        let mut end = i;
        let mut seen_separator = false;
        while let Some(&c) = self.bytes.get(end) {
            if c.is_ascii_digit() {
                end += 1;
            } else if (c == b'.' || c == b',')
                && !seen_separator
                && end > i
                && self.bytes.get(end + 1).is_some_and(u8::is_ascii_digit)
            {
                seen_separator = true;
                end += 1;
            } else {
                break;
            }
        }
        end - i
    }

    fn parse_decimal(&self, start: usize, len: usize, field: &'static str) -> Result<f64, ScanError> {
        let text = &self.line[start..start + len];
        text.replace(',', ".")
            .parse::<f64>()
            .map_err(|_| ScanError::MalformedNumber { field, text: text.to_string() })
    }

    fn expect(&mut self, literal: &'static str) -> Result<(), ScanError> {
        if self.rest().starts_with(literal) {
            self.cursor.index += literal.len();
            Ok(())
        } else if self.cursor.index >= self.bytes.len() {
            Err(ScanError::UnexpectedEnd { expected: literal })
        } else {
            Err(ScanError::Expected { expected: literal, found: excerpt(self.rest()) })
        }
    }

    fn looks_like_datestamp(&self, i: usize) -> bool {
        let b = &self.bytes[i.min(self.bytes.len())..];
        b.len() >= 11
            && b[..4].iter().all(u8::is_ascii_digit)
            && b[4] == b'-'
            && b[7] == b'-'
            && b[10] == b'T'
    }

    /// Optional `yyyy-MM-ddTHH:mm:ss.SSS+zzzz: ` prefix.
    pub fn datestamp(&mut self) -> Result<Option<DateTime<FixedOffset>>, ScanError> {
        let start = self.skip_spaces_from(self.cursor.index);
        if !self.looks_like_datestamp(start) {
            return Ok(None);
        }
        let end = self.line[start..]
            .find(": ")
            .map(|offset| start + offset)
            .ok_or(ScanError::UnexpectedEnd { expected: ": " })?;
        let text = &self.line[start..end];
        let stamp = DATESTAMP_FORMATS
            .iter()
            .find_map(|fmt| DateTime::parse_from_str(text, fmt).ok())
            .ok_or_else(|| ScanError::MalformedNumber { field: "datestamp", text: text.to_string() })?;
        self.cursor.index = self.skip_spaces_from(end + 1);
        Ok(Some(stamp))
    }

    /// Seconds since runtime start, terminated by `:`.
    pub fn timestamp(&mut self) -> Result<f64, ScanError> {
        let start = self.skip_spaces_from(self.cursor.index);
        let len = self.number_len(start);
        if len == 0 {
            return match self.bytes.get(start) {
                None => Err(ScanError::UnexpectedEnd { expected: "timestamp" }),
                Some(_) => Err(ScanError::Expected {
                    expected: "timestamp",
                    found: excerpt(&self.line[start..]),
                }),
            };
        }
        if self.bytes.get(start + len) != Some(&b':') {
            return Err(ScanError::Expected {
                expected: ":",
                found: excerpt(&self.line[start + len..]),
            });
        }
        let value = self.parse_decimal(start, len, "timestamp")?;
        self.cursor.index = self.skip_spaces_from(start + len + 1);
        Ok(value)
    }

    /// `[` followed by a known tag; a trailing `:` and spaces are consumed too.
    pub fn event_type(&mut self) -> Result<EventType, ScanError> {
        let mut i = self.skip_spaces_from(self.cursor.index);
        match self.bytes.get(i) {
            Some(b'[') => i += 1,
            Some(_) => {
                return Err(ScanError::Expected { expected: "[", found: excerpt(&self.line[i..]) })
            }
            None => return Err(ScanError::UnexpectedEnd { expected: "[" }),
        }
        let text = &self.line[i..];
        let (event_type, len) = EventType::match_prefix(text)
            .ok_or_else(|| ScanError::UnknownType(tag_text(text)))?;
        i = self.skip_spaces_from(i + len);
        if self.bytes.get(i) == Some(&b':') {
            i = self.skip_spaces_from(i + 1);
        }
        self.cursor.index = i;
        Ok(event_type)
    }

    fn memory_value(&self, start: usize) -> Result<(u64, usize), ScanError> {
        let mut i = start;
        while self.bytes.get(i).is_some_and(u8::is_ascii_digit) {
            i += 1;
        }
        let digits = &self.line[start..i];
        let value: u64 = digits
            .parse()
            .map_err(|_| ScanError::MalformedNumber { field: "memory", text: excerpt(&self.line[start..]) })?;
        i = self.skip_spaces_from(i);
        let factor = match self.bytes.get(i) {
            Some(b'K') => 1,
            Some(b'M') => 1024,
            Some(b'G') => 1024 * 1024,
            _ => {
                return Err(ScanError::MalformedNumber {
                    field: "memory",
                    text: excerpt(&self.line[start..]),
                })
            }
        };
        let kilobytes = value
            .checked_mul(factor)
            .ok_or_else(|| ScanError::MalformedNumber { field: "memory", text: digits.to_string() })?;
        Ok((kilobytes, i + 1))
    }

    /// `<before>K-><after>K(<total>K)`, each of `before->` and `(total)`
    /// optional. `None` when no digit follows the cursor.
    pub fn memory(&mut self) -> Result<Option<Memory>, ScanError> {
        let start = self.skip_spaces_from(self.cursor.index);
        if !self.bytes.get(start).is_some_and(u8::is_ascii_digit) {
            return Ok(None);
        }
        let (first, mut i) = self.memory_value(start)?;
        let mut memory = Memory { before: None, after: first, total: None };
        if self.line[i..].starts_with("->") {
            let (after, next) = self.memory_value(i + 2)?;
            memory.before = Some(first);
            memory.after = after;
            i = next;
        }
        let open = self.skip_spaces_from(i);
        if self.bytes.get(open) == Some(&b'(') {
            let (total, next) = self.memory_value(open + 1)?;
            if self.bytes.get(next) != Some(&b')') {
                return Err(ScanError::Expected { expected: ")", found: excerpt(&self.line[next..]) });
            }
            memory.total = Some(total);
            i = next + 1;
        }
        self.cursor.index = i;
        Ok(Some(memory))
    }

    /// Pause of the event the cursor is in: `, <secs> secs]`.
    ///
    /// A bare `]` closes the event without a pause. When a nested detail
    /// follows the comma instead of a number the cursor stops right before it.
    pub fn pause(&mut self) -> Result<Option<f64>, ScanError> {
        let mut i = self.skip_spaces_from(self.cursor.index);
        match self.bytes.get(i) {
            Some(b']') => {
                self.cursor.index = self.skip_spaces_from(i + 1);
                return Ok(None);
            }
            Some(b',') => i = self.skip_spaces_from(i + 1),
            _ => return Ok(None),
        }
        let len = self.number_len(i);
        if len == 0 {
            if self.bytes.get(i).is_some_and(u8::is_ascii_digit) {
                return Err(ScanError::MalformedNumber { field: "pause", text: excerpt(&self.line[i..]) });
            }
            self.cursor.index = i;
            return Ok(None);
        }
        let pause = self.parse_decimal(i, len, "pause")?;
        self.cursor.index = self.skip_spaces_from(i + len);
        self.expect("secs")?;
        self.skip_spaces();
        if self.peek() == Some(b']') {
            self.cursor.index += 1;
            self.skip_spaces();
        }
        Ok(Some(pause))
    }

    /// `<elapsed>/<duration> ` of a concurrent phase.
    pub fn pause_pair(&mut self) -> Result<(f64, f64), ScanError> {
        let start = self.skip_spaces_from(self.cursor.index);
        let elapsed_len = self.number_len(start);
        if elapsed_len == 0 {
            return Err(ScanError::MalformedNumber { field: "elapsed", text: excerpt(&self.line[start..]) });
        }
        let slash = start + elapsed_len;
        if self.bytes.get(slash) != Some(&b'/') {
            return Err(ScanError::Expected { expected: "/", found: excerpt(&self.line[slash..]) });
        }
        let duration_len = self.number_len(slash + 1);
        if duration_len == 0 {
            return Err(ScanError::MalformedNumber {
                field: "duration",
                text: excerpt(&self.line[slash + 1..]),
            });
        }
        let end = slash + 1 + duration_len;
        if self.bytes.get(end) != Some(&b' ') {
            return Err(ScanError::Expected { expected: " ", found: excerpt(&self.line[end..]) });
        }
        let elapsed = self.parse_decimal(start, elapsed_len, "elapsed")?;
        let duration = self.parse_decimal(slash + 1, duration_len, "duration")?;
        self.cursor.index = end + 1;
        Ok((elapsed, duration))
    }

    /// Another bracketed detail follows: either `[` or a (date/)timestamp
    /// in front of one.
    pub fn has_next_detail(&self) -> bool {
        let i = self.skip_spaces_from(self.cursor.index);
        match self.bytes.get(i) {
            Some(b'[') => true,
            Some(c) if c.is_ascii_digit() => {
                if self.looks_like_datestamp(i) {
                    return true;
                }
                let len = self.number_len(i);
                self.bytes.get(i + len) == Some(&b':')
            }
            _ => false,
        }
    }

    /// Error for a token that is required at the cursor but absent.
    pub fn missing(&self, expected: &'static str) -> ScanError {
        let i = self.skip_spaces_from(self.cursor.index);
        match self.line.get(i..) {
            Some(rest) if !rest.is_empty() => ScanError::Expected { expected, found: excerpt(rest) },
            _ => ScanError::UnexpectedEnd { expected },
        }
    }

    pub fn next_is_bracket(&self) -> bool {
        let i = self.skip_spaces_from(self.cursor.index);
        self.bytes.get(i) == Some(&b'[')
    }

    /// Move past the next `]` and the spaces after it. Stays put when there
    /// is no closing bracket left.
    pub fn skip_to_end_of_detail(&mut self) {
        if let Some(offset) = self.rest().find(']') {
            self.cursor.index = self.skip_spaces_from(self.cursor.index + offset + 1);
        }
    }
}

fn tag_text(text: &str) -> String {
    let end = text.find([':', ']', '[', ',']).unwrap_or(text.len());
    excerpt(text[..end].trim_end())
}

fn excerpt(text: &str) -> String {
    text.chars().take(40).collect()
}
