//! Event — turns one reconstructed logical line into one [`Event`].

use chrono::{DateTime, FixedOffset};

use super::model::{Event, EventBody, ParseError, ScanError};
use super::scanner::{ScanCursor, Scanner};
use super::types::GcPattern;

/// Parse a complete logical line.
///
/// The cursor must point at the start of `line`; on return it points past
/// the last token that was consumed. Any failure that could not be skipped
/// over is reported with the line text and the cursor position.
pub fn parse_line(line: &str, cursor: &mut ScanCursor) -> Result<Event, ParseError> {
    let line_number = cursor.line_number();
    let mut scanner = Scanner::new(line, cursor);
    parse_event(&mut scanner).map_err(|source| ParseError::Line {
        source,
        line: line.to_string(),
        position: scanner.position(),
        line_number,
    })
}

fn parse_event(scanner: &mut Scanner) -> Result<Event, ScanError> {
    let datestamp = scanner.datestamp()?;
    let timestamp = scanner.timestamp()?;
    let event_type = scanner.event_type()?;

    if event_type.is_concurrent() {
        let body = match event_type.pattern {
            GcPattern::Tag => EventBody::ConcurrentMarker,
            _ => {
                let (elapsed, duration) = scanner.pause_pair()?;
                EventBody::ConcurrentPhase { elapsed, duration }
            }
        };
        return Ok(Event { datestamp, timestamp, event_type, body });
    }

    let mut details = Vec::new();
    let mut last_position = scanner.position();
    let mut advanced = true;
    while advanced && scanner.has_next_detail() {
        match parse_detail(scanner, timestamp) {
            Ok(detail) => details.push(detail),
            Err(e) if e.is_detail_recoverable() => {
                tracing::debug!(error = %e, position = scanner.position(), "skipping detail event");
                scanner.skip_to_end_of_detail();
            }
            Err(e) => return Err(e),
        }
        // a line of garbage must not keep the loop spinning in place
        advanced = scanner.position() != last_position;
        last_position = scanner.position();
    }

    let memory = scanner.memory()?;
    let mut pause = scanner.pause()?;
    if pause.is_none() {
        if scanner.has_next_detail() {
            details.push(parse_detail(scanner, timestamp)?);
        }
        pause = scanner.pause()?;
    }
    if pause.is_none() && event_type.pattern.has_pause() {
        return Err(scanner.missing("secs"));
    }

    Ok(Event {
        datestamp,
        timestamp,
        event_type,
        body: EventBody::Collection { memory, pause, details },
    })
}

/// A detail bracketed inside its parent, e.g. `1.5: [ParNew: 900K->100K(1000K), 0.05 secs]`.
fn parse_detail(scanner: &mut Scanner, parent_timestamp: f64) -> Result<Event, ScanError> {
    let (datestamp, timestamp) = if scanner.next_is_bracket() {
        (None, parent_timestamp)
    } else {
        nested_stamps(scanner)?
    };
    let event_type = scanner.event_type()?;
    let memory = scanner.memory()?;
    let pause = scanner.pause()?;
    Ok(Event {
        datestamp,
        timestamp,
        event_type,
        body: EventBody::Collection { memory, pause, details: Vec::new() },
    })
}

fn nested_stamps(scanner: &mut Scanner) -> Result<(Option<DateTime<FixedOffset>>, f64), ScanError> {
    let datestamp = scanner.datestamp()?;
    let timestamp = scanner.timestamp()?;
    Ok((datestamp, timestamp))
}
