/// GC log parsing
///
/// Turns one reconstructed logical line of a Sun / Oracle GC log into a
/// structured event.
///
/// # Architecture
///
/// - `types.rs`: Table of known collection tags
/// - `scanner.rs`: Token scanner over one line with a shared cursor
/// - `event.rs`: Event parser built on the scanner
/// - `tables.rs`: Noise prefixes and block markers used by the reassembler
/// - `model.rs`: Events, the model and the error types
/// - `traits.rs`: Line sources and readers
///
/// # Recovery
///
/// An unknown or malformed nested detail is skipped and the parent event is
/// still produced. Anything else fails the line, never the whole read.

pub mod traits;
pub mod types;
pub mod scanner;
pub mod event;
pub mod tables;
pub mod model;

// Re-export commonly used types
pub use event::parse_line;
pub use model::{Event, EventBody, GcModel, LogFormat, Memory, ParseError, ReadError, ReadStats, ScanError};
pub use scanner::ScanCursor;
pub use traits::{BoundedLines, DataReader, LineSource};
pub use types::EventType;

// Constants
pub const MAX_LINE_SIZE: usize = 1_048_576; // 1MB
pub const MAX_PENDING_FRAGMENTS: usize = 4;
