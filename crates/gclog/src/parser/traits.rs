use std::io::{self, BufRead, Read};

pub use super::model::{GcModel, LogFormat, ReadError};

/// Where physical log lines come from.
pub trait LineSource {
    /// Next line without its line terminator, or `None` at end of input.
    fn next_line(&mut self) -> io::Result<Option<String>>;
}

/// Any buffered reader is a line source. Invalid UTF-8 is replaced rather
/// than failing the read. Lines are buffered whole; see [`BoundedLines`]
/// for input whose line lengths are not trusted.
impl<R: BufRead> LineSource for R {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        let mut buf = Vec::new();
        if self.read_until(b'\n', &mut buf)? == 0 {
            return Ok(None);
        }
        Ok(Some(into_line(buf)))
    }
}

/// Line source that keeps at most `max_len` bytes (plus the terminator) of a
/// line in memory. The rest of an overlong line is read and thrown away, and
/// the line comes out longer than `max_len`, so the length guard of the
/// reassembler still rejects it.
pub struct BoundedLines<R> {
    inner: R,
    max_len: usize,
}

impl<R: BufRead> BoundedLines<R> {
    pub fn new(inner: R, max_len: usize) -> Self {
        Self { inner, max_len }
    }

    fn discard_rest_of_line(&mut self) -> io::Result<()> {
        loop {
            let (used, done) = match self.inner.fill_buf() {
                Ok([]) => return Ok(()),
                Ok(available) => match available.iter().position(|&b| b == b'\n') {
                    Some(i) => (i + 1, true),
                    None => (available.len(), false),
                },
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => return Err(e),
            };
            self.inner.consume(used);
            if done {
                return Ok(());
            }
        }
    }
}

impl<R: BufRead> LineSource for BoundedLines<R> {
    fn next_line(&mut self) -> io::Result<Option<String>> {
        // room for "\r\n"
        let limit = self.max_len.saturating_add(2) as u64;
        let mut buf = Vec::new();
        let read = (&mut self.inner).take(limit).read_until(b'\n', &mut buf)?;
        if read == 0 {
            return Ok(None);
        }
        if buf.last() != Some(&b'\n') && read as u64 == limit {
            self.discard_rest_of_line()?;
        }
        Ok(Some(into_line(buf)))
    }
}

fn into_line(mut buf: Vec<u8>) -> String {
    if buf.last() == Some(&b'\n') {
        buf.pop();
        if buf.last() == Some(&b'\r') {
            buf.pop();
        }
    }
    String::from_utf8_lossy(&buf).into_owned()
}

pub trait DataReader {
    /// Read the whole source into a model. Consumes the reader so the source
    /// is released however the read ends.
    fn read(self) -> Result<GcModel, ReadError>;

    fn format(&self) -> LogFormat;
}
