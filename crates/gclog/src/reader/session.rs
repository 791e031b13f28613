//! Session — drives one source through the reassembler into a [`GcModel`].

use tracing::{debug, error, info, warn};

use crate::conf::ReassemblyConfig;
use crate::parser::model::{GcModel, LogFormat, ReadError};
use crate::parser::traits::{DataReader, LineSource};

use super::reassembler::{BlockKind, LineReassembler, RawLine, Step};

/// Reader for logs written by Sun / Oracle JVMs 1.4 to 1.7 with
/// `-verbose:gc` or `-XX:+PrintGCDetails`.
pub struct DataReaderSun1_6<S: LineSource> {
    source: S,
    reassembler: LineReassembler,
    pushed_back: Option<RawLine>,
    line_number: usize,
    lines_read: usize,
}

impl<S: LineSource> DataReaderSun1_6<S> {
    pub fn new(source: S) -> Self {
        Self::with_config(source, &ReassemblyConfig::default())
    }

    pub fn with_config(source: S, config: &ReassemblyConfig) -> Self {
        Self {
            source,
            reassembler: LineReassembler::new(config),
            pushed_back: None,
            line_number: 0,
            lines_read: 0,
        }
    }

    /// Next physical line; a pushed-back line comes again with its own number.
    fn next_raw(&mut self) -> std::io::Result<Option<RawLine>> {
        if let Some(raw) = self.pushed_back.take() {
            return Ok(Some(raw));
        }
        match self.source.next_line()? {
            Some(text) => {
                self.line_number += 1;
                self.lines_read += 1;
                Ok(Some(RawLine::new(text, self.line_number)))
            }
            None => Ok(None),
        }
    }

    /// Consume the lines of a diagnostic block. The first line outside the
    /// block is pushed back for normal processing.
    fn skip_block(&mut self, kind: BlockKind) -> std::io::Result<usize> {
        let mut skipped = 0;
        while let Some(raw) = self.next_raw()? {
            if kind.continues_with(&raw.text) {
                skipped += 1;
            } else {
                self.pushed_back = Some(raw);
                break;
            }
        }
        debug!(?kind, skipped, line_number = self.line_number, "skipped diagnostic block");
        Ok(skipped)
    }

    fn read_into(&mut self, model: &mut GcModel) -> std::io::Result<()> {
        while let Some(raw) = self.next_raw()? {
            match self.reassembler.process(&raw) {
                Ok(Step::Event(event)) => model.add(event),
                Ok(Step::Excluded) => model.stats.lines_excluded += 1,
                Ok(Step::Ignored | Step::Buffered) => {}
                Ok(Step::SkipBlock(kind)) => {
                    model.stats.lines_skipped += self.skip_block(kind)?;
                }
                Err(e) => {
                    model.stats.failures += 1;
                    warn!(line_number = raw.number, line = %raw.text, error = %e, "failed to parse line");
                    self.reassembler.reset();
                }
            }
        }
        Ok(())
    }
}

impl<S: LineSource> DataReader for DataReaderSun1_6<S> {
    fn read(mut self) -> Result<GcModel, ReadError> {
        info!("Reading Sun / Oracle 1.4.x / 1.5.x / 1.6.x / 1.7.x format...");

        let mut model = GcModel::new(self.format());
        let result = self.read_into(&mut model);
        model.stats.lines_read = self.lines_read;

        let leftover = self.reassembler.finish();
        if !leftover.is_empty() {
            debug!(fragments = leftover.len(), "discarding incomplete lines at end of input");
        }

        info!(
            lines = model.stats.lines_read,
            events = model.stats.events,
            failures = model.stats.failures,
            "Done reading"
        );

        let line_number = self.line_number + 1;
        // release the source before handing out the result
        drop(self);

        match result {
            Ok(()) => Ok(model),
            Err(source) => {
                error!(line_number, error = %source, "failed reading gc log");
                Err(ReadError { source, line_number, partial: Box::new(model) })
            }
        }
    }

    fn format(&self) -> LogFormat {
        LogFormat::SunXLogGc
    }
}
