//! Run — one read session per file, results written in argument order.

use std::collections::BTreeMap;
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::{Path, PathBuf};

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info};

use crate::conf::{OutputFormat, ReaderConfig, ReassemblyConfig};
use crate::parser::model::{Event, GcModel, ReadError};
use crate::parser::traits::{BoundedLines, DataReader};
use crate::reader::DataReaderSun1_6;

#[derive(Debug, Error)]
pub enum FileError {
    #[error("failed to open {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: io::Error,
    },

    #[error(transparent)]
    Read(#[from] ReadError),

    #[error("read task for {path} failed: {source}")]
    Task {
        path: String,
        #[source]
        source: tokio::task::JoinError,
    },
}

/// One line of `json` output.
#[derive(Serialize)]
struct EventRecord<'a> {
    file: &'a str,
    #[serde(flatten)]
    event: &'a Event,
}

/// Read one GC log file to completion on the calling thread.
pub fn read_file(path: &Path, config: &ReassemblyConfig) -> Result<GcModel, FileError> {
    let file = File::open(path).map_err(|source| FileError::Open {
        path: path.display().to_string(),
        source,
    })?;
    info!(file = %path.display(), "Opened gc log");
    let source = BoundedLines::new(BufReader::new(file), config.max_line_length);
    let model = DataReaderSun1_6::with_config(source, config).read()?;
    Ok(model)
}

/// Read all files concurrently and print their results in argument order.
///
/// Returns `false` when any file could not be opened or was cut short by an
/// I/O failure; partial results are printed regardless.
pub async fn run(files: Vec<PathBuf>, config: &ReaderConfig) -> io::Result<bool> {
    let tasks: Vec<_> = files
        .into_iter()
        .map(|path| {
            let reassembly = config.reassembly.clone();
            let task_path = path.clone();
            let task = tokio::task::spawn_blocking(move || read_file(&task_path, &reassembly));
            (path, task)
        })
        .collect();

    let mut all_ok = true;
    let stdout = io::stdout();
    for (path, task) in tasks {
        let name = path.display().to_string();
        let result = task
            .await
            .unwrap_or_else(|source| Err(FileError::Task { path: name.clone(), source }));

        let mut out = stdout.lock();
        match result {
            Ok(model) => write_model(&mut out, &name, &model, config.output)?,
            Err(FileError::Read(e)) => {
                write_model(&mut out, &name, &e.partial, config.output)?;
                error!(file = %name, error = %e, "Read aborted, partial results written");
                all_ok = false;
            }
            Err(e) => {
                error!(file = %name, error = %e, "Failed to read gc log");
                all_ok = false;
            }
        }
        out.flush()?;
    }
    Ok(all_ok)
}

pub fn write_model<W: Write>(out: &mut W, file: &str, model: &GcModel, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Json => {
            for event in &model.events {
                serde_json::to_writer(&mut *out, &EventRecord { file, event })?;
                writeln!(out)?;
            }
            Ok(())
        }
        OutputFormat::Summary => write_summary(out, file, model),
    }
}

fn write_summary<W: Write>(out: &mut W, file: &str, model: &GcModel) -> io::Result<()> {
    let stats = &model.stats;
    writeln!(
        out,
        "{}: {} events from {} lines (excluded {}, skipped {}, failed {})",
        file, stats.events, stats.lines_read, stats.lines_excluded, stats.lines_skipped, stats.failures
    )?;

    let mut by_type: BTreeMap<&str, (usize, f64)> = BTreeMap::new();
    for event in &model.events {
        let entry = by_type.entry(event.event_type.name).or_default();
        entry.0 += 1;
        entry.1 += event.pause().unwrap_or(0.0);
    }
    for (name, (count, pause)) in by_type {
        writeln!(out, "  {:<40} {:>8} {:>12.6} secs", name, count, pause)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::model::LogFormat;
    use std::io::Cursor;

    fn model_of(log: &str) -> GcModel {
        DataReaderSun1_6::new(Cursor::new(log.as_bytes().to_vec())).read().unwrap()
    }

    fn write_temp(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!("gclog-run-{}-{}.log", name, std::process::id()));
        std::fs::write(&path, contents).expect("temp file should be writable");
        path
    }

    #[test]
    fn test_json_output_one_event_per_line() {
        let model = model_of(
            "1.0: [GC 1024K->512K(2048K), 0.01 secs]\n2.0: [CMS-concurrent-mark-start]\n",
        );
        let mut out = Vec::new();
        write_model(&mut out, "gc.log", &model, OutputFormat::Json).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);

        let first: serde_json::Value = serde_json::from_str(lines[0]).unwrap();
        assert_eq!(first["file"], "gc.log");
        assert_eq!(first["timestamp"], 1.0);
        assert_eq!(first["type"]["name"], "GC");
        assert_eq!(first["memory"]["after"], 512);

        let second: serde_json::Value = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(second["shape"], "concurrent_marker");
    }

    #[test]
    fn test_summary_output() {
        let model = model_of(
            "1.0: [GC 1024K->512K(2048K), 0.5 secs]\n\
             2.0: [GC 1024K->512K(2048K), 0.25 secs]\n\
             not a gc line\n",
        );
        let mut out = Vec::new();
        write_model(&mut out, "gc.log", &model, OutputFormat::Summary).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.starts_with("gc.log: 2 events from 3 lines (excluded 0, skipped 0, failed 1)"));
        assert!(text.contains("GC"));
        assert!(text.contains("0.750000 secs"));
    }

    #[test]
    fn test_read_file_missing() {
        let err = read_file(Path::new("/nonexistent/gc.log"), &ReassemblyConfig::default()).unwrap_err();
        assert!(matches!(err, FileError::Open { .. }));
    }

    #[test]
    fn test_read_file() {
        let path = write_temp("read", "1.0: [GC 1024K->512K(2048K), 0.01 secs]\n");
        let model = read_file(&path, &ReassemblyConfig::default()).unwrap();
        assert_eq!(model.format, LogFormat::SunXLogGc);
        assert_eq!(model.len(), 1);
        let _ = std::fs::remove_file(&path);
    }

    #[test]
    fn test_read_file_rejects_overlong_line() {
        let long = format!("1.0: [GC 1024K->512K(2048K), 0.01 secs]{}\n", " ".repeat(64));
        let path = write_temp("overlong", &format!("{}2.0: [GC 1024K->512K(2048K), 0.02 secs]\n", long));
        let config = ReassemblyConfig { max_line_length: 48, ..Default::default() };
        let model = read_file(&path, &config).unwrap();
        assert_eq!(model.len(), 1);
        assert_eq!(model.events[0].timestamp, 2.0);
        assert_eq!(model.stats.failures, 1);
        let _ = std::fs::remove_file(&path);
    }

    #[tokio::test]
    async fn test_run_reports_missing_file() {
        let good = write_temp("good", "1.0: [GC 1024K->512K(2048K), 0.01 secs]\n");
        let config = ReaderConfig::default();
        assert!(run(vec![good.clone()], &config).await.unwrap());
        assert!(!run(vec![good.clone(), PathBuf::from("/nonexistent/gc.log")], &config).await.unwrap());
        let _ = std::fs::remove_file(&good);
    }
}
