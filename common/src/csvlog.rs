// Copyright © SixtyFPS GmbH <info@slint.dev>
// SPDX-License-Identifier: MIT

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use crate::sampler::Sample;

pub const HEADER: &str = "Time, t1, t2, t3, t4, t5, t6, t7, t8";

/// Append-only CSV log of samples. The header is written once on creation.
pub struct CsvLog<W: Write> {
    writer: W,
}

impl CsvLog<BufWriter<File>> {
    /// Creates (or truncates) the file at `path` and writes the header.
    pub fn create(path: impl AsRef<Path>) -> io::Result<Self> {
        let file = File::create(path.as_ref())?;
        log::info!("Logging samples to {}", path.as_ref().display());
        Self::new(BufWriter::new(file))
    }
}

/// Opens the log for the output path given on the command line.
///
/// No path, or an empty one, means the readings are only printed and no file is touched.
pub fn open_output(path: Option<&Path>) -> io::Result<Option<CsvLog<BufWriter<File>>>> {
    match path {
        Some(path) if !path.as_os_str().is_empty() => CsvLog::create(path).map(Some),
        _ => Ok(None),
    }
}

impl<W: Write> CsvLog<W> {
    pub fn new(mut writer: W) -> io::Result<Self> {
        writeln!(writer, "{HEADER}")?;
        Ok(Self { writer })
    }

    pub fn append(&mut self, sample: &Sample) -> io::Result<()> {
        write!(self.writer, "{}", sample.timestamp())?;
        for value in sample.temperatures {
            write!(self.writer, ", {value:?}")?;
        }
        writeln!(self.writer)
    }

    /// Flushes everything written so far and returns the underlying writer.
    pub fn finish(mut self) -> io::Result<W> {
        self.writer.flush()?;
        Ok(self.writer)
    }
}

#[cfg(test)]
fn sample(hour: u32, min: u32, sec: u32, temperatures: [f32; 8]) -> Sample {
    Sample {
        time: chrono::NaiveTime::from_hms_opt(hour, min, sec).unwrap(),
        temperatures,
    }
}

#[test]
fn test_header_is_written_once_before_rows() {
    let mut log = CsvLog::new(Vec::new()).unwrap();
    log.append(&sample(9, 5, 3, [20.1, 20.2, 20.3, 20.4, 20.5, 20.6, 20.7, 20.8]))
        .unwrap();
    log.append(&sample(9, 5, 4, [-1.5, 0.0, 100.0, 3.25, 4.0, 5.0, 6.0, 7.0]))
        .unwrap();
    let text = String::from_utf8(log.finish().unwrap()).unwrap();

    assert_eq!(
        text,
        "Time, t1, t2, t3, t4, t5, t6, t7, t8\n\
         09:05:03, 20.1, 20.2, 20.3, 20.4, 20.5, 20.6, 20.7, 20.8\n\
         09:05:04, -1.5, 0.0, 100.0, 3.25, 4.0, 5.0, 6.0, 7.0\n"
    );
    for line in text.lines() {
        assert_eq!(line.split(',').count(), 9);
    }
}

#[test]
fn test_create_truncates_existing_file() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");
    std::fs::write(&path, "stale contents\nmore\n").unwrap();

    let log = CsvLog::create(&path).unwrap();
    log.finish().unwrap();

    assert_eq!(std::fs::read_to_string(&path).unwrap(), format!("{HEADER}\n"));
}

#[test]
fn test_create_fails_in_missing_directory() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("missing").join("log.csv");
    assert!(CsvLog::create(&path).is_err());
}

#[test]
fn test_no_output_path_creates_no_file() {
    let cwd = std::env::current_dir().unwrap();
    let before: Vec<_> = std::fs::read_dir(&cwd).unwrap().flatten().map(|e| e.path()).collect();

    assert!(open_output(None).unwrap().is_none());
    assert!(open_output(Some(Path::new(""))).unwrap().is_none());

    let after: Vec<_> = std::fs::read_dir(&cwd).unwrap().flatten().map(|e| e.path()).collect();
    assert_eq!(before.len(), after.len());
}

#[test]
fn test_output_path_opens_log_with_header() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("log.csv");

    let log = open_output(Some(path.as_path())).unwrap().unwrap();
    log.finish().unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("Time, t1, t2, t3, t4, t5, t6, t7, t8\n"));
    assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
}
