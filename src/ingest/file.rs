//! Per-file scanning with failure isolation.
//!
//! A file that cannot be opened or read is reported as
//! [`FileOutcome::Failed`] together with whatever was reconstructed before
//! the failure. Nothing here returns an error to the caller.

use std::borrow::Cow;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::Path;

use tracing::{debug, warn};

use crate::engine::{DecodePolicy, Engine, LineEvent, MessageReconstructor};
use crate::model::{FileOutcome, FileReport, LogMessage, Provenance};

/// Scans single files with a shared engine.
#[derive(Debug, Clone)]
pub struct FileScanner<'e> {
    engine: &'e Engine,
    source_host: String,
    record_orphans: bool,
}

impl<'e> FileScanner<'e> {
    pub fn new(engine: &'e Engine, source_host: impl Into<String>) -> Self {
        Self {
            engine,
            source_host: source_host.into(),
            record_orphans: false,
        }
    }

    /// Keep orphan line texts for the error report.
    pub fn record_orphans(mut self, enabled: bool) -> Self {
        self.record_orphans = enabled;
        self
    }

    pub fn engine(&self) -> &Engine {
        self.engine
    }

    /// Provenance for a file found under `root`.
    pub fn provenance(&self, path: &Path, root: Option<&Path>) -> Provenance {
        let folder = self.engine.folder_policy().folder_timestamp(root, path);
        Provenance::new(path, &self.source_host, folder)
    }

    /// Open and scan one file.
    pub fn scan_path(&self, path: &Path, root: Option<&Path>) -> FileReport {
        let provenance = self.provenance(path, root);
        match File::open(path) {
            Ok(file) => self.scan_reader(BufReader::new(file), provenance),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "failed to open log file");
                let description = format!("Failed to open {}: {}", path.display(), e);
                failed_before_start(provenance, description)
            }
        }
    }

    /// Scan any buffered reader as if it were the file named in `provenance`.
    pub fn scan_reader<R: BufRead>(&self, mut reader: R, provenance: Provenance) -> FileReport {
        let path = provenance.source_path.clone();
        let mut reconstructor = MessageReconstructor::new(self.engine, provenance);
        let mut messages = Vec::new();
        let mut orphans = Vec::new();
        let mut orphan_lines = 0;
        let mut lines_read = 0;
        let mut bytes_read = 0u64;
        let mut failure: Option<String> = None;
        let mut buf = Vec::new();

        'read: loop {
            buf.clear();
            match reader.read_until(b'\n', &mut buf) {
                Ok(0) => break,
                Ok(n) => {
                    bytes_read += n as u64;
                    for raw in physical_lines(&buf) {
                        lines_read += 1;
                        let line = match decode_line(raw, self.engine.decode_policy()) {
                            Ok(line) => line,
                            Err(e) => {
                                failure = Some(format!(
                                    "Failed to read line {} of {}: {}",
                                    lines_read,
                                    path.display(),
                                    e
                                ));
                                break 'read;
                            }
                        };
                        match reconstructor.push_line(&line) {
                            LineEvent::Started(Some(done)) => messages.push(done),
                            LineEvent::Started(None) | LineEvent::Continued => {}
                            LineEvent::Orphan => {
                                orphan_lines += 1;
                                if self.record_orphans {
                                    orphans.push(line.into_owned());
                                }
                            }
                        }
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
                Err(e) => {
                    failure = Some(format!(
                        "Failed to read line {} of {}: {}",
                        lines_read + 1,
                        path.display(),
                        e
                    ));
                    break;
                }
            }
        }

        // Flush on both clean EOF and failure so partial progress is kept.
        messages.extend(reconstructor.finish());

        let outcome = match failure {
            Some(error_description) => {
                warn!(
                    path = %path.display(),
                    error = %error_description,
                    messages = messages.len(),
                    "log file read failed, keeping partial results"
                );
                messages.push(LogMessage::read_error(
                    reconstructor.provenance().clone(),
                    &error_description,
                ));
                FileOutcome::Failed { error_description }
            }
            None => FileOutcome::Ok {
                messages_emitted: messages.len(),
                orphan_lines,
            },
        };

        debug!(
            path = %path.display(),
            lines = lines_read,
            messages = messages.len(),
            orphans = orphan_lines,
            "scanned log file"
        );

        FileReport {
            path,
            outcome,
            messages,
            lines_read,
            bytes_read,
            orphan_lines,
            orphans,
            multiline_messages: reconstructor.multiline_messages(),
            continuation_lines: reconstructor.continuation_lines(),
        }
    }
}

fn failed_before_start(provenance: Provenance, error_description: String) -> FileReport {
    let path = provenance.source_path.clone();
    FileReport {
        path,
        messages: vec![LogMessage::read_error(provenance, &error_description)],
        outcome: FileOutcome::Failed { error_description },
        lines_read: 0,
        bytes_read: 0,
        orphan_lines: 0,
        orphans: Vec::new(),
        multiline_messages: 0,
        continuation_lines: 0,
    }
}

/// Strip the line terminator and decode.
/// Split a chunk read up to `\n` into physical lines without terminators.
/// `\n`, `\r\n` and a bare `\r` all end a line.
fn physical_lines(chunk: &[u8]) -> impl Iterator<Item = &[u8]> {
    let mut body = chunk.strip_suffix(b"\n").unwrap_or(chunk);
    body = body.strip_suffix(b"\r").unwrap_or(body);
    body.split(|&b| b == b'\r')
}

fn decode_line(raw: &[u8], policy: DecodePolicy) -> io::Result<Cow<'_, str>> {
    match policy {
        DecodePolicy::Lossy => Ok(String::from_utf8_lossy(raw)),
        DecodePolicy::Strict => std::str::from_utf8(raw)
            .map(Cow::Borrowed)
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e)),
    }
}
