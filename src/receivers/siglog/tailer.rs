// SPDX-License-Identifier: Apache-2.0

//! Cursor-tracking tail reader for a single log file.
//!
//! Each poll opens the file fresh, checks for truncation, reads everything
//! past the cursor, and yields the lines containing the configured
//! signature substring. The handle is scoped to the poll so nothing stays
//! open across cycles.

use std::fs::File;
use std::io::{self, BufRead, BufReader, Seek, SeekFrom};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

pub struct LogTailer {
    path: PathBuf,
    signature: String,
    /// Byte offset of the next unread position. Monotonically non-decreasing
    /// except on truncation, where it resets to the new end of file.
    offset: u64,
}

impl LogTailer {
    /// Open the file and start tailing from its current end. Content written
    /// before this call is never surfaced.
    pub fn start_at_end(path: impl AsRef<Path>, signature: impl Into<String>) -> io::Result<Self> {
        let path = path.as_ref().to_path_buf();
        let offset = File::open(&path)?.metadata()?.len();

        debug!(path = %path.display(), offset, "beginning to tail log file");

        Ok(Self {
            path,
            signature: signature.into(),
            offset,
        })
    }

    /// Current cursor position in bytes.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Read all lines appended since the last poll and return those that
    /// contain the signature substring.
    ///
    /// If the file is now shorter than the cursor it was truncated or
    /// rotated: the cursor resets to the new end of file and this cycle
    /// yields nothing. Lines written in the same cycle as the truncation are
    /// lost; that loss is accepted and surfaced only as a warning.
    pub fn poll(&mut self) -> io::Result<Vec<String>> {
        let mut file = File::open(&self.path)?;

        let eof = file.seek(SeekFrom::End(0))?;
        if eof < self.offset {
            warn!(
                path = %self.path.display(),
                cursor = self.offset,
                eof,
                "log file got shorter, this should not happen"
            );
            self.offset = eof;
            return Ok(Vec::new());
        }

        file.seek(SeekFrom::Start(self.offset))?;
        let mut reader = BufReader::new(file);

        let mut matched = Vec::new();
        let mut acquired = 0u64;
        let mut buf = Vec::new();

        loop {
            buf.clear();
            let n = reader.read_until(b'\n', &mut buf)?;
            if n == 0 {
                break;
            }
            self.offset += n as u64;
            acquired += 1;

            let line = match std::str::from_utf8(&buf) {
                Ok(s) => s.trim_end_matches(['\n', '\r']),
                Err(e) => {
                    debug!(error = %e, "skipping undecodable line from log file");
                    continue;
                }
            };

            if line.contains(&self.signature) {
                debug!(signature = %self.signature, line, "log contains target signature");
                matched.push(line.to_string());
            }
        }

        if acquired > 0 {
            debug!(
                path = %self.path.display(),
                lines = acquired,
                matched = matched.len(),
                "acquired new lines from log file"
            );
        } else {
            debug!(path = %self.path.display(), "no new lines acquired from log file");
        }

        Ok(matched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn append(file: &NamedTempFile, content: &str) {
        let mut f = std::fs::OpenOptions::new()
            .append(true)
            .open(file.path())
            .unwrap();
        f.write_all(content.as_bytes()).unwrap();
        f.flush().unwrap();
    }

    #[test]
    fn test_start_at_end_skips_existing_content() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "old line with probe-sig").unwrap();
        file.flush().unwrap();

        let mut tailer = LogTailer::start_at_end(file.path(), "probe-sig").unwrap();

        let lines = tailer.poll().unwrap();
        assert!(lines.is_empty(), "pre-existing content must not be surfaced");
    }

    #[test]
    fn test_poll_yields_only_signature_lines() {
        let file = NamedTempFile::new().unwrap();
        let mut tailer = LogTailer::start_at_end(file.path(), "probe-sig").unwrap();

        append(
            &file,
            "1700000000.5 probe-sig 10.0.0.1 443 10.0.0.2 51000 extra\ngarbage no signature here\n",
        );

        let lines = tailer.poll().unwrap();
        assert_eq!(
            lines,
            vec!["1700000000.5 probe-sig 10.0.0.1 443 10.0.0.2 51000 extra"]
        );
    }

    #[test]
    fn test_poll_is_idempotent_without_new_content() {
        let file = NamedTempFile::new().unwrap();
        let mut tailer = LogTailer::start_at_end(file.path(), "probe-sig").unwrap();

        append(&file, "first probe-sig line\n");
        assert_eq!(tailer.poll().unwrap().len(), 1);
        let offset = tailer.offset();

        assert!(tailer.poll().unwrap().is_empty());
        assert_eq!(tailer.offset(), offset);
        assert!(tailer.poll().unwrap().is_empty());
        assert_eq!(tailer.offset(), offset);
    }

    #[test]
    fn test_poll_strips_trailing_newline_and_cr() {
        let file = NamedTempFile::new().unwrap();
        let mut tailer = LogTailer::start_at_end(file.path(), "probe-sig").unwrap();

        append(&file, "crlf probe-sig line\r\n");

        let lines = tailer.poll().unwrap();
        assert_eq!(lines, vec!["crlf probe-sig line"]);
    }

    #[test]
    fn test_poll_surfaces_unterminated_final_line() {
        let file = NamedTempFile::new().unwrap();
        let mut tailer = LogTailer::start_at_end(file.path(), "probe-sig").unwrap();

        append(&file, "partial probe-sig line");

        let lines = tailer.poll().unwrap();
        assert_eq!(lines, vec!["partial probe-sig line"]);
        assert_eq!(tailer.offset(), "partial probe-sig line".len() as u64);
    }

    #[test]
    fn test_truncation_resets_cursor_to_new_eof() {
        let file = NamedTempFile::new().unwrap();

        // Grow the file to 500 bytes and advance the cursor past all of it
        let payload = "x".repeat(499);
        append(&file, &format!("{payload}\n"));
        let mut tailer = LogTailer::start_at_end(file.path(), "probe-sig").unwrap();
        assert_eq!(tailer.offset(), 500);

        // Truncate down to 100 bytes between polls
        let f = std::fs::OpenOptions::new()
            .write(true)
            .open(file.path())
            .unwrap();
        f.set_len(100).unwrap();
        drop(f);

        let lines = tailer.poll().unwrap();
        assert!(lines.is_empty());
        assert_eq!(tailer.offset(), 100);
    }

    #[test]
    fn test_lines_appended_after_truncation_are_read() {
        let file = NamedTempFile::new().unwrap();
        append(&file, "some existing content padding\n");
        let mut tailer = LogTailer::start_at_end(file.path(), "probe-sig").unwrap();

        let f = std::fs::OpenOptions::new()
            .write(true)
            .open(file.path())
            .unwrap();
        f.set_len(0).unwrap();
        drop(f);

        assert!(tailer.poll().unwrap().is_empty());
        assert_eq!(tailer.offset(), 0);

        append(&file, "fresh probe-sig line\n");
        let lines = tailer.poll().unwrap();
        assert_eq!(lines, vec!["fresh probe-sig line"]);
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("does-not-exist.log");

        assert!(LogTailer::start_at_end(&path, "probe-sig").is_err());
    }

    #[test]
    fn test_file_removed_between_polls_is_an_error() {
        let file = NamedTempFile::new().unwrap();
        let mut tailer = LogTailer::start_at_end(file.path(), "probe-sig").unwrap();

        let path = file.path().to_path_buf();
        drop(file);
        std::fs::remove_file(&path).ok();

        assert!(tailer.poll().is_err());
    }

    #[test]
    fn test_signature_match_is_case_sensitive() {
        let file = NamedTempFile::new().unwrap();
        let mut tailer = LogTailer::start_at_end(file.path(), "Probe-Sig").unwrap();

        append(&file, "lowercase probe-sig line\nexact Probe-Sig line\n");

        let lines = tailer.poll().unwrap();
        assert_eq!(lines, vec!["exact Probe-Sig line"]);
    }
}
