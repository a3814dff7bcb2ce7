use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Write};
use std::path::Path;

use crate::source::{OverrideEntry, OverrideSource, SourceError};

fn is_zstd_path(path: &Path) -> bool {
    path.extension().is_some_and(|ext| ext == "zst")
}

/// Streaming reader for override files holding one JSON entry per line.
///
/// Paths ending in `.zst` are decompressed on the fly. Blank lines are
/// skipped; any other line that fails to parse is a [`SourceError::Malformed`]
/// carrying the 1-based line number.
pub struct JsonlReader {
    input: Box<dyn BufRead>,
    line: u64,
    buf: String,
}

impl std::fmt::Debug for JsonlReader {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JsonlReader")
            .field("line", &self.line)
            .finish_non_exhaustive()
    }
}

impl JsonlReader {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path)?;
        let input: Box<dyn BufRead> = if is_zstd_path(path) {
            Box::new(BufReader::new(zstd::Decoder::new(file)?))
        } else {
            Box::new(BufReader::new(file))
        };
        tracing::debug!(path = %path.display(), "opened override stream");
        Ok(Self {
            input,
            line: 0,
            buf: String::new(),
        })
    }
}

impl OverrideSource for JsonlReader {
    fn next_entry(&mut self) -> Result<Option<OverrideEntry>, SourceError> {
        loop {
            self.buf.clear();
            if self.input.read_line(&mut self.buf)? == 0 {
                return Ok(None);
            }
            self.line += 1;
            let text = self.buf.trim();
            if text.is_empty() {
                continue;
            }
            return serde_json::from_str(text).map(Some).map_err(|err| {
                SourceError::Malformed {
                    line: self.line,
                    message: err.to_string(),
                }
            });
        }
    }
}

/// Writer producing files [`JsonlReader`] reads back, zstd-compressed when
/// the path ends in `.zst`.
pub enum JsonlWriter {
    Plain(BufWriter<File>),
    Zstd(zstd::Encoder<'static, BufWriter<File>>),
}

impl JsonlWriter {
    pub fn create(path: &Path) -> io::Result<Self> {
        let file = BufWriter::new(File::create(path)?);
        if is_zstd_path(path) {
            Ok(JsonlWriter::Zstd(zstd::Encoder::new(file, 3)?))
        } else {
            Ok(JsonlWriter::Plain(file))
        }
    }

    pub fn append(&mut self, entry: &OverrideEntry) -> io::Result<()> {
        let mut line = serde_json::to_vec(entry).map_err(io::Error::other)?;
        line.push(b'\n');
        match self {
            JsonlWriter::Plain(w) => w.write_all(&line),
            JsonlWriter::Zstd(w) => w.write_all(&line),
        }
    }

    /// Flush buffered entries and, for compressed output, write the zstd
    /// frame epilogue. Dropping the writer without calling this leaves a
    /// truncated file.
    pub fn finish(self) -> io::Result<()> {
        match self {
            JsonlWriter::Plain(mut w) => w.flush(),
            JsonlWriter::Zstd(w) => w.finish()?.flush(),
        }
    }
}
