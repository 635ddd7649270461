//! Input journals on disk, as line-delimited JSON chained with SHA-256.
//!
//! - Line 1: header with `format_version`, `build_id`, `content_hash`, `seed`.
//! - Lines 2+: one record per non-idle tick (or the final stop marker), each
//!   carrying `prev_sha256_hex` and `sha256_hex` so edits and gaps are detected.
//!
//! Every record is flushed as soon as it is written, so a crashed session still
//! leaves a replayable prefix. Loading stops at the first line that fails.

use std::error::Error;
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::journal::{InputJournal, InputPayload, InputRecord, JOURNAL_FORMAT_VERSION};

/// First line of the JSONL journal file.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Eq)]
struct FileHeader {
    format_version: u16,
    build_id: String,
    content_hash: u64,
    seed: u64,
}

/// The part of a record that is hashed, serialized as JSON.
#[derive(Serialize)]
struct RecordBody<'a> {
    seq: u64,
    tick: u64,
    payload: &'a InputPayload,
}

#[derive(Serialize, Deserialize, Debug, Clone)]
struct FileRecord {
    seq: u64,
    tick: u64,
    payload: InputPayload,
    prev_sha256_hex: String,
    sha256_hex: String,
}

/// Previous-hash of the first record.
const INITIAL_HASH: &str = "0000000000000000000000000000000000000000000000000000000000000000";

/// `hex(SHA-256(body_json || prev_sha256_hex))`
fn compute_record_sha256(body_json: &str, prev_sha256_hex: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(body_json.as_bytes());
    hasher.update(prev_sha256_hex.as_bytes());
    let result = hasher.finalize();
    format!("{result:064x}")
}

/// Appends journal records to a file as they happen.
pub struct JournalWriter {
    writer: BufWriter<File>,
    last_sha256_hex: String,
    next_seq: u64,
}

impl JournalWriter {
    /// Creates (or truncates) the file and writes the header line.
    pub fn create(path: &Path, seed: u64, build_id: &str, content_hash: u64) -> io::Result<Self> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        let mut writer = BufWriter::new(file);

        let header = FileHeader {
            format_version: JOURNAL_FORMAT_VERSION,
            build_id: build_id.to_string(),
            content_hash,
            seed,
        };
        let header_json = serde_json::to_string(&header).map_err(io::Error::other)?;
        writeln!(writer, "{header_json}")?;
        writer.flush()?;

        Ok(Self { writer, last_sha256_hex: INITIAL_HASH.to_string(), next_seq: 0 })
    }

    /// Continues a journal previously read with [`load_journal_from_file`].
    pub fn resume(path: &Path, last_sha256_hex: String, next_seq: u64) -> io::Result<Self> {
        let file = OpenOptions::new().append(true).open(path)?;
        let writer = BufWriter::new(file);
        Ok(Self { writer, last_sha256_hex, next_seq })
    }

    pub fn append(&mut self, tick: u64, payload: &InputPayload) -> io::Result<()> {
        let body = RecordBody { seq: self.next_seq, tick, payload };
        let body_json = serde_json::to_string(&body).map_err(io::Error::other)?;
        let sha256_hex = compute_record_sha256(&body_json, &self.last_sha256_hex);

        let record = FileRecord {
            seq: self.next_seq,
            tick,
            payload: payload.clone(),
            prev_sha256_hex: self.last_sha256_hex.clone(),
            sha256_hex: sha256_hex.clone(),
        };

        let record_json = serde_json::to_string(&record).map_err(io::Error::other)?;
        writeln!(self.writer, "{record_json}")?;
        self.writer.flush()?;

        self.last_sha256_hex = sha256_hex;
        self.next_seq += 1;

        Ok(())
    }

    /// Writes one in-memory record. Its `seq` must be the next one in this file.
    pub fn append_record(&mut self, record: &InputRecord) -> io::Result<()> {
        if record.seq != self.next_seq {
            return Err(io::Error::other(format!(
                "expected seq {}, got {}",
                self.next_seq, record.seq
            )));
        }
        self.append(record.tick, &record.payload)
    }

    pub fn next_seq(&self) -> u64 {
        self.next_seq
    }
}

#[derive(Debug)]
pub struct LoadedJournal {
    pub journal: InputJournal,
    /// Hash of the last record, or the initial hash when there are none.
    pub last_sha256_hex: String,
    pub next_seq: u64,
}

/// Line numbers are 1-based; the header is line 1.
#[derive(Debug)]
pub enum JournalLoadError {
    Io(io::Error),
    EmptyFile,
    InvalidHeader { line: usize, message: String },
    /// Unparseable JSON, a sequence gap, or a tick that goes backwards.
    InvalidRecord { line: usize, message: String },
    /// The file ends without a trailing newline.
    IncompleteLine { line: usize },
    HashChainBroken { line: usize },
}

impl fmt::Display for JournalLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "journal I/O error: {e}"),
            Self::EmptyFile => write!(f, "journal file is empty"),
            Self::InvalidHeader { line, message } => {
                write!(f, "invalid journal header at line {line}: {message}")
            }
            Self::InvalidRecord { line, message } => {
                write!(f, "invalid journal record at line {line}: {message}")
            }
            Self::IncompleteLine { line } => {
                write!(f, "incomplete journal line at line {line}")
            }
            Self::HashChainBroken { line } => {
                write!(f, "SHA-256 hash chain broken at line {line}")
            }
        }
    }
}

impl Error for JournalLoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

/// Reads a journal written by [`JournalWriter`], verifying every hash link.
pub fn load_journal_from_file(path: &Path) -> Result<LoadedJournal, JournalLoadError> {
    let content = fs::read_to_string(path).map_err(JournalLoadError::Io)?;
    if content.is_empty() {
        return Err(JournalLoadError::EmptyFile);
    }
    let has_trailing_newline = content.ends_with('\n');
    let lines: Vec<&str> = content.lines().collect();
    if lines.is_empty() {
        return Err(JournalLoadError::EmptyFile);
    }
    if !has_trailing_newline {
        return Err(JournalLoadError::IncompleteLine { line: lines.len() });
    }

    let header: FileHeader = serde_json::from_str(lines[0])
        .map_err(|e| JournalLoadError::InvalidHeader { line: 1, message: e.to_string() })?;

    let mut journal = InputJournal {
        format_version: header.format_version,
        build_id: header.build_id,
        content_hash: header.content_hash,
        seed: header.seed,
        inputs: Vec::new(),
    };

    let mut chain = ChainCursor::default();
    for (line_index, line) in lines.iter().enumerate().skip(1) {
        let record = chain.accept(line_index + 1, line)?;
        journal.inputs.push(record);
    }

    Ok(LoadedJournal { journal, last_sha256_hex: chain.prev_sha256_hex, next_seq: chain.next_seq })
}

/// Position in the hash chain while records are read back in order.
struct ChainCursor {
    prev_sha256_hex: String,
    next_seq: u64,
    last_tick: u64,
}

impl Default for ChainCursor {
    fn default() -> Self {
        Self { prev_sha256_hex: INITIAL_HASH.to_string(), next_seq: 0, last_tick: 0 }
    }
}

impl ChainCursor {
    /// Checks one record line against the chain and advances past it.
    fn accept(&mut self, line: usize, text: &str) -> Result<InputRecord, JournalLoadError> {
        let invalid = |message: String| JournalLoadError::InvalidRecord { line, message };
        if text.is_empty() {
            return Err(invalid("empty line".to_string()));
        }

        let record: FileRecord =
            serde_json::from_str(text).map_err(|err| invalid(err.to_string()))?;
        if record.seq != self.next_seq {
            return Err(invalid(format!("expected seq {}, found {}", self.next_seq, record.seq)));
        }
        if record.tick < self.last_tick {
            return Err(invalid(format!("tick {} after tick {}", record.tick, self.last_tick)));
        }

        let body = RecordBody { seq: record.seq, tick: record.tick, payload: &record.payload };
        let body_json = serde_json::to_string(&body).map_err(|err| invalid(err.to_string()))?;
        let linked = record.prev_sha256_hex == self.prev_sha256_hex;
        if !linked || record.sha256_hex != compute_record_sha256(&body_json, &self.prev_sha256_hex)
        {
            return Err(JournalLoadError::HashChainBroken { line });
        }

        self.prev_sha256_hex = record.sha256_hex;
        self.next_seq += 1;
        self.last_tick = record.tick;
        Ok(InputRecord { seq: record.seq, tick: record.tick, payload: record.payload })
    }
}
