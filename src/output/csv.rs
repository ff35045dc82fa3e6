//! CSV-backed rank store
//!
//! One file serves two purposes: it is the append target for resolved ranks,
//! and on startup it is parsed back into the existing-domain set so an
//! interrupted run resumes where it left off instead of re-ranking domains.

use csv::{ReaderBuilder, Writer, WriterBuilder};
use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::BufWriter;
use std::path::Path;
use tracing::{debug, info};

use super::{OutputError, OutputResult, RankWriter};

/// Header row written when the store is first created.
const HEADER_FIELDS: [&str; 2] = ["domain", " rank"];

/// Append-only CSV writer for `domain,rank` rows.
pub struct CsvRankWriter {
    writer: Writer<BufWriter<File>>,
    rows_written: u64,
}

impl CsvRankWriter {
    /// Open the store at `path` for appending.
    ///
    /// If the file does not exist yet, its parent directory is created and a
    /// header row is written first. An existing file is never rewritten.
    pub fn open_append<P: AsRef<Path>>(path: P) -> OutputResult<Self> {
        let path = path.as_ref();
        let is_new = !path.exists();

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .map_err(|e| OutputError::IoError(format!("failed to create directory: {e}")))?;
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .map_err(|e| OutputError::IoError(format!("failed to open rank store: {e}")))?;

        let mut writer = WriterBuilder::new()
            .has_headers(false)
            .from_writer(BufWriter::new(file));

        if is_new {
            writer
                .write_record(HEADER_FIELDS)
                .map_err(|e| OutputError::CsvError(format!("failed to write header: {e}")))?;
            writer
                .flush()
                .map_err(|e| OutputError::FlushError(format!("failed to flush header: {e}")))?;
            info!(path = %path.display(), "created rank store");
        } else {
            debug!(path = %path.display(), "opened rank store for append");
        }

        Ok(Self {
            writer,
            rows_written: 0,
        })
    }

    /// Number of rows appended through this writer.
    pub fn rows_written(&self) -> u64 {
        self.rows_written
    }

    /// Close the writer, flushing and syncing the file to disk.
    pub fn close(mut self) -> OutputResult<()> {
        self.flush()?;

        let buf_writer = self
            .writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("failed to get inner writer: {e}")))?;
        let file = buf_writer
            .into_inner()
            .map_err(|e| OutputError::IoError(format!("failed to get file handle: {e}")))?;
        file.sync_all()
            .map_err(|e| OutputError::IoError(format!("failed to sync rank store: {e}")))?;

        debug!(rows = self.rows_written, "closed rank store");
        Ok(())
    }
}

impl RankWriter for CsvRankWriter {
    fn append(&mut self, domain: &str, value: &str) -> OutputResult<()> {
        self.writer
            .write_record([domain, value])
            .map_err(|e| OutputError::CsvError(format!("failed to write rank row: {e}")))?;
        self.rows_written += 1;

        // Each row must be on disk before the domain is marked as seen.
        self.flush()
    }

    fn flush(&mut self) -> OutputResult<()> {
        self.writer
            .flush()
            .map_err(|e| OutputError::FlushError(format!("failed to flush: {e}")))
    }
}

/// Rebuild the existing-domain set from a prior run's rank store.
///
/// Every row's first field is taken as a domain, header line included — the
/// set only answers membership queries and the header field can never collide
/// with a rankable domain. A missing file yields an empty set; an unparseable
/// file is a fatal error.
pub fn read_existing_domains<P: AsRef<Path>>(path: P) -> OutputResult<HashSet<String>> {
    let path = path.as_ref();

    if !path.exists() {
        debug!(path = %path.display(), "no rank store yet; starting with empty domain set");
        return Ok(HashSet::new());
    }

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(|e| OutputError::CsvError(format!("failed to open rank store: {e}")))?;

    let mut domains = HashSet::new();
    for record in reader.records() {
        let record =
            record.map_err(|e| OutputError::CsvError(format!("malformed rank store: {e}")))?;
        if let Some(domain) = record.get(0) {
            domains.insert(domain.to_string());
        }
    }

    debug!(path = %path.display(), count = domains.len(), "seeded existing domains from rank store");

    Ok(domains)
}
