//! Append-only binary journal of closed beep events.
//!
//! File layout: a 6-byte header (magic `BPLG`, little-endian `u16` format
//! version), then independently decodable records. Each record is a `u16`
//! little-endian length prefix followed by the bincode encoding of one
//! [`BeepEvent`] (48 bytes in version 1). The length prefix keeps older
//! readers able to walk logs written by newer schema revisions.
//!
//! Writes are never batched: one durably flushed append per closed event,
//! so a crash loses at most the in-flight record. Reads are sequential; a
//! truncated trailing record is a normal end of file, never an error.

use crate::event::BeepEvent;
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::io::{BufReader, Read, Write};
use std::path::Path;
use thiserror::Error;

const MAGIC: [u8; 4] = *b"BPLG";
const FORMAT_VERSION: u16 = 1;

#[derive(Error, Debug)]
pub enum JournalError {
    #[error("journal I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("not a beep journal (bad magic)")]
    BadMagic,
    #[error("unsupported journal format version {0} (this build reads version {FORMAT_VERSION})")]
    UnsupportedVersion(u16),
    #[error("record encoding error: {0}")]
    Codec(#[from] bincode::Error),
    #[error("journal is already locked by another writer")]
    Locked,
}

/// Exclusive append-only writer for one journal file.
pub struct JournalWriter {
    file: File,
}

impl JournalWriter {
    /// Open `path` for appending, writing the header if the file is new,
    /// and take an exclusive advisory lock for the writer's lifetime.
    /// Reopening an existing journal validates its header first so a
    /// foreign file is never appended to.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<Self, JournalError> {
        let mut file = OpenOptions::new()
            .read(true)
            .create(true)
            .append(true)
            .open(path)?;
        file.try_lock_exclusive()
            .map_err(|_| JournalError::Locked)?;

        if file.metadata()?.len() == 0 {
            file.write_all(&MAGIC)?;
            file.write_all(&FORMAT_VERSION.to_le_bytes())?;
            file.sync_data()?;
        } else {
            validate_header(&mut &file)?;
        }

        Ok(Self { file })
    }

    /// Append one closed event. The record is durably flushed before this
    /// returns.
    pub fn append(&mut self, event: &BeepEvent) -> Result<(), JournalError> {
        let payload = bincode::serialize(event)?;
        let len = payload.len() as u16;

        self.file.write_all(&len.to_le_bytes())?;
        self.file.write_all(&payload)?;
        self.file.sync_data()?;
        Ok(())
    }
}

impl Drop for JournalWriter {
    fn drop(&mut self) {
        let _ = FileExt::unlock(&self.file);
    }
}

/// Sequential reader over a journal file.
pub struct JournalReader {
    reader: BufReader<File>,
}

impl JournalReader {
    /// Open `path` and validate the header.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, JournalError> {
        let file = File::open(path)?;
        let mut reader = BufReader::new(file);
        validate_header(&mut reader)?;
        Ok(Self { reader })
    }

    /// The next record, or `None` at end of file. A partial length prefix
    /// or a payload shorter than its prefix also ends iteration cleanly.
    pub fn next_event(&mut self) -> Result<Option<BeepEvent>, JournalError> {
        let mut len = [0u8; 2];
        if !read_exact_or_eof(&mut self.reader, &mut len)? {
            return Ok(None);
        }

        let mut payload = vec![0u8; u16::from_le_bytes(len) as usize];
        if !read_exact_or_eof(&mut self.reader, &mut payload)? {
            return Ok(None);
        }

        Ok(Some(bincode::deserialize(&payload)?))
    }

    /// Read every remaining record in order.
    pub fn read_all(&mut self) -> Result<Vec<BeepEvent>, JournalError> {
        let mut events = Vec::new();
        while let Some(event) = self.next_event()? {
            events.push(event);
        }
        Ok(events)
    }
}

// A well-formed header is magic then format version, 6 bytes total.
fn validate_header<R: Read>(reader: &mut R) -> Result<(), JournalError> {
    let mut magic = [0u8; 4];
    if !read_exact_or_eof(reader, &mut magic)? || magic != MAGIC {
        return Err(JournalError::BadMagic);
    }
    let mut version = [0u8; 2];
    if !read_exact_or_eof(reader, &mut version)? {
        return Err(JournalError::BadMagic);
    }
    let version = u16::from_le_bytes(version);
    if version != FORMAT_VERSION {
        return Err(JournalError::UnsupportedVersion(version));
    }
    Ok(())
}

// Fill `buf` completely, or report a clean end of file. Hitting EOF partway
// through the buffer counts as end of file too (truncated trailing record).
fn read_exact_or_eof<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<bool, JournalError> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = reader.read(&mut buf[filled..])?;
        if n == 0 {
            return Ok(filled == buf.len());
        }
        filled += n;
    }
    Ok(true)
}
