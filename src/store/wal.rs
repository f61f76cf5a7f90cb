//! Length-prefixed bincode log of record post-images and deletes.

use bson::Document as BsonDocument;
use serde::{Deserialize, Serialize};
use std::fs::{File, OpenOptions};
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};

use crate::errors::DbError;
use crate::types::RecordId;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OpKind {
    Put,
    Delete,
}

/// One WAL entry. `doc` holds the full storage form of the record after a `Put`, as raw BSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WalRecord {
    pub op: OpKind,
    pub id: [u8; 12],
    pub doc: Option<Vec<u8>>,
    pub ts_millis: i64,
}

impl WalRecord {
    /// # Errors
    /// Fails if the document cannot be serialized to BSON.
    pub fn put(id: RecordId, doc: &BsonDocument) -> Result<Self, DbError> {
        let mut buf = Vec::new();
        doc.to_writer(&mut buf)?;
        Ok(Self { op: OpKind::Put, id: id.0.bytes(), doc: Some(buf), ts_millis: chrono::Utc::now().timestamp_millis() })
    }

    #[must_use]
    pub fn delete(id: RecordId) -> Self {
        Self { op: OpKind::Delete, id: id.0.bytes(), doc: None, ts_millis: chrono::Utc::now().timestamp_millis() }
    }

    #[must_use]
    pub fn record_id(&self) -> RecordId {
        RecordId(bson::oid::ObjectId::from_bytes(self.id))
    }

    /// # Errors
    /// `InvalidRecord` for a `Put` without a payload; BSON errors for a corrupt payload.
    pub fn document(&self) -> Result<BsonDocument, DbError> {
        let bytes = self.doc.as_deref().ok_or_else(|| {
            DbError::InvalidRecord(format!("WAL put for {} has no document", self.record_id()))
        })?;
        Ok(BsonDocument::from_reader(&mut &bytes[..])?)
    }
}

/// Largest encoded entry accepted on write or read. A length prefix above this is treated as
/// garbage rather than allocated.
pub const MAX_ENTRY_BYTES: usize = 64 * 1024 * 1024;

pub fn write_record<W: Write>(writer: &mut W, rec: &WalRecord) -> Result<(), DbError> {
    let bytes = bincode::serde::encode_to_vec(rec, bincode::config::standard())?;
    let len = u32::try_from(bytes.len())
        .ok()
        .filter(|_| bytes.len() <= MAX_ENTRY_BYTES)
        .ok_or_else(|| DbError::InvalidRecord(format!("WAL entry too large: {} bytes", bytes.len())))?;
    writer.write_all(&len.to_le_bytes())?;
    writer.write_all(&bytes)?;
    Ok(())
}

/// Result of reading one length-prefixed frame.
enum Frame {
    Entry { rec: WalRecord, size: u64 },
    End,
    /// Partial prefix, oversized prefix or short payload: a write that never completed.
    Torn,
}

fn read_frame<R: Read>(reader: &mut R) -> Result<Frame, DbError> {
    let mut len_buf = [0u8; 4];
    let mut got = 0;
    while got < len_buf.len() {
        match reader.read(&mut len_buf[got..]) {
            Ok(0) => return Ok(if got == 0 { Frame::End } else { Frame::Torn }),
            Ok(n) => got += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(DbError::Io(e)),
        }
    }
    let len = u32::from_le_bytes(len_buf) as usize;
    if len > MAX_ENTRY_BYTES {
        return Ok(Frame::Torn);
    }
    let mut buf = vec![0u8; len];
    match reader.read_exact(&mut buf) {
        Ok(()) => {}
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => return Ok(Frame::Torn),
        Err(e) => return Err(DbError::Io(e)),
    }
    let (rec, _): (WalRecord, usize) = bincode::serde::decode_from_slice(&buf, bincode::config::standard())?;
    Ok(Frame::Entry { rec, size: 4 + len as u64 })
}

/// Reads the next entry; `Ok(None)` at a clean end of file.
///
/// # Errors
/// I/O and decode errors; an incomplete trailing entry is reported as `UnexpectedEof`.
pub fn read_record<R: Read>(reader: &mut R) -> Result<Option<WalRecord>, DbError> {
    match read_frame(reader)? {
        Frame::Entry { rec, .. } => Ok(Some(rec)),
        Frame::End => Ok(None),
        Frame::Torn => Err(DbError::Io(std::io::Error::new(
            std::io::ErrorKind::UnexpectedEof,
            "incomplete WAL entry",
        ))),
    }
}

/// Append-only WAL file. Every append is flushed before it returns.
#[derive(Debug)]
pub struct Wal {
    path: PathBuf,
    writer: BufWriter<File>,
}

impl Wal {
    /// Opens (creating if needed) the log at `path` and returns it with every entry already
    /// on disk. A truncated trailing entry is logged and cut off the file.
    ///
    /// # Errors
    /// I/O errors opening the file, or a corrupt entry before the tail.
    pub fn open(path: impl AsRef<Path>) -> Result<(Self, Vec<WalRecord>), DbError> {
        let path = path.as_ref().to_path_buf();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        let mut entries = Vec::new();
        let mut good_len = 0u64;
        if path.exists() {
            let mut reader = BufReader::new(File::open(&path)?);
            loop {
                match read_frame(&mut reader)? {
                    Frame::Entry { rec, size } => {
                        entries.push(rec);
                        good_len += size;
                    }
                    Frame::End => break,
                    Frame::Torn => {
                        log::warn!("WAL {}: dropping truncated tail entry at byte {good_len}", path.display());
                        break;
                    }
                }
            }
        }
        let file = OpenOptions::new().create(true).append(true).open(&path)?;
        // later appends must start right after the last complete entry
        if file.metadata()?.len() > good_len {
            file.set_len(good_len)?;
        }
        log::info!("WAL {} opened, {} entries", path.display(), entries.len());
        Ok((Self { path, writer: BufWriter::new(file) }, entries))
    }

    pub fn append(&mut self, rec: &WalRecord) -> Result<(), DbError> {
        write_record(&mut self.writer, rec)?;
        self.writer.flush()?;
        Ok(())
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
