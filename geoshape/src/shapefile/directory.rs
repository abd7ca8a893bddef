use byteorder::{BigEndian, ByteOrder, WriteBytesExt};
use log::error;
use serde::{Deserialize, Serialize};

use super::constants::{GROWTH_FACTOR, GROWTH_PAD, INDEX_ENTRY_SIZE};
use crate::errors::{ErrorKind, GeoShapeError, GeoShapeResult};

/// Location of one record in the `.shp` file, in bytes.
///
/// `size` excludes the 8-byte record header, so a record occupies
/// `offset..offset + size + 8`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct RecordEntry {
    pub offset: u32,
    pub size: u32,
}

/// In-memory mirror of the `.shx` body: one entry per record id.
#[derive(Debug, Clone, Default)]
pub struct RecordDirectory {
    entries: Vec<RecordEntry>,
}

impl RecordDirectory {
    pub fn new() -> RecordDirectory {
        RecordDirectory::default()
    }

    /// Parses `count` big-endian `(offset, size)` word pairs.
    pub fn decode(buf: &[u8], count: usize) -> GeoShapeResult<RecordDirectory> {
        let needed = count.saturating_mul(INDEX_ENTRY_SIZE);
        if buf.len() < needed {
            error!(
                "index holds {} bytes of entries, {} records need {}",
                buf.len(),
                count,
                needed
            );
            return Err(GeoShapeError::new(
                "Index file is shorter than its header says",
                ErrorKind::FormatError,
            ));
        }

        let mut entries = Vec::new();
        entries.try_reserve_exact(count.max(1))?;
        for chunk in buf[..needed].chunks_exact(INDEX_ENTRY_SIZE) {
            let offset = words_to_bytes(BigEndian::read_u32(&chunk[..4]))?;
            let size = words_to_bytes(BigEndian::read_u32(&chunk[4..]))?;
            entries.push(RecordEntry { offset, size });
        }
        Ok(RecordDirectory { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn get(&self, id: usize) -> Option<RecordEntry> {
        self.entries.get(id).copied()
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    /// Appends an entry and returns its id. Capacity grows by 1.3x plus a
    /// fixed pad; a failed reservation leaves the directory unchanged.
    pub fn push(&mut self, entry: RecordEntry) -> GeoShapeResult<usize> {
        if self.entries.len() == self.entries.capacity() {
            let target = (self.entries.len() as f64 * GROWTH_FACTOR) as usize + GROWTH_PAD;
            self.entries
                .try_reserve_exact(target - self.entries.len())?;
        }
        self.entries.push(entry);
        Ok(self.entries.len() - 1)
    }

    pub fn set(&mut self, id: usize, entry: RecordEntry) {
        self.entries[id] = entry;
    }

    /// Encodes the `.shx` body as big-endian word pairs.
    pub fn encode(&self) -> GeoShapeResult<Vec<u8>> {
        let mut out = Vec::new();
        out.try_reserve_exact(self.entries.len() * INDEX_ENTRY_SIZE)?;
        for entry in &self.entries {
            out.write_u32::<BigEndian>(entry.offset / 2)?;
            out.write_u32::<BigEndian>(entry.size / 2)?;
        }
        Ok(out)
    }
}

fn words_to_bytes(words: u32) -> GeoShapeResult<u32> {
    words.checked_mul(2).ok_or_else(|| {
        error!("index entry of {} words overflows a 32-bit byte offset", words);
        GeoShapeError::new("Index entry out of range", ErrorKind::FormatError)
    })
}
