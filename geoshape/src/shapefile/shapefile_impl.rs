//! ShapeFile handle: an open `.shp`/`.shx` pair.

use std::path::Path;

use log::{debug, error, trace, warn};
use serde::{Deserialize, Serialize};

use super::constants::{
    EMPTY_FILE_WORDS, HEADER_SIZE, INDEX_ENTRY_SIZE, RECORDS_MAX, RECORD_HEADER_SIZE,
};
use super::directory::{RecordDirectory, RecordEntry};
use super::header::FileHeader;
use super::record::{decode_bounds, decode_record, encode_record, encoded_len};
use super::storage::{read_at, write_at, FilePair};
use crate::bounds::{Bounds, Envelope};
use crate::config::AccessMode;
use crate::errors::{ErrorKind, GeoShapeError, GeoShapeResult};
use crate::geometry::{Shape, UNASSIGNED_ID};
use crate::shape_type::ShapeType;

/// Summary of an open file pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShapeFileInfo {
    pub record_count: usize,
    pub shape_type: ShapeType,
    pub bounds: Bounds,
}

/// An open shapefile.
///
/// The handle owns both files, the record directory and a scratch buffer
/// reused by every record read and write. Headers and the `.shx` body are
/// only rewritten by [`ShapeFile::flush`], [`ShapeFile::close`] or, as a
/// best effort, when the handle is dropped after a write.
///
/// # Examples
///
/// ```rust,ignore
/// use geoshape::{AccessMode, Shape, ShapeFile, ShapeType};
///
/// let mut file = ShapeFile::create("roads", ShapeType::Arc)?;
/// let line = Shape::simple(ShapeType::Arc, &[0.0, 10.0], &[0.0, 5.0], None)?;
/// let id = file.write_shape(-1, &line)?;
/// file.close()?;
///
/// let mut file = ShapeFile::open("roads.shp", AccessMode::ReadOnly)?;
/// let line = file.read_shape(id)?;
/// ```
#[derive(Debug)]
pub struct ShapeFile {
    files: FilePair,
    mode: AccessMode,
    shape_type: ShapeType,
    file_size: u32,
    bounds: Bounds,
    directory: RecordDirectory,
    record_buf: Vec<u8>,
    updated: bool,
}

impl ShapeFile {
    /// Opens an existing pair by either file name or base name.
    pub fn open(path: impl AsRef<Path>, mode: AccessMode) -> GeoShapeResult<ShapeFile> {
        let mut files = FilePair::open(path.as_ref(), mode)?;

        let mut header_buf = [0u8; HEADER_SIZE];
        read_at(&mut files.shp, 0, &mut header_buf)?;
        let shp_header = FileHeader::decode(&header_buf)?;
        read_at(&mut files.shx, 0, &mut header_buf)?;
        let shx_header = FileHeader::decode(&header_buf)?;

        let file_size = u32::try_from(shp_header.file_length_bytes()).map_err(|_| {
            error!(
                "file length of {} words in {}",
                shp_header.file_length_words,
                files.shp_path.display()
            );
            GeoShapeError::new("Invalid .shp file length", ErrorKind::FormatError)
        })?;

        let record_count = (shx_header.file_length_bytes() - HEADER_SIZE as i64)
            / INDEX_ENTRY_SIZE as i64;
        if record_count < 0 || record_count > RECORDS_MAX as i64 {
            error!(
                "record count {} from {} is out of range",
                record_count,
                files.shx_path.display()
            );
            return Err(GeoShapeError::new(
                &format!("Record count {} out of range", record_count),
                ErrorKind::FormatError,
            ));
        }
        let record_count = record_count as usize;

        let shape_type = ShapeType::from_code(shx_header.shape_type_code).ok_or_else(|| {
            error!(
                "unknown shape type {} in {}",
                shx_header.shape_type_code,
                files.shx_path.display()
            );
            GeoShapeError::new(
                &format!("Unknown shape type {}", shx_header.shape_type_code),
                ErrorKind::FormatError,
            )
        })?;

        let mut body = Vec::new();
        body.try_reserve_exact(record_count * INDEX_ENTRY_SIZE)?;
        body.resize(record_count * INDEX_ENTRY_SIZE, 0);
        read_at(&mut files.shx, HEADER_SIZE as u64, &mut body)?;
        let directory = RecordDirectory::decode(&body, record_count)?;

        debug!(
            "{} holds {} {} records in {} bytes",
            files.shp_path.display(),
            record_count,
            shape_type,
            file_size
        );
        Ok(ShapeFile {
            files,
            mode,
            shape_type,
            file_size,
            bounds: shx_header.bounds,
            directory,
            record_buf: Vec::new(),
            updated: false,
        })
    }

    /// Creates an empty pair of the given type and opens it read/write.
    pub fn create(path: impl AsRef<Path>, shape_type: ShapeType) -> GeoShapeResult<ShapeFile> {
        let path = path.as_ref();
        {
            let mut files = FilePair::create(path)?;
            let header = FileHeader::new(EMPTY_FILE_WORDS, shape_type.code(), Bounds::default())
                .encode()?;
            write_at(&mut files.shp, 0, &header)?;
            write_at(&mut files.shx, 0, &header)?;
            files.flush()?;
        }
        Self::open(path, AccessMode::ReadWrite)
    }

    /// Reads record `id` into a shape.
    pub fn read_shape(&mut self, id: i32) -> GeoShapeResult<Shape> {
        self.load_record(id)?;
        decode_record(&self.record_buf, id)
    }

    /// Reads only the stored extent of record `id`, without decoding its
    /// vertices. See [`ShapeFile::read_object_envelope`] for the X/Y part.
    ///
    /// Points report their vertex as the extent, with the X/Y maximum
    /// widened by `point_epsilon` when given. Returns `None` for Null records
    /// and records without vertices.
    pub fn read_object_bounds(
        &mut self,
        id: i32,
        point_epsilon: Option<f64>,
    ) -> GeoShapeResult<Option<(ShapeType, Bounds)>> {
        self.load_record(id)?;
        decode_bounds(&self.record_buf, point_epsilon)
    }

    pub fn read_object_envelope(
        &mut self,
        id: i32,
        point_epsilon: Option<f64>,
    ) -> GeoShapeResult<Option<(ShapeType, Envelope)>> {
        Ok(self
            .read_object_bounds(id, point_epsilon)?
            .map(|(shape_type, bounds)| (shape_type, bounds.envelope())))
    }

    /// Writes `shape` as record `id`, or appends it when `id` is -1 or past
    /// the last record. Returns the id the record was stored under.
    ///
    /// A record that fits in its old slot is overwritten in place. A larger
    /// one is appended at the end of the file and the old slot is left
    /// behind as dead space; nothing reclaims it.
    pub fn write_shape(&mut self, id: i32, shape: &Shape) -> GeoShapeResult<i32> {
        if !self.mode.is_writable() {
            return Err(GeoShapeError::new(
                "Shapefile is opened read-only",
                ErrorKind::InvalidOperation,
            ));
        }
        if shape.shape_type() != self.shape_type && shape.shape_type() != ShapeType::Null {
            return Err(GeoShapeError::new(
                &format!(
                    "Cannot write a {} shape to a {} file",
                    shape.shape_type(),
                    self.shape_type
                ),
                ErrorKind::InvariantViolation,
            ));
        }
        if id < UNASSIGNED_ID {
            return Err(GeoShapeError::new(
                &format!("Invalid shape id {}", id),
                ErrorKind::ValidationError,
            ));
        }

        let existing = usize::try_from(id)
            .ok()
            .and_then(|index| self.directory.get(index).map(|entry| (index, entry)));
        let total = encoded_len(shape);
        let content_size = u32::try_from(total - RECORD_HEADER_SIZE).map_err(|_| {
            GeoShapeError::new("Record too large", ErrorKind::ValidationError)
        })?;

        let (index, offset, appended) = match existing {
            Some((index, entry)) if entry.size >= content_size => (index, entry.offset, false),
            _ => {
                let index = existing.map_or(self.directory.len(), |(index, _)| index);
                (index, self.file_size, true)
            }
        };
        let final_id = i32::try_from(index).map_err(|_| {
            GeoShapeError::new("Too many records", ErrorKind::InvalidOperation)
        })?;
        let new_file_size = if appended {
            self.file_size
                .checked_add(total as u32)
                .filter(|size| *size <= i32::MAX as u32)
                .ok_or_else(|| {
                    GeoShapeError::new(
                        "Shapefile would exceed its maximum size",
                        ErrorKind::InvalidOperation,
                    )
                })?
        } else {
            self.file_size
        };

        encode_record(shape, final_id + 1, &mut self.record_buf)?;
        write_at(&mut self.files.shp, offset as u64, &self.record_buf)?;

        let entry = RecordEntry {
            offset,
            size: content_size,
        };
        match existing {
            None => {
                self.directory.push(entry)?;
                trace!("appended record {} at offset {}", final_id, offset);
            }
            Some((_, old)) if appended => {
                warn!(
                    "record {} grew to {} bytes, moved to offset {}; {} bytes at offset {} left unused",
                    final_id,
                    content_size,
                    offset,
                    old.size + RECORD_HEADER_SIZE as u32,
                    old.offset
                );
                self.directory.set(index, entry);
            }
            Some(_) => {
                trace!("overwrote record {} in place at offset {}", final_id, offset);
                self.directory.set(index, entry);
            }
        }
        self.file_size = new_file_size;
        self.expand_bounds(shape);
        self.updated = true;
        Ok(final_id)
    }

    /// Rewrites both headers and the `.shx` body if anything was written.
    pub fn flush(&mut self) -> GeoShapeResult<()> {
        if !self.updated {
            return Ok(());
        }

        let shp_header = FileHeader::new(
            (self.file_size / 2) as i32,
            self.shape_type.code(),
            self.bounds,
        );
        write_at(&mut self.files.shp, 0, &shp_header.encode()?)?;

        let shx_words = (HEADER_SIZE + INDEX_ENTRY_SIZE * self.directory.len()) / 2;
        let shx_header = FileHeader::new(shx_words as i32, self.shape_type.code(), self.bounds);
        write_at(&mut self.files.shx, 0, &shx_header.encode()?)?;
        write_at(
            &mut self.files.shx,
            HEADER_SIZE as u64,
            &self.directory.encode()?,
        )?;

        self.files.flush()?;
        self.updated = false;
        debug!(
            "flushed {} with {} records",
            self.files.shp_path.display(),
            self.directory.len()
        );
        Ok(())
    }

    /// Flushes pending header updates and closes both files.
    pub fn close(mut self) -> GeoShapeResult<()> {
        self.flush()?;
        debug!("closed {}", self.files.shp_path.display());
        Ok(())
    }

    pub fn info(&self) -> ShapeFileInfo {
        ShapeFileInfo {
            record_count: self.record_count(),
            shape_type: self.shape_type,
            bounds: self.bounds,
        }
    }

    pub fn shape_type(&self) -> ShapeType {
        self.shape_type
    }

    pub fn record_count(&self) -> usize {
        self.directory.len()
    }

    /// File-wide bounds, as of the last write.
    pub fn bounds(&self) -> &Bounds {
        &self.bounds
    }

    /// Current `.shp` length in bytes, header included.
    pub fn file_size(&self) -> u32 {
        self.file_size
    }

    pub fn record_entry(&self, id: usize) -> Option<RecordEntry> {
        self.directory.get(id)
    }

    pub fn access_mode(&self) -> AccessMode {
        self.mode
    }

    pub fn shp_path(&self) -> &Path {
        &self.files.shp_path
    }

    pub fn shx_path(&self) -> &Path {
        &self.files.shx_path
    }

    /// Reads record `id`, record header included, into the scratch buffer.
    fn load_record(&mut self, id: i32) -> GeoShapeResult<()> {
        let entry = usize::try_from(id)
            .ok()
            .and_then(|index| self.directory.get(index))
            .ok_or_else(|| {
                GeoShapeError::new(
                    &format!(
                        "Shape id {} out of range for {} records",
                        id,
                        self.directory.len()
                    ),
                    ErrorKind::ValidationError,
                )
            })?;

        let len = entry.size as usize + RECORD_HEADER_SIZE;
        self.record_buf.clear();
        self.record_buf.try_reserve_exact(len)?;
        self.record_buf.resize(len, 0);
        read_at(&mut self.files.shp, entry.offset as u64, &mut self.record_buf)
    }

    /// Folds the vertices of `shape` into the file-wide bounds. All-zero X/Y
    /// bounds mean "no data yet" and are re-seeded instead of expanded.
    fn expand_bounds(&mut self, shape: &Shape) {
        if self.bounds.is_empty_xy() {
            self.bounds = if shape.shape_type() == ShapeType::Null || shape.vertex_count() == 0 {
                Bounds::default()
            } else {
                Bounds::from_vertex(shape.x()[0], shape.y()[0], shape.z()[0], shape.m()[0])
            };
        }
        for i in 0..shape.vertex_count() {
            self.bounds
                .expand(shape.x()[i], shape.y()[i], shape.z()[i], shape.m()[i]);
        }
    }
}

impl Drop for ShapeFile {
    fn drop(&mut self) {
        // best effort flush on drop
        if self.updated {
            if let Err(err) = self.flush() {
                error!(
                    "failed to flush {} on drop: {}",
                    self.files.shp_path.display(),
                    err
                );
            }
        }
    }
}
