use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use log::error;
use std::io::Cursor;

use super::constants::{FILE_CODE, HEADER_SIZE, VERSION};
use crate::bounds::Bounds;
use crate::errors::{ErrorKind, GeoShapeError, GeoShapeResult};

/// The 100-byte header shared by both files of a pair.
///
/// Only the file length differs between the `.shp` and `.shx` copies. The
/// length is kept as the raw count of 16-bit words, big-endian on disk; all
/// other fields are little-endian.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FileHeader {
    pub file_length_words: i32,
    pub shape_type_code: i32,
    pub bounds: Bounds,
}

impl FileHeader {
    pub fn new(file_length_words: i32, shape_type_code: i32, bounds: Bounds) -> FileHeader {
        FileHeader {
            file_length_words,
            shape_type_code,
            bounds,
        }
    }

    pub fn file_length_bytes(&self) -> i64 {
        self.file_length_words as i64 * 2
    }

    /// Decodes a header after checking the file code bytes.
    ///
    /// The check only looks at the first four bytes: two zero bytes, `0x27`
    /// and either `0x0a` or `0x0d`. Version and the unused fields are not
    /// verified.
    pub fn decode(buf: &[u8]) -> GeoShapeResult<FileHeader> {
        if buf.len() < HEADER_SIZE {
            error!("header is {} bytes, expected {}", buf.len(), HEADER_SIZE);
            return Err(GeoShapeError::new(
                "Header is truncated",
                ErrorKind::FormatError,
            ));
        }
        if buf[0] != 0 || buf[1] != 0 || buf[2] != 0x27 || (buf[3] != 0x0a && buf[3] != 0x0d) {
            error!(
                "bad file code bytes {:02x} {:02x} {:02x} {:02x}",
                buf[0], buf[1], buf[2], buf[3]
            );
            return Err(GeoShapeError::new(
                "Not a shapefile: bad file code",
                ErrorKind::FormatError,
            ));
        }

        let file_length_words = BigEndian::read_i32(&buf[24..28]);
        let shape_type_code = LittleEndian::read_i32(&buf[32..36]);
        let double_at = |offset: usize| LittleEndian::read_f64(&buf[offset..offset + 8]);
        let bounds = Bounds {
            x_min: double_at(36),
            y_min: double_at(44),
            x_max: double_at(52),
            y_max: double_at(60),
            z_min: double_at(68),
            z_max: double_at(76),
            m_min: double_at(84),
            m_max: double_at(92),
        };

        Ok(FileHeader {
            file_length_words,
            shape_type_code,
            bounds,
        })
    }

    pub fn encode(&self) -> GeoShapeResult<[u8; HEADER_SIZE]> {
        let mut header = [0u8; HEADER_SIZE];
        let mut cursor = Cursor::new(&mut header[..]);
        cursor.write_i32::<BigEndian>(FILE_CODE)?;
        cursor.set_position(24);
        cursor.write_i32::<BigEndian>(self.file_length_words)?;
        cursor.write_i32::<LittleEndian>(VERSION)?;
        cursor.write_i32::<LittleEndian>(self.shape_type_code)?;
        let b = &self.bounds;
        for value in [
            b.x_min, b.y_min, b.x_max, b.y_max, b.z_min, b.z_max, b.m_min, b.m_max,
        ] {
            cursor.write_f64::<LittleEndian>(value)?;
        }
        Ok(header)
    }
}
