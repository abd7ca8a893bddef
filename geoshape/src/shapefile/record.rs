//! Encoding and decoding of single `.shp` records.
//!
//! Offsets below count from the start of the 8-byte record header, which is
//! part of every buffer handled here. The record header is big-endian; all
//! record content is little-endian.

use byteorder::{BigEndian, ByteOrder, LittleEndian, WriteBytesExt};
use log::error;

use super::constants::{
    BBOX_OFFSET, COUNT_OFFSET, MULTIPOINT_XY_OFFSET, PARTS_OFFSET, PARTS_POINTS_OFFSET,
    POINT_XY_OFFSET, POINT_Z_OFFSET, RECORD_HEADER_SIZE, SHAPE_TYPE_OFFSET,
};
use crate::bounds::Bounds;
use crate::errors::{ErrorKind, GeoShapeError, GeoShapeResult};
use crate::geometry::Shape;
use crate::shape_type::{PartType, ShapeType};

/// Whether a record of this type is written with a measure block.
///
/// MultiPatch carries M in memory but its records are written without one;
/// readers still pick up a measure block if the record length allows it.
fn writes_measures(shape_type: ShapeType) -> bool {
    shape_type.has_m() && shape_type != ShapeType::MultiPatch
}

/// Size of the encoded record, record header included.
pub(crate) fn encoded_len(shape: &Shape) -> usize {
    let shape_type = shape.shape_type();
    let n = shape.vertex_count();
    let axis_block = 16 + 8 * n;

    if shape_type.has_parts() {
        let parts = shape.part_count();
        let mut len = PARTS_OFFSET + 4 * parts;
        if shape_type == ShapeType::MultiPatch {
            len += 4 * parts;
        }
        len += 16 * n;
        if shape_type.has_z() {
            len += axis_block;
        }
        if writes_measures(shape_type) {
            len += axis_block;
        }
        len
    } else if shape_type.is_multipoint() {
        let mut len = MULTIPOINT_XY_OFFSET + 16 * n;
        if shape_type.has_z() {
            len += axis_block;
        }
        if writes_measures(shape_type) {
            len += axis_block;
        }
        len
    } else if shape_type.is_point() {
        let mut len = POINT_Z_OFFSET;
        if shape_type.has_z() {
            len += 8;
        }
        if writes_measures(shape_type) {
            len += 8;
        }
        len
    } else {
        SHAPE_TYPE_OFFSET + 4
    }
}

/// Encodes `shape` into `out`, replacing its contents.
///
/// `record_number` is the 1-based number stored in the record header.
pub(crate) fn encode_record(
    shape: &Shape,
    record_number: i32,
    out: &mut Vec<u8>,
) -> GeoShapeResult<()> {
    let total = encoded_len(shape);
    let content_words = i32::try_from((total - RECORD_HEADER_SIZE) / 2).map_err(|_| {
        GeoShapeError::new(
            &format!("Record of {} bytes is too large", total),
            ErrorKind::ValidationError,
        )
    })?;
    let shape_type = shape.shape_type();
    let n = shape.vertex_count();

    out.clear();
    out.try_reserve_exact(total)?;

    out.write_i32::<BigEndian>(record_number)?;
    out.write_i32::<BigEndian>(content_words)?;
    out.write_i32::<LittleEndian>(shape_type.code())?;

    if shape_type.has_parts() || shape_type.is_multipoint() {
        let bounds = shape.bounds();
        out.write_f64::<LittleEndian>(bounds.x_min)?;
        out.write_f64::<LittleEndian>(bounds.y_min)?;
        out.write_f64::<LittleEndian>(bounds.x_max)?;
        out.write_f64::<LittleEndian>(bounds.y_max)?;

        if shape_type.has_parts() {
            let parts = shape.part_count();
            out.write_i32::<LittleEndian>(count_to_i32(parts)?)?;
            out.write_i32::<LittleEndian>(count_to_i32(n)?)?;
            for start in &shape.parts()[..parts] {
                out.write_i32::<LittleEndian>(count_to_i32(*start)?)?;
            }
            if shape_type == ShapeType::MultiPatch {
                for part_type in shape.part_types() {
                    out.write_i32::<LittleEndian>(part_type.code())?;
                }
            }
        } else {
            out.write_i32::<LittleEndian>(count_to_i32(n)?)?;
        }

        for i in 0..n {
            out.write_f64::<LittleEndian>(shape.x()[i])?;
            out.write_f64::<LittleEndian>(shape.y()[i])?;
        }
        if shape_type.has_z() {
            write_axis_block(out, bounds.z_min, bounds.z_max, shape.z())?;
        }
        if writes_measures(shape_type) {
            write_axis_block(out, bounds.m_min, bounds.m_max, shape.m())?;
        }
    } else if shape_type.is_point() {
        out.write_f64::<LittleEndian>(shape.x()[0])?;
        out.write_f64::<LittleEndian>(shape.y()[0])?;
        if shape_type.has_z() {
            out.write_f64::<LittleEndian>(shape.z()[0])?;
        }
        if writes_measures(shape_type) {
            out.write_f64::<LittleEndian>(shape.m()[0])?;
        }
    }

    debug_assert_eq!(out.len(), total);
    Ok(())
}

fn write_axis_block(out: &mut Vec<u8>, min: f64, max: f64, values: &[f64]) -> GeoShapeResult<()> {
    out.write_f64::<LittleEndian>(min)?;
    out.write_f64::<LittleEndian>(max)?;
    for value in values {
        out.write_f64::<LittleEndian>(*value)?;
    }
    Ok(())
}

fn count_to_i32(count: usize) -> GeoShapeResult<i32> {
    i32::try_from(count).map_err(|_| {
        GeoShapeError::new(
            &format!("Count {} does not fit a record field", count),
            ErrorKind::ValidationError,
        )
    })
}

/// Bounds-checked little-endian view over one record buffer.
struct RecordBytes<'a> {
    buf: &'a [u8],
}

impl<'a> RecordBytes<'a> {
    fn new(buf: &'a [u8]) -> Self {
        RecordBytes { buf }
    }

    fn len(&self) -> usize {
        self.buf.len()
    }

    fn slice(&self, offset: usize, len: usize) -> GeoShapeResult<&'a [u8]> {
        offset
            .checked_add(len)
            .and_then(|end| self.buf.get(offset..end))
            .ok_or_else(|| {
                error!(
                    "record of {} bytes truncated, needs {} bytes at offset {}",
                    self.buf.len(),
                    len,
                    offset
                );
                GeoShapeError::new("Record is truncated", ErrorKind::FormatError)
            })
    }

    fn i32_at(&self, offset: usize) -> GeoShapeResult<i32> {
        self.slice(offset, 4).map(LittleEndian::read_i32)
    }

    fn f64_at(&self, offset: usize) -> GeoShapeResult<f64> {
        self.slice(offset, 8).map(LittleEndian::read_f64)
    }

    fn count_at(&self, offset: usize, what: &str) -> GeoShapeResult<usize> {
        let value = self.i32_at(offset)?;
        usize::try_from(value).map_err(|_| {
            error!("negative {} count {} in record", what, value);
            GeoShapeError::new(
                &format!("Negative {} count in record", what),
                ErrorKind::FormatError,
            )
        })
    }

    fn f64_run(&self, offset: usize, count: usize) -> GeoShapeResult<Vec<f64>> {
        let bytes = self.slice(offset, byte_span(count, 8)?)?;
        let mut values = Vec::new();
        values.try_reserve_exact(count)?;
        values.extend(bytes.chunks_exact(8).map(LittleEndian::read_f64));
        Ok(values)
    }

    fn xy_run(&self, offset: usize, count: usize) -> GeoShapeResult<(Vec<f64>, Vec<f64>)> {
        let bytes = self.slice(offset, byte_span(count, 16)?)?;
        let mut x = Vec::new();
        let mut y = Vec::new();
        x.try_reserve_exact(count)?;
        y.try_reserve_exact(count)?;
        for pair in bytes.chunks_exact(16) {
            x.push(LittleEndian::read_f64(&pair[..8]));
            y.push(LittleEndian::read_f64(&pair[8..]));
        }
        Ok((x, y))
    }

    fn xy_bbox(&self) -> GeoShapeResult<Bounds> {
        Ok(Bounds {
            x_min: self.f64_at(BBOX_OFFSET)?,
            y_min: self.f64_at(BBOX_OFFSET + 8)?,
            x_max: self.f64_at(BBOX_OFFSET + 16)?,
            y_max: self.f64_at(BBOX_OFFSET + 24)?,
            ..Bounds::default()
        })
    }

    /// Measures are present when the record is long enough to hold a full
    /// range + array block at `offset`.
    fn has_measure_block(&self, offset: usize, count: usize) -> bool {
        byte_span(count, 8)
            .ok()
            .and_then(|span| offset.checked_add(16 + span))
            .is_some_and(|end| self.len() >= end)
    }
}

fn byte_span(count: usize, width: usize) -> GeoShapeResult<usize> {
    count.checked_mul(width).ok_or_else(|| {
        GeoShapeError::new(
            &format!("Vertex count {} overflows the record size", count),
            ErrorKind::FormatError,
        )
    })
}

fn record_shape_type(bytes: &RecordBytes) -> GeoShapeResult<Option<ShapeType>> {
    let code = bytes.i32_at(SHAPE_TYPE_OFFSET)?;
    Ok(ShapeType::from_code(code))
}

fn no_vertices() -> GeoShapeError {
    error!("record declares no vertices");
    GeoShapeError::new("Record has no vertices", ErrorKind::FormatError)
}

/// Decodes one full record into a shape with the given id.
pub(crate) fn decode_record(buf: &[u8], id: i32) -> GeoShapeResult<Shape> {
    let bytes = RecordBytes::new(buf);
    let code = bytes.i32_at(SHAPE_TYPE_OFFSET)?;
    let shape_type = ShapeType::from_code(code).ok_or_else(|| {
        error!("unknown shape type {} in record {}", code, id);
        GeoShapeError::new(
            &format!("Unknown shape type {}", code),
            ErrorKind::FormatError,
        )
    })?;

    if shape_type.has_parts() {
        decode_parts(&bytes, shape_type, id)
    } else if shape_type.is_multipoint() {
        decode_multipoint(&bytes, shape_type, id)
    } else if shape_type.is_point() {
        decode_point(&bytes, shape_type, id)
    } else {
        let mut shape = Shape::null();
        shape.set_id(id);
        Ok(shape)
    }
}

fn decode_parts(bytes: &RecordBytes, shape_type: ShapeType, id: i32) -> GeoShapeResult<Shape> {
    let part_count = bytes.count_at(COUNT_OFFSET, "part")?;
    let n = bytes.count_at(PARTS_POINTS_OFFSET, "vertex")?;
    if n == 0 {
        return Err(no_vertices());
    }
    let mut bounds = bytes.xy_bbox()?;
    let part_fields = if shape_type == ShapeType::MultiPatch { 8 } else { 4 };
    bytes.slice(PARTS_OFFSET, byte_span(part_count, part_fields)?)?;

    let mut parts = Vec::new();
    parts.try_reserve_exact(part_count + 1)?;
    let mut offset = PARTS_OFFSET;
    let mut previous = 0;
    for _ in 0..part_count {
        let start = bytes.count_at(offset, "part start")?;
        if start < previous || start > n {
            error!(
                "part start {} out of order or beyond {} vertices in record {}",
                start, n, id
            );
            return Err(GeoShapeError::new(
                "Invalid part start in record",
                ErrorKind::FormatError,
            ));
        }
        parts.push(start);
        previous = start;
        offset += 4;
    }
    parts.push(n);

    let mut part_types = Vec::new();
    part_types.try_reserve_exact(part_count)?;
    if shape_type == ShapeType::MultiPatch {
        for _ in 0..part_count {
            let code = bytes.i32_at(offset)?;
            let part_type = PartType::from_code(code).ok_or_else(|| {
                error!("unknown part type {} in record {}", code, id);
                GeoShapeError::new(
                    &format!("Unknown part type {}", code),
                    ErrorKind::FormatError,
                )
            })?;
            part_types.push(part_type);
            offset += 4;
        }
    } else {
        part_types.resize(part_count, PartType::Ring);
    }

    let (x, y) = bytes.xy_run(offset, n)?;
    offset += 16 * n;

    let (z, m) = decode_axis_blocks(bytes, shape_type, offset, n, &mut bounds)?;
    Ok(Shape::from_decoded(
        shape_type, id, parts, part_types, x, y, z, m, bounds,
    ))
}

fn decode_multipoint(
    bytes: &RecordBytes,
    shape_type: ShapeType,
    id: i32,
) -> GeoShapeResult<Shape> {
    let n = bytes.count_at(COUNT_OFFSET, "vertex")?;
    if n == 0 {
        return Err(no_vertices());
    }
    let (x, y) = bytes.xy_run(MULTIPOINT_XY_OFFSET, n)?;
    let mut bounds = bytes.xy_bbox()?;
    let offset = MULTIPOINT_XY_OFFSET + 16 * n;

    let (z, m) = decode_axis_blocks(bytes, shape_type, offset, n, &mut bounds)?;
    Ok(Shape::from_decoded(
        shape_type,
        id,
        Vec::new(),
        Vec::new(),
        x,
        y,
        z,
        m,
        bounds,
    ))
}

/// Reads the Z block (for Z types) and the length-gated M block that
/// follow the X/Y array at `offset`.
fn decode_axis_blocks(
    bytes: &RecordBytes,
    shape_type: ShapeType,
    mut offset: usize,
    n: usize,
    bounds: &mut Bounds,
) -> GeoShapeResult<(Vec<f64>, Vec<f64>)> {
    let z = if shape_type.has_z() {
        bounds.z_min = bytes.f64_at(offset)?;
        bounds.z_max = bytes.f64_at(offset + 8)?;
        let z = bytes.f64_run(offset + 16, n)?;
        offset += 16 + 8 * n;
        z
    } else {
        zeros(n)?
    };

    let m = if bytes.has_measure_block(offset, n) {
        bounds.m_min = bytes.f64_at(offset)?;
        bounds.m_max = bytes.f64_at(offset + 8)?;
        bytes.f64_run(offset + 16, n)?
    } else {
        zeros(n)?
    };
    Ok((z, m))
}

fn zeros(n: usize) -> GeoShapeResult<Vec<f64>> {
    let mut values = Vec::new();
    values.try_reserve_exact(n)?;
    values.resize(n, 0.0);
    Ok(values)
}

/// X, Y, Z and M of a point record. M is read only when the record is long
/// enough to hold it.
fn point_vertex(
    bytes: &RecordBytes,
    shape_type: ShapeType,
) -> GeoShapeResult<(f64, f64, f64, f64)> {
    let x = bytes.f64_at(POINT_XY_OFFSET)?;
    let y = bytes.f64_at(POINT_XY_OFFSET + 8)?;
    let mut offset = POINT_Z_OFFSET;
    let z = if shape_type.has_z() {
        offset += 8;
        bytes.f64_at(POINT_Z_OFFSET)?
    } else {
        0.0
    };
    let m = if bytes.len() >= offset + 8 {
        bytes.f64_at(offset)?
    } else {
        0.0
    };
    Ok((x, y, z, m))
}

fn decode_point(bytes: &RecordBytes, shape_type: ShapeType, id: i32) -> GeoShapeResult<Shape> {
    let (x, y, z, m) = point_vertex(bytes, shape_type)?;
    Ok(Shape::from_decoded(
        shape_type,
        id,
        Vec::new(),
        Vec::new(),
        vec![x],
        vec![y],
        vec![z],
        vec![m],
        Bounds::from_vertex(x, y, z, m),
    ))
}

/// Reads only the stored extent of a record.
///
/// Point records have no stored extent; their bounds are the vertex, with
/// every maximum widened by `point_epsilon` when given. Null records,
/// records without vertices and unknown types yield `None`.
pub(crate) fn decode_bounds(
    buf: &[u8],
    point_epsilon: Option<f64>,
) -> GeoShapeResult<Option<(ShapeType, Bounds)>> {
    let bytes = RecordBytes::new(buf);
    let shape_type = match record_shape_type(&bytes)? {
        Some(shape_type) => shape_type,
        None => return Ok(None),
    };

    if shape_type.has_parts() || shape_type.is_multipoint() {
        let (n, mut offset) = if shape_type.has_parts() {
            let part_count = bytes.count_at(COUNT_OFFSET, "part")?;
            let n = bytes.count_at(PARTS_POINTS_OFFSET, "vertex")?;
            let part_fields = if shape_type == ShapeType::MultiPatch { 8 } else { 4 };
            (n, PARTS_OFFSET + byte_span(part_count, part_fields)?)
        } else {
            (bytes.count_at(COUNT_OFFSET, "vertex")?, MULTIPOINT_XY_OFFSET)
        };
        if n == 0 {
            return Ok(None);
        }
        offset += byte_span(n, 16)?;

        let mut bounds = bytes.xy_bbox()?;
        if shape_type.has_z() {
            bounds.z_min = bytes.f64_at(offset)?;
            bounds.z_max = bytes.f64_at(offset + 8)?;
            offset += 16 + 8 * n;
        }
        if bytes.has_measure_block(offset, n) {
            bounds.m_min = bytes.f64_at(offset)?;
            bounds.m_max = bytes.f64_at(offset + 8)?;
        }
        Ok(Some((shape_type, bounds)))
    } else if shape_type.is_point() {
        let (x, y, z, m) = point_vertex(&bytes, shape_type)?;
        let mut bounds = Bounds::from_vertex(x, y, z, m);
        if let Some(epsilon) = point_epsilon {
            bounds.x_max += epsilon;
            bounds.y_max += epsilon;
            bounds.z_max += epsilon;
            bounds.m_max += epsilon;
        }
        Ok(Some((shape_type, bounds)))
    } else {
        Ok(None)
    }
}
