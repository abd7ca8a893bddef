//! Constants of the shapefile layout.

/// Size of the header at the start of both files of a pair.
pub const HEADER_SIZE: usize = 100;

/// File code stored big-endian at offset 0.
pub const FILE_CODE: i32 = 9994;

/// Format version stored little-endian at offset 28.
pub const VERSION: i32 = 1000;

/// Size of the big-endian record header in front of every `.shp` record.
pub const RECORD_HEADER_SIZE: usize = 8;

/// Size of one `.shx` entry.
pub const INDEX_ENTRY_SIZE: usize = 8;

/// Upper bound on the record count derived from an index file length.
pub const RECORDS_MAX: usize = 256_000_000;

/// Header length of a fresh file, in 16-bit words.
pub const EMPTY_FILE_WORDS: i32 = (HEADER_SIZE / 2) as i32;

/// Directory growth: new capacity is `len * GROWTH_FACTOR + GROWTH_PAD`.
pub const GROWTH_FACTOR: f64 = 1.3;
pub const GROWTH_PAD: usize = 100;

pub const SHP_EXTENSIONS: [&str; 2] = ["shp", "SHP"];
pub const SHX_EXTENSIONS: [&str; 2] = ["shx", "SHX"];

// record field offsets, counted from the start of the record header
pub(crate) const SHAPE_TYPE_OFFSET: usize = 8;
pub(crate) const BBOX_OFFSET: usize = 12;
pub(crate) const COUNT_OFFSET: usize = 44;
pub(crate) const PARTS_POINTS_OFFSET: usize = 48;
pub(crate) const PARTS_OFFSET: usize = 52;
pub(crate) const MULTIPOINT_XY_OFFSET: usize = 48;
pub(crate) const POINT_XY_OFFSET: usize = 12;
pub(crate) const POINT_Z_OFFSET: usize = 28;
