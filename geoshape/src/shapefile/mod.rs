//! Reading and writing `.shp`/`.shx` file pairs.
//!
//! - `header`: the 100-byte header shared by both files
//! - `directory`: the in-memory record directory mirrored by `.shx`
//! - `record`: per-type encoding and decoding of `.shp` records
//! - `storage`: locating and opening the two files
//! - `ShapeFile`: the open handle tying these together

pub mod constants;
pub mod directory;
pub mod header;
mod record;
mod shapefile_impl;
mod storage;

pub use directory::{RecordDirectory, RecordEntry};
pub use header::FileHeader;
pub use shapefile_impl::{ShapeFile, ShapeFileInfo};
