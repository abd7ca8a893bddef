//! # geoshape - ESRI Shapefile geometry for Rust
//!
//! This crate reads and writes the geometry half of an ESRI Shapefile: the
//! `.shp` file holding the records and the `.shx` file indexing them. It
//! also carries the in-memory shape model and the ring utilities used to
//! measure and orient polygons.
//!
//! ## Features
//!
//! - **Byte-exact codec**: every shape type, including Z, M and MultiPatch
//!   records
//! - **Random access**: records are read on demand through the `.shx`
//!   directory
//! - **Incremental writes**: append or overwrite records, with file size and
//!   bounds kept up to date
//! - **Bounds-only reads**: fetch a record's extent without decoding its
//!   vertices
//! - **Ring orientation**: area, length, rewinding and polygon validation
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geoshape::{AccessMode, ShapeBuilder, ShapeFile, ShapeType};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let mut file = ShapeFile::create("parcels", ShapeType::Polygon)?;
//! let square = ShapeBuilder::new(ShapeType::Polygon)
//!     .xy(&[0.0, 0.0, 4.0, 4.0, 0.0], &[0.0, 4.0, 4.0, 0.0, 0.0])
//!     .build()?;
//! file.write_shape(-1, &square)?;
//! file.close()?;
//!
//! let mut file = ShapeFile::open("parcels.shp", AccessMode::ReadOnly)?;
//! let (_, bounds) = file.read_object_bounds(0, None)?.expect("not null");
//! assert_eq!(bounds.x_max, 4.0);
//! # Ok(())
//! # }
//! ```
//!
//! Handles are not synchronized. A `ShapeFile` must not be shared between
//! threads without outside locking.

pub mod bounds;
pub mod config;
pub mod errors;
pub mod geometry;
pub mod shape_type;
pub mod shapefile;

pub use bounds::{Bounds, Envelope};
pub use config::AccessMode;
pub use errors::{ErrorKind, GeoShapeError, GeoShapeResult};
pub use geometry::{Shape, ShapeBuilder, UNASSIGNED_ID};
pub use shape_type::{part_type_name, type_name, PartType, ShapeFamily, ShapeType};
pub use shapefile::{RecordEntry, ShapeFile, ShapeFileInfo};
