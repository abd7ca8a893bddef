//! # geoshape-spatial - R-Tree indexing for shapefile geometry
//!
//! An in-memory R-Tree answering "which rectangles overlap this one"
//! queries, and a shape index that fills one from an open
//! [`geoshape::ShapeFile`].
//!
//! ## Features
//!
//! - **Guttman R-Tree**: quadratic node split, spherical-volume branch
//!   choice, deletion with reinsertion of underfull nodes
//! - **Any dimensionality**: `RTree<D>` for `D` up to 20, 2-D by default
//! - **Early-stopping search**: visitors return [`std::ops::ControlFlow`]
//! - **Shape index**: envelopes read without decoding vertices
//! - **Integrity checks**: fill factors, covering rectangles and levels
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use geoshape::{AccessMode, Envelope, ShapeFile};
//! use geoshape_spatial::ShapeIndex;
//!
//! let mut file = ShapeFile::open("roads.shp", AccessMode::ReadOnly)?;
//! let index = ShapeIndex::build(&mut file)?;
//! for id in index.query(&Envelope::new(0.0, 0.0, 100.0, 100.0))? {
//!     let road = file.read_shape(id as i32)?;
//!     println!("{} has {} vertices", id, road.vertex_count());
//! }
//! ```

pub mod mbr;
pub mod rtree;
pub mod shape_index;

pub use mbr::Mbr;
pub use rtree::{
    Branch, ChildRef, DataId, IntegrityReport, NodeId, RTree, RTreeConfig, SpatialError,
    SpatialResult,
};
pub use shape_index::ShapeIndex;
