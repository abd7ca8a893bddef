//! In-memory shapes and the planar measures computed over them.

pub mod rings;
mod shape;

pub use rings::{area_of_xys, length_of_xys};
pub use shape::{Shape, ShapeBuilder, UNASSIGNED_ID};
