//! Spatial integration test module.
//!
//! These tests drive the R-Tree directly and through a shape index built
//! from a shapefile on disk.

mod rtree_scenario_test;
mod shape_index_test;
