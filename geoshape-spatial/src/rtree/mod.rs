//! In-memory R-Tree with Guttman's quadratic split.
//!
//! - `rtree_types`: errors, arena handles, branches and the integrity report
//! - `rtree_config`: fill factors
//! - `rtree_node`: fixed-capacity nodes, branch choice and node splitting
//! - `RTree`: insertion with split propagation, deletion with reinsertion
//!   of underfull nodes, and range search

pub mod rtree_config;
pub mod rtree_constants;
pub mod rtree_types;
mod rtree_impl;
mod rtree_node;

pub use rtree_config::RTreeConfig;
pub use rtree_constants::{DEFAULT_PAGE_SIZE, MAX_DIMENSIONS, UNIT_SPHERE_VOLUMES};
pub use rtree_impl::RTree;
pub use rtree_types::{
    Branch, ChildRef, DataId, IntegrityReport, NodeId, SpatialError, SpatialResult,
};
