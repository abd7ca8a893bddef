//! Core types shared by the R-Tree modules.
//!
//! - Error and result types
//! - Arena handles and branch children
//! - The integrity report returned by tree checks

use geoshape::errors::{ErrorKind, GeoShapeError};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::mbr::Mbr;

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur in spatial indexing operations
#[derive(Debug, Error)]
pub enum SpatialError {
    #[error("Shapefile error: {0}")]
    Shape(#[from] GeoShapeError),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    #[error("Invariant violation: {0}")]
    InvariantViolation(String),
}

impl From<SpatialError> for GeoShapeError {
    fn from(err: SpatialError) -> Self {
        match err {
            SpatialError::Shape(err) => err,
            SpatialError::InvalidConfig(msg) => {
                GeoShapeError::new(&msg, ErrorKind::ValidationError)
            }
            SpatialError::InvariantViolation(msg) => {
                GeoShapeError::new(&msg, ErrorKind::InvariantViolation)
            }
        }
    }
}

/// Result type for spatial operations
pub type SpatialResult<T> = Result<T, SpatialError>;

// ============================================================================
// Tree Handles
// ============================================================================

/// Opaque identifier stored in leaf branches, usually a shape id
pub type DataId = u64;

/// Index of a node in the tree's arena
pub type NodeId = usize;

/// What a branch points at: another node for internal levels, a data id
/// at the leaf level.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ChildRef {
    Node(NodeId),
    Data(DataId),
}

impl ChildRef {
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            ChildRef::Node(id) => Some(*id),
            ChildRef::Data(_) => None,
        }
    }

    pub fn data_id(&self) -> Option<DataId> {
        match self {
            ChildRef::Data(id) => Some(*id),
            ChildRef::Node(_) => None,
        }
    }
}

/// One occupied slot of a node
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Branch<const D: usize = 2> {
    pub mbr: Mbr<D>,
    pub child: ChildRef,
}

impl<const D: usize> Branch<D> {
    pub fn new(mbr: Mbr<D>, child: ChildRef) -> Branch<D> {
        Branch { mbr, child }
    }
}

// ============================================================================
// Diagnostics
// ============================================================================

/// Result of walking the whole tree with [`RTree::check_integrity`].
///
/// [`RTree::check_integrity`]: crate::rtree::RTree::check_integrity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IntegrityReport {
    /// Nodes reached from the root
    pub nodes_checked: u64,
    /// Data ids found in the leaves
    pub entries_found: u64,
    /// Non-root nodes holding fewer than `min_fill` or more than
    /// `max_card` branches
    pub fill_violations: u64,
    /// Branches whose rectangle is larger than their child's coverage
    pub loose_branches: u64,
    /// Branches whose rectangle does not cover their child
    pub non_covering_branches: u64,
    /// Children whose level is not one below their parent
    pub level_mismatches: u64,
    /// Summary of findings
    pub is_valid: bool,
    /// Detailed error messages
    pub errors: Vec<String>,
}

impl IntegrityReport {
    pub fn new() -> Self {
        Self {
            nodes_checked: 0,
            entries_found: 0,
            fill_violations: 0,
            loose_branches: 0,
            non_covering_branches: 0,
            level_mismatches: 0,
            is_valid: true,
            errors: Vec::new(),
        }
    }

    pub(crate) fn fail(&mut self, message: String) {
        self.is_valid = false;
        self.errors.push(message);
    }
}

impl Default for IntegrityReport {
    fn default() -> Self {
        Self::new()
    }
}
