use serde::{Deserialize, Serialize};

use super::rtree_constants::{CHILD_REF_SIZE, DEFAULT_PAGE_SIZE, NODE_HEADER_SIZE};
use super::rtree_types::{SpatialError, SpatialResult};

/// Fill factors of an R-Tree.
///
/// Every node holds at most `max_card` branches. Every node except the root
/// holds at least `min_fill`. The defaults size a 2-D node to one 4 KiB page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RTreeConfig {
    pub max_card: usize,
    pub min_fill: usize,
}

impl RTreeConfig {
    /// Capacity `n` with the conventional half-full minimum.
    pub fn with_max_card(max_card: usize) -> RTreeConfig {
        RTreeConfig {
            max_card,
            min_fill: max_card / 2,
        }
    }

    /// As many branches of a `dimensions`-D tree as fit in `page_size`
    /// bytes after the node header.
    pub fn for_page_size(page_size: usize, dimensions: usize) -> RTreeConfig {
        let branch_size = 2 * dimensions * std::mem::size_of::<f64>() + CHILD_REF_SIZE;
        RTreeConfig::with_max_card(page_size.saturating_sub(NODE_HEADER_SIZE) / branch_size)
    }

    pub fn validate(&self) -> SpatialResult<()> {
        if self.max_card < 2 {
            return Err(SpatialError::InvalidConfig(format!(
                "max_card must be at least 2, got {}",
                self.max_card
            )));
        }
        if self.min_fill < 1 || self.min_fill > self.max_card / 2 {
            return Err(SpatialError::InvalidConfig(format!(
                "min_fill must be within 1..={}, got {}",
                self.max_card / 2,
                self.min_fill
            )));
        }
        Ok(())
    }
}

impl Default for RTreeConfig {
    fn default() -> Self {
        RTreeConfig::for_page_size(DEFAULT_PAGE_SIZE, 2)
    }
}
