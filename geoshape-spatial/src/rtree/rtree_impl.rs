use std::ops::ControlFlow;

use log::{debug, trace};

use super::rtree_config::RTreeConfig;
use super::rtree_constants::DEFAULT_PAGE_SIZE;
use super::rtree_node::Node;
use super::rtree_types::{
    Branch, ChildRef, DataId, IntegrityReport, NodeId, SpatialError, SpatialResult,
};
use crate::mbr::Mbr;

/// In-memory R-Tree (Guttman, quadratic split) over `D`-dimensional
/// rectangles.
///
/// Nodes live in an arena addressed by [`NodeId`]; a freed node's slot is
/// reused by the next split. Leaves map rectangles to opaque [`DataId`]s.
///
/// The tree is not synchronized. Share it across threads only behind a
/// lock.
///
/// # Examples
///
/// ```rust,ignore
/// use std::ops::ControlFlow;
/// use geoshape_spatial::{Mbr, RTree, RTreeConfig};
///
/// let mut tree: RTree = RTree::new(RTreeConfig::with_max_card(8))?;
/// tree.insert(Mbr::new([0.0, 0.0], [1.0, 1.0]), 1)?;
/// tree.insert(Mbr::new([5.0, 5.0], [6.0, 6.0]), 2)?;
///
/// let hits = tree.find_intersecting(&Mbr::new([0.5, 0.5], [2.0, 2.0]))?;
/// assert_eq!(hits, vec![1]);
/// ```
#[derive(Debug, Clone)]
pub struct RTree<const D: usize = 2> {
    config: RTreeConfig,
    nodes: Vec<Node<D>>,
    free: Vec<NodeId>,
    root: NodeId,
    len: usize,
}

impl<const D: usize> RTree<D> {
    pub fn new(config: RTreeConfig) -> SpatialResult<RTree<D>> {
        config.validate()?;
        Ok(RTree::with_valid_config(config))
    }

    fn with_valid_config(config: RTreeConfig) -> RTree<D> {
        RTree {
            config,
            nodes: vec![Node::new(0, config.max_card)],
            free: Vec::new(),
            root: 0,
            len: 0,
        }
    }

    pub fn config(&self) -> &RTreeConfig {
        &self.config
    }

    /// Number of data entries.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Level of the root; 0 while the root is a leaf.
    pub fn height(&self) -> usize {
        self.nodes[self.root].level
    }

    /// Nodes currently reachable in the arena.
    pub fn node_count(&self) -> usize {
        self.nodes.len() - self.free.len()
    }

    /// Drops every entry, leaving an empty leaf root.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.nodes.push(Node::new(0, self.config.max_card));
        self.root = 0;
        self.len = 0;
    }

    // ========================================================================
    // Insert
    // ========================================================================

    /// Adds `id` under `mbr` at the leaf level.
    ///
    /// Fails with [`SpatialError::InvariantViolation`] before touching the
    /// tree if `mbr` has a NaN side or a low side above its high side.
    pub fn insert(&mut self, mbr: Mbr<D>, id: DataId) -> SpatialResult<()> {
        check_mbr(&mbr)?;
        self.insert_branch(Branch::new(mbr, ChildRef::Data(id)), 0)?;
        self.len += 1;
        Ok(())
    }

    /// Places `branch` in a node at `level`, growing the tree when the root
    /// splits.
    fn insert_branch(&mut self, branch: Branch<D>, level: usize) -> SpatialResult<()> {
        if level > self.height() {
            return Err(SpatialError::InvariantViolation(format!(
                "insertion level {} is above the root at level {}",
                level,
                self.height()
            )));
        }

        if let Some(sibling) = self.insert_recursive(self.root, branch, level) {
            let old_root = self.root;
            let new_level = self.nodes[old_root].level + 1;
            let mut new_root = Node::new(new_level, self.config.max_card);
            new_root.push(Branch::new(self.nodes[old_root].cover(), ChildRef::Node(old_root)));
            new_root.push(Branch::new(self.nodes[sibling].cover(), ChildRef::Node(sibling)));
            self.root = self.alloc(new_root);
            debug!("R-Tree root split, height is now {}", new_level);
        }
        Ok(())
    }

    /// Returns the new sibling when `node_id` had to split.
    fn insert_recursive(
        &mut self,
        node_id: NodeId,
        branch: Branch<D>,
        level: usize,
    ) -> Option<NodeId> {
        let node_level = self.nodes[node_id].level;
        assert!(node_level >= level, "descended below level {}", level);

        if node_level == level {
            return self.add_branch(node_id, branch);
        }

        let index = self.nodes[node_id].pick_branch(&branch.mbr);
        let child = child_node(&self.nodes[node_id], index);
        let mbr = branch.mbr;
        match self.insert_recursive(child, branch, level) {
            None => {
                if let Some(slot) = self.nodes[node_id].slot_mut(index) {
                    slot.mbr = slot.mbr.union(&mbr);
                }
                None
            }
            Some(sibling) => {
                let child_cover = self.nodes[child].cover();
                if let Some(slot) = self.nodes[node_id].slot_mut(index) {
                    slot.mbr = child_cover;
                }
                let sibling_branch =
                    Branch::new(self.nodes[sibling].cover(), ChildRef::Node(sibling));
                self.add_branch(node_id, sibling_branch)
            }
        }
    }

    fn add_branch(&mut self, node_id: NodeId, branch: Branch<D>) -> Option<NodeId> {
        match self.nodes[node_id].try_push(branch) {
            Ok(_) => None,
            Err(branch) => {
                let min_fill = self.config.min_fill;
                let sibling = self.nodes[node_id].split(branch, min_fill);
                trace!(
                    "split node {} at level {} into {} + {} branches",
                    node_id,
                    sibling.level,
                    self.nodes[node_id].count,
                    sibling.count
                );
                Some(self.alloc(sibling))
            }
        }
    }

    // ========================================================================
    // Remove
    // ========================================================================

    /// Removes the entry `id` stored under a rectangle overlapping `mbr`.
    ///
    /// Nodes left under `min_fill` are dissolved and their branches
    /// reinserted at their own level. A non-leaf root with a single child is
    /// replaced by that child. Returns false when no such entry exists.
    pub fn remove(&mut self, mbr: &Mbr<D>, id: DataId) -> SpatialResult<bool> {
        check_mbr(mbr)?;

        let mut eliminated = Vec::new();
        if !self.remove_recursive(self.root, mbr, id, &mut eliminated) {
            return Ok(false);
        }
        self.len -= 1;

        // most recently eliminated first
        while let Some(node_id) = eliminated.pop() {
            let node = self.release(node_id);
            let level = node.level;
            for branch in node.into_branches() {
                self.insert_branch(branch, level)?;
            }
        }

        self.collapse_root();
        Ok(true)
    }

    /// Replaces a non-leaf root holding a single child by that child, as
    /// long as one remains. An internal root left with no branch at all
    /// becomes an empty leaf.
    fn collapse_root(&mut self) {
        loop {
            let root = &self.nodes[self.root];
            if root.is_leaf() || root.count > 1 {
                return;
            }
            let first = root.branches().next().map(|(index, _)| index);
            let child = match first {
                Some(index) => child_node(root, index),
                None => {
                    let root_id = self.root;
                    self.nodes[root_id] = Node::new(0, self.config.max_card);
                    debug!("R-Tree emptied, height is now 0");
                    return;
                }
            };
            let old_root = self.root;
            self.release(old_root);
            self.root = child;
            debug!("R-Tree root collapsed, height is now {}", self.height());
        }
    }

    fn remove_recursive(
        &mut self,
        node_id: NodeId,
        mbr: &Mbr<D>,
        id: DataId,
        eliminated: &mut Vec<NodeId>,
    ) -> bool {
        if self.nodes[node_id].is_leaf() {
            let found = self.nodes[node_id]
                .branches()
                .find(|(_, branch)| branch.child == ChildRef::Data(id))
                .map(|(index, _)| index);
            return match found {
                Some(index) => {
                    self.nodes[node_id].cut(index);
                    true
                }
                None => false,
            };
        }

        for index in 0..self.nodes[node_id].capacity() {
            let child = match self.nodes[node_id].slot(index) {
                Some(branch) if branch.mbr.overlaps(mbr) => child_node(&self.nodes[node_id], index),
                _ => continue,
            };
            if !self.remove_recursive(child, mbr, id, eliminated) {
                continue;
            }

            if self.nodes[child].count >= self.config.min_fill {
                let cover = self.nodes[child].cover();
                if let Some(slot) = self.nodes[node_id].slot_mut(index) {
                    slot.mbr = cover;
                }
            } else {
                eliminated.push(child);
                self.nodes[node_id].cut(index);
            }
            return true;
        }
        false
    }

    // ========================================================================
    // Search
    // ========================================================================

    /// Calls `visitor` with every data id whose rectangle overlaps `mbr`
    /// and returns how many were visited.
    ///
    /// Returning [`ControlFlow::Break`] from `visitor` ends the whole search;
    /// the entry that stopped it is counted.
    pub fn search<F>(&self, mbr: &Mbr<D>, mut visitor: F) -> SpatialResult<usize>
    where
        F: FnMut(DataId) -> ControlFlow<()>,
    {
        check_mbr(mbr)?;
        let mut hits = 0;
        let _ = self.search_recursive(self.root, mbr, &mut visitor, &mut hits);
        Ok(hits)
    }

    /// Ids of every entry overlapping `mbr`.
    pub fn find_intersecting(&self, mbr: &Mbr<D>) -> SpatialResult<Vec<DataId>> {
        let mut ids = Vec::new();
        self.search(mbr, |id| {
            ids.push(id);
            ControlFlow::Continue(())
        })?;
        Ok(ids)
    }

    fn search_recursive<F>(
        &self,
        node_id: NodeId,
        mbr: &Mbr<D>,
        visitor: &mut F,
        hits: &mut usize,
    ) -> ControlFlow<()>
    where
        F: FnMut(DataId) -> ControlFlow<()>,
    {
        let node = &self.nodes[node_id];
        for (_, branch) in node.branches() {
            if !branch.mbr.overlaps(mbr) {
                continue;
            }
            match branch.child {
                ChildRef::Node(child) => self.search_recursive(child, mbr, visitor, hits)?,
                ChildRef::Data(id) => {
                    *hits += 1;
                    visitor(id)?;
                }
            }
        }
        ControlFlow::Continue(())
    }

    // ========================================================================
    // Diagnostics
    // ========================================================================

    /// Walks the whole tree and reports every broken structural rule.
    pub fn check_integrity(&self) -> IntegrityReport {
        let mut report = IntegrityReport::new();
        self.check_node(self.root, true, &mut report);
        if report.entries_found != self.len as u64 {
            report.fail(format!(
                "tree holds {} entries but counts {}",
                report.entries_found, self.len
            ));
        }
        report
    }

    fn check_node(&self, node_id: NodeId, is_root: bool, report: &mut IntegrityReport) {
        let node = &self.nodes[node_id];
        report.nodes_checked += 1;

        let occupied = node.branches().count();
        if occupied != node.count {
            report.fail(format!(
                "node {} counts {} branches but holds {}",
                node_id, node.count, occupied
            ));
        }
        if !is_root && (occupied < self.config.min_fill || occupied > self.config.max_card) {
            report.fill_violations += 1;
            report.fail(format!(
                "node {} at level {} holds {} branches, allowed {}..={}",
                node_id, node.level, occupied, self.config.min_fill, self.config.max_card
            ));
        }

        for (index, branch) in node.branches() {
            match branch.child {
                ChildRef::Data(_) if node.is_leaf() => report.entries_found += 1,
                ChildRef::Node(child) if !node.is_leaf() => {
                    let child_node = &self.nodes[child];
                    if child_node.level + 1 != node.level {
                        report.level_mismatches += 1;
                        report.fail(format!(
                            "node {} at level {} is a child of node {} at level {}",
                            child, child_node.level, node_id, node.level
                        ));
                    }

                    let cover = child_node.cover();
                    if !cover.contained_in(&branch.mbr) {
                        report.non_covering_branches += 1;
                        report.fail(format!(
                            "branch {} of node {} does not cover node {}",
                            index, node_id, child
                        ));
                    } else if cover != branch.mbr {
                        report.loose_branches += 1;
                        report.fail(format!(
                            "branch {} of node {} is larger than node {}",
                            index, node_id, child
                        ));
                    }
                    self.check_node(child, false, report);
                }
                child => {
                    report.level_mismatches += 1;
                    report.fail(format!(
                        "node {} at level {} holds {:?}",
                        node_id, node.level, child
                    ));
                }
            }
        }
    }

    // ========================================================================
    // Arena
    // ========================================================================

    fn alloc(&mut self, node: Node<D>) -> NodeId {
        match self.free.pop() {
            Some(node_id) => {
                self.nodes[node_id] = node;
                node_id
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }

    fn release(&mut self, node_id: NodeId) -> Node<D> {
        self.free.push(node_id);
        std::mem::replace(&mut self.nodes[node_id], Node::new(0, 0))
    }
}

impl<const D: usize> Default for RTree<D> {
    fn default() -> Self {
        RTree::with_valid_config(RTreeConfig::for_page_size(DEFAULT_PAGE_SIZE, D))
    }
}

fn check_mbr<const D: usize>(mbr: &Mbr<D>) -> SpatialResult<()> {
    if mbr.is_well_formed() {
        Ok(())
    } else {
        Err(SpatialError::InvariantViolation(format!(
            "malformed rectangle {}",
            mbr
        )))
    }
}

/// Child node behind an occupied slot of an internal node.
fn child_node<const D: usize>(node: &Node<D>, index: usize) -> NodeId {
    match node.slot(index).map(|branch| branch.child) {
        Some(ChildRef::Node(child)) => child,
        other => panic!(
            "slot {} of node at level {} holds {:?} instead of a child node",
            index, node.level, other
        ),
    }
}
