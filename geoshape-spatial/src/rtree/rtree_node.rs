//! Fixed-capacity nodes and the quadratic split.

use super::rtree_types::Branch;
use crate::mbr::Mbr;

/// A node of the tree. Level 0 is a leaf whose branches hold data ids;
/// higher levels hold child nodes.
///
/// Slots are fixed at creation. A removed branch leaves an empty slot that
/// the next insertion reuses.
#[derive(Debug, Clone)]
pub(crate) struct Node<const D: usize> {
    pub(crate) level: usize,
    pub(crate) count: usize,
    slots: Vec<Option<Branch<D>>>,
}

impl<const D: usize> Node<D> {
    pub(crate) fn new(level: usize, capacity: usize) -> Node<D> {
        Node {
            level,
            count: 0,
            slots: vec![None; capacity],
        }
    }

    pub(crate) fn is_leaf(&self) -> bool {
        self.level == 0
    }

    pub(crate) fn capacity(&self) -> usize {
        self.slots.len()
    }

    pub(crate) fn slot(&self, index: usize) -> Option<&Branch<D>> {
        self.slots[index].as_ref()
    }

    pub(crate) fn slot_mut(&mut self, index: usize) -> Option<&mut Branch<D>> {
        self.slots[index].as_mut()
    }

    /// Occupied slots with their index.
    pub(crate) fn branches(&self) -> impl Iterator<Item = (usize, &Branch<D>)> + '_ {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|branch| (index, branch)))
    }

    pub(crate) fn into_branches(self) -> impl Iterator<Item = Branch<D>> {
        self.slots.into_iter().flatten()
    }

    /// Puts `branch` in the first empty slot, or hands it back when the
    /// node is full.
    pub(crate) fn try_push(&mut self, branch: Branch<D>) -> Result<usize, Branch<D>> {
        if self.count >= self.capacity() {
            return Err(branch);
        }
        match self.slots.iter().position(Option::is_none) {
            Some(index) => {
                self.slots[index] = Some(branch);
                self.count += 1;
                Ok(index)
            }
            None => Err(branch),
        }
    }

    pub(crate) fn push(&mut self, branch: Branch<D>) {
        let pushed = self.try_push(branch);
        assert!(pushed.is_ok(), "node at level {} is full", self.level);
    }

    /// Empties slot `index`.
    pub(crate) fn cut(&mut self, index: usize) -> Branch<D> {
        match self.slots[index].take() {
            Some(branch) => {
                self.count -= 1;
                branch
            }
            None => panic!("cut of empty slot {} at level {}", index, self.level),
        }
    }

    /// Smallest rectangle covering every branch; null for an empty node.
    pub(crate) fn cover(&self) -> Mbr<D> {
        self.branches()
            .fold(Mbr::null(), |cover, (_, branch)| cover.union(&branch.mbr))
    }

    /// Slot whose rectangle grows least, by spherical volume, to take
    /// `mbr`. Ties go to the smaller rectangle.
    pub(crate) fn pick_branch(&self, mbr: &Mbr<D>) -> usize {
        let mut best: Option<(usize, f64, f64)> = None;
        for (index, branch) in self.branches() {
            let volume = branch.mbr.spherical_volume();
            let increase = mbr.union(&branch.mbr).spherical_volume() - volume;
            best = match best {
                None => Some((index, increase, volume)),
                Some((_, best_increase, _)) if increase < best_increase => {
                    Some((index, increase, volume))
                }
                Some((_, best_increase, best_volume))
                    if increase == best_increase && volume < best_volume =>
                {
                    Some((index, increase, volume))
                }
                kept => kept,
            };
        }
        match best {
            Some((index, _, _)) => index,
            None => panic!("pick_branch on empty node at level {}", self.level),
        }
    }

    /// Splits a full node that must also take `extra`.
    ///
    /// The node keeps the first group and the second is returned as a new
    /// node on the same level. Both groups hold at least `min_fill`
    /// branches.
    pub(crate) fn split(&mut self, extra: Branch<D>, min_fill: usize) -> Node<D> {
        let capacity = self.capacity();
        assert_eq!(self.count, capacity, "split of a node with free slots");

        let mut buffer = Vec::with_capacity(capacity + 1);
        for slot in self.slots.iter_mut() {
            if let Some(branch) = slot.take() {
                buffer.push(branch);
            }
        }
        buffer.push(extra);
        self.count = 0;

        let partition = Partition::quadratic(&buffer, min_fill);
        let mut sibling = Node::new(self.level, capacity);
        for (branch, group) in buffer.into_iter().zip(partition.groups) {
            match group {
                Some(0) => self.push(branch),
                Some(_) => sibling.push(branch),
                None => panic!("branch left unassigned by split"),
            }
        }
        sibling
    }
}

/// Assignment of the buffered branches to two groups.
struct Partition<const D: usize> {
    groups: Vec<Option<usize>>,
    count: [usize; 2],
    cover: [Mbr<D>; 2],
    volume: [f64; 2],
}

impl<const D: usize> Partition<D> {
    /// Guttman's quadratic method.
    ///
    /// Seeds are the pair that would waste the most volume in one rectangle.
    /// The rest go one at a time, most decided first, to the group that grows
    /// less. Once a group is so full that the other would end below
    /// `min_fill`, the other group takes everything left.
    fn quadratic(buffer: &[Branch<D>], min_fill: usize) -> Partition<D> {
        let total = buffer.len();
        assert!(total >= 2 && 2 * min_fill <= total, "cannot split {} branches", total);

        let mut partition = Partition {
            groups: vec![None; total],
            count: [0, 0],
            cover: [Mbr::null(), Mbr::null()],
            volume: [0.0, 0.0],
        };
        partition.pick_seeds(buffer);

        while partition.assigned() < total
            && partition.count[0] < total - min_fill
            && partition.count[1] < total - min_fill
        {
            let mut biggest_diff = -1.0;
            let mut chosen = 0;
            let mut better_group = 0;
            for (index, branch) in buffer.iter().enumerate() {
                if partition.groups[index].is_some() {
                    continue;
                }
                let growth0 =
                    branch.mbr.union(&partition.cover[0]).spherical_volume() - partition.volume[0];
                let growth1 =
                    branch.mbr.union(&partition.cover[1]).spherical_volume() - partition.volume[1];
                let (group, diff) = if growth1 - growth0 >= 0.0 {
                    (0, growth1 - growth0)
                } else {
                    (1, growth0 - growth1)
                };

                if diff > biggest_diff
                    || (diff == biggest_diff
                        && partition.count[group] < partition.count[better_group])
                {
                    biggest_diff = diff;
                    chosen = index;
                    better_group = group;
                }
            }
            partition.classify(buffer, chosen, better_group);
        }

        if partition.assigned() < total {
            let group = if partition.count[0] >= total - min_fill { 1 } else { 0 };
            for index in 0..total {
                if partition.groups[index].is_none() {
                    partition.classify(buffer, index, group);
                }
            }
        }

        assert_eq!(partition.assigned(), total);
        assert!(
            partition.count[0] >= min_fill && partition.count[1] >= min_fill,
            "split left groups of {} and {} below {}",
            partition.count[0],
            partition.count[1],
            min_fill
        );
        partition
    }

    fn pick_seeds(&mut self, buffer: &[Branch<D>]) {
        let cover = buffer
            .iter()
            .fold(Mbr::null(), |cover, branch| cover.union(&branch.mbr));
        let volumes: Vec<f64> = buffer
            .iter()
            .map(|branch| branch.mbr.spherical_volume())
            .collect();

        let mut worst = -cover.spherical_volume() - 1.0;
        let (mut seed0, mut seed1) = (0, 1);
        for i in 0..buffer.len() - 1 {
            for j in i + 1..buffer.len() {
                let waste =
                    buffer[i].mbr.union(&buffer[j].mbr).spherical_volume() - volumes[i] - volumes[j];
                if waste > worst {
                    worst = waste;
                    seed0 = i;
                    seed1 = j;
                }
            }
        }
        self.classify(buffer, seed0, 0);
        self.classify(buffer, seed1, 1);
    }

    fn classify(&mut self, buffer: &[Branch<D>], index: usize, group: usize) {
        assert!(self.groups[index].is_none(), "branch {} classified twice", index);
        self.groups[index] = Some(group);
        self.cover[group] = if self.count[group] == 0 {
            buffer[index].mbr
        } else {
            buffer[index].mbr.union(&self.cover[group])
        };
        self.volume[group] = self.cover[group].spherical_volume();
        self.count[group] += 1;
    }

    fn assigned(&self) -> usize {
        self.count[0] + self.count[1]
    }
}
