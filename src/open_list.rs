use crate::error::{Error, Result};
use crate::node::SearchNode;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

/// Tie-break rule among open nodes with equal f
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TieBreak {
    /// Prefer the larger g (deeper node)
    #[serde(rename = "g")]
    LargerG,
    /// Prefer the smaller h
    #[serde(rename = "h")]
    SmallerH,
}

impl TieBreak {
    pub fn symbol(&self) -> char {
        match self {
            TieBreak::LargerG => 'g',
            TieBreak::SmallerH => 'h',
        }
    }

    /// Total order used by the open list; `Less` pops first.
    ///
    /// f ascending, then the tie-break key, then the smaller coordinate.
    pub fn compare(&self, a: &SearchNode, b: &SearchNode) -> Ordering {
        a.f()
            .cmp(&b.f())
            .then_with(|| match self {
                TieBreak::LargerG => b.g.cmp(&a.g),
                TieBreak::SmallerH => a.h.cmp(&b.h),
            })
            .then_with(|| a.coord.cmp(&b.coord))
    }
}

impl fmt::Display for TieBreak {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.symbol())
    }
}

impl FromStr for TieBreak {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "g" | "G" => Ok(TieBreak::LargerG),
            "h" | "H" => Ok(TieBreak::SmallerH),
            other => Err(Error::UnknownTieBreak(other.to_string())),
        }
    }
}

impl TryFrom<char> for TieBreak {
    type Error = Error;

    fn try_from(c: char) -> Result<Self> {
        c.to_string().parse()
    }
}

const NOT_QUEUED: usize = usize::MAX;

/// Open set for A*: an indexed binary min-heap keyed by coordinate.
///
/// There is no deduplication on insert. Decrease-key is `remove(coord)`
/// followed by `insert`, so each coordinate appears at most once.
#[derive(Debug, Clone)]
pub struct OpenList {
    heap: Vec<SearchNode>,
    /// Heap slot of each coordinate, or NOT_QUEUED
    slots: Vec<usize>,
    tiebreak: TieBreak,
}

impl OpenList {
    /// Create an open list for coordinates in `0..capacity`
    pub fn new(capacity: usize, tiebreak: TieBreak) -> Self {
        OpenList {
            heap: Vec::new(),
            slots: vec![NOT_QUEUED; capacity],
            tiebreak,
        }
    }

    pub fn len(&self) -> usize {
        self.heap.len()
    }

    pub fn is_empty(&self) -> bool {
        self.heap.is_empty()
    }

    pub fn contains(&self, coord: usize) -> bool {
        self.slots.get(coord).is_some_and(|&s| s != NOT_QUEUED)
    }

    /// Empty the list, keeping its allocation
    pub fn clear(&mut self) {
        for node in &self.heap {
            self.slots[node.coord] = NOT_QUEUED;
        }
        self.heap.clear();
    }

    pub fn insert(&mut self, node: SearchNode) {
        let slot = self.heap.len();
        self.heap.push(node);
        self.slots[node.coord] = slot;
        self.sift_up(slot);
    }

    /// Smallest node without removing it
    pub fn peek_min(&self) -> Option<&SearchNode> {
        self.heap.first()
    }

    /// Remove and return the smallest node
    pub fn pop_min(&mut self) -> Option<SearchNode> {
        if self.heap.is_empty() {
            return None;
        }
        Some(self.remove_at(0))
    }

    /// Remove the entry for `coord` if present
    pub fn remove(&mut self, coord: usize) -> Option<SearchNode> {
        match self.slots.get(coord) {
            Some(&slot) if slot != NOT_QUEUED => Some(self.remove_at(slot)),
            _ => None,
        }
    }

    fn remove_at(&mut self, slot: usize) -> SearchNode {
        let node = self.heap.swap_remove(slot);
        self.slots[node.coord] = NOT_QUEUED;

        if slot < self.heap.len() {
            self.slots[self.heap[slot].coord] = slot;
            // The moved node may need to travel either way
            self.sift_down(slot);
            self.sift_up(slot);
        }
        node
    }

    fn less(&self, a: usize, b: usize) -> bool {
        self.tiebreak.compare(&self.heap[a], &self.heap[b]) == Ordering::Less
    }

    fn swap(&mut self, a: usize, b: usize) {
        self.heap.swap(a, b);
        self.slots[self.heap[a].coord] = a;
        self.slots[self.heap[b].coord] = b;
    }

    fn sift_up(&mut self, mut slot: usize) {
        while slot > 0 {
            let parent = (slot - 1) / 2;
            if !self.less(slot, parent) {
                break;
            }
            self.swap(slot, parent);
            slot = parent;
        }
    }

    fn sift_down(&mut self, mut slot: usize) {
        let len = self.heap.len();
        loop {
            let left = 2 * slot + 1;
            let right = left + 1;
            let mut smallest = slot;
            if left < len && self.less(left, smallest) {
                smallest = left;
            }
            if right < len && self.less(right, smallest) {
                smallest = right;
            }
            if smallest == slot {
                break;
            }
            self.swap(slot, smallest);
            slot = smallest;
        }
    }
}
