/// Sentinel for "no cost known yet"
pub const INFINITE_COST: u32 = u32::MAX;

/// Index of an expanded node in the current iteration's search tree
pub type NodeId = usize;

/// A node in one A* search iteration.
///
/// `parent` points into the solver's per-iteration arena of expanded nodes;
/// it is never followed across iterations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchNode {
    pub coord: usize,
    pub g: u32,
    pub h: u32,
    pub parent: Option<NodeId>,
}

impl SearchNode {
    /// Root node of a search
    pub fn root(coord: usize, h: u32) -> Self {
        SearchNode {
            coord,
            g: 0,
            h,
            parent: None,
        }
    }

    pub fn new(coord: usize, g: u32, h: u32, parent: NodeId) -> Self {
        SearchNode {
            coord,
            g,
            h,
            parent: Some(parent),
        }
    }

    /// f = g + h, saturating at the infinite sentinel
    pub fn f(&self) -> u32 {
        self.g.saturating_add(self.h)
    }
}
