//! Repeated A* under partial observability.
//!
//! The agent plans on its belief grid (unknown cells assumed free), walks the
//! plan while revealing cells within its sight radius, and replans from the
//! last good cell whenever the plan runs into a newly seen wall.

use crate::coords::{manhattan, offset, to_index, to_row_col, NEIGHBORS};
use crate::discovery::{clear_path_markers, discover};
use crate::error::{Error, Result};
use crate::grid::{Cell, Grid};
use crate::node::{NodeId, SearchNode, INFINITE_COST};
use crate::open_list::{OpenList, TieBreak};
use crate::result::SolveResult;
use log::{debug, info, trace};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use std::fmt;
use std::str::FromStr;
use std::time::Instant;

const MOVEMENT_COST: u32 = 1;

/// Which repeated-search variant to run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Algorithm {
    /// Plan from the agent to the target
    #[serde(alias = "Forward")]
    Forward,
    /// Plan from the target to the agent
    #[serde(alias = "Backward")]
    Backward,
    /// Forward search that learns h from each iteration's closed set
    #[serde(alias = "Adaptive")]
    Adaptive,
}

impl Algorithm {
    pub const ALL: [Algorithm; 3] = [Algorithm::Forward, Algorithm::Backward, Algorithm::Adaptive];

    pub fn name(&self) -> &'static str {
        match self {
            Algorithm::Forward => "Forward A*",
            Algorithm::Backward => "Backward A*",
            Algorithm::Adaptive => "Adaptive A*",
        }
    }

    /// Search runs target -> agent
    pub fn searches_backward(&self) -> bool {
        matches!(self, Algorithm::Backward)
    }

    /// Closed cells feed the learned heuristic table after each iteration
    pub fn learns_heuristic(&self) -> bool {
        matches!(self, Algorithm::Adaptive)
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Algorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "forward" | "f" => Ok(Algorithm::Forward),
            "backward" | "b" => Ok(Algorithm::Backward),
            "adaptive" | "a" => Ok(Algorithm::Adaptive),
            _ => Err(Error::UnknownAlgorithm(s.to_string())),
        }
    }
}

/// Maze solver holding all per-solve search state.
///
/// One instance per concurrent solve; nothing here is shared.
pub struct Solver<'a> {
    truth: &'a Grid,
    belief: Grid,
    size: usize,
    start: usize,
    target: usize,
    tiebreak: TieBreak,
    sight_radius: usize,
    capture_steps: bool,

    expanded_cells: usize,
    /// g-values, valid only where `search_epoch` equals the current iteration
    g: Vec<u32>,
    search_epoch: Vec<u32>,
    /// Learned h-values (Adaptive A* only)
    learned: Option<HashMap<usize, u32>>,
    open: OpenList,
    /// Expanded nodes of the current iteration; `NodeId` indexes this
    closed: Vec<SearchNode>,
    steps: Vec<Grid>,
    #[cfg(test)]
    searches: Vec<SearchRecord>,
}

/// Belief, source and closed nodes of one planning iteration
#[cfg(test)]
struct SearchRecord {
    belief: Grid,
    source: usize,
    destination: usize,
    closed: Vec<SearchNode>,
    terminal: Option<SearchNode>,
}

impl<'a> Solver<'a> {
    /// Create a solver for `truth` with 1-D start and target coordinates.
    ///
    /// The sight radius is clamped to at least 1.
    pub fn new(
        truth: &'a Grid,
        start: usize,
        target: usize,
        tiebreak: TieBreak,
        sight_radius: usize,
        capture_steps: bool,
    ) -> Result<Self> {
        let size = truth.size();
        if size == 0 {
            return Err(Error::InvalidParameter("grid size must be positive".to_string()));
        }
        for coord in [start, target] {
            if coord >= size * size {
                let (row, col) = to_row_col(coord, size);
                return Err(Error::OutOfBounds { row, col, size });
            }
            if truth.get_by_id(coord) == Cell::Blocked {
                let (row, col) = to_row_col(coord, size);
                return Err(Error::InvalidParameter(format!(
                    "cell ({}, {}) must be unblocked",
                    row, col
                )));
            }
        }
        if start == target {
            return Err(Error::InvalidParameter("start and target are the same cell".to_string()));
        }

        Ok(Solver {
            truth,
            belief: Self::fresh_belief(size, start, target),
            size,
            start,
            target,
            tiebreak,
            sight_radius: sight_radius.max(1),
            capture_steps,
            expanded_cells: 0,
            g: vec![INFINITE_COST; size * size],
            search_epoch: vec![0; size * size],
            learned: None,
            open: OpenList::new(size * size, tiebreak),
            closed: Vec::new(),
            steps: Vec::new(),
            #[cfg(test)]
            searches: Vec::new(),
        })
    }

    /// Solver from the top-left to the bottom-right corner, no step capture
    pub fn with_corners(truth: &'a Grid, tiebreak: TieBreak, sight_radius: usize) -> Result<Self> {
        let size = truth.size();
        let target = (size * size).saturating_sub(1);
        Self::new(truth, 0, target, tiebreak, sight_radius, false)
    }

    fn fresh_belief(size: usize, start: usize, target: usize) -> Grid {
        let mut belief = Grid::filled(size, Cell::Unknown);
        belief.set_by_id(start, Cell::Start);
        belief.set_by_id(target, Cell::Target);
        belief
    }

    pub fn solve_forward(&mut self) -> SolveResult {
        self.solve(Algorithm::Forward)
    }

    pub fn solve_backward(&mut self) -> SolveResult {
        self.solve(Algorithm::Backward)
    }

    pub fn solve_adaptive(&mut self) -> SolveResult {
        self.solve(Algorithm::Adaptive)
    }

    /// Run the full replanning loop for `algorithm`.
    ///
    /// Every call starts from a fresh belief grid, so repeated calls on the
    /// same solver give identical results.
    pub fn solve(&mut self, algorithm: Algorithm) -> SolveResult {
        let started = Instant::now();
        self.reset(algorithm);
        self.capture_step();

        let backward = algorithm.searches_backward();
        let mut iteration: u32 = 0;
        let mut iteration_expansions = Vec::new();
        let mut moves = 0;
        let mut current = self.start;

        let solved = loop {
            if current == self.target {
                break true;
            }
            iteration += 1;

            let (source, destination) = if backward {
                (self.target, current)
            } else {
                (current, self.target)
            };

            let before = self.expanded_cells;
            let terminal = self.compute_shortest_path(iteration, source, destination);
            iteration_expansions.push(self.expanded_cells - before);
            #[cfg(test)]
            self.searches.push(SearchRecord {
                belief: self.belief.clone(),
                source,
                destination,
                closed: self.closed.clone(),
                terminal,
            });
            debug!(
                "[Solver] {} iteration {}: {} -> {}, expanded {}",
                algorithm,
                iteration,
                source,
                destination,
                self.expanded_cells - before
            );

            let Some(terminal) = terminal else {
                debug!("[Solver] no path under current knowledge from {}", current);
                break false;
            };

            let path = self.extract_path(terminal, backward);
            self.belief.set_by_id(self.target, Cell::Target);
            let (reached, stepped) = self.follow_path(path, current);
            moves += stepped;

            if algorithm.learns_heuristic() {
                self.update_learned_heuristics();
            }

            clear_path_markers(&mut self.belief, self.start, self.target);
            current = reached;
        };

        let elapsed_ms = started.elapsed().as_millis() as u64;
        info!(
            "[Solver] {} (t:{}, r:{}) solved={} expanded={} iterations={} in {}ms",
            algorithm,
            self.tiebreak,
            self.sight_radius,
            solved,
            self.expanded_cells,
            iteration,
            elapsed_ms
        );

        SolveResult {
            solved,
            expanded_cells: self.expanded_cells,
            algorithm,
            tiebreak: self.tiebreak,
            sight_radius: self.sight_radius,
            maze_size: self.size,
            original_maze: self.truth.clone(),
            start_position: to_row_col(self.start, self.size),
            target_position: to_row_col(self.target, self.size),
            solution_steps: if self.capture_steps {
                std::mem::take(&mut self.steps)
            } else {
                Vec::new()
            },
            solution_time_ms: elapsed_ms,
            iteration_expansions,
            moves,
        }
    }

    fn reset(&mut self, algorithm: Algorithm) {
        self.belief = Self::fresh_belief(self.size, self.start, self.target);
        self.expanded_cells = 0;
        self.g.fill(INFINITE_COST);
        self.search_epoch.fill(0);
        self.learned = algorithm.learns_heuristic().then(HashMap::new);
        self.open.clear();
        self.closed.clear();
        self.steps.clear();
        #[cfg(test)]
        self.searches.clear();
    }

    /// One A* search on the belief grid.
    ///
    /// Returns the open-list node for `destination` carrying the parent chain,
    /// or `None` when the open list empties before the destination is bounded.
    fn compute_shortest_path(&mut self, iteration: u32, source: usize, destination: usize) -> Option<SearchNode> {
        self.g[source] = 0;
        self.search_epoch[source] = iteration;
        self.g[destination] = INFINITE_COST;
        self.search_epoch[destination] = iteration;

        self.open.clear();
        self.closed.clear();
        let root = SearchNode::root(source, self.heuristic(source, destination));
        self.open.insert(root);

        let mut terminal = None;

        loop {
            let Some(best_f) = self.open.peek_min().map(SearchNode::f) else {
                break;
            };
            if self.g[destination] <= best_f {
                break;
            }
            let Some(node) = self.open.pop_min() else {
                break;
            };

            let id: NodeId = self.closed.len();
            self.closed.push(node);
            self.expanded_cells += 1;

            let (row, col) = to_row_col(node.coord, self.size);
            let cost = self.g[node.coord] + MOVEMENT_COST;

            for delta in NEIGHBORS {
                let Some((r, c)) = offset(row, col, delta, self.size) else {
                    continue;
                };
                // Unknown counts as free
                if self.belief.get(r, c) == Cell::Blocked {
                    continue;
                }
                let next = to_index(r, c, self.size);

                if self.search_epoch[next] != iteration {
                    self.g[next] = INFINITE_COST;
                    self.search_epoch[next] = iteration;
                }

                if cost < self.g[next] {
                    self.g[next] = cost;
                    self.open.remove(next);
                    let child = SearchNode::new(next, cost, self.heuristic(next, destination), id);
                    if next == destination {
                        terminal = Some(child);
                    }
                    self.open.insert(child);
                }
            }
        }

        terminal
    }

    fn heuristic(&self, coord: usize, destination: usize) -> u32 {
        if let Some(&h) = self.learned.as_ref().and_then(|table| table.get(&coord)) {
            return h;
        }
        manhattan(coord, destination, self.size)
    }

    /// Walk parent pointers from `terminal`, returning cells in walking
    /// order (agent first) and marking them on the belief grid.
    fn extract_path(&mut self, terminal: SearchNode, backward: bool) -> VecDeque<usize> {
        let mut path = VecDeque::new();
        let mut cursor = Some(terminal);

        while let Some(node) = cursor {
            if backward {
                path.push_back(node.coord);
            } else {
                path.push_front(node.coord);
            }
            let marker = if self.belief.get_by_id(node.coord) == Cell::Unknown {
                Cell::OnPathUnknown
            } else {
                Cell::OnPathUnblocked
            };
            self.belief.set_by_id(node.coord, marker);
            cursor = node.parent.map(|id| self.closed[id]);
        }

        path
    }

    /// Step along `path` until the target is reached or the plan is shown
    /// to be blocked. Returns the cell the agent stopped on and the number
    /// of moves made.
    fn follow_path(&mut self, mut path: VecDeque<usize>, from: usize) -> (usize, usize) {
        let Some(mut current) = path.pop_front() else {
            return (from, 0);
        };
        let mut moves = 0;

        while current != self.target && !path.is_empty() {
            let (row, col) = to_row_col(current, self.size);
            self.belief.set(row, col, Cell::Current);

            if !discover(&mut self.belief, self.truth, row, col, self.sight_radius) {
                trace!("[Solver] plan invalidated at ({}, {})", row, col);
                self.capture_step();
                return (current, moves);
            }
            self.capture_step();
            self.belief.set(row, col, Cell::Explored);

            if let Some(&next) = path.front() {
                if self.belief.get_by_id(next) == Cell::Blocked {
                    trace!("[Solver] next cell {} blocked, stopping at ({}, {})", next, row, col);
                    self.belief.set(row, col, Cell::Current);
                    self.capture_step();
                    self.belief.set(row, col, Cell::Explored);
                    return (current, moves);
                }
                path.pop_front();
                current = next;
                moves += 1;
            }
        }

        if current == self.target {
            self.belief.set_by_id(self.target, Cell::Current);
            self.capture_step();
        }

        (current, moves)
    }

    /// h(s) = g(target) - g(s) for every cell expanded this iteration
    fn update_learned_heuristics(&mut self) {
        let Some(learned) = self.learned.as_mut() else {
            return;
        };
        let goal_cost = self.g[self.target];
        for node in &self.closed {
            learned.insert(node.coord, goal_cost.saturating_sub(self.g[node.coord]));
        }
        trace!("[Solver] learned table holds {} cells", learned.len());
    }

    fn capture_step(&mut self) {
        if self.capture_steps {
            self.steps.push(self.belief.clone());
        }
    }

    /// Agent's knowledge after the last solve
    pub fn belief(&self) -> &Grid {
        &self.belief
    }

    pub fn sight_radius(&self) -> usize {
        self.sight_radius
    }

    /// Learned heuristic for `coord`, if Adaptive A* has recorded one
    pub fn learned_heuristic(&self, coord: usize) -> Option<u32> {
        self.learned.as_ref().and_then(|table| table.get(&coord).copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rejects_same_start_and_target() {
        let grid = Grid::new(3);
        assert!(matches!(
            Solver::new(&grid, 4, 4, TieBreak::LargerG, 1, false),
            Err(Error::InvalidParameter(_))
        ));
    }

    #[test]
    fn test_rejects_out_of_range() {
        let grid = Grid::new(3);
        assert!(matches!(
            Solver::new(&grid, 0, 9, TieBreak::LargerG, 1, false),
            Err(Error::OutOfBounds { row: 3, col: 0, size: 3 })
        ));
    }

    #[test]
    fn test_rejects_empty_grid() {
        let grid = Grid::new(0);
        assert!(Solver::with_corners(&grid, TieBreak::LargerG, 1).is_err());
    }

    #[test]
    fn test_rejects_blocked_start() {
        let grid = Grid::with_blocked(3, &[0]);
        assert!(Solver::with_corners(&grid, TieBreak::LargerG, 1).is_err());
    }

    #[test]
    fn test_radius_clamped() {
        let grid = Grid::new(3);
        let solver = Solver::with_corners(&grid, TieBreak::LargerG, 0).unwrap();
        assert_eq!(solver.sight_radius(), 1);
    }

    #[test]
    fn test_initial_belief_marks_endpoints() {
        let grid = Grid::new(4);
        let solver = Solver::with_corners(&grid, TieBreak::SmallerH, 1).unwrap();
        assert_eq!(solver.belief().get(0, 0), Cell::Start);
        assert_eq!(solver.belief().get(3, 3), Cell::Target);
        assert_eq!(solver.belief().count(Cell::Unknown), 14);
    }

    #[test]
    fn test_epoch_tags_written_with_g() {
        let grid = Grid::new(4);
        let mut solver = Solver::with_corners(&grid, TieBreak::LargerG, 1).unwrap();
        solver.reset(Algorithm::Forward);
        let terminal = solver.compute_shortest_path(1, 0, 15);

        assert_eq!(terminal.map(|n| n.g), Some(6));
        for node in &solver.closed {
            assert_eq!(solver.search_epoch[node.coord], 1);
            assert_eq!(solver.g[node.coord], node.g);
        }
        // Second iteration ignores stale g from the first
        let terminal = solver.compute_shortest_path(2, 5, 15);
        assert_eq!(terminal.map(|n| n.g), Some(4));
        assert_eq!(solver.g[5], 0);
    }

    #[test]
    fn test_adaptive_learns_goal_distance() {
        let grid = Grid::new(3);
        let mut solver = Solver::with_corners(&grid, TieBreak::LargerG, 1).unwrap();
        let result = solver.solve_adaptive();

        assert!(result.solved);
        // Open grid: learned values equal the Manhattan distance
        assert_eq!(solver.learned_heuristic(0), Some(4));
        assert_eq!(solver.learned_heuristic(1), Some(3));
        assert_eq!(solver.learned_heuristic(5), Some(1));
        assert_eq!(solver.learned_heuristic(8), None);
    }

    /// Breadth-first distances from `source`, treating everything but Blocked as free
    fn bfs_distances(grid: &Grid, source: usize) -> Vec<Option<u32>> {
        let size = grid.size();
        let mut dist = vec![None; grid.len()];
        let mut queue = VecDeque::from([source]);
        dist[source] = Some(0);
        while let Some(cell) = queue.pop_front() {
            let (row, col) = to_row_col(cell, size);
            for delta in NEIGHBORS {
                let Some((r, c)) = offset(row, col, delta, size) else {
                    continue;
                };
                let next = to_index(r, c, size);
                if grid.get_by_id(next) != Cell::Blocked && dist[next].is_none() {
                    dist[next] = dist[cell].map(|d: u32| d + 1);
                    queue.push_back(next);
                }
            }
        }
        dist
    }

    #[test]
    fn test_every_iteration_closes_at_shortest_distance() {
        use crate::maze::generate_maze;
        use rand::rngs::StdRng;
        use rand::SeedableRng;

        let mut rng = StdRng::seed_from_u64(5);
        let mut replans = 0;
        for _ in 0..8 {
            let maze = generate_maze(15, &mut rng);
            for algorithm in Algorithm::ALL {
                for tiebreak in [TieBreak::LargerG, TieBreak::SmallerH] {
                    let mut solver = Solver::with_corners(&maze, tiebreak, 1).unwrap();
                    let result = solver.solve(algorithm);
                    assert_eq!(solver.searches.len(), result.iterations());
                    replans += result.iterations() - 1;

                    for (i, search) in solver.searches.iter().enumerate() {
                        let dist = bfs_distances(&search.belief, search.source);
                        for node in &search.closed {
                            assert_eq!(
                                dist[node.coord],
                                Some(node.g),
                                "{} iteration {} cell {}",
                                algorithm,
                                i + 1,
                                node.coord
                            );
                        }
                        assert_eq!(
                            search.terminal.map(|n| n.g),
                            dist[search.destination]
                        );
                    }
                }
            }
        }
        assert!(replans > 0);
    }

    #[test]
    fn test_parse_algorithm() {
        assert_eq!("Forward".parse::<Algorithm>().unwrap(), Algorithm::Forward);
        assert_eq!("b".parse::<Algorithm>().unwrap(), Algorithm::Backward);
        assert!("sideways".parse::<Algorithm>().is_err());
    }
}
