use crate::error::Result;
use crate::grid::{Cell, Grid};
use crate::open_list::TieBreak;
use crate::solver::Algorithm;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;

/// Outcome of one solve call, created once at the end of the solve
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveResult {
    pub solved: bool,
    /// Cells expanded over all planning iterations
    pub expanded_cells: usize,
    pub algorithm: Algorithm,
    pub tiebreak: TieBreak,
    pub sight_radius: usize,
    pub maze_size: usize,
    /// Copy of the ground-truth maze
    pub original_maze: Grid,
    /// (row, col)
    pub start_position: (usize, usize),
    /// (row, col)
    pub target_position: (usize, usize),
    /// Belief-grid snapshots, empty unless step capture was requested
    #[serde(default)]
    pub solution_steps: Vec<Grid>,
    pub solution_time_ms: u64,
    /// Expansions per planning iteration; sums to `expanded_cells`
    #[serde(default)]
    pub iteration_expansions: Vec<usize>,
    /// Cells the agent actually stepped
    #[serde(default)]
    pub moves: usize,
}

impl SolveResult {
    /// Number of planning iterations
    pub fn iterations(&self) -> usize {
        self.iteration_expansions.len()
    }

    /// e.g. "Forward A* (t:g, r:1) - Solved"
    pub fn display_name(&self) -> String {
        format!(
            "{} (t:{}, r:{}) - {}",
            self.algorithm,
            self.tiebreak,
            self.sight_radius,
            if self.solved { "Solved" } else { "Unsolved" }
        )
    }

    /// Last captured belief snapshot
    pub fn final_belief(&self) -> Option<&Grid> {
        self.solution_steps.last()
    }

    /// Agent position in each captured snapshot
    pub fn agent_trail(&self) -> Vec<Option<(usize, usize)>> {
        self.solution_steps.iter().map(|step| step.find(Cell::Current)).collect()
    }

    /// Save to file
    pub fn save_json<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let json = serde_json::to_string_pretty(self)?;
        fs::write(path, json)?;
        Ok(())
    }

    /// Load from file
    pub fn load_json<P: AsRef<Path>>(path: P) -> Result<Self> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }
}

impl fmt::Display for SolveResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Maze {} with {} expansions using {}",
            if self.solved { "was solved" } else { "was found to be unsolvable" },
            self.expanded_cells,
            self.algorithm
        )
    }
}

/// Save a batch of results to one JSON file
pub fn save_results<P: AsRef<Path>>(results: &[SolveResult], path: P) -> Result<()> {
    let json = serde_json::to_string_pretty(results)?;
    fs::write(path, json)?;
    Ok(())
}

/// Load a batch of results
pub fn load_results<P: AsRef<Path>>(path: P) -> Result<Vec<SolveResult>> {
    let json = fs::read_to_string(path)?;
    Ok(serde_json::from_str(&json)?)
}
