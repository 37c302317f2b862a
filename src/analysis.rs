//! Batch comparison of solver configurations over a set of mazes.

use crate::config::AlgorithmConfig;
use crate::error::{Error, Result};
use crate::grid::{Cell, Grid};
use crate::result::SolveResult;
use crate::solver::Solver;
use log::{debug, info};
use std::fmt;
use std::fmt::Write as _;

/// All runs of one configuration
#[derive(Debug, Clone)]
pub struct ConfigReport {
    pub config: AlgorithmConfig,
    pub results: Vec<SolveResult>,
    pub summary: Summary,
    /// Per cell, number of runs whose final belief left it Explored, Start or Target
    pub exploration: Vec<usize>,
    pub maze_size: usize,
}

/// Aggregate statistics over a set of results
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Summary {
    pub runs: usize,
    pub solved: usize,
    pub total_expanded: usize,
    pub min_expanded: usize,
    pub max_expanded: usize,
    pub avg_expanded: f64,
    /// Population standard deviation of expanded cells
    pub std_dev_expanded: f64,
    pub min_time_ms: u64,
    pub max_time_ms: u64,
    pub avg_time_ms: f64,
}

impl Summary {
    pub fn from_results(results: &[SolveResult]) -> Self {
        if results.is_empty() {
            return Summary::default();
        }
        let runs = results.len();
        let expanded: Vec<usize> = results.iter().map(|r| r.expanded_cells).collect();
        let times: Vec<u64> = results.iter().map(|r| r.solution_time_ms).collect();

        let total_expanded: usize = expanded.iter().sum();
        let avg_expanded = total_expanded as f64 / runs as f64;
        let variance = expanded
            .iter()
            .map(|&e| {
                let d = e as f64 - avg_expanded;
                d * d
            })
            .sum::<f64>()
            / runs as f64;

        Summary {
            runs,
            solved: results.iter().filter(|r| r.solved).count(),
            total_expanded,
            min_expanded: expanded.iter().copied().min().unwrap_or(0),
            max_expanded: expanded.iter().copied().max().unwrap_or(0),
            avg_expanded,
            std_dev_expanded: variance.sqrt(),
            min_time_ms: times.iter().copied().min().unwrap_or(0),
            max_time_ms: times.iter().copied().max().unwrap_or(0),
            avg_time_ms: times.iter().sum::<u64>() as f64 / runs as f64,
        }
    }

    /// Percentage of runs that reached the target
    pub fn success_rate(&self) -> f64 {
        if self.runs == 0 {
            0.0
        } else {
            100.0 * self.solved as f64 / self.runs as f64
        }
    }
}

impl fmt::Display for Summary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Runs: {} ({} solved, {:.1}%)", self.runs, self.solved, self.success_rate())?;
        writeln!(
            f,
            "Expanded: total {}, min {}, max {}, avg {:.2}, std dev {:.2}",
            self.total_expanded, self.min_expanded, self.max_expanded, self.avg_expanded, self.std_dev_expanded
        )?;
        write!(
            f,
            "Time (ms): min {}, max {}, avg {:.2}",
            self.min_time_ms, self.max_time_ms, self.avg_time_ms
        )
    }
}

impl ConfigReport {
    /// Exploration counts laid out as a grid, row-major
    pub fn exploration_rows(&self) -> Vec<&[usize]> {
        if self.maze_size == 0 {
            return Vec::new();
        }
        self.exploration.chunks(self.maze_size).collect()
    }
}

/// Solve every maze with every configuration, corner to corner.
///
/// All mazes must share one size so exploration counts line up. Every maze
/// is checked before the first solve starts.
pub fn run(mazes: &[Grid], configs: &[AlgorithmConfig], capture_steps: bool) -> Result<Vec<ConfigReport>> {
    let maze_size = mazes.first().map(Grid::size).unwrap_or(0);
    for (i, maze) in mazes.iter().enumerate() {
        if maze.size() != maze_size {
            return Err(Error::InvalidParameter(format!(
                "maze sizes differ: {} and {}",
                maze_size,
                maze.size()
            )));
        }
        if maze.size() < 2 {
            return Err(Error::InvalidParameter(format!(
                "maze {} is {}x{}, corner-to-corner runs need at least 2x2",
                i,
                maze.size(),
                maze.size()
            )));
        }
        let last = maze.len() - 1;
        if maze.get_by_id(0) == Cell::Blocked || maze.get_by_id(last) == Cell::Blocked {
            return Err(Error::InvalidParameter(format!("maze {} has a blocked corner", i)));
        }
    }

    let mut reports = Vec::with_capacity(configs.len());
    for config in configs {
        info!("[Analysis] running {} on {} mazes", config.label(), mazes.len());
        let mut results = Vec::with_capacity(mazes.len());
        let mut exploration = vec![0; maze_size * maze_size];

        for (i, maze) in mazes.iter().enumerate() {
            let last = maze_size * maze_size - 1;
            let mut solver = Solver::new(maze, 0, last, config.tiebreak, config.sight_radius, capture_steps)?;
            let result = solver.solve(config.algorithm);
            debug!("[Analysis] maze {}: {}", i, result);

            for (count, cell) in exploration.iter_mut().zip(solver.belief().cells()) {
                if matches!(cell, Cell::Explored | Cell::Start | Cell::Target) {
                    *count += 1;
                }
            }
            results.push(result);
        }

        let summary = Summary::from_results(&results);
        info!(
            "[Analysis] {}: {}/{} solved, avg expanded {:.2}",
            config.label(),
            summary.solved,
            summary.runs,
            summary.avg_expanded
        );
        reports.push(ConfigReport {
            config: config.clone(),
            results,
            summary,
            exploration,
            maze_size,
        });
    }
    Ok(reports)
}

/// Plain-text comparison of reports, one row per configuration
pub fn comparison_table(reports: &[ConfigReport]) -> String {
    let width = reports
        .iter()
        .map(|r| r.config.label().len())
        .max()
        .unwrap_or(0)
        .max("Configuration".len());

    let mut table = String::new();
    let _ = writeln!(
        table,
        "{:<width$}  {:>8}  {:>12}  {:>10}  {:>8}  {:>8}  {:>9}",
        "Configuration", "Solved", "Avg expanded", "Std dev", "Min", "Max", "Avg ms"
    );
    let _ = writeln!(table, "{}", "-".repeat(width + 71));
    for report in reports {
        let s = &report.summary;
        let _ = writeln!(
            table,
            "{:<width$}  {:>8}  {:>12.2}  {:>10.2}  {:>8}  {:>8}  {:>9.2}",
            report.config.label(),
            format!("{}/{}", s.solved, s.runs),
            s.avg_expanded,
            s.std_dev_expanded,
            s.min_expanded,
            s.max_expanded,
            s.avg_time_ms
        );
    }
    table
}
