#![allow(dead_code)]

use maze_astar::coords::{offset, to_index, to_row_col, NEIGHBORS};
use maze_astar::maze::generate_maze;
use maze_astar::{Cell, Grid};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::collections::VecDeque;

/// Build a ground-truth maze from rows of text: '#' is blocked, anything
/// else is open.
///
/// ```text
/// .#.
/// ...
/// ...
/// ```
pub fn maze_from_ascii(rows: &[&str]) -> Grid {
    let size = rows.len();
    let values: Vec<u8> = rows
        .iter()
        .flat_map(|row| row.chars().map(|c| u8::from(c == '#')))
        .collect();
    Grid::from_values(size, &values).expect("rows must form a square")
}

/// Shortest path length on the ground truth, None if unreachable
pub fn bfs_distance(grid: &Grid, source: usize, destination: usize) -> Option<usize> {
    let size = grid.size();
    let mut dist: Vec<Option<usize>> = vec![None; grid.len()];
    let mut queue = VecDeque::from([source]);
    dist[source] = Some(0);

    while let Some(cell) = queue.pop_front() {
        if cell == destination {
            break;
        }
        let (row, col) = to_row_col(cell, size);
        for delta in NEIGHBORS {
            let Some((r, c)) = offset(row, col, delta, size) else {
                continue;
            };
            let next = to_index(r, c, size);
            if grid.get_by_id(next) != Cell::Blocked && dist[next].is_none() {
                dist[next] = dist[cell].map(|d| d + 1);
                queue.push_back(next);
            }
        }
    }
    dist[destination]
}

/// Reproducible generated mazes
pub fn seeded_mazes(count: usize, size: usize, seed: u64) -> Vec<Grid> {
    let mut rng = StdRng::seed_from_u64(seed);
    (0..count).map(|_| generate_maze(size, &mut rng)).collect()
}

/// Corner-to-corner target index
pub fn last_cell(grid: &Grid) -> usize {
    grid.len() - 1
}
