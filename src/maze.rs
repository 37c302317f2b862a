//! Ground-truth maze sources: random generation and the plain text format
//! (one 0/1 value per line, row-major, N² lines).

use crate::coords::{offset, to_index, to_row_col, NEIGHBORS};
use crate::error::{Error, Result};
use crate::grid::{Cell, Grid};
use log::debug;
use rand::seq::SliceRandom;
use rand::Rng;
use std::fs;
use std::path::Path;

/// Probability that a visited cell stays open
const OPEN_PROBABILITY: f64 = 0.7;

/// Generate a maze with start (0,0) and target (N-1,N-1)
pub fn generate_maze<R: Rng + ?Sized>(size: usize, rng: &mut R) -> Grid {
    let last = size.saturating_sub(1);
    generate_maze_between(size, (0, 0), (last, last), rng)
}

/// Generate a maze by randomized depth-first filling.
///
/// Cells are taken in shuffled order; each unvisited one seeds a fill that
/// keeps the seed open and then opens each further cell with
/// `OPEN_PROBABILITY`, descending into its unvisited neighbours, or blocks
/// it. `start` and `target` are always open.
pub fn generate_maze_between<R: Rng + ?Sized>(
    size: usize,
    start: (usize, usize),
    target: (usize, usize),
    rng: &mut R,
) -> Grid {
    let mut maze = Grid::new(size);
    if size == 0 {
        return maze;
    }

    let start_id = to_index(start.0, start.1, size);
    let target_id = to_index(target.0, target.1, size);

    let mut visited = vec![false; size * size];
    visited[start_id] = true;
    visited[target_id] = true;

    let mut order: Vec<usize> = (0..size * size).collect();
    order.shuffle(rng);

    for &seed in &order {
        if visited[seed] {
            continue;
        }
        fill_from(&mut maze, &mut visited, seed, rng);
    }

    maze.set_by_id(start_id, Cell::Unblocked);
    maze.set_by_id(target_id, Cell::Unblocked);
    maze
}

/// One fill. Each frame holds a cell and the neighbours that were unvisited
/// when it was opened; they are re-checked when their turn comes.
fn fill_from<R: Rng + ?Sized>(maze: &mut Grid, visited: &mut [bool], seed: usize, rng: &mut R) {
    let size = maze.size();
    let mut stack: Vec<(Vec<usize>, usize)> = Vec::new();

    visited[seed] = true;
    stack.push((unvisited_neighbors(seed, size, visited), 0));

    while let Some((pending, next)) = stack.last_mut() {
        let Some(&cell) = pending.get(*next) else {
            stack.pop();
            continue;
        };
        *next += 1;
        if visited[cell] {
            continue;
        }

        visited[cell] = true;
        if rng.random::<f64>() < OPEN_PROBABILITY {
            let neighbors = unvisited_neighbors(cell, size, visited);
            stack.push((neighbors, 0));
        } else {
            maze.set_by_id(cell, Cell::Blocked);
        }
    }
}

fn unvisited_neighbors(id: usize, size: usize, visited: &[bool]) -> Vec<usize> {
    let (row, col) = to_row_col(id, size);
    NEIGHBORS
        .iter()
        .filter_map(|&delta| offset(row, col, delta, size))
        .map(|(r, c)| to_index(r, c, size))
        .filter(|&n| !visited[n])
        .collect()
}

/// Parse the text maze format. The side length is the square root of the
/// number of values.
pub fn parse_maze(text: &str) -> Result<Grid> {
    let values = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .enumerate()
        .map(|(i, line)| {
            line.parse::<u8>()
                .map_err(|_| Error::InvalidMaze(format!("line {}: '{}' is not a cell value", i + 1, line)))
        })
        .collect::<Result<Vec<u8>>>()?;

    let size = (values.len() as f64).sqrt().round() as usize;
    if size == 0 || size * size != values.len() {
        return Err(Error::InvalidMaze(format!(
            "{} values do not form a square grid",
            values.len()
        )));
    }
    Grid::from_values(size, &values)
}

/// Load a maze from a text file
pub fn load_maze<P: AsRef<Path>>(path: P) -> Result<Grid> {
    let text = fs::read_to_string(path.as_ref())?;
    let maze = parse_maze(&text)?;
    debug!("[Maze] loaded {}x{} maze from {}", maze.size(), maze.size(), path.as_ref().display());
    Ok(maze)
}

/// Render a ground-truth maze in the text format
pub fn format_maze(maze: &Grid) -> String {
    let mut text = String::with_capacity(maze.len() * 2);
    for &cell in maze.cells() {
        text.push(if cell == Cell::Blocked { '1' } else { '0' });
        text.push('\n');
    }
    text
}

/// Save a maze to a text file
pub fn save_maze<P: AsRef<Path>>(maze: &Grid, path: P) -> Result<()> {
    fs::write(path, format_maze(maze))?;
    Ok(())
}

/// File name of the `index`-th maze in a numbered folder ("00.txt", "01.txt", ...)
pub fn numbered_file_name(index: usize) -> String {
    format!("{:02}.txt", index)
}

/// Load `count` numbered mazes from `folder`
pub fn load_numbered_mazes<P: AsRef<Path>>(folder: P, count: usize) -> Result<Vec<Grid>> {
    (0..count)
        .map(|i| load_maze(folder.as_ref().join(numbered_file_name(i))))
        .collect()
}

/// Write mazes as numbered files into `folder`, creating it if needed
pub fn save_numbered_mazes<P: AsRef<Path>>(mazes: &[Grid], folder: P) -> Result<()> {
    fs::create_dir_all(folder.as_ref())?;
    for (i, maze) in mazes.iter().enumerate() {
        save_maze(maze, folder.as_ref().join(numbered_file_name(i)))?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn test_generated_endpoints_open() {
        for seed in 0..20 {
            let mut rng = StdRng::seed_from_u64(seed);
            let maze = generate_maze(15, &mut rng);
            assert_eq!(maze.size(), 15);
            assert_eq!(maze.get(0, 0), Cell::Unblocked);
            assert_eq!(maze.get(14, 14), Cell::Unblocked);
            assert!(maze.cells().iter().all(|&c| c == Cell::Unblocked || c == Cell::Blocked));
        }
    }

    #[test]
    fn test_generation_is_seeded() {
        let a = generate_maze(20, &mut StdRng::seed_from_u64(7));
        let b = generate_maze(20, &mut StdRng::seed_from_u64(7));
        assert_eq!(a, b);
    }

    #[test]
    fn test_generated_density() {
        let maze = generate_maze(60, &mut StdRng::seed_from_u64(3));
        let blocked = maze.count(Cell::Blocked) as f64 / maze.len() as f64;
        assert!(blocked > 0.2 && blocked < 0.4, "blocked fraction {}", blocked);
    }

    #[test]
    fn test_custom_endpoints() {
        let maze = generate_maze_between(10, (3, 4), (9, 0), &mut StdRng::seed_from_u64(11));
        assert_eq!(maze.get(3, 4), Cell::Unblocked);
        assert_eq!(maze.get(9, 0), Cell::Unblocked);
    }

    #[test]
    fn test_parse_maze() {
        let maze = parse_maze("0\n1\n\n0\n0\n").unwrap();
        assert_eq!(maze.size(), 2);
        assert_eq!(maze.get(0, 1), Cell::Blocked);
        assert_eq!(maze.count(Cell::Unblocked), 3);
    }

    #[test]
    fn test_parse_maze_errors() {
        assert!(matches!(parse_maze(""), Err(Error::InvalidMaze(_))));
        assert!(matches!(parse_maze("0\n1\n0\n"), Err(Error::InvalidMaze(_))));
        assert!(matches!(parse_maze("0\nx\n0\n0\n"), Err(Error::InvalidMaze(_))));
        assert!(matches!(parse_maze("0\n3\n0\n0\n"), Err(Error::InvalidMaze(_))));
    }

    #[test]
    fn test_numbered_folder_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let mut rng = StdRng::seed_from_u64(42);
        let mazes: Vec<Grid> = (0..3).map(|_| generate_maze(12, &mut rng)).collect();

        save_numbered_mazes(&mazes, dir.path()).unwrap();
        assert!(dir.path().join("02.txt").exists());
        assert_eq!(load_numbered_mazes(dir.path(), 3).unwrap(), mazes);
        assert!(load_numbered_mazes(dir.path(), 4).is_err());
    }
}
