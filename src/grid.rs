use crate::coords::{to_index, to_row_col};
use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// State of a single maze cell.
///
/// Ground-truth grids only ever hold `Unblocked` and `Blocked`. Belief grids
/// start `Unknown` and pick up the solver's transient markers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum Cell {
    Unblocked = 0,
    Blocked = 1,
    Unknown = 2,
    Explored = 3,
    OnPathUnblocked = 4,
    OnPathUnknown = 5,
    Start = 6,
    Target = 7,
    Current = 8,
}

impl Cell {
    /// Character used when printing a grid
    pub fn symbol(&self) -> char {
        match self {
            Cell::Unblocked => '.',
            Cell::Blocked => '#',
            Cell::Unknown => '?',
            Cell::Explored => 'o',
            Cell::OnPathUnblocked | Cell::OnPathUnknown => '*',
            Cell::Start => 'S',
            Cell::Target => 'T',
            Cell::Current => '@',
        }
    }
}

impl From<Cell> for u8 {
    fn from(cell: Cell) -> u8 {
        cell as u8
    }
}

impl TryFrom<u8> for Cell {
    type Error = Error;

    fn try_from(value: u8) -> Result<Self> {
        Ok(match value {
            0 => Cell::Unblocked,
            1 => Cell::Blocked,
            2 => Cell::Unknown,
            3 => Cell::Explored,
            4 => Cell::OnPathUnblocked,
            5 => Cell::OnPathUnknown,
            6 => Cell::Start,
            7 => Cell::Target,
            8 => Cell::Current,
            other => return Err(Error::InvalidMaze(format!("unknown cell value {}", other))),
        })
    }
}

/// Square grid of cell states, stored row-major
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGrid")]
pub struct Grid {
    size: usize,
    cells: Vec<Cell>,
}

/// Grid as read from disk, before the cell count is checked
#[derive(Deserialize)]
struct RawGrid {
    size: usize,
    cells: Vec<Cell>,
}

impl TryFrom<RawGrid> for Grid {
    type Error = Error;

    fn try_from(raw: RawGrid) -> Result<Self> {
        let expected = raw.size.checked_mul(raw.size);
        if expected != Some(raw.cells.len()) {
            return Err(Error::InvalidMaze(format!(
                "{} cells stored for a {}x{} grid",
                raw.cells.len(),
                raw.size,
                raw.size
            )));
        }
        Ok(Grid {
            size: raw.size,
            cells: raw.cells,
        })
    }
}

impl Grid {
    /// Create a new grid with all cells unblocked
    pub fn new(size: usize) -> Self {
        Self::filled(size, Cell::Unblocked)
    }

    /// Create a grid with every cell set to `cell`
    pub fn filled(size: usize, cell: Cell) -> Self {
        Grid {
            size,
            cells: vec![cell; size * size],
        }
    }

    /// Create a grid with specific blocked cells (1-D indices, out of range ignored)
    pub fn with_blocked(size: usize, blocked: &[usize]) -> Self {
        let mut grid = Self::new(size);
        for &id in blocked {
            if id < size * size {
                grid.cells[id] = Cell::Blocked;
            }
        }
        grid
    }

    /// Build a ground-truth grid from row-major 0/1 values
    pub fn from_values(size: usize, values: &[u8]) -> Result<Self> {
        if values.len() != size * size {
            return Err(Error::InvalidMaze(format!(
                "expected {} values for a {}x{} grid, got {}",
                size * size,
                size,
                size,
                values.len()
            )));
        }
        let cells = values
            .iter()
            .map(|&v| match v {
                0 => Ok(Cell::Unblocked),
                1 => Ok(Cell::Blocked),
                other => Err(Error::InvalidMaze(format!("cell value {} is not 0 or 1", other))),
            })
            .collect::<Result<Vec<_>>>()?;
        Ok(Grid { size, cells })
    }

    /// Side length
    pub fn size(&self) -> usize {
        self.size
    }

    /// Total number of cells
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Convert (row, col) coordinates to cell ID
    pub fn get_id(&self, row: usize, col: usize) -> usize {
        to_index(row, col, self.size)
    }

    /// Convert cell ID to (row, col) coordinates
    pub fn get_coords(&self, id: usize) -> (usize, usize) {
        to_row_col(id, self.size)
    }

    /// Get cell at (row, col); caller guarantees bounds
    pub fn get(&self, row: usize, col: usize) -> Cell {
        self.cells[self.get_id(row, col)]
    }

    /// Get cell by 1-D index; caller guarantees bounds
    pub fn get_by_id(&self, id: usize) -> Cell {
        self.cells[id]
    }

    /// Set cell at (row, col)
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let id = self.get_id(row, col);
        self.cells[id] = cell;
    }

    /// Set cell by 1-D index
    pub fn set_by_id(&mut self, id: usize, cell: Cell) {
        self.cells[id] = cell;
    }

    /// Cells in row-major order
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    /// Mutable access for bulk rewrites of marker cells
    pub fn cells_mut(&mut self) -> &mut [Cell] {
        &mut self.cells
    }

    /// Number of cells in the given state
    pub fn count(&self, cell: Cell) -> usize {
        self.cells.iter().filter(|&&c| c == cell).count()
    }

    /// Find the first cell in the given state
    pub fn find(&self, cell: Cell) -> Option<(usize, usize)> {
        self.cells
            .iter()
            .position(|&c| c == cell)
            .map(|id| self.get_coords(id))
    }

    /// One line per row using `Cell::symbol`
    pub fn render(&self) -> String {
        let mut text = String::with_capacity(self.len() + self.size);
        for row in self.cells.chunks(self.size.max(1)) {
            text.extend(row.iter().map(Cell::symbol));
            text.push('\n');
        }
        text
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_blocked() {
        // □□□
        // □■□
        // □□□
        let grid = Grid::with_blocked(3, &[4, 42]);
        assert_eq!(grid.get(1, 1), Cell::Blocked);
        assert_eq!(grid.get(0, 0), Cell::Unblocked);
        assert_eq!(grid.count(Cell::Blocked), 1);
    }

    #[test]
    fn test_json_round_trip() {
        let mut grid = Grid::with_blocked(3, &[2]);
        grid.set(1, 1, Cell::Current);
        let json = serde_json::to_string(&grid).unwrap();
        assert_eq!(json, r#"{"size":3,"cells":[0,0,1,0,8,0,0,0,0]}"#);
        assert_eq!(serde_json::from_str::<Grid>(&json).unwrap(), grid);
        assert_eq!(serde_json::from_str::<Grid>(r#"{"size":0,"cells":[]}"#).unwrap(), Grid::new(0));
    }

    #[test]
    fn test_json_rejects_wrong_cell_count() {
        assert!(serde_json::from_str::<Grid>(r#"{"size":0,"cells":[8]}"#).is_err());
        assert!(serde_json::from_str::<Grid>(r#"{"size":3,"cells":[0,0]}"#).is_err());
        assert!(serde_json::from_str::<Grid>(r#"{"size":2,"cells":[0,0,0,0,0]}"#).is_err());
    }

    #[test]
    fn test_from_values_rejects_bad_input() {
        assert!(Grid::from_values(2, &[0, 1, 0]).is_err());
        assert!(Grid::from_values(2, &[0, 1, 0, 2]).is_err());

        let grid = Grid::from_values(2, &[0, 1, 1, 0]).unwrap();
        assert_eq!(grid.get(0, 1), Cell::Blocked);
        assert_eq!(grid.get(1, 1), Cell::Unblocked);
    }

    #[test]
    fn test_cell_serializes_as_number() {
        let json = serde_json::to_string(&vec![Cell::Unknown, Cell::Current]).unwrap();
        assert_eq!(json, "[2,8]");
        let back: Vec<Cell> = serde_json::from_str(&json).unwrap();
        assert_eq!(back, vec![Cell::Unknown, Cell::Current]);
        assert!(serde_json::from_str::<Cell>("9").is_err());
    }

    #[test]
    fn test_find() {
        let mut grid = Grid::filled(4, Cell::Unknown);
        grid.set(2, 3, Cell::Current);
        assert_eq!(grid.find(Cell::Current), Some((2, 3)));
        assert_eq!(grid.find(Cell::Target), None);
    }

    #[test]
    fn test_render() {
        let mut grid = Grid::with_blocked(3, &[4]);
        grid.set(0, 0, Cell::Start);
        grid.set(2, 2, Cell::Unknown);
        assert_eq!(grid.render(), "S..\n.#.\n..?\n");
        assert_eq!(Grid::new(0).render(), "");
    }
}
