//! Conversion between 1-D cell indices and (row, col) pairs.
//!
//! Callers guarantee bounds; nothing here validates its input.

/// 4-connected neighbour offsets as (d_row, d_col): down, up, right, left
pub const NEIGHBORS: [(isize, isize); 4] = [(1, 0), (-1, 0), (0, 1), (0, -1)];

/// Convert (row, col) to a 1-D index for a `size`-wide grid
#[inline]
pub fn to_index(row: usize, col: usize, size: usize) -> usize {
    size * row + col
}

/// Convert a 1-D index back to (row, col)
#[inline]
pub fn to_row_col(index: usize, size: usize) -> (usize, usize) {
    (index / size, index % size)
}

/// Manhattan distance between two 1-D indices
pub fn manhattan(a: usize, b: usize, size: usize) -> u32 {
    let (ar, ac) = to_row_col(a, size);
    let (br, bc) = to_row_col(b, size);
    (ar.abs_diff(br) + ac.abs_diff(bc)) as u32
}

/// Offset (row, col) by `delta`, returning `None` when it leaves the grid
#[inline]
pub fn offset(row: usize, col: usize, delta: (isize, isize), size: usize) -> Option<(usize, usize)> {
    let r = row.checked_add_signed(delta.0)?;
    let c = col.checked_add_signed(delta.1)?;
    (r < size && c < size).then_some((r, c))
}
