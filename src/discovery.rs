use crate::grid::{Cell, Grid};

/// Reveal ground truth within Manhattan distance `radius` of (row, col).
///
/// Unknown cells take their true state. Cells marked `OnPathUnknown` are
/// resolved: a blocked one turns `Blocked` and invalidates the planned path,
/// a free one becomes `OnPathUnblocked`. Every other cell is left alone.
///
/// Returns false iff some on-path cell turned out to be blocked.
pub fn discover(belief: &mut Grid, truth: &Grid, row: usize, col: usize, radius: usize) -> bool {
    let size = belief.size();
    let mut path_still_valid = true;

    let row_lo = row.saturating_sub(radius);
    let row_hi = (row + radius).min(size - 1);
    let col_lo = col.saturating_sub(radius);
    let col_hi = (col + radius).min(size - 1);

    for r in row_lo..=row_hi {
        for c in col_lo..=col_hi {
            if r.abs_diff(row) + c.abs_diff(col) > radius {
                continue;
            }
            match belief.get(r, c) {
                Cell::Unknown => belief.set(r, c, truth.get(r, c)),
                Cell::OnPathUnknown => {
                    if truth.get(r, c) == Cell::Blocked {
                        belief.set(r, c, Cell::Blocked);
                        path_still_valid = false;
                    } else {
                        belief.set(r, c, Cell::OnPathUnblocked);
                    }
                }
                _ => {}
            }
        }
    }

    path_still_valid
}

/// Drop the on-path markers left by one planning iteration and restore
/// the start/target markers.
pub fn clear_path_markers(belief: &mut Grid, start: usize, target: usize) {
    for cell in belief.cells_mut() {
        *cell = match *cell {
            Cell::OnPathUnknown => Cell::Unknown,
            Cell::OnPathUnblocked => Cell::Unblocked,
            other => other,
        };
    }
    belief.set_by_id(start, Cell::Start);
    belief.set_by_id(target, Cell::Target);
}
