use crate::types::{BoolGrid, ClassCode, ClassGrid};
use ndarray::{s, Array2};

/// Ice cells touching water in their 3x3 neighbourhood.
///
/// The neighbourhood is clamped at the grid border, so border cells only
/// look at in-bounds neighbours.
pub fn find_edge(grid: &ClassGrid) -> BoolGrid {
    let (rows, cols) = grid.dim();
    let ice = ClassCode::Ice.code();
    let water = ClassCode::Water.code();

    let edges = Array2::from_shape_fn((rows, cols), |(r, c)| {
        if grid[[r, c]] != ice {
            return false;
        }
        let neighbourhood = grid.slice(s![
            r.saturating_sub(1)..(r + 2).min(rows),
            c.saturating_sub(1)..(c + 2).min(cols)
        ]);
        neighbourhood.iter().any(|&v| v == water)
    });

    log::debug!("Found {} edge pixels", edges.iter().filter(|&&e| e).count());
    edges
}
