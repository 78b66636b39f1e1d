//! Pure calculation functions for grid geometry.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::{Rect, SplitMode};

/// Calculate the working canvas: the region of the source that gets sliced.
///
/// # Arguments
/// * `mode` - Crop takes the centered `min(W, H)` square, Stretch takes everything
/// * `source` - Source image dimensions (width, height)
///
/// # Examples
/// ```
/// # use grid_splitter::imaging::{Rect, SplitMode, calculate_working_canvas};
/// // 100x50 landscape → centered 50x50 square
/// assert_eq!(calculate_working_canvas(SplitMode::Crop, (100, 50)), Rect::new(25, 0, 50, 50));
///
/// // Stretch keeps the full bounding box
/// assert_eq!(calculate_working_canvas(SplitMode::Stretch, (100, 50)), Rect::new(0, 0, 100, 50));
/// ```
pub fn calculate_working_canvas(mode: SplitMode, source: (u32, u32)) -> Rect {
    let (width, height) = source;

    match mode {
        SplitMode::Crop => {
            let size = width.min(height);
            // Odd leftovers put the extra pixel on the right/bottom
            Rect::new((width - size) / 2, (height - size) / 2, size, size)
        }
        SplitMode::Stretch => Rect::sized(width, height),
    }
}

/// Calculate cell dimensions by floor division of the canvas.
///
/// Remainder pixels are dropped from the last column and row. A zero count
/// yields a zero-sized cell rather than a division panic.
pub fn calculate_cell_size(canvas: (u32, u32), cols: u32, rows: u32) -> (u32, u32) {
    let (width, height) = canvas;
    (
        width.checked_div(cols).unwrap_or(0),
        height.checked_div(rows).unwrap_or(0),
    )
}

/// One cell of the grid, positioned on the working canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: u32,
    pub col: u32,
    /// Source rectangle relative to the working canvas.
    pub rect: Rect,
}

/// Complete geometry for one split: where the canvas lies on the source and
/// where every cell lies on the canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPlan {
    /// Working canvas, relative to the source image.
    pub canvas: Rect,
    pub cell_width: u32,
    pub cell_height: u32,
    /// Cells in row-major order.
    pub cells: Vec<Cell>,
}

impl GridPlan {
    /// True when the grid is finer than the canvas and cells have no pixels.
    pub fn has_empty_cells(&self) -> bool {
        !self.cells.is_empty() && (self.cell_width == 0 || self.cell_height == 0)
    }
}

/// Plan the full grid for a source of the given dimensions.
///
/// Cells are emitted row by row, left to right, so index `k` sits at
/// `(k / cols, k % cols)`.
pub fn plan_grid(mode: SplitMode, source: (u32, u32), cols: u32, rows: u32) -> GridPlan {
    let canvas = calculate_working_canvas(mode, source);
    let (cell_width, cell_height) = calculate_cell_size((canvas.width, canvas.height), cols, rows);

    let cells = (0..rows)
        .flat_map(|row| {
            (0..cols).map(move |col| Cell {
                row,
                col,
                rect: Rect::new(col * cell_width, row * cell_height, cell_width, cell_height),
            })
        })
        .collect();

    GridPlan {
        canvas,
        cell_width,
        cell_height,
        cells,
    }
}

/// Percentage offsets of the internal divider lines along one axis.
///
/// `divisions - 1` values at `i * (100 / divisions)` for `i` in `1..divisions`.
/// One division (or none) has no internal lines.
pub fn calculate_grid_line_offsets(divisions: u32) -> Vec<f64> {
    let step = 100.0 / f64::from(divisions.max(1));
    (1..divisions).map(|i| f64::from(i) * step).collect()
}
