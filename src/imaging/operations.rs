//! High-level grid operations.
//!
//! These functions combine calculations with backend execution.
//! They take the resolved configuration, plan the grid, and drive the
//! [`PixelSource`] and [`PieceEncoder`] for every cell.

use super::backend::{PieceEncoder, PixelSource};
use super::calculations::{Cell, GridPlan, calculate_grid_line_offsets, plan_grid};
use super::rust_backend::extension_for_format;
use crate::config::SplitConfig;
use crate::error::SplitError;
use base64::Engine as _;
use base64::engine::general_purpose::STANDARD;
use image::RgbaImage;
use rayon::prelude::*;
use serde::Serialize;
use tracing::{debug, warn};

/// Result type for grid operations.
pub type Result<T> = std::result::Result<T, SplitError>;

/// One encoded cell of the grid.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GridPiece {
    /// Encoded image bytes. Empty for zero-area cells.
    pub encoded_data: Vec<u8>,
    /// Format id the bytes were encoded as, e.g. `image/png`.
    pub format: String,
    pub row: u32,
    pub col: u32,
    pub width: u32,
    pub height: u32,
}

impl GridPiece {
    /// True for zero-area cells, which carry no encoded data.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// File extension for the piece's format, if it is a known output format.
    pub fn file_extension(&self) -> Option<&'static str> {
        extension_for_format(&self.format)
    }

    /// Render the piece as a `data:` URL, e.g. for an `<img src>`.
    pub fn to_data_url(&self) -> String {
        format!("data:{};base64,{}", self.format, STANDARD.encode(&self.encoded_data))
    }
}

/// Percentage offsets of the internal divider lines of a grid.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GridLines {
    pub horizontal: Vec<f64>,
    pub vertical: Vec<f64>,
}

/// Grid-line preview for `cols × rows`. Needs no image.
pub fn preview_grid_lines(cols: u32, rows: u32) -> GridLines {
    GridLines {
        horizontal: calculate_grid_line_offsets(rows),
        vertical: calculate_grid_line_offsets(cols),
    }
}

/// Plan the grid for a source without touching any pixels.
///
/// Useful for testing geometry and for callers that only need piece sizes.
pub fn plan_split(source: &impl PixelSource, config: &SplitConfig) -> GridPlan {
    plan_grid(
        config.mode,
        source.dimensions().into(),
        config.cols,
        config.rows,
    )
}

/// Split a decoded image into encoded grid pieces.
///
/// Copies the working canvas once, then samples and encodes every cell in
/// parallel. Pieces come back in row-major order regardless of which worker
/// finishes first; the first failing cell aborts the whole split.
pub fn split_into_pieces(
    source: &impl PixelSource,
    encoder: &impl PieceEncoder,
    config: &SplitConfig,
) -> Result<Vec<GridPiece>> {
    let plan = plan_split(source, config);
    debug!(
        mode = %config.mode,
        canvas = %plan.canvas,
        cell_width = plan.cell_width,
        cell_height = plan.cell_height,
        cells = plan.cells.len(),
        "planned grid"
    );

    if plan.has_empty_cells() {
        warn!(
            cols = config.cols,
            rows = config.rows,
            canvas = %plan.canvas,
            "grid is finer than the image, pieces will be empty"
        );
    }

    let canvas = source.copy_region(plan.canvas)?;

    plan.cells
        .par_iter()
        .map(|cell| render_cell(&canvas, encoder, cell, config))
        .collect()
}

fn render_cell(
    canvas: &RgbaImage,
    encoder: &impl PieceEncoder,
    cell: &Cell,
    config: &SplitConfig,
) -> Result<GridPiece> {
    let Cell { row, col, rect } = *cell;

    let encoded_data = if rect.is_empty() {
        Vec::new()
    } else {
        let buffer = canvas.copy_region(rect)?;
        encoder
            .encode(&buffer, &config.output_format, config.quality)
            .map_err(|source| SplitError::Encoding { row, col, source })?
    };

    Ok(GridPiece {
        encoded_data,
        format: config.output_format.clone(),
        row,
        col,
        width: rect.width,
        height: rect.height,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitOptions;
    use crate::imaging::backend::tests::{MockEncoder, MockSource, RecordedOp};
    use crate::imaging::{Rect, SplitMode};

    fn config(mode: SplitMode, cols: u32, rows: u32) -> SplitConfig {
        SplitOptions {
            mode: Some(mode),
            cols: Some(cols),
            rows: Some(rows),
            ..SplitOptions::default()
        }
        .resolve()
    }

    fn coords(pieces: &[GridPiece]) -> Vec<(u32, u32)> {
        pieces.iter().map(|p| (p.row, p.col)).collect()
    }

    #[test]
    fn crop_two_by_two_on_landscape() {
        let source = MockSource::gradient(100, 50);
        let encoder = MockEncoder::new();

        let pieces =
            split_into_pieces(&source, &encoder, &config(SplitMode::Crop, 2, 2)).unwrap();

        assert_eq!(coords(&pieces), vec![(0, 0), (0, 1), (1, 0), (1, 1)]);
        for piece in &pieces {
            assert_eq!((piece.width, piece.height), (25, 25));
        }
        // Canvas copy comes from the centered square
        assert_eq!(source.get_copies(), vec![Rect::new(25, 0, 50, 50)]);
    }

    #[test]
    fn stretch_four_columns_one_row() {
        let source = MockSource::gradient(100, 50);
        let encoder = MockEncoder::new();

        let pieces =
            split_into_pieces(&source, &encoder, &config(SplitMode::Stretch, 4, 1)).unwrap();

        assert_eq!(pieces.len(), 4);
        for piece in &pieces {
            assert_eq!((piece.width, piece.height), (25, 50));
        }
        assert_eq!(source.get_copies(), vec![Rect::new(0, 0, 100, 50)]);
    }

    #[test]
    fn crop_with_more_cols_than_rows() {
        let source = MockSource::gradient(90, 60);
        let encoder = MockEncoder::new();

        let pieces =
            split_into_pieces(&source, &encoder, &config(SplitMode::Crop, 3, 2)).unwrap();

        // 60x60 canvas at x = 15, cells floor(60 / 3) x floor(60 / 2)
        assert_eq!(source.get_copies(), vec![Rect::new(15, 0, 60, 60)]);
        assert_eq!(
            coords(&pieces),
            vec![(0, 0), (0, 1), (0, 2), (1, 0), (1, 1), (1, 2)]
        );
        assert!(pieces.iter().all(|p| (p.width, p.height) == (20, 30)));
        let last = &pieces[5];
        assert_eq!((last.encoded_data[0], last.encoded_data[1]), (15 + 40, 30));
    }

    #[test]
    fn pieces_hold_the_right_pixels() {
        let source = MockSource::gradient(100, 50);
        let encoder = MockEncoder::new();

        let pieces =
            split_into_pieces(&source, &encoder, &config(SplitMode::Crop, 2, 2)).unwrap();

        // Mock encoder returns raw RGBA: first pixel of each piece is its
        // top-left corner on the source (canvas starts at x = 25)
        let top_left = |p: &GridPiece| (p.encoded_data[0], p.encoded_data[1]);
        assert_eq!(top_left(&pieces[0]), (25, 0));
        assert_eq!(top_left(&pieces[1]), (50, 0));
        assert_eq!(top_left(&pieces[2]), (25, 25));
        assert_eq!(top_left(&pieces[3]), (50, 25));
    }

    #[test]
    fn order_is_row_major_for_large_grids() {
        let source = MockSource::gradient(120, 90);
        let encoder = MockEncoder::new();

        let pieces =
            split_into_pieces(&source, &encoder, &config(SplitMode::Stretch, 6, 5)).unwrap();

        assert_eq!(pieces.len(), 30);
        for (k, piece) in pieces.iter().enumerate() {
            assert_eq!(piece.row, k as u32 / 6);
            assert_eq!(piece.col, k as u32 % 6);
        }
    }

    #[test]
    fn encoder_receives_format_and_quality() {
        let source = MockSource::gradient(30, 30);
        let encoder = MockEncoder::new();
        let config = SplitOptions {
            output_format: Some("image/jpeg".into()),
            quality: Some(0.5),
            ..SplitOptions::default()
        }
        .resolve();

        let pieces = split_into_pieces(&source, &encoder, &config).unwrap();

        assert_eq!(pieces.len(), 9);
        assert!(pieces.iter().all(|p| p.format == "image/jpeg"));
        let ops = encoder.get_operations();
        assert_eq!(ops.len(), 9);
        assert!(ops.iter().all(|op| matches!(
            op,
            RecordedOp::Encode { format, quality, width: 10, height: 10 }
                if format == "image/jpeg" && *quality == 0.5
        )));
    }

    #[test]
    fn remainder_pixels_are_dropped() {
        let source = MockSource::gradient(101, 47);
        let encoder = MockEncoder::new();

        let pieces =
            split_into_pieces(&source, &encoder, &config(SplitMode::Stretch, 3, 4)).unwrap();

        assert_eq!(pieces.len(), 12);
        assert!(pieces.iter().all(|p| p.width == 33 && p.height == 11));
    }

    #[test]
    fn zero_area_cells_skip_encoder() {
        let source = MockSource::gradient(3, 3);
        let encoder = MockEncoder::new();

        let pieces =
            split_into_pieces(&source, &encoder, &config(SplitMode::Crop, 4, 2)).unwrap();

        assert_eq!(pieces.len(), 8);
        assert!(pieces.iter().all(|p| p.is_empty() && p.encoded_data.is_empty()));
        assert_eq!(pieces[0].width, 0);
        assert_eq!(pieces[0].height, 1);
        assert!(encoder.get_operations().is_empty());
    }

    #[test]
    fn encoding_failure_aborts_split() {
        let source = MockSource::gradient(30, 30);
        let encoder = MockEncoder::failing_after(4);

        let result = split_into_pieces(&source, &encoder, &config(SplitMode::Crop, 3, 3));
        assert!(matches!(result, Err(SplitError::Encoding { .. })));
    }

    #[test]
    fn repeated_splits_have_identical_geometry() {
        let source = MockSource::gradient(64, 48);
        let encoder = MockEncoder::new();
        let config = config(SplitMode::Crop, 3, 2);

        let first = split_into_pieces(&source, &encoder, &config).unwrap();
        let second = split_into_pieces(&source, &encoder, &config).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn plan_split_uses_source_dimensions() {
        let source = MockSource::gradient(60, 200);
        let plan = plan_split(&source, &config(SplitMode::Crop, 3, 3));

        assert_eq!(plan.canvas, Rect::new(0, 70, 60, 60));
        assert_eq!((plan.cell_width, plan.cell_height), (20, 20));
        assert!(source.get_copies().is_empty());
    }

    #[test]
    fn preview_lines_three_by_three() {
        let lines = preview_grid_lines(3, 3);
        assert_eq!(lines.horizontal.len(), 2);
        assert_eq!(lines.vertical.len(), 2);
        assert!((lines.horizontal[0] - 33.333).abs() < 0.001);
        assert!((lines.vertical[1] - 66.667).abs() < 0.001);
    }

    #[test]
    fn preview_lines_single_row_and_column_are_empty() {
        let lines = preview_grid_lines(1, 1);
        assert!(lines.horizontal.is_empty());
        assert!(lines.vertical.is_empty());
    }

    #[test]
    fn preview_lines_axes_are_independent() {
        let lines = preview_grid_lines(4, 2);
        assert_eq!(lines.horizontal, vec![50.0]);
        assert_eq!(lines.vertical, vec![25.0, 50.0, 75.0]);
    }

    #[test]
    fn data_url_has_format_prefix() {
        let piece = GridPiece {
            encoded_data: vec![1, 2, 3],
            format: "image/png".into(),
            row: 0,
            col: 0,
            width: 1,
            height: 1,
        };
        assert_eq!(piece.to_data_url(), "data:image/png;base64,AQID");
        assert_eq!(piece.file_extension(), Some("png"));
    }
}
