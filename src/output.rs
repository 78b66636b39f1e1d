//! CLI output formatting.
//!
//! # Output Format
//!
//! ## Split
//!
//! ```text
//! 001 cat (crop 3x3, 9 pieces at 200x200)
//!     Source: photos/cat.jpg
//!     r0 c0 → pieces/cat-r0-c0.png
//!     r0 c1 → pieces/cat-r0-c1.png
//!     ...
//!
//! Split 1 image into 9 pieces
//! ```
//!
//! ## Preview
//!
//! ```text
//! Grid 3x3
//!     Horizontal: 33.33%, 66.67%
//!     Vertical: 33.33%, 66.67%
//! ```
//!
//! # Architecture
//!
//! Each command has a `format_*` function (returns `Vec<String>`) for
//! testability and a `print_*` wrapper that writes to stdout. Format functions
//! are pure: no I/O, no side effects.

use crate::config::SplitConfig;
use crate::imaging::{GridLines, GridPiece};
use std::path::{Path, PathBuf};

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

fn plural(n: usize, word: &str) -> String {
    if n == 1 {
        format!("{} {}", n, word)
    } else {
        format!("{} {}s", n, word)
    }
}

fn format_offsets(offsets: &[f64]) -> String {
    if offsets.is_empty() {
        return "(none)".to_string();
    }
    offsets
        .iter()
        .map(|o| format!("{:.2}%", o))
        .collect::<Vec<_>>()
        .join(", ")
}

/// One image's split, as handed to [`format_split_output`].
pub struct SplitReport<'a> {
    /// 1-based position among the inputs.
    pub index: usize,
    /// Stem used for the output file names.
    pub label: &'a str,
    /// Where the image came from (path, URL, or a placeholder for data URLs).
    pub source: &'a str,
    pub config: &'a SplitConfig,
    pub pieces: &'a [GridPiece],
    /// Output file per piece, same order as `pieces`. `None` for empty pieces.
    pub written: &'a [Option<PathBuf>],
}

/// Format the result of splitting one image.
///
/// Header line: index, label, mode, grid and piece size. Context lines: the
/// source and one line per piece with the file it was written to.
pub fn format_split_output(report: &SplitReport<'_>) -> Vec<String> {
    let config = report.config;
    let size = report
        .pieces
        .first()
        .map(|p| format!("{}x{}", p.width, p.height))
        .unwrap_or_else(|| "-".to_string());

    let mut lines = vec![format!(
        "{} {} ({} {}x{}, {} at {})",
        format_index(report.index),
        report.label,
        config.mode,
        config.cols,
        config.rows,
        plural(report.pieces.len(), "piece"),
        size
    )];
    lines.push(format!("{}Source: {}", indent(1), report.source));

    for (piece, written) in report.pieces.iter().zip(report.written) {
        let target = match written {
            Some(path) => path.display().to_string(),
            None => format!("(empty, {}x{})", piece.width, piece.height),
        };
        lines.push(format!(
            "{}r{} c{} → {}",
            indent(1),
            piece.row,
            piece.col,
            target
        ));
    }

    lines
}

/// Print split output to stdout.
pub fn print_split_output(report: &SplitReport<'_>) {
    for line in format_split_output(report) {
        println!("{}", line);
    }
}

/// Format the closing summary after all inputs were split.
pub fn format_split_summary(images: usize, pieces: usize, output_dir: &Path) -> Vec<String> {
    vec![
        String::new(),
        format!(
            "Split {} into {} → {}",
            plural(images, "image"),
            plural(pieces, "piece"),
            output_dir.display()
        ),
    ]
}

/// Print the split summary to stdout.
pub fn print_split_summary(images: usize, pieces: usize, output_dir: &Path) {
    for line in format_split_summary(images, pieces, output_dir) {
        println!("{}", line);
    }
}

/// Format grid-line preview percentages.
pub fn format_preview_output(config: &SplitConfig, lines: &GridLines) -> Vec<String> {
    vec![
        format!("Grid {}x{}", config.cols, config.rows),
        format!("{}Horizontal: {}", indent(1), format_offsets(&lines.horizontal)),
        format!("{}Vertical: {}", indent(1), format_offsets(&lines.vertical)),
    ]
}

/// Print the grid-line preview to stdout.
pub fn print_preview_output(config: &SplitConfig, lines: &GridLines) {
    for line in format_preview_output(config, lines) {
        println!("{}", line);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SplitOptions;
    use crate::imaging::{SplitMode, preview_grid_lines};

    fn piece(row: u32, col: u32, width: u32, height: u32) -> GridPiece {
        GridPiece {
            encoded_data: vec![0],
            format: "image/png".into(),
            row,
            col,
            width,
            height,
        }
    }

    #[test]
    fn format_index_pads_to_three_digits() {
        assert_eq!(format_index(1), "001");
        assert_eq!(format_index(42), "042");
        assert_eq!(format_index(1234), "1234");
    }

    #[test]
    fn offsets_render_with_two_decimals() {
        assert_eq!(format_offsets(&[100.0 / 3.0, 200.0 / 3.0]), "33.33%, 66.67%");
        assert_eq!(format_offsets(&[]), "(none)");
    }

    #[test]
    fn split_output_lists_every_piece() {
        let config = SplitOptions {
            cols: Some(2),
            rows: Some(1),
            ..SplitOptions::default()
        }
        .resolve();
        let pieces = vec![piece(0, 0, 50, 100), piece(0, 1, 50, 100)];
        let written = vec![
            Some(PathBuf::from("out/cat-r0-c0.png")),
            Some(PathBuf::from("out/cat-r0-c1.png")),
        ];

        let lines = format_split_output(&SplitReport {
            index: 1,
            label: "cat",
            source: "photos/cat.jpg",
            config: &config,
            pieces: &pieces,
            written: &written,
        });

        assert_eq!(
            lines,
            vec![
                "001 cat (crop 2x1, 2 pieces at 50x100)",
                "    Source: photos/cat.jpg",
                "    r0 c0 → out/cat-r0-c0.png",
                "    r0 c1 → out/cat-r0-c1.png",
            ]
        );
    }

    #[test]
    fn split_output_marks_empty_pieces() {
        let config = SplitOptions {
            mode: Some(SplitMode::Stretch),
            cols: Some(1),
            rows: Some(1),
            ..SplitOptions::default()
        }
        .resolve();
        let pieces = vec![piece(0, 0, 0, 3)];

        let lines = format_split_output(&SplitReport {
            index: 2,
            label: "dot",
            source: "dot.png",
            config: &config,
            pieces: &pieces,
            written: &[None],
        });

        assert_eq!(lines[0], "002 dot (stretch 1x1, 1 piece at 0x3)");
        assert_eq!(lines[2], "    r0 c0 → (empty, 0x3)");
    }

    #[test]
    fn summary_pluralizes() {
        let lines = format_split_summary(1, 9, Path::new("pieces"));
        assert_eq!(lines[1], "Split 1 image into 9 pieces → pieces");
    }

    #[test]
    fn preview_output_three_by_three() {
        let config = SplitConfig::default();
        let lines = format_preview_output(&config, &preview_grid_lines(3, 3));
        assert_eq!(
            lines,
            vec![
                "Grid 3x3",
                "    Horizontal: 33.33%, 66.67%",
                "    Vertical: 33.33%, 66.67%",
            ]
        );
    }

    #[test]
    fn preview_output_single_cell_has_no_lines() {
        let config = SplitOptions {
            cols: Some(1),
            rows: Some(1),
            ..SplitOptions::default()
        }
        .resolve();
        let lines = format_preview_output(&config, &preview_grid_lines(1, 1));
        assert_eq!(lines[1], "    Horizontal: (none)");
        assert_eq!(lines[2], "    Vertical: (none)");
    }
}
