//! Grid geometry and pixel work in pure Rust, no system libraries.
//!
//! | Operation | Crate / function |
//! |---|---|
//! | **Plan** | pure integer geometry ([`plan_grid`]) |
//! | **Sample** | [`PixelSource::copy_region`], unscaled rectangle copy |
//! | **Encode** | [`PieceEncoder`], `image` crate codecs |
//! | **Fan out** | `rayon` parallel iterator, order preserved |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for grid math (unit testable)
//! - **Parameters**: Data structures describing the grid
//! - **Backend**: [`PixelSource`] / [`PieceEncoder`] traits + [`RustEncoder`]
//! - **Operations**: High-level functions combining calculations + backend

pub mod backend;
pub mod calculations;
pub mod operations;
mod params;
pub mod rust_backend;

pub use backend::{BackendError, Dimensions, EncodingError, PieceEncoder, PixelSource};
pub use calculations::{
    Cell, GridPlan, calculate_cell_size, calculate_grid_line_offsets, calculate_working_canvas,
    plan_grid,
};
pub use operations::{GridLines, GridPiece, plan_split, preview_grid_lines, split_into_pieces};
pub use params::{Quality, Rect, SplitMode};
pub use rust_backend::{RustEncoder, extension_for_format, supported_input_extensions};
