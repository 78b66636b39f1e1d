//! # Grid Splitter
//!
//! Cut one image into an N×M grid of independently encoded pieces, for
//! puzzle layouts, social-media grid posts, or grid previews.
//!
//! # Pipeline
//!
//! ```text
//! 1. Resolve   SplitOptions  →  SplitConfig      (defaults filled, validated once)
//! 2. Acquire   ImageSource   →  decoded image    (the only await point)
//! 3. Canvas    image         →  working canvas   (centered square, or everything)
//! 4. Cut       canvas        →  Vec<GridPiece>   (row-major, encoded in parallel)
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`config`] | `SplitOptions` → `SplitConfig` resolution, validation, TOML config file |
//! | [`imaging`] | Grid geometry, pixel sampling and encoding backends |
//! | [`acquire`] | `ImageSource` variants and the async acquirer that decodes them |
//! | [`splitter`] | [`ImageGridSplitter`], the public entry point |
//! | [`error`] | [`SplitError`], everything a split can fail with |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Floor Division, Remainders Dropped
//!
//! Cell sizes are `floor(canvas / count)`. Leftover pixels on the right and
//! bottom edge are never part of any piece, so every piece of a split has the
//! same dimensions.
//!
//! ## Crop Mode Squares the Canvas, Not the Cells
//!
//! Crop mode takes the centered `min(W, H)` square before slicing. Pieces are
//! square whenever `cols == rows`; other grids give `floor(size / cols)` by
//! `floor(size / rows)` pieces.
//!
//! ## Bad Options Fail Early, Tiny Images Do Not
//!
//! Zero rows or columns, a quality outside `[0, 1]` and an empty format are
//! rejected when the splitter is built. A grid finer than the image is legal:
//! the resulting zero-area pieces carry no data and skip the encoder.

pub mod acquire;
pub mod config;
pub mod error;
pub mod imaging;
pub mod output;
pub mod splitter;

pub use acquire::{AcquisitionError, DefaultAcquirer, ImageAcquirer, ImageSource};
pub use config::{ConfigError, SplitConfig, SplitOptions};
pub use error::SplitError;
pub use imaging::{GridLines, GridPiece, PieceEncoder, PixelSource, RustEncoder, SplitMode};
pub use splitter::ImageGridSplitter;
