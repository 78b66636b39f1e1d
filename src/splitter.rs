//! The public splitter: resolved configuration plus its two collaborators.
//!
//! ```no_run
//! # async fn demo() -> Result<(), Box<dyn std::error::Error>> {
//! use grid_splitter::{ImageGridSplitter, SplitMode, SplitOptions};
//!
//! let splitter = ImageGridSplitter::new(SplitOptions {
//!     mode: Some(SplitMode::Crop),
//!     cols: Some(3),
//!     rows: Some(3),
//!     ..SplitOptions::default()
//! })?;
//!
//! let pieces = splitter.split(std::path::PathBuf::from("photo.jpg")).await?;
//! assert_eq!(pieces.len(), 9);
//! # Ok(())
//! # }
//! ```

use crate::acquire::{DefaultAcquirer, ImageAcquirer, ImageSource};
use crate::config::{ConfigError, SplitConfig, SplitOptions};
use crate::error::SplitError;
use crate::imaging::{
    GridLines, GridPiece, GridPlan, PieceEncoder, PixelSource, RustEncoder, plan_split,
    preview_grid_lines, split_into_pieces,
};
use tracing::debug;

/// Splits images into a fixed grid of encoded pieces.
///
/// The configuration is resolved and validated once, at construction, and
/// never changes afterwards, so one splitter can be reused for any number of
/// images, sequentially or from several tasks at once.
pub struct ImageGridSplitter<E = RustEncoder, A = DefaultAcquirer> {
    config: SplitConfig,
    encoder: E,
    acquirer: A,
}

impl ImageGridSplitter {
    /// Splitter using the built-in `image` crate encoder and acquirer.
    pub fn new(options: SplitOptions) -> Result<Self, ConfigError> {
        Self::with_collaborators(options, RustEncoder::new(), DefaultAcquirer::new())
    }
}

impl<E: PieceEncoder, A: ImageAcquirer> ImageGridSplitter<E, A> {
    /// Splitter with custom encoding and acquisition backends.
    pub fn with_collaborators(
        options: SplitOptions,
        encoder: E,
        acquirer: A,
    ) -> Result<Self, ConfigError> {
        let config = options.resolve();
        config.validate()?;
        Ok(Self {
            config,
            encoder,
            acquirer,
        })
    }

    pub fn config(&self) -> &SplitConfig {
        &self.config
    }

    /// Acquire `source`, then cut it into `rows × cols` pieces in row-major order.
    ///
    /// Awaiting acquisition is the only suspension point; sampling and encoding
    /// run to completion once the image is ready.
    pub async fn split(
        &self,
        source: impl Into<ImageSource>,
    ) -> Result<Vec<GridPiece>, SplitError> {
        let image = self.acquirer.acquire(source.into()).await?;
        self.split_image(&image)
    }

    /// Cut an already decoded image.
    pub fn split_image(&self, image: &impl PixelSource) -> Result<Vec<GridPiece>, SplitError> {
        let pieces = split_into_pieces(image, &self.encoder, &self.config)?;
        debug!(pieces = pieces.len(), "split complete");
        Ok(pieces)
    }

    /// Geometry a split of `image` would produce, without sampling or encoding.
    pub fn plan(&self, image: &impl PixelSource) -> GridPlan {
        plan_split(image, &self.config)
    }

    /// Divider-line positions, in percent, for previewing the grid over an image.
    pub fn preview_grid_lines(&self) -> GridLines {
        preview_grid_lines(self.config.cols, self.config.rows)
    }
}
