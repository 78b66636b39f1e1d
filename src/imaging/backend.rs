//! Pixel backend traits and shared types.
//!
//! The grid code never touches a concrete image type directly. It goes through
//! two capabilities:
//!
//! - [`PixelSource`]: report dimensions and copy a rectangle into a fresh
//!   RGBA buffer (unscaled, source and destination sizes always match).
//! - [`PieceEncoder`]: serialize a buffer to a container format at a quality.
//!
//! The production implementations live in
//! [`rust_backend`](super::rust_backend), built on the `image` crate.

use super::params::Rect;
use image::RgbaImage;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    #[error("Region {rect} lies outside the {width}x{height} image")]
    OutOfBounds { rect: Rect, width: u32, height: u32 },
    #[error("Cannot allocate a {width}x{height} pixel buffer")]
    Allocation { width: u32, height: u32 },
}

#[derive(Error, Debug)]
pub enum EncodingError {
    #[error("Unsupported output format: {0}")]
    UnsupportedFormat(String),
    #[error("Encoding as {format} failed: {source}")]
    Failed {
        format: String,
        #[source]
        source: image::ImageError,
    },
}

/// Width and height of an image in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Dimensions {
    pub width: u32,
    pub height: u32,
}

impl From<Dimensions> for (u32, u32) {
    fn from(dims: Dimensions) -> Self {
        (dims.width, dims.height)
    }
}

/// A decoded image that pixels can be copied out of.
pub trait PixelSource {
    /// Natural dimensions of the image.
    fn dimensions(&self) -> Dimensions;

    /// Copy `rect` into a new buffer of exactly `rect.width × rect.height`.
    fn copy_region(&self, rect: Rect) -> Result<RgbaImage, BackendError>;
}

/// Serializes a pixel buffer, e.g. `("image/png", 0.8)`.
///
/// `Sync` so one encoder can serve every rayon worker.
pub trait PieceEncoder: Sync {
    fn encode(
        &self,
        buffer: &RgbaImage,
        format: &str,
        quality: f32,
    ) -> Result<Vec<u8>, EncodingError>;
}
