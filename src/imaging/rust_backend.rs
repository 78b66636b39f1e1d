//! Pure Rust pixel backend built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Operation | Crate / function |
//! |---|---|
//! | Region copy (RGBA8) | row-wise slice copy into a fallibly allocated buffer |
//! | Region copy (other layouts) | `image::imageops::crop_imm` |
//! | Encode → PNG | `image::codecs::png::PngEncoder` |
//! | Encode → JPEG | `image::codecs::jpeg::JpegEncoder` (alpha dropped) |
//! | Encode → WebP | `image::codecs::webp::WebPEncoder` (lossless only) |
//! | Encode → AVIF | `image::codecs::avif::AvifEncoder` (rav1e, speed 6) |
//! | Encode → TIFF | `image::codecs::tiff::TiffEncoder` |

use super::backend::{BackendError, Dimensions, EncodingError, PieceEncoder, PixelSource};
use super::params::{Quality, Rect};
use image::codecs::avif::AvifEncoder;
use image::codecs::jpeg::JpegEncoder;
use image::codecs::png::PngEncoder;
use image::codecs::tiff::TiffEncoder;
use image::codecs::webp::WebPEncoder;
use image::{DynamicImage, ExtendedColorType, ImageEncoder as _, ImageFormat, RgbaImage};
use std::io::Cursor;
use std::sync::LazyLock;

/// Output formats [`RustEncoder`] accepts, with the file extension used for each.
const OUTPUT_FORMATS: &[(&str, &str)] = &[
    ("image/png", "png"),
    ("image/jpeg", "jpg"),
    ("image/jpg", "jpg"),
    ("image/webp", "webp"),
    ("image/avif", "avif"),
    ("image/tiff", "tiff"),
];

/// Input extensions whose decoders are compiled in.
///
/// AVIF is excluded: the `"avif"` feature only enables the encoder.
const INPUT_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    INPUT_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// File extension for an output format id, if [`RustEncoder`] supports it.
pub fn extension_for_format(format: &str) -> Option<&'static str> {
    OUTPUT_FORMATS
        .iter()
        .find(|(id, _)| id.eq_ignore_ascii_case(format))
        .map(|(_, ext)| *ext)
}

/// Allocate an empty RGBA buffer for `width × height` pixels without aborting
/// the process when the size is absurd.
fn allocate_buffer(width: u32, height: u32) -> Result<Vec<u8>, BackendError> {
    let len = (width as usize)
        .checked_mul(height as usize)
        .and_then(|n| n.checked_mul(4))
        .ok_or(BackendError::Allocation { width, height })?;

    let mut buffer = Vec::new();
    buffer
        .try_reserve_exact(len)
        .map_err(|_| BackendError::Allocation { width, height })?;
    Ok(buffer)
}

fn check_bounds(rect: Rect, width: u32, height: u32) -> Result<(), BackendError> {
    if rect.fits_within(width, height) {
        Ok(())
    } else {
        Err(BackendError::OutOfBounds {
            rect,
            width,
            height,
        })
    }
}

impl PixelSource for RgbaImage {
    fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    fn copy_region(&self, rect: Rect) -> Result<RgbaImage, BackendError> {
        check_bounds(rect, self.width(), self.height())?;

        let mut data = allocate_buffer(rect.width, rect.height)?;
        let stride = self.width() as usize * 4;
        let row_len = rect.width as usize * 4;
        let raw = self.as_raw();
        for y in rect.y..rect.y + rect.height {
            let start = y as usize * stride + rect.x as usize * 4;
            data.extend_from_slice(&raw[start..start + row_len]);
        }

        RgbaImage::from_raw(rect.width, rect.height, data).ok_or(BackendError::Allocation {
            width: rect.width,
            height: rect.height,
        })
    }
}

impl PixelSource for DynamicImage {
    fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width(),
            height: self.height(),
        }
    }

    fn copy_region(&self, rect: Rect) -> Result<RgbaImage, BackendError> {
        if let DynamicImage::ImageRgba8(buffer) = self {
            return buffer.copy_region(rect);
        }

        check_bounds(rect, self.width(), self.height())?;
        // Probe the allocation first so a huge crop fails instead of aborting
        drop(allocate_buffer(rect.width, rect.height)?);
        Ok(image::imageops::crop_imm(self, rect.x, rect.y, rect.width, rect.height).to_image())
    }
}

/// Encoder backed by the `image` crate codecs.
///
/// See the [module docs](self) for the format-to-codec mapping.
pub struct RustEncoder;

impl RustEncoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl PieceEncoder for RustEncoder {
    fn encode(
        &self,
        buffer: &RgbaImage,
        format: &str,
        quality: f32,
    ) -> Result<Vec<u8>, EncodingError> {
        let (width, height) = (buffer.width(), buffer.height());
        let quality = Quality::from_unit(quality).value();
        let mut out = Vec::new();

        let result = match format.to_ascii_lowercase().as_str() {
            "image/png" => PngEncoder::new(&mut out).write_image(
                buffer.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            "image/jpeg" | "image/jpg" => {
                let rgb = DynamicImage::ImageRgba8(buffer.clone()).to_rgb8();
                JpegEncoder::new_with_quality(&mut out, quality).write_image(
                    rgb.as_raw(),
                    width,
                    height,
                    ExtendedColorType::Rgb8,
                )
            }
            "image/webp" => WebPEncoder::new_lossless(&mut out).write_image(
                buffer.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            "image/avif" => AvifEncoder::new_with_speed_quality(&mut out, 6, quality)
                .write_image(buffer.as_raw(), width, height, ExtendedColorType::Rgba8),
            "image/tiff" => TiffEncoder::new(Cursor::new(&mut out)).write_image(
                buffer.as_raw(),
                width,
                height,
                ExtendedColorType::Rgba8,
            ),
            _ => return Err(EncodingError::UnsupportedFormat(format.to_string())),
        };

        result.map_err(|source| EncodingError::Failed {
            format: format.to_string(),
            source,
        })?;
        Ok(out)
    }
}
