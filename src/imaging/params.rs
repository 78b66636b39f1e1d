//! Parameter types for grid operations.
//!
//! These types describe *what* to cut, not *how* to cut it. They are shared
//! by the pure [`calculations`](super::calculations) module (which decides
//! where every cell lies) and the [`backend`](super::backend) traits (which do
//! the actual pixel work).
//!
//! ## Types
//!
//! - [`SplitMode`]: Crop to a centered square, or slice the full image.
//! - [`Rect`]: Pixel rectangle on an image or working canvas.
//! - [`Quality`]: Encoder quality as a 1–100 percentage, derived from the
//!   0–1 float the caller configures.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How the source image is shaped before slicing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SplitMode {
    /// Center-crop the source to a square, then slice.
    #[default]
    Crop,
    /// Slice the full source bounding box.
    Stretch,
}

impl fmt::Display for SplitMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SplitMode::Crop => f.write_str("crop"),
            SplitMode::Stretch => f.write_str("stretch"),
        }
    }
}

impl FromStr for SplitMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "crop" => Ok(SplitMode::Crop),
            "stretch" => Ok(SplitMode::Stretch),
            other => Err(format!(
                "unknown split mode '{other}' (expected 'crop' or 'stretch')"
            )),
        }
    }
}

/// Axis-aligned pixel rectangle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub fn new(x: u32, y: u32, width: u32, height: u32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle anchored at the origin.
    pub fn sized(width: u32, height: u32) -> Self {
        Self::new(0, 0, width, height)
    }

    /// True when the rectangle covers no pixels.
    pub fn is_empty(&self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// True when the rectangle lies entirely inside a `width × height` image.
    pub fn fits_within(&self, width: u32, height: u32) -> bool {
        u64::from(self.x) + u64::from(self.width) <= u64::from(width)
            && u64::from(self.y) + u64::from(self.height) <= u64::from(height)
    }
}

impl fmt::Display for Rect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}+{}+{}", self.width, self.height, self.x, self.y)
    }
}

/// Quality setting for lossy encoders (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u8);

impl Quality {
    pub fn new(value: u8) -> Self {
        Self(value.clamp(1, 100))
    }

    /// Map a 0.0–1.0 quality onto the 1–100 scale lossy encoders expect.
    pub fn from_unit(value: f32) -> Self {
        if !value.is_finite() {
            return Self::default();
        }
        Self::new((value.clamp(0.0, 1.0) * 100.0).round() as u8)
    }

    pub fn value(self) -> u8 {
        self.0
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(80)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_clamps_to_valid_range() {
        assert_eq!(Quality::new(0).value(), 1);
        assert_eq!(Quality::new(50).value(), 50);
        assert_eq!(Quality::new(150).value(), 100);
    }

    #[test]
    fn quality_from_unit_scales_and_rounds() {
        assert_eq!(Quality::from_unit(0.8).value(), 80);
        assert_eq!(Quality::from_unit(0.456).value(), 46);
        assert_eq!(Quality::from_unit(1.0).value(), 100);
        // Zero still has to be a legal encoder quality
        assert_eq!(Quality::from_unit(0.0).value(), 1);
    }

    #[test]
    fn quality_from_unit_handles_out_of_range() {
        assert_eq!(Quality::from_unit(1.5).value(), 100);
        assert_eq!(Quality::from_unit(-0.2).value(), 1);
        assert_eq!(Quality::from_unit(f32::NAN), Quality::default());
    }

    #[test]
    fn split_mode_parses_case_insensitively() {
        assert_eq!("crop".parse::<SplitMode>(), Ok(SplitMode::Crop));
        assert_eq!("Stretch".parse::<SplitMode>(), Ok(SplitMode::Stretch));
        assert!("tile".parse::<SplitMode>().is_err());
    }

    #[test]
    fn split_mode_display_roundtrips_through_from_str() {
        for mode in [SplitMode::Crop, SplitMode::Stretch] {
            assert_eq!(mode.to_string().parse::<SplitMode>(), Ok(mode));
        }
    }

    #[test]
    fn rect_fits_within_bounds() {
        assert!(Rect::new(10, 10, 90, 40).fits_within(100, 50));
        assert!(!Rect::new(10, 10, 91, 40).fits_within(100, 50));
        assert!(!Rect::new(u32::MAX, 0, 2, 1).fits_within(100, 50));
    }

    #[test]
    fn rect_empty_when_either_side_is_zero() {
        assert!(Rect::sized(0, 5).is_empty());
        assert!(Rect::sized(5, 0).is_empty());
        assert!(!Rect::sized(1, 1).is_empty());
    }
}
