//! Parameter types for image operations.
//!
//! These structs describe *what* to do, not *how* to do it. They are the
//! interface between [`operations`](super::operations), which decides the
//! scale and rotation, and the [`backend`](super::backend), which does the
//! pixel work. Keeping them apart lets tests swap in a mock backend.
//!
//! ## Types
//!
//! - [`Quality`]: JPEG quality (1–100). Clamped on construction.
//! - [`Rotation`]: Clockwise quarter-turn derived from EXIF orientation.
//! - [`TransformParams`]: Source, uniform scale, rotation, output quality.

use std::path::PathBuf;

/// Quality setting for lossy image encoding (1-100).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Quality(pub u32);

impl Quality {
    /// Used for resized captures; nothing is lost on top of the resample.
    pub const MAX: Quality = Quality(100);

    pub fn new(value: u32) -> Self {
        Self(value.clamp(1, 100))
    }

    pub fn value(self) -> u32 {
        self.0
    }

    /// Quality as the `u8` the JPEG encoder takes.
    pub fn as_u8(self) -> u8 {
        self.0.clamp(1, 100) as u8
    }
}

impl Default for Quality {
    fn default() -> Self {
        Self(90)
    }
}

/// Clockwise rotation applied after scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Rotation {
    #[default]
    None,
    Cw90,
    Cw180,
    Cw270,
}

impl Rotation {
    /// Map an EXIF `Orientation` value to a rotation.
    ///
    /// Only the pure rotations are honored: 6 (90°), 3 (180°), 8 (270°).
    /// Mirrored orientations and unknown values map to no rotation.
    pub fn from_exif_orientation(orientation: u16) -> Self {
        match orientation {
            6 => Rotation::Cw90,
            3 => Rotation::Cw180,
            8 => Rotation::Cw270,
            _ => Rotation::None,
        }
    }

    pub fn degrees(self) -> u32 {
        match self {
            Rotation::None => 0,
            Rotation::Cw90 => 90,
            Rotation::Cw180 => 180,
            Rotation::Cw270 => 270,
        }
    }

    /// Whether this rotation swaps width and height.
    pub fn swaps_axes(self) -> bool {
        matches!(self, Rotation::Cw90 | Rotation::Cw270)
    }
}

/// Parameters for a scale-then-rotate transform.
#[derive(Debug, Clone, PartialEq)]
pub struct TransformParams {
    pub source: PathBuf,
    /// Uniform scale applied to both axes of the decoded bitmap.
    pub scale: f64,
    pub rotation: Rotation,
    pub quality: Quality,
    /// Smallest acceptable edge, in pixels, after scaling.
    pub min_edge: u32,
    /// Largest acceptable edge, in pixels, after scaling.
    pub max_edge: u32,
}
