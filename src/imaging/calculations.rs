//! Pure calculation functions for resize dimensions.
//!
//! All functions here are pure and testable without any I/O or images.

use super::params::Rotation;

/// Resolve max bounds against the source size. A bound of 0 means
/// "unconstrained on that axis" and is replaced by the source dimension.
///
/// # Examples
/// ```
/// # use capture_bridge::imaging::calculations::effective_bounds;
/// assert_eq!(effective_bounds((1920, 1080), (800, 0)), (800, 1080));
/// assert_eq!(effective_bounds((1920, 1080), (0, 0)), (1920, 1080));
/// ```
pub fn effective_bounds(source: (u32, u32), max: (u32, u32)) -> (u32, u32) {
    let (src_w, src_h) = source;
    let (max_w, max_h) = max;
    (
        if max_w == 0 { src_w } else { max_w },
        if max_h == 0 { src_h } else { max_h },
    )
}

/// Uniform scale factor that fits `source` inside `max` (after resolving
/// zero bounds). The smaller of the two axis ratios wins, so neither bound
/// is exceeded and the aspect ratio is preserved.
///
/// Can be greater than 1.0 when both bounds exceed the source.
///
/// # Examples
/// ```
/// # use capture_bridge::imaging::calculations::calculate_scale_factor;
/// let scale = calculate_scale_factor((1920, 1080), (800, 800));
/// assert!((scale - 800.0 / 1920.0).abs() < 1e-9);
/// ```
pub fn calculate_scale_factor(source: (u32, u32), max: (u32, u32)) -> f64 {
    let (src_w, src_h) = source;
    let (max_w, max_h) = effective_bounds(source, max);

    let width_ratio = max_w as f64 / src_w as f64;
    let height_ratio = max_h as f64 / src_h as f64;

    width_ratio.min(height_ratio)
}

/// Dimensions after applying a uniform scale, rounded to whole pixels.
pub fn scaled_dimensions(source: (u32, u32), scale: f64) -> (u32, u32) {
    let (w, h) = source;
    (
        (w as f64 * scale).round() as u32,
        (h as f64 * scale).round() as u32,
    )
}

/// Dimensions after rotation: quarter turns swap the axes.
pub fn rotated_dimensions(dims: (u32, u32), rotation: Rotation) -> (u32, u32) {
    if rotation.swaps_axes() {
        (dims.1, dims.0)
    } else {
        dims
    }
}

/// Whether a scaled result is too small to be a meaningful image.
pub fn is_degenerate(scaled: (u32, u32), min_edge: u32) -> bool {
    let min_edge = min_edge.max(1);
    scaled.0 < min_edge || scaled.1 < min_edge
}

/// Whether a scaled result has an edge longer than `max_edge`.
///
/// `scaled_dimensions` saturates at `u32::MAX`, so absurd upscales land here
/// rather than wrapping.
pub fn exceeds_max_edge(scaled: (u32, u32), max_edge: u32) -> bool {
    scaled.0 > max_edge || scaled.1 > max_edge
}
