//! Target generators: visual source → dense per-particle target field
//!
//! Every generator returns exactly `count` positions (and, for image
//! sources, `count` colors). When a source yields fewer points than
//! particles, index `i` reuses source point `i % M`.

mod photo;
pub mod raster;
mod shapes;
mod text;

pub use photo::{decode_image, greeting_positions_from_image, image_positions_and_colors};
pub use raster::{
    default_raster, HAlign, MonoFontRaster, NullRaster, OutlineFontRaster, TextRaster, TextRun, VAlign,
};
pub use shapes::{decoration_positions, scatter_positions, tree_positions};
pub use text::{banner_positions, greeting_positions, wish_positions, wrap_lines, WISH_WIDTH};
pub use image::DynamicImage;

use flurry_core::{Color, Vec3};
use image::GrayImage;

/// Default banner shown in text mode
pub const BANNER_LINES: (&str, &str) = ("MERRY", "CHRISTMAS");

/// Per-particle target positions, optionally with per-particle colors.
#[derive(Debug, Clone, PartialEq)]
pub struct TargetField {
    positions: Vec<Vec3>,
    colors: Option<Vec<Color>>,
}

impl TargetField {
    pub fn new(positions: Vec<Vec3>) -> Self {
        Self {
            positions,
            colors: None,
        }
    }

    /// Field with colors; both arrays must have the same length.
    pub fn with_colors(positions: Vec<Vec3>, colors: Vec<Color>) -> Self {
        debug_assert_eq!(positions.len(), colors.len());
        Self {
            positions,
            colors: Some(colors),
        }
    }

    /// `count` points at the origin, the fallback cluster.
    pub fn zeroed(count: usize) -> Self {
        Self::new(vec![Vec3::ZERO; count])
    }

    pub fn len(&self) -> usize {
        self.positions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.positions.is_empty()
    }

    pub fn positions(&self) -> &[Vec3] {
        &self.positions
    }

    pub fn colors(&self) -> Option<&[Color]> {
        self.colors.as_deref()
    }

    pub fn position(&self, i: usize) -> Option<Vec3> {
        self.positions.get(i).copied()
    }

    pub fn color(&self, i: usize) -> Option<Color> {
        self.colors.as_ref().and_then(|c| c.get(i).copied())
    }

    /// Flat `[x0, y0, z0, x1, ...]` array of length `3 * len`
    pub fn flat_positions(&self) -> Vec<f32> {
        self.positions.iter().flat_map(|p| p.to_array()).collect()
    }

    /// Flat `[r0, g0, b0, ...]` array of length `3 * len`, if colored
    pub fn flat_colors(&self) -> Option<Vec<f32>> {
        self.colors
            .as_ref()
            .map(|c| c.iter().flat_map(|c| c.to_array()).collect())
    }
}

/// Source point for target slot `i`, cycling through `source`.
pub fn cyclic<T>(source: &[T], i: usize) -> Option<&T> {
    if source.is_empty() {
        None
    } else {
        source.get(i % source.len())
    }
}

/// Coordinates of every `step`-th pixel whose luminance exceeds `threshold`,
/// in raster-scan order.
pub(crate) fn scan_lit(img: &GrayImage, step: u32, threshold: u8) -> Vec<(u32, u32)> {
    let step = step.max(1) as usize;
    let (w, h) = img.dimensions();
    let mut points = Vec::new();
    for y in (0..h).step_by(step) {
        for x in (0..w).step_by(step) {
            if img.get_pixel(x, y).0[0] > threshold {
                points.push((x, y));
            }
        }
    }
    points
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cyclic_reuse() {
        let src = [10, 20, 30];
        assert_eq!(cyclic(&src, 0), Some(&10));
        assert_eq!(cyclic(&src, 3), Some(&10));
        assert_eq!(cyclic(&src, 7), Some(&20));
        assert_eq!(cyclic::<i32>(&[], 4), None);
    }

    #[test]
    fn flat_arrays_have_three_floats_per_point() {
        let field = TargetField::with_colors(
            vec![Vec3::new(1.0, 2.0, 3.0); 4],
            vec![Color::GOLD; 4],
        );
        assert_eq!(field.flat_positions().len(), 12);
        assert_eq!(field.flat_colors().unwrap().len(), 12);
        assert!(TargetField::zeroed(4).flat_colors().is_none());
    }

    #[test]
    fn scan_respects_step_and_threshold() {
        let mut img = GrayImage::new(8, 8);
        img.put_pixel(2, 2, image::Luma([255]));
        img.put_pixel(3, 3, image::Luma([255]));
        img.put_pixel(4, 2, image::Luma([100]));
        assert_eq!(scan_lit(&img, 2, 128), vec![(2, 2)]);
        assert_eq!(scan_lit(&img, 2, 50), vec![(2, 2), (4, 2)]);
    }
}
