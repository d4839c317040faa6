//! Image-backed targets: uploaded photo mosaic and logo silhouette

use super::{cyclic, TargetField};
use crate::rand::ParticleRng;
use flurry_core::{Color, Result, Vec3};
use image::imageops::FilterType;
use image::DynamicImage;

const MOSAIC_WIDTH: u32 = 200;
const MOSAIC_EXTENT: f32 = 10.4;
const MOSAIC_SLAB: f32 = 0.5;

const LOGO_WIDTH: u32 = 400;
const LOGO_EXTENT: f32 = 14.4;
const LOGO_SLAB: f32 = 1.05;

const ALPHA_THRESHOLD: u8 = 128;

/// Decode uploaded bytes in any format `image` recognises.
pub fn decode_image(bytes: &[u8]) -> Result<DynamicImage> {
    Ok(image::load_from_memory(bytes)?)
}

struct OpaquePixel {
    x: u32,
    y: u32,
    color: Color,
}

/// Downsample to `width` pixels wide (aspect preserved, at least one row)
/// and collect pixels with alpha above the threshold, in raster order.
fn opaque_pixels(img: &DynamicImage, width: u32) -> (Vec<OpaquePixel>, u32, u32) {
    let w = width;
    let h = if img.width() == 0 {
        1
    } else {
        ((w as f64 * img.height() as f64 / img.width() as f64).floor() as u32).max(1)
    };
    let small = img.resize_exact(w, h, FilterType::Triangle).to_rgba8();
    let mut points = Vec::new();
    for (x, y, px) in small.enumerate_pixels() {
        let [r, g, b, a] = px.0;
        if a > ALPHA_THRESHOLD {
            points.push(OpaquePixel {
                x,
                y,
                color: Color::new(r as f32 / 255.0, g as f32 / 255.0, b as f32 / 255.0),
            });
        }
    }
    (points, w, h)
}

/// Photo mosaic: positions spanning 10.4 units wide (height by aspect) and
/// the source pixel colors. An image with no opaque pixel collapses to a
/// white point at the origin.
pub fn image_positions_and_colors(img: &DynamicImage, count: usize, rng: &mut ParticleRng) -> TargetField {
    let (points, w, h) = opaque_pixels(img, MOSAIC_WIDTH);
    log::debug!("[targets] image mosaic {}x{}: {} source points", w, h, points.len());
    let aspect = h as f32 / w as f32;

    let mut positions = Vec::with_capacity(count);
    let mut colors = Vec::with_capacity(count);
    for i in 0..count {
        let (pos, color) = match cyclic(&points, i) {
            Some(p) => {
                let x_norm = p.x as f32 / w as f32 - 0.5;
                let y_norm = -(p.y as f32 / h as f32 - 0.5);
                (
                    Vec3::new(x_norm * MOSAIC_EXTENT, y_norm * MOSAIC_EXTENT * aspect, 0.0),
                    p.color,
                )
            }
            None => (Vec3::ZERO, Color::WHITE),
        };
        positions.push(Vec3::new(pos.x, pos.y, rng.centered() * MOSAIC_SLAB));
        colors.push(color);
    }
    TargetField::with_colors(positions, colors)
}

/// Logo silhouette from an image's alpha mask, 14.4 units wide.
pub fn greeting_positions_from_image(img: &DynamicImage, count: usize, rng: &mut ParticleRng) -> TargetField {
    let (points, w, h) = opaque_pixels(img, LOGO_WIDTH);
    log::debug!("[targets] logo image {}x{}: {} source points", w, h, points.len());
    let aspect = h as f32 / w as f32;
    let positions = (0..count)
        .map(|i| {
            let (x_norm, y_norm) = match cyclic(&points, i) {
                Some(p) => (p.x as f32 / w as f32 - 0.5, -(p.y as f32 / h as f32 - 0.5)),
                None => (0.0, 0.0),
            };
            Vec3::new(
                x_norm * LOGO_EXTENT,
                y_norm * LOGO_EXTENT * aspect,
                rng.centered() * LOGO_SLAB,
            )
        })
        .collect();
    TargetField::new(positions)
}
