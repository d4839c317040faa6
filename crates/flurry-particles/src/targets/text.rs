//! Text-backed targets: greeting logo, banner, wish reveal

use super::raster::{TextRaster, TextRun};
use super::{cyclic, scan_lit, TargetField};
use crate::rand::ParticleRng;
use flurry_core::Vec3;

const LOGO_CANVAS: (u32, u32) = (1024, 512);
const LOGO_MAIN_PX: u32 = 340;
const LOGO_SMALL_PX: u32 = 220;
const LOGO_EXTENT: (f32, f32) = (14.4, 7.2);

const BANNER_CANVAS: (u32, u32) = (1024, 512);
const BANNER_PX: u32 = 160;
const BANNER_LINE_OFFSET: i32 = 80;
const BANNER_EXTENT: (f32, f32) = (15.0, 7.5);

const WISH_CANVAS: (u32, u32) = (2000, 1000);
const WISH_PX: u32 = 80;
const WISH_WRAP_FRACTION: f32 = 0.85;
const WISH_LINE_HEIGHT: f32 = 1.3;
/// Width in scene units the wish text is fitted to
pub const WISH_WIDTH: f32 = 15.2;
const WISH_LIFT: f32 = 2.0;

const SCAN_STEP: u32 = 2;
const SOLID_THRESHOLD: u8 = 128;
const WISH_THRESHOLD: u8 = 50;
/// Depth of the slab text particles are scattered through
const TEXT_SLAB: f32 = 1.05;

/// The "STe" logo: two large capitals and a small kerned "e" on one baseline.
pub fn greeting_positions(raster: &dyn TextRaster, count: usize, rng: &mut ParticleRng) -> TargetField {
    let (w, h) = LOGO_CANVAS;
    let width_s = raster.measure("S", LOGO_MAIN_PX) as i32;
    let width_t = raster.measure("T", LOGO_MAIN_PX) as i32;
    let width_e = raster.measure("e", LOGO_SMALL_PX) as i32;
    let total = width_s + width_t + width_e - 30;
    let start_x = (w as i32 - total) / 2;
    let baseline = h as i32 / 2 + 100;

    let runs = [
        TextRun::left_baseline("S", start_x, baseline, LOGO_MAIN_PX),
        TextRun::left_baseline("T", start_x + width_s - 15, baseline, LOGO_MAIN_PX),
        TextRun::left_baseline("e", start_x + width_s + width_t - 25, baseline, LOGO_SMALL_PX),
    ];
    let Some(canvas) = raster.rasterize(w, h, &runs) else {
        log::warn!("[targets] no raster surface for greeting logo, using default cluster");
        return TargetField::zeroed(count);
    };
    let points = scan_lit(&canvas, SCAN_STEP, SOLID_THRESHOLD);
    log::debug!("[targets] greeting logo: {} source points", points.len());
    canvas_field(&points, (w, h), LOGO_EXTENT, count, rng)
}

/// Two centred banner lines, e.g. "MERRY" / "CHRISTMAS".
pub fn banner_positions(
    raster: &dyn TextRaster,
    line1: &str,
    line2: &str,
    count: usize,
    rng: &mut ParticleRng,
) -> TargetField {
    let (w, h) = BANNER_CANVAS;
    let cx = w as i32 / 2;
    let cy = h as i32 / 2;
    let runs = [
        TextRun::centered(line1, cx, cy - BANNER_LINE_OFFSET, BANNER_PX),
        TextRun::centered(line2, cx, cy + BANNER_LINE_OFFSET, BANNER_PX),
    ];
    let Some(canvas) = raster.rasterize(w, h, &runs) else {
        log::warn!("[targets] no raster surface for banner, using default cluster");
        return TargetField::zeroed(count);
    };
    let points = scan_lit(&canvas, SCAN_STEP, SOLID_THRESHOLD);
    log::debug!("[targets] banner: {} source points", points.len());
    canvas_field(&points, (w, h), BANNER_EXTENT, count, rng)
}

/// Wish text normalized around its bounding box and sorted left to right so
/// slot order follows the reveal sweep. Flat (z = 0), lifted by 2 units.
pub fn wish_positions(raster: &dyn TextRaster, text: &str, count: usize) -> TargetField {
    let (w, h) = WISH_CANVAS;
    let max_width = (w as f32 * WISH_WRAP_FRACTION) as u32;
    let lines = wrap_lines(raster, text, WISH_PX, max_width);
    let line_height = WISH_PX as f32 * WISH_LINE_HEIGHT;
    let start_y = h as f32 / 2.0 - (lines.len().saturating_sub(1)) as f32 * line_height / 2.0;
    let runs: Vec<TextRun> = lines
        .iter()
        .enumerate()
        .map(|(i, line)| {
            let y = start_y + i as f32 * line_height;
            TextRun::centered(line.as_str(), w as i32 / 2, y.round() as i32, WISH_PX)
        })
        .collect();

    let Some(canvas) = raster.rasterize(w, h, &runs) else {
        log::warn!("[targets] no raster surface for wish text, using default cluster");
        return TargetField::zeroed(count);
    };
    let mut points = scan_lit(&canvas, SCAN_STEP, WISH_THRESHOLD);
    if points.is_empty() {
        return TargetField::new(vec![Vec3::new(0.0, WISH_LIFT, 0.0); count]);
    }

    let (mut min_x, mut max_x, mut min_y, mut max_y) = (u32::MAX, 0, u32::MAX, 0);
    for &(x, y) in &points {
        min_x = min_x.min(x);
        max_x = max_x.max(x);
        min_y = min_y.min(y);
        max_y = max_y.max(y);
    }
    let content_w = match max_x - min_x {
        0 => 1.0,
        d => d as f32,
    };
    let content_h = match max_y - min_y {
        0 => 1.0,
        d => d as f32,
    };
    let center_x = min_x as f32 + content_w / 2.0;
    let center_y = min_y as f32 + content_h / 2.0;
    let scale = WISH_WIDTH / content_w;

    // Stable: equal columns keep raster order
    points.sort_by_key(|&(x, _)| x);

    let positions = (0..count)
        .map(|i| match cyclic(&points, i) {
            Some(&(x, y)) => Vec3::new(
                (x as f32 - center_x) * scale,
                -(y as f32 - center_y) * scale + WISH_LIFT,
                0.0,
            ),
            None => Vec3::new(0.0, WISH_LIFT, 0.0),
        })
        .collect();
    TargetField::new(positions)
}

/// Split on explicit newlines, then greedily word-wrap each line so no
/// multi-word line reaches `max_width` pixels.
pub fn wrap_lines(raster: &dyn TextRaster, text: &str, size_px: u32, max_width: u32) -> Vec<String> {
    let mut lines = Vec::new();
    for manual in text.split('\n') {
        let mut words = manual.split(' ');
        let mut current = words.next().unwrap_or_default().to_string();
        for word in words {
            let candidate = format!("{current} {word}");
            if raster.measure(&candidate, size_px) < max_width {
                current = candidate;
            } else {
                lines.push(std::mem::replace(&mut current, word.to_string()));
            }
        }
        lines.push(current);
    }
    lines
}

/// Map canvas pixels into a centred field of the given extent, with a thin
/// random depth slab.
fn canvas_field(
    points: &[(u32, u32)],
    (w, h): (u32, u32),
    (extent_x, extent_y): (f32, f32),
    count: usize,
    rng: &mut ParticleRng,
) -> TargetField {
    let fallback = (w / 2, h / 2);
    let positions = (0..count)
        .map(|i| {
            let &(x, y) = cyclic(points, i).unwrap_or(&fallback);
            let x_norm = x as f32 / w as f32 - 0.5;
            let y_norm = -(y as f32 / h as f32 - 0.5);
            Vec3::new(
                x_norm * extent_x,
                y_norm * extent_y,
                rng.centered() * TEXT_SLAB,
            )
        })
        .collect();
    TargetField::new(positions)
}
