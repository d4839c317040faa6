//! Off-screen text rasterization
//!
//! Target generators never draw directly; they describe [`TextRun`]s and ask
//! a [`TextRaster`] for an 8-bit luminance canvas. A raster that cannot
//! provide a surface returns `None` and the generator degrades to a zeroed
//! field.
//!
//! [`OutlineFontRaster`] draws the bundled DejaVu Sans Bold, which covers
//! Vietnamese. [`MonoFontRaster`] is the Latin-1 bitmap fallback.

use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use embedded_graphics::{
    mono_font::{iso_8859_1::FONT_10X20, MonoFont, MonoTextStyle},
    pixelcolor::{Gray8, GrayColor},
    prelude::*,
    text::{Alignment, Baseline, Text, TextStyleBuilder},
};
use flurry_core::FlurryError;
use image::{GrayImage, Luma};
use std::fmt;
use std::sync::Arc;

static BUNDLED_FONT: &[u8] = include_bytes!("../../assets/DejaVuSans-Bold.ttf");

/// Horizontal anchor of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HAlign {
    Left,
    Center,
}

/// Vertical anchor of a text run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VAlign {
    Middle,
    Alphabetic,
}

/// One string drawn at a pixel position and nominal font size.
#[derive(Debug, Clone)]
pub struct TextRun {
    pub text: String,
    pub x: i32,
    pub y: i32,
    pub size_px: u32,
    pub align: HAlign,
    pub baseline: VAlign,
}

impl TextRun {
    pub fn centered(text: impl Into<String>, x: i32, y: i32, size_px: u32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            size_px,
            align: HAlign::Center,
            baseline: VAlign::Middle,
        }
    }

    pub fn left_baseline(text: impl Into<String>, x: i32, y: i32, size_px: u32) -> Self {
        Self {
            text: text.into(),
            x,
            y,
            size_px,
            align: HAlign::Left,
            baseline: VAlign::Alphabetic,
        }
    }
}

/// A drawing surface provider for text targets.
pub trait TextRaster: Send + Sync {
    /// Advance width of `text` in pixels at `size_px`.
    fn measure(&self, text: &str, size_px: u32) -> u32;

    /// White-on-black luminance canvas with every run drawn, or `None` when
    /// no surface is available.
    fn rasterize(&self, width: u32, height: u32, runs: &[TextRun]) -> Option<GrayImage>;
}

/// The bundled outline font, or the mono font if it cannot be loaded.
pub fn default_raster() -> Arc<dyn TextRaster> {
    match OutlineFontRaster::bundled() {
        Ok(raster) => Arc::new(raster),
        Err(e) => {
            log::warn!("[targets] {e}, falling back to the mono font");
            Arc::new(MonoFontRaster::default())
        }
    }
}

/// Anti-aliased raster of a TrueType/OpenType font. `size_px` is the em
/// size, as in a CSS `font-size`.
#[derive(Clone)]
pub struct OutlineFontRaster {
    font: FontArc,
}

impl OutlineFontRaster {
    /// DejaVu Sans Bold, shipped with the crate.
    pub fn bundled() -> flurry_core::Result<Self> {
        let font = FontArc::try_from_slice(BUNDLED_FONT)
            .map_err(|e| FlurryError::GenerationError(format!("bundled font: {e}")))?;
        Ok(Self { font })
    }

    /// Load a font file's bytes, e.g. a custom typeface for the lettering.
    pub fn from_bytes(bytes: Vec<u8>) -> flurry_core::Result<Self> {
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| FlurryError::GenerationError(format!("font: {e}")))?;
        Ok(Self { font })
    }

    fn scale_for(&self, size_px: u32) -> PxScale {
        let em = self.font.units_per_em().unwrap_or(1.0);
        PxScale::from(size_px as f32 * self.font.height_unscaled() / em)
    }

    /// Advance width in pixels, kerning included
    fn advance(&self, text: &str, scale: PxScale) -> f32 {
        let scaled = self.font.as_scaled(scale);
        let mut width = 0.0;
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                width += scaled.kern(prev, id);
            }
            width += scaled.h_advance(id);
            prev = Some(id);
        }
        width
    }

    fn draw_run(&self, canvas: &mut GrayImage, run: &TextRun) {
        let scale = self.scale_for(run.size_px);
        let scaled = self.font.as_scaled(scale);
        let mut caret = match run.align {
            HAlign::Left => run.x as f32,
            HAlign::Center => run.x as f32 - self.advance(&run.text, scale) / 2.0,
        };
        let baseline = match run.baseline {
            VAlign::Alphabetic => run.y as f32,
            VAlign::Middle => run.y as f32 + (scaled.ascent() + scaled.descent()) / 2.0,
        };
        let (w, h) = canvas.dimensions();

        let mut prev = None;
        for c in run.text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(prev) = prev {
                caret += scaled.kern(prev, id);
            }
            let glyph = id.with_scale_and_position(scale, point(caret, baseline));
            if let Some(outline) = self.font.outline_glyph(glyph) {
                let bounds = outline.px_bounds();
                outline.draw(|gx, gy, coverage| {
                    let x = bounds.min.x as i32 + gx as i32;
                    let y = bounds.min.y as i32 + gy as i32;
                    if x < 0 || y < 0 || x as u32 >= w || y as u32 >= h {
                        return;
                    }
                    let value = (coverage.clamp(0.0, 1.0) * 255.0).round() as u8;
                    let px = canvas.get_pixel_mut(x as u32, y as u32);
                    px.0[0] = px.0[0].max(value);
                });
            }
            caret += scaled.h_advance(id);
            prev = Some(id);
        }
    }
}

impl fmt::Debug for OutlineFontRaster {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutlineFontRaster").finish_non_exhaustive()
    }
}

impl TextRaster for OutlineFontRaster {
    fn measure(&self, text: &str, size_px: u32) -> u32 {
        self.advance(text, self.scale_for(size_px)).ceil() as u32
    }

    fn rasterize(&self, width: u32, height: u32, runs: &[TextRun]) -> Option<GrayImage> {
        if width == 0 || height == 0 {
            return None;
        }
        let mut canvas = GrayImage::new(width, height);
        for run in runs {
            self.draw_run(&mut canvas, run);
        }
        Some(canvas)
    }
}

/// Raster backed by `embedded-graphics` ISO-8859-1 mono fonts, upscaled by
/// an integer factor so the glyph cell height approximates `size_px`.
/// Characters outside Latin-1 render as the font's replacement glyph, so
/// this only suits Latin-1 text.
#[derive(Debug, Clone, Copy)]
pub struct MonoFontRaster {
    font: &'static MonoFont<'static>,
}

impl Default for MonoFontRaster {
    fn default() -> Self {
        Self { font: &FONT_10X20 }
    }
}

impl MonoFontRaster {
    fn scale_for(&self, size_px: u32) -> u32 {
        (size_px / self.font.character_size.height).max(1)
    }
}

impl TextRaster for MonoFontRaster {
    fn measure(&self, text: &str, size_px: u32) -> u32 {
        let n = text.chars().count() as u32;
        if n == 0 {
            return 0;
        }
        let cell = self.font.character_size.width + self.font.character_spacing;
        (n * cell - self.font.character_spacing) * self.scale_for(size_px)
    }

    fn rasterize(&self, width: u32, height: u32, runs: &[TextRun]) -> Option<GrayImage> {
        if width == 0 || height == 0 {
            return None;
        }
        let mut canvas = ScaledCanvas::new(width, height);
        for run in runs {
            canvas.scale = self.scale_for(run.size_px);
            let style = MonoTextStyle::new(self.font, Gray8::WHITE);
            let text_style = TextStyleBuilder::new()
                .alignment(match run.align {
                    HAlign::Left => Alignment::Left,
                    HAlign::Center => Alignment::Center,
                })
                .baseline(match run.baseline {
                    VAlign::Middle => Baseline::Middle,
                    VAlign::Alphabetic => Baseline::Alphabetic,
                })
                .build();
            let s = canvas.scale as i32;
            let anchor = Point::new(run.x.div_euclid(s), run.y.div_euclid(s));
            // Drawing into the canvas cannot fail
            let _ = Text::with_text_style(&run.text, anchor, style, text_style).draw(&mut canvas);
        }
        Some(canvas.image)
    }
}

/// Raster with no drawing surface; every request fails.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullRaster;

impl TextRaster for NullRaster {
    fn measure(&self, _text: &str, _size_px: u32) -> u32 {
        0
    }

    fn rasterize(&self, _width: u32, _height: u32, _runs: &[TextRun]) -> Option<GrayImage> {
        None
    }
}

/// Luminance image addressed in virtual pixels, each painted as a
/// `scale × scale` block.
struct ScaledCanvas {
    image: GrayImage,
    scale: u32,
}

impl ScaledCanvas {
    fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
            scale: 1,
        }
    }
}

impl OriginDimensions for ScaledCanvas {
    fn size(&self) -> Size {
        Size::new(self.image.width() / self.scale, self.image.height() / self.scale)
    }
}

impl DrawTarget for ScaledCanvas {
    type Color = Gray8;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let (w, h) = self.image.dimensions();
        for Pixel(point, color) in pixels {
            if point.x < 0 || point.y < 0 {
                continue;
            }
            let x0 = point.x as u32 * self.scale;
            let y0 = point.y as u32 * self.scale;
            for y in y0..(y0 + self.scale).min(h) {
                for x in x0..(x0 + self.scale).min(w) {
                    self.image.put_pixel(x, y, Luma([color.luma()]));
                }
            }
        }
        Ok(())
    }
}
