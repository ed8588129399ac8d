use std::path::Path;

use ab_glyph::{Font, FontVec, PxScale, ScaleFont};
use earth_gif_common::config::RenderConfig;
use image::{imageops, DynamicImage, GenericImageView, Rgba, RgbaImage};
use imageproc::drawing::{draw_text_mut, text_size};
use tracing::debug;

use crate::error::RenderError;

const WHITE: Rgba<u8> = Rgba([255, 255, 255, 255]);
const OPAQUE_BLACK: Rgba<u8> = Rgba([0, 0, 0, 255]);

/// Geometry of the caption box.
///
/// The box is centered on `(width - offset_x, height - offset_y)` and text
/// wraps at `width - margin`. Offsets are absolute pixels, so on images
/// smaller than the offsets the caption lands partly or fully off-canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptionStyle {
    pub font_size: f32,
    pub offset_x: u32,
    pub offset_y: u32,
    pub margin: u32,
    pub line_spacing: f32,
}

impl From<&RenderConfig> for CaptionStyle {
    fn from(config: &RenderConfig) -> Self {
        Self {
            font_size: config.font_size,
            offset_x: config.caption_offset_x,
            offset_y: config.caption_offset_y,
            margin: config.caption_margin,
            line_spacing: config.line_spacing,
        }
    }
}

impl Default for CaptionStyle {
    fn default() -> Self {
        Self::from(&RenderConfig::default())
    }
}

/// A background with its caption drawn on, ready for quantization.
#[derive(Debug, Clone)]
pub struct CompositeFrame {
    pub caption: String,
    pub image: RgbaImage,
}

/// Draws timestamp captions onto frames with one loaded font.
pub struct Captioner {
    font: FontVec,
    style: CaptionStyle,
}

impl Captioner {
    pub fn load(path: &Path, style: CaptionStyle) -> Result<Self, RenderError> {
        let font_error = |reason: String| RenderError::FontLoad {
            path: path.display().to_string(),
            reason,
        };
        let data = std::fs::read(path).map_err(|e| font_error(e.to_string()))?;
        let font = FontVec::try_from_vec(data).map_err(|e| font_error(e.to_string()))?;
        debug!(path = path.display().to_string(), size = style.font_size, "font loaded");
        Ok(Self { font, style })
    }

    /// Paint `background` onto an opaque canvas of the same size and draw `caption` over it.
    pub fn compose(&self, background: &DynamicImage, caption: &str) -> CompositeFrame {
        let (width, height) = background.dimensions();
        let mut canvas = RgbaImage::from_pixel(width, height, OPAQUE_BLACK);
        imageops::overlay(&mut canvas, &background.to_rgba8(), 0, 0);
        self.draw_caption(&mut canvas, caption);
        CompositeFrame {
            caption: caption.to_string(),
            image: canvas,
        }
    }

    fn draw_caption(&self, canvas: &mut RgbaImage, text: &str) {
        let (width, height) = canvas.dimensions();
        let scale = self.scale();
        let line_height = self.font.as_scaled(scale).height();
        let spacing = self.style.line_spacing;

        let max_width = width as f32 - self.style.margin as f32;
        let lines = self.wrap(text, max_width);
        if lines.is_empty() {
            return;
        }

        let anchor_x = width as f32 - self.style.offset_x as f32;
        let anchor_y = height as f32 - self.style.offset_y as f32;
        let block_height =
            lines.len() as f32 * line_height * spacing - (spacing - 1.0) * line_height;

        let mut top = anchor_y - block_height / 2.0;
        for line in &lines {
            let line_width = self.measure(line);
            let left = anchor_x - line_width / 2.0;
            draw_text_mut(
                canvas,
                WHITE,
                left.round() as i32,
                top.round() as i32,
                scale,
                &self.font,
                line,
            );
            top += line_height * spacing;
        }
    }

    /// Greedy word wrap: words are packed onto a line while it fits in
    /// `max_width`; a word wider than `max_width` gets a line of its own.
    pub fn wrap(&self, text: &str, max_width: f32) -> Vec<String> {
        let mut lines = Vec::new();
        for paragraph in text.lines() {
            let mut current = String::new();
            for word in paragraph.split_whitespace() {
                if current.is_empty() {
                    current.push_str(word);
                    continue;
                }
                let candidate = format!("{current} {word}");
                if self.measure(&candidate) <= max_width {
                    current = candidate;
                } else {
                    lines.push(std::mem::replace(&mut current, word.to_string()));
                }
            }
            if !current.is_empty() {
                lines.push(current);
            }
        }
        lines
    }

    fn measure(&self, text: &str) -> f32 {
        text_size(self.scale(), &self.font, text).0 as f32
    }

    fn scale(&self) -> PxScale {
        PxScale::from(self.style.font_size)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::path::PathBuf;

    pub(crate) fn font_path() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../assets/fonts/DejaVuSans.ttf")
    }

    pub(crate) fn captioner() -> Captioner {
        Captioner::load(&font_path(), CaptionStyle::default()).unwrap()
    }

    /// Same geometry as the default, with a font small enough for one line on 1200px.
    fn small_captioner() -> Captioner {
        let style = CaptionStyle {
            font_size: 40.0,
            ..CaptionStyle::default()
        };
        Captioner::load(&font_path(), style).unwrap()
    }

    fn solid(width: u32, height: u32, color: [u8; 3]) -> DynamicImage {
        DynamicImage::ImageRgb8(image::RgbImage::from_pixel(width, height, image::Rgb(color)))
    }

    fn is_lit(pixel: &Rgba<u8>) -> bool {
        pixel.0[0] > 128 && pixel.0[1] > 128 && pixel.0[2] > 128
    }

    #[test]
    fn missing_font_is_font_load_error() {
        let err = Captioner::load(Path::new("/nonexistent/font.ttf"), CaptionStyle::default())
            .err()
            .unwrap();
        assert!(matches!(err, RenderError::FontLoad { .. }));
    }

    #[test]
    fn garbage_font_is_font_load_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.ttf");
        std::fs::write(&path, b"definitely not a font").unwrap();
        let err = Captioner::load(&path, CaptionStyle::default()).err().unwrap();
        assert!(matches!(err, RenderError::FontLoad { .. }));
    }

    #[test]
    fn composite_keeps_background_size() {
        let frame = captioner().compose(&solid(320, 240, [0, 0, 255]), "2022-01-01 00:00:00");
        assert_eq!(frame.image.dimensions(), (320, 240));
        assert_eq!(frame.caption, "2022-01-01 00:00:00");
    }

    #[test]
    fn caption_is_drawn_in_white_near_bottom() {
        // Anchor at (700, 320); one 40px line sits around rows 300..340.
        let frame = small_captioner().compose(&solid(1200, 400, [0, 0, 0]), "2022-01-01 00:00:00");

        let lit_rows: Vec<u32> = frame
            .image
            .enumerate_pixels()
            .filter(|(_, _, p)| is_lit(p))
            .map(|(_, y, _)| y)
            .collect();
        assert!(!lit_rows.is_empty(), "caption should paint white pixels");
        assert!(lit_rows.iter().all(|&y| y > 200), "caption stays in the lower box");

        // Background above the caption box is untouched.
        assert_eq!(*frame.image.get_pixel(10, 10), OPAQUE_BLACK);
    }

    #[test]
    fn caption_is_centered_on_anchor_x() {
        let frame = small_captioner().compose(&solid(1200, 400, [0, 0, 0]), "2022-01-01 00:00:00");
        let xs: Vec<u32> = frame
            .image
            .enumerate_pixels()
            .filter(|(_, _, p)| is_lit(p))
            .map(|(x, _, _)| x)
            .collect();
        let min = *xs.iter().min().unwrap() as f32;
        let max = *xs.iter().max().unwrap() as f32;
        let center = (min + max) / 2.0;
        assert!((center - 700.0).abs() < 40.0, "center was {center}");
    }

    #[test]
    fn tiny_background_does_not_panic() {
        let frame = captioner().compose(&solid(10, 10, [255, 0, 0]), "2022-01-01 00:00:00");
        assert_eq!(frame.image.dimensions(), (10, 10));
    }

    #[test]
    fn offsets_are_configurable() {
        let style = CaptionStyle {
            offset_x: 100,
            offset_y: 100,
            font_size: 20.0,
            ..CaptionStyle::default()
        };
        let captioner = Captioner::load(&font_path(), style).unwrap();
        let frame = captioner.compose(&solid(200, 200, [0, 0, 0]), "2022-01-01 00:00:00");
        let lit = frame.image.pixels().filter(|p| is_lit(p)).count();
        assert!(lit > 0, "a small caption centered in a small frame is visible");
    }

    #[test]
    fn transparent_background_becomes_black() {
        let clear = DynamicImage::ImageRgba8(RgbaImage::from_pixel(50, 50, Rgba([255, 0, 0, 0])));
        let frame = captioner().compose(&clear, "");
        assert_eq!(*frame.image.get_pixel(25, 25), OPAQUE_BLACK);
    }

    #[test]
    fn wrap_splits_on_width() {
        let c = captioner();
        let one_line = c.wrap("2022-01-01 00:00:00", 5000.0);
        assert_eq!(one_line, vec!["2022-01-01 00:00:00".to_string()]);

        let narrow = c.wrap("2022-01-01 00:00:00", 140.0);
        assert_eq!(narrow, vec!["2022-01-01".to_string(), "00:00:00".to_string()]);

        assert!(c.wrap("   ", 100.0).is_empty());
    }
}
