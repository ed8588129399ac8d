use image::buffer::ConvertBuffer;
use image::imageops::{self, ColorMap};
use image::{Rgb, RgbImage};

use crate::caption::CompositeFrame;
use crate::error::RenderError;

/// A fixed indexed palette of at most 256 opaque colors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Palette {
    colors: Vec<Rgb<u8>>,
}

impl Palette {
    pub fn new(colors: Vec<Rgb<u8>>) -> Result<Self, RenderError> {
        if colors.is_empty() || colors.len() > 256 {
            return Err(RenderError::Palette(colors.len()));
        }
        Ok(Self { colors })
    }

    /// The 256-color Plan 9 palette: the RGB cube split 4x4x4, with four
    /// shades per subcube.
    pub fn plan9() -> Self {
        let mut colors = vec![Rgb([0u8; 3]); 256];
        let mut i: i32 = 0;
        for r in 0..4i32 {
            for v in 0..4i32 {
                let mut j = v - r;
                for g in 0..4i32 {
                    for b in 0..4i32 {
                        let den = r.max(g).max(b);
                        let rgb = if den == 0 {
                            [0x11 * v; 3]
                        } else {
                            let num = 17 * (4 * den + v);
                            [r * num / den, g * num / den, b * num / den]
                        };
                        colors[(i + (j & 0x0f)) as usize] = Rgb(rgb.map(|c| c as u8));
                        j += 1;
                    }
                }
                i += 16;
            }
        }
        Self { colors }
    }

    pub fn colors(&self) -> &[Rgb<u8>] {
        &self.colors
    }

    /// Index of the closest entry by squared RGB distance; ties go to the lower index.
    pub fn nearest(&self, color: &Rgb<u8>) -> usize {
        let mut best = 0;
        let mut best_distance = u32::MAX;
        for (index, candidate) in self.colors.iter().enumerate() {
            let distance: u32 = color
                .0
                .iter()
                .zip(candidate.0.iter())
                .map(|(&a, &b)| {
                    let d = a as i32 - b as i32;
                    (d * d) as u32
                })
                .sum();
            if distance < best_distance {
                best = index;
                best_distance = distance;
                if distance == 0 {
                    break;
                }
            }
        }
        best
    }

    /// Flat `r, g, b, r, g, b, ...` table as stored in an animation's color table.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        self.colors.iter().flat_map(|c| c.0).collect()
    }
}

impl ColorMap for Palette {
    type Color = Rgb<u8>;

    fn index_of(&self, color: &Rgb<u8>) -> usize {
        self.nearest(color)
    }

    fn lookup(&self, index: usize) -> Option<Rgb<u8>> {
        self.colors.get(index).copied()
    }

    fn has_lookup(&self) -> bool {
        true
    }

    fn map_color(&self, color: &mut Rgb<u8>) {
        *color = self.colors[self.nearest(color)];
    }
}

/// A composite frame reduced to palette indices, one byte per pixel in raster order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PalettizedFrame {
    pub caption: String,
    pub width: u32,
    pub height: u32,
    pub indices: Vec<u8>,
}

/// Map every pixel of `frame` onto `palette` with Floyd-Steinberg error diffusion.
pub fn quantize(frame: &CompositeFrame, palette: &Palette) -> PalettizedFrame {
    let mut rgb: RgbImage = frame.image.convert();
    imageops::dither(&mut rgb, palette);
    let indexed = imageops::index_colors(&rgb, palette);
    PalettizedFrame {
        caption: frame.caption.clone(),
        width: indexed.width(),
        height: indexed.height(),
        indices: indexed.into_raw(),
    }
}
