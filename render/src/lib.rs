//! Turns fetched frames into a captioned, palettized, looping animation.
//!
//! Per frame, in input order: decode the PNG, draw the timestamp caption
//! ([`caption`]), reduce to a fixed palette with error diffusion
//! ([`palette`]), then append to the [`animation`].

pub mod animation;
pub mod artifact;
pub mod caption;
pub mod error;
pub mod palette;

use std::io::Cursor;

use earth_gif_common::config::RenderConfig;
use earth_gif_common::frame::FetchedFrame;
use image::{DynamicImage, ImageReader};
use tracing::debug;

pub use animation::Animation;
pub use artifact::write_atomic;
pub use caption::{CaptionStyle, Captioner, CompositeFrame};
pub use error::RenderError;
pub use palette::{quantize, Palette, PalettizedFrame};

/// Build the animation for `frames`, keeping their order.
pub fn render_animation(
    frames: &[FetchedFrame],
    captioner: &Captioner,
    palette: &Palette,
    config: &RenderConfig,
) -> Result<Animation, RenderError> {
    let mut animation = Animation::new(palette.clone(), config.loop_mode);
    for (index, frame) in frames.iter().enumerate() {
        let background = decode_frame(frame)?;
        let composite = captioner.compose(&background, frame.caption());
        animation.push(quantize(&composite, palette), config.frame_delay_cs);
        debug!(index, image = frame.descriptor.image, caption = frame.caption(), "frame rendered");
    }
    Ok(animation)
}

pub fn decode_frame(frame: &FetchedFrame) -> Result<DynamicImage, RenderError> {
    let decode_error = |source| RenderError::Decode {
        image: frame.descriptor.image.clone(),
        source,
    };
    ImageReader::new(Cursor::new(&frame.bytes[..]))
        .with_guessed_format()
        .map_err(|e| decode_error(image::ImageError::IoError(e)))?
        .decode()
        .map_err(decode_error)
}
