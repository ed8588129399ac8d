use std::borrow::Cow;

use earth_gif_common::config::LoopMode;
use gif::{Encoder, Frame, Repeat};
use tracing::debug;

use crate::error::RenderError;
use crate::palette::{Palette, PalettizedFrame};

/// Ordered palettized frames plus per-frame delays, sharing one global palette.
#[derive(Debug, Clone)]
pub struct Animation {
    palette: Palette,
    loop_mode: LoopMode,
    frames: Vec<PalettizedFrame>,
    delays: Vec<u16>,
}

impl Animation {
    pub fn new(palette: Palette, loop_mode: LoopMode) -> Self {
        Self {
            palette,
            loop_mode,
            frames: Vec::new(),
            delays: Vec::new(),
        }
    }

    /// Append a frame shown for `delay_cs` hundredths of a second.
    pub fn push(&mut self, frame: PalettizedFrame, delay_cs: u16) {
        self.frames.push(frame);
        self.delays.push(delay_cs);
    }

    pub fn delays(&self) -> &[u16] {
        &self.delays
    }

    pub fn captions(&self) -> impl Iterator<Item = &str> {
        self.frames.iter().map(|f| f.caption.as_str())
    }

    /// Value written to the loop extension.
    pub fn repeat(&self) -> Repeat {
        match self.loop_mode {
            LoopMode::FrameCount => Repeat::Finite(self.frames.len().min(u16::MAX as usize) as u16),
            LoopMode::Infinite => Repeat::Infinite,
        }
    }

    /// Encode as a GIF89a byte stream. Every frame is placed at the origin of a
    /// logical screen as large as the largest frame.
    pub fn encode(&self) -> Result<Vec<u8>, RenderError> {
        if self.frames.is_empty() {
            return Err(RenderError::Empty);
        }
        let width = self.frames.iter().map(|f| f.width).max().unwrap_or(0);
        let height = self.frames.iter().map(|f| f.height).max().unwrap_or(0);
        if width > u16::MAX as u32 || height > u16::MAX as u32 {
            return Err(RenderError::TooLarge { width, height });
        }

        let mut out = Vec::new();
        {
            let mut encoder = Encoder::new(
                &mut out,
                width as u16,
                height as u16,
                &self.palette.to_rgb_bytes(),
            )?;
            encoder.set_repeat(self.repeat())?;

            for (frame, &delay) in self.frames.iter().zip(&self.delays) {
                let mut gif_frame = Frame::default();
                gif_frame.width = frame.width as u16;
                gif_frame.height = frame.height as u16;
                gif_frame.delay = delay;
                gif_frame.buffer = Cow::Borrowed(frame.indices.as_slice());
                encoder.write_frame(&gif_frame)?;
            }
            // The trailer is written when the encoder drops.
        }

        debug!(
            frames = self.frames.len(),
            width,
            height,
            bytes = out.len(),
            "animation encoded"
        );
        Ok(out)
    }
}
