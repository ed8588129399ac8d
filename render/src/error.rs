#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error("load_font {path}: {reason}")]
    FontLoad { path: String, reason: String },
    #[error("decode_frame {image}: {source}")]
    Decode {
        image: String,
        #[source]
        source: image::ImageError,
    },
    #[error("palette must hold between 1 and 256 colors, got {0}")]
    Palette(usize),
    #[error("encode_animation: no frames to encode")]
    Empty,
    #[error("encode_animation: frame is {width}x{height}, over the 65535 pixel limit")]
    TooLarge { width: u32, height: u32 },
    #[error("encode_animation: {0}")]
    Encode(#[from] gif::EncodingError),
    #[error("{op} {path}: {source}")]
    Filesystem {
        op: &'static str,
        path: String,
        #[source]
        source: std::io::Error,
    },
}
