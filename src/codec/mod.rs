//! Codec capability used by the inspector and the compositor.
//!
//! The stitching logic only needs three things from an image library: a cheap header probe, a
//! full decode to straight-alpha RGBA8, and an encoder for the finished canvas. [`ImageCodec`]
//! captures exactly that so the layout and placement code stays independent of the codec.

/// PNG codec backed by the `image` crate.
pub mod png;

use crate::foundation::core::Dimensions;
use crate::foundation::error::StitchResult;

/// Fully decoded fragment pixels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DecodedImage {
    /// Pixel dimensions.
    pub size: Dimensions,
    /// Straight-alpha RGBA8, row-major, tightly packed.
    pub rgba8: Vec<u8>,
}

/// Output format of the finished canvas.
///
/// Only one lossless, alpha-capable format is produced.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize)]
pub enum OutputFormat {
    /// Portable Network Graphics.
    #[default]
    Png,
}

impl OutputFormat {
    /// MIME type for the `Content-Type` header.
    pub fn content_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
        }
    }

    /// Filename suggested for attachment delivery.
    pub fn suggested_filename(self) -> &'static str {
        match self {
            Self::Png => "stitched_image.png",
        }
    }
}

/// Decode/encode capability required by the stitching pipeline.
///
/// Implementations must be shareable across threads: probing and decoding run on rayon workers.
pub trait ImageCodec: Send + Sync {
    /// Read only as much of `bytes` as needed to learn the image dimensions.
    fn probe(&self, bytes: &[u8]) -> StitchResult<Dimensions>;

    /// Decode `bytes` to straight-alpha RGBA8.
    fn decode_rgba8(&self, bytes: &[u8]) -> StitchResult<DecodedImage>;

    /// Encode a tightly packed straight-alpha RGBA8 buffer.
    fn encode_rgba8(&self, size: Dimensions, rgba8: &[u8]) -> StitchResult<Vec<u8>>;

    /// Format produced by [`ImageCodec::encode_rgba8`].
    fn output_format(&self) -> OutputFormat;
}
