use std::io::Cursor;

use image::ImageEncoder as _;
use image::codecs::png::{CompressionType, FilterType, PngEncoder};

use crate::codec::{DecodedImage, ImageCodec, OutputFormat};
use crate::foundation::core::Dimensions;
use crate::foundation::error::{StitchError, StitchResult};

/// zlib effort used when writing the stitched PNG.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum PngCompression {
    /// Fastest encode, larger files.
    Fast,
    /// Balanced default.
    #[default]
    Default,
    /// Smallest files, slowest encode.
    Best,
}

impl From<PngCompression> for CompressionType {
    fn from(c: PngCompression) -> Self {
        match c {
            PngCompression::Fast => CompressionType::Fast,
            PngCompression::Default => CompressionType::Default,
            PngCompression::Best => CompressionType::Best,
        }
    }
}

/// Codec that accepts any input format enabled in `image` and always writes PNG.
#[derive(Clone, Copy, Debug, Default)]
pub struct PngCodec {
    compression: PngCompression,
}

impl PngCodec {
    /// Create a codec writing with the given compression effort.
    pub fn new(compression: PngCompression) -> Self {
        Self { compression }
    }

    /// Compression effort used by [`ImageCodec::encode_rgba8`].
    pub fn compression(&self) -> PngCompression {
        self.compression
    }
}

impl ImageCodec for PngCodec {
    fn probe(&self, bytes: &[u8]) -> StitchResult<Dimensions> {
        let reader = sniff(bytes)?;
        let (width, height) = reader.into_dimensions().map_err(map_decode_err)?;
        Ok(Dimensions::new(width, height))
    }

    fn decode_rgba8(&self, bytes: &[u8]) -> StitchResult<DecodedImage> {
        let reader = sniff(bytes)?;
        let rgba = reader.decode().map_err(map_decode_err)?.into_rgba8();
        let (width, height) = rgba.dimensions();
        Ok(DecodedImage {
            size: Dimensions::new(width, height),
            rgba8: rgba.into_raw(),
        })
    }

    fn encode_rgba8(&self, size: Dimensions, rgba8: &[u8]) -> StitchResult<Vec<u8>> {
        let expected = size.rgba8_len()?;
        if rgba8.len() != expected {
            return Err(StitchError::encode(format!(
                "canvas buffer is {} bytes, expected {expected} for {size}",
                rgba8.len()
            )));
        }

        let mut out = Vec::new();
        let encoder =
            PngEncoder::new_with_quality(&mut out, self.compression.into(), FilterType::Adaptive);
        encoder
            .write_image(
                rgba8,
                size.width,
                size.height,
                image::ExtendedColorType::Rgba8,
            )
            .map_err(|e| StitchError::encode(format!("write png {size}: {e}")))?;
        Ok(out)
    }

    fn output_format(&self) -> OutputFormat {
        OutputFormat::Png
    }
}

fn sniff(bytes: &[u8]) -> StitchResult<image::ImageReader<Cursor<&[u8]>>> {
    if bytes.is_empty() {
        return Err(StitchError::decode("empty image buffer"));
    }
    let reader = image::ImageReader::new(Cursor::new(bytes))
        .with_guessed_format()
        .map_err(|e| StitchError::decode(format!("sniff image format: {e}")))?;
    if reader.format().is_none() {
        return Err(StitchError::decode("unrecognized image format"));
    }
    Ok(reader)
}

fn map_decode_err(err: image::ImageError) -> StitchError {
    match err {
        image::ImageError::Limits(e) => {
            StitchError::resource_exhausted(format!("decoder limits exceeded: {e}"))
        }
        other => StitchError::decode(other.to_string()),
    }
}

#[cfg(test)]
#[path = "../../tests/unit/codec/png.rs"]
mod tests;
