use crate::foundation::error::{StitchError, StitchResult};

/// Bytes per RGBA8 pixel.
pub const RGBA8_BYTES_PER_PIXEL: usize = 4;

/// Width and height of an image in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Dimensions {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Dimensions {
    /// Create a dimensions value.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Number of pixels, or `None` on overflow.
    pub fn pixel_count(self) -> Option<usize> {
        (self.width as usize).checked_mul(self.height as usize)
    }

    /// Length in bytes of one tightly packed RGBA8 row.
    pub fn row_bytes(self) -> StitchResult<usize> {
        (self.width as usize)
            .checked_mul(RGBA8_BYTES_PER_PIXEL)
            .ok_or_else(|| {
                StitchError::resource_exhausted(format!("row of {} px overflows", self.width))
            })
    }

    /// Length in bytes of a tightly packed RGBA8 buffer with these dimensions.
    pub fn rgba8_len(self) -> StitchResult<usize> {
        self.pixel_count()
            .and_then(|px| px.checked_mul(RGBA8_BYTES_PER_PIXEL))
            .ok_or_else(|| {
                StitchError::resource_exhausted(format!(
                    "{}x{} rgba8 buffer size overflows usize",
                    self.width, self.height
                ))
            })
    }
}

impl std::fmt::Display for Dimensions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// Position of one fragment on the canvas.
///
/// `left` is always 0 for vertical stacking; it is kept so a placement reads as a full
/// `(index, top, left)` triple in logs and reports.
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize)]
pub struct Placement {
    /// Index of the fragment in submission order.
    pub index: usize,
    /// First canvas row covered by the fragment.
    pub top: u32,
    /// First canvas column covered by the fragment.
    pub left: u32,
    /// Fragment size.
    pub size: Dimensions,
}

impl Placement {
    /// One past the last canvas row covered by this placement, saturating at `u32::MAX`.
    pub fn bottom(self) -> u32 {
        self.top.saturating_add(self.size.height)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
