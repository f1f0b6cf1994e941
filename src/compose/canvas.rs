use crate::compose::layout::Layout;
use crate::foundation::core::{Dimensions, Placement, RGBA8_BYTES_PER_PIXEL};
use crate::foundation::error::{StitchError, StitchResult};

/// Straight-alpha RGBA8 raster the fragments are placed onto.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    size: Dimensions,
    rgba8: Vec<u8>,
}

impl Canvas {
    /// Allocate a fully transparent canvas.
    ///
    /// Allocation failure is reported as [`StitchError::ResourceExhausted`] instead of aborting.
    pub fn transparent(size: Dimensions) -> StitchResult<Self> {
        let len = size.rgba8_len()?;
        let mut rgba8 = Vec::new();
        rgba8.try_reserve_exact(len).map_err(|e| {
            StitchError::resource_exhausted(format!("allocate {size} canvas ({len} bytes): {e}"))
        })?;
        rgba8.resize(len, 0);
        Ok(Self { size, rgba8 })
    }

    /// Canvas dimensions.
    pub fn size(&self) -> Dimensions {
        self.size
    }

    /// Pixel bytes, row-major, tightly packed.
    pub fn as_rgba8(&self) -> &[u8] {
        &self.rgba8
    }

    /// Consume the canvas and return its pixel bytes.
    pub fn into_rgba8(self) -> Vec<u8> {
        self.rgba8
    }

    /// Read one pixel, or `None` when out of bounds.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.size.width || y >= self.size.height {
            return None;
        }
        let idx = ((y as usize) * (self.size.width as usize) + (x as usize)) * RGBA8_BYTES_PER_PIXEL;
        let px = self.rgba8.get(idx..idx + RGBA8_BYTES_PER_PIXEL)?;
        Some([px[0], px[1], px[2], px[3]])
    }

    /// Copy a fragment's pixels into the rows covered by `placement`.
    pub fn place(&mut self, placement: Placement, rgba8: &[u8]) -> StitchResult<()> {
        let band = self.band_mut(placement)?;
        blit_band(band, placement, rgba8)
    }

    fn band_mut(&mut self, placement: Placement) -> StitchResult<&mut [u8]> {
        if placement.size.width != self.size.width || placement.left != 0 {
            return Err(StitchError::Other(anyhow::anyhow!(
                "placement of fragment {} does not span the {} px canvas width",
                placement.index,
                self.size.width
            )));
        }
        let row = self.size.row_bytes()?;
        let range = (placement.top as usize)
            .checked_mul(row)
            .zip(row.checked_mul(placement.size.height as usize))
            .and_then(|(start, len)| Some(start..start.checked_add(len)?));
        range
            .and_then(|r| self.rgba8.get_mut(r))
            .ok_or_else(|| {
                StitchError::Other(anyhow::anyhow!(
                    "placement of fragment {} ({} rows from row {}) is outside the {} canvas",
                    placement.index,
                    placement.size.height,
                    placement.top,
                    self.size
                ))
            })
    }

    /// Split the canvas into one disjoint mutable band per placement.
    pub(crate) fn bands_mut(&mut self, layout: &Layout) -> StitchResult<Vec<&mut [u8]>> {
        if layout.size() != self.size {
            return Err(StitchError::Other(anyhow::anyhow!(
                "layout size {} does not match canvas size {}",
                layout.size(),
                self.size
            )));
        }
        let row = self.size.row_bytes()?;
        let mut rest: &mut [u8] = &mut self.rgba8;
        let mut bands = Vec::with_capacity(layout.placements().len());
        for p in layout.placements() {
            let (band, tail) = std::mem::take(&mut rest).split_at_mut(row * p.size.height as usize);
            bands.push(band);
            rest = tail;
        }
        Ok(bands)
    }
}

/// Overwrite `band` with the fragment's pixels.
///
/// The band is untouched and fully transparent, so source-over reduces to a straight copy and the
/// fragment's alpha is kept as-is.
pub(crate) fn blit_band(band: &mut [u8], placement: Placement, rgba8: &[u8]) -> StitchResult<()> {
    if band.len() != rgba8.len() {
        return Err(StitchError::Decode {
            fragment: Some(placement.index),
            message: format!(
                "decoded pixels are {} bytes, expected {} for {}",
                rgba8.len(),
                band.len(),
                placement.size
            ),
        });
    }
    band.copy_from_slice(rgba8);
    Ok(())
}

#[cfg(test)]
#[path = "../../tests/unit/compose/canvas.rs"]
mod tests;
