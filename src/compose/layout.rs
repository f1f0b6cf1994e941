use crate::foundation::core::{Dimensions, Placement};
use crate::foundation::error::{StitchError, StitchResult};

/// Canvas size plus the placement of every fragment, top to bottom.
///
/// Placements are contiguous: each one starts where the previous one ends, the first starts at
/// row 0 and the last ends at `size.height`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Layout {
    size: Dimensions,
    placements: Vec<Placement>,
}

impl Layout {
    /// Canvas dimensions.
    pub fn size(&self) -> Dimensions {
        self.size
    }

    /// Placements in fragment order.
    pub fn placements(&self) -> &[Placement] {
        &self.placements
    }
}

/// Check that every fragment has the width of the first one.
///
/// Reports the first offending index.
pub fn validate_widths(sizes: &[Dimensions]) -> StitchResult<u32> {
    let Some(first) = sizes.first() else {
        return Err(StitchError::request("at least one fragment is required"));
    };
    let expected = first.width;
    if let Some((index, found)) = sizes
        .iter()
        .enumerate()
        .skip(1)
        .find(|(_, s)| s.width != expected)
    {
        return Err(StitchError::WidthMismatch {
            index,
            expected,
            found: found.width,
        });
    }
    Ok(expected)
}

/// Validate widths, then fold fragment heights into contiguous placements.
pub fn plan_layout(sizes: &[Dimensions]) -> StitchResult<Layout> {
    let width = validate_widths(sizes)?;

    let (height, placements) = sizes.iter().enumerate().try_fold(
        (0u32, Vec::with_capacity(sizes.len())),
        |(top, mut placements), (index, &size)| {
            let bottom = top.checked_add(size.height).ok_or_else(|| {
                StitchError::resource_exhausted(format!(
                    "total height overflows u32 at fragment {index}"
                ))
            })?;
            placements.push(Placement {
                index,
                top,
                left: 0,
                size,
            });
            Ok::<_, StitchError>((bottom, placements))
        },
    )?;

    Ok(Layout {
        size: Dimensions::new(width, height),
        placements,
    })
}

#[cfg(test)]
#[path = "../../tests/unit/compose/layout.rs"]
mod tests;
